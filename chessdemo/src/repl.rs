//! Line commands typed at the prompt.

use chess::{parse_color, parse_promotion, parse_square, GameMode};
use cozy_chess::{Piece, Square};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Move {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
    /// A single square acts like a board click.
    Click(Square),
    Back,
    Next,
    Goto(usize),
    NewGame(Option<GameMode>),
    Flip,
    ToggleBestMove,
    Skill(u8),
    ShowFen,
    LoadFen(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  e2e4 | e2 e4 | e7e8q   make a move
  e2                     select or move like a board click
  back | next            step through history
  goto <n>               jump to position n (0 = start)
  new [white|black|pvp]  new game, optionally changing mode
  flip                   flip the board
  best                   toggle the best-move arrow
  skill <0-20>           engine skill level
  fen [FEN]              print the position or load one
  quit";

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<UserInput, String> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    match (first.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("back" | "b", []) => Ok(UserInput::Back),
        ("next" | "n", []) => Ok(UserInput::Next),
        ("goto", [index]) => index
            .parse()
            .map(UserInput::Goto)
            .map_err(|_| format!("not a position index: {}", index)),
        ("new", []) => Ok(UserInput::NewGame(None)),
        ("new", [mode]) => parse_mode(mode).map(|m| UserInput::NewGame(Some(m))),
        ("flip", []) => Ok(UserInput::Flip),
        ("best", []) => Ok(UserInput::ToggleBestMove),
        ("skill", [level]) => level
            .parse()
            .map(UserInput::Skill)
            .map_err(|_| format!("not a skill level: {}", level)),
        ("fen", []) => Ok(UserInput::ShowFen),
        ("fen", _) => Ok(UserInput::LoadFen(line[3..].trim().to_string())),
        ("help" | "?", []) => Ok(UserInput::Help),
        ("quit" | "exit" | "q", []) => Ok(UserInput::Quit),
        (word, []) => parse_move_text(word),
        (from, [to]) => parse_move_text(&format!("{}{}", from, to)),
        _ => Err(format!("unknown command: {}", line)),
    }
}

fn parse_mode(word: &str) -> Result<GameMode, String> {
    if matches!(word.to_ascii_lowercase().as_str(), "pvp" | "local") {
        return Ok(GameMode::VsPlayer);
    }
    parse_color(word)
        .map(|human| GameMode::VsComputer { human })
        .ok_or_else(|| format!("unknown mode: {}", word))
}

/// `e2`, `e2e4` or `e7e8q`.
fn parse_move_text(text: &str) -> Result<UserInput, String> {
    let text = text.to_ascii_lowercase();
    let invalid = || format!("unknown command: {}", text);
    if !text.is_ascii() {
        return Err(invalid());
    }
    match text.len() {
        2 => parse_square(&text).map(UserInput::Click).ok_or_else(invalid),
        4 | 5 => {
            let from = parse_square(&text[0..2]).ok_or_else(invalid)?;
            let to = parse_square(&text[2..4]).ok_or_else(invalid)?;
            let promotion = match text[4..].chars().next() {
                Some(c) => Some(parse_promotion(c).ok_or_else(invalid)?),
                None => None,
            };
            Ok(UserInput::Move {
                from,
                to,
                promotion,
            })
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::Color;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn test_moves() {
        assert_eq!(
            parse_line("e2e4").unwrap(),
            UserInput::Move {
                from: sq("e2"),
                to: sq("e4"),
                promotion: None
            }
        );
        assert_eq!(parse_line(" e2  e4 ").unwrap(), parse_line("e2e4").unwrap());
        assert_eq!(
            parse_line("E7E8Q").unwrap(),
            UserInput::Move {
                from: sq("e7"),
                to: sq("e8"),
                promotion: Some(Piece::Queen)
            }
        );
        assert_eq!(parse_line("g1").unwrap(), UserInput::Click(sq("g1")));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_line("back").unwrap(), UserInput::Back);
        assert_eq!(parse_line("next").unwrap(), UserInput::Next);
        assert_eq!(parse_line("goto 3").unwrap(), UserInput::Goto(3));
        assert_eq!(parse_line("skill 20").unwrap(), UserInput::Skill(20));
        assert_eq!(parse_line("new").unwrap(), UserInput::NewGame(None));
        assert_eq!(
            parse_line("new black").unwrap(),
            UserInput::NewGame(Some(GameMode::VsComputer {
                human: Color::Black
            }))
        );
        assert_eq!(
            parse_line("new pvp").unwrap(),
            UserInput::NewGame(Some(GameMode::VsPlayer))
        );
        assert_eq!(parse_line("quit").unwrap(), UserInput::Quit);
    }

    #[test]
    fn test_fen_keeps_spaces() {
        assert_eq!(
            parse_line("fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap(),
            UserInput::LoadFen("4k3/8/8/8/8/8/8/4K3 w - - 0 1".to_string())
        );
        assert_eq!(parse_line("fen").unwrap(), UserInput::ShowFen);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_line("").is_err());
        assert!(parse_line("e9e4").is_err());
        assert!(parse_line("e7e8x").is_err());
        assert!(parse_line("skill high").is_err());
        assert!(parse_line("new purple").is_err());
        assert!(parse_line("castle kingside now").is_err());
    }
}
