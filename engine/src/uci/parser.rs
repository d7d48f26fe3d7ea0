use crate::{EngineInfo, Score};
use cozy_chess::{File, Move, Piece, Rank, Square};

/// Incoming message from UCI engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    Id { name: String, value: String },
    /// `option name ...` advertisement sent during the handshake.
    Option(String),
    UciOk,
    ReadyOk,
    /// `mv` is `None` when the engine answers `bestmove (none)`.
    BestMove {
        mv: Option<Move>,
        ponder: Option<Move>,
    },
    Info(EngineInfo),
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, crate::UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"option") => Ok(UciMessage::Option(tokens[1..].join(" "))),

        Some(&"bestmove") => {
            if tokens.len() < 2 {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            }
            let mv = match tokens[1] {
                "(none)" | "0000" => None,
                text => Some(parse_uci_move(text)?),
            };
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                parse_uci_move(tokens[3]).ok()
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        Some(&"info") => Ok(UciMessage::Info(parse_info_line(&tokens[1..]))),

        _ => Err(crate::UciError::UnknownMessage(line.to_string())),
    }
}

/// Parse an "info" line from the engine
fn parse_info_line(tokens: &[&str]) -> EngineInfo {
    let mut info = EngineInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "seldepth" => {
                i += 1;
                info.seldepth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "time" => {
                i += 1;
                info.time_ms = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "nodes" => {
                i += 1;
                info.nodes = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "nps" => {
                i += 1;
                info.nps = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "score" => {
                i += 1;
                if let Some(&score_type) = tokens.get(i) {
                    i += 1;
                    if let Some(value_str) = tokens.get(i) {
                        info.score = match score_type {
                            "cp" => value_str.parse().ok().map(Score::Centipawns),
                            "mate" => value_str.parse().ok().map(Score::Mate),
                            _ => None,
                        };
                    }
                    // Optional bound marker after the value.
                    if matches!(tokens.get(i + 1), Some(&"lowerbound") | Some(&"upperbound")) {
                        i += 1;
                    }
                }
            }
            "pv" => {
                // Collect moves until the next keyword, dropping everything
                // from the first malformed move on.
                i += 1;
                let mut malformed = false;
                while i < tokens.len() && !is_keyword(tokens[i]) {
                    if !malformed {
                        match parse_uci_move(tokens[i]) {
                            Ok(mv) => info.pv.push(mv),
                            Err(_) => malformed = true,
                        }
                    }
                    i += 1;
                }
                continue; // Don't increment i again
            }
            "multipv" => {
                i += 1;
                info.multipv = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "currmove" => {
                i += 1;
                info.currmove = tokens.get(i).and_then(|s| parse_uci_move(s).ok());
            }
            "hashfull" => {
                i += 1;
                info.hashfull = tokens.get(i).and_then(|s| s.parse().ok());
            }
            // Free text runs to the end of the line.
            "string" => break,
            _ => {
                // Unknown keyword, skip
            }
        }
        i += 1;
    }

    info
}

fn is_keyword(token: &str) -> bool {
    matches!(
        token,
        "depth"
            | "seldepth"
            | "time"
            | "nodes"
            | "score"
            | "pv"
            | "multipv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "nps"
            | "tbhits"
            | "cpuload"
            | "string"
    )
}

/// Parse UCI move format (e2e4, e7e8q)
///
/// Castling stays in UCI form (`e1g1`); resolving it needs the position.
pub fn parse_uci_move(s: &str) -> Result<Move, crate::UciError> {
    if !(4..=5).contains(&s.len()) || !s.is_ascii() {
        return Err(crate::UciError::InvalidMove(s.to_string()));
    }

    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;

    let promotion = if s.len() == 5 {
        Some(match &s[4..5] {
            "q" => Piece::Queen,
            "r" => Piece::Rook,
            "b" => Piece::Bishop,
            "n" => Piece::Knight,
            _ => return Err(crate::UciError::InvalidPromotion(s.to_string())),
        })
    } else {
        None
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

fn parse_square(s: &str) -> Result<Square, crate::UciError> {
    let mut chars = s.chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(crate::UciError::InvalidSquare(s.to_string()));
    };

    let file = match file {
        'a' => File::A,
        'b' => File::B,
        'c' => File::C,
        'd' => File::D,
        'e' => File::E,
        'f' => File::F,
        'g' => File::G,
        'h' => File::H,
        _ => return Err(crate::UciError::InvalidSquare(s.to_string())),
    };

    let rank = match rank {
        '1' => Rank::First,
        '2' => Rank::Second,
        '3' => Rank::Third,
        '4' => Rank::Fourth,
        '5' => Rank::Fifth,
        '6' => Rank::Sixth,
        '7' => Rank::Seventh,
        '8' => Rank::Eighth,
        _ => return Err(crate::UciError::InvalidSquare(s.to_string())),
    };

    Ok(Square::new(file, rank))
}

/// Format move for UCI (cozy-chess Move → "e2e4")
pub fn format_uci_move(mv: &Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(match promo {
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            Piece::Pawn => 'p',
            Piece::King => 'k',
        });
    }
    s
}

fn format_square(sq: Square) -> String {
    let file = (b'a' + sq.file() as u8) as char;
    let rank = (b'1' + sq.rank() as u8) as char;
    format!("{}{}", file, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        let msg = parse_uci_message("bestmove e2e4 ponder e7e5").unwrap();
        match msg {
            UciMessage::BestMove { mv, ponder } => {
                assert_eq!(format_uci_move(&mv.unwrap()), "e2e4");
                assert_eq!(format_uci_move(&ponder.unwrap()), "e7e5");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_parse_bestmove_none() {
        let msg = parse_uci_message("bestmove (none)").unwrap();
        assert_eq!(
            msg,
            UciMessage::BestMove {
                mv: None,
                ponder: None
            }
        );
    }

    #[test]
    fn test_parse_info() {
        let msg = parse_uci_message("info depth 12 score cp 35 nodes 15234 pv e2e4 e7e5").unwrap();
        match msg {
            UciMessage::Info(info) => {
                assert_eq!(info.depth, Some(12));
                assert!(matches!(info.score, Some(Score::Centipawns(35))));
                assert_eq!(info.nodes, Some(15234));
                assert_eq!(info.pv.len(), 2);
                assert_eq!(info.rank(), 1);
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_parse_multipv_mate_line() {
        let msg = parse_uci_message(
            "info depth 20 seldepth 24 multipv 2 score mate -3 lowerbound nodes 99 pv h7h8q g8h8",
        )
        .unwrap();
        let UciMessage::Info(info) = msg else {
            panic!("Wrong message type");
        };
        assert_eq!(info.rank(), 2);
        assert_eq!(info.score, Some(Score::Mate(-3)));
        assert_eq!(info.nodes, Some(99));
        assert_eq!(info.pv[0].promotion, Some(Piece::Queen));
    }

    #[test]
    fn test_pv_stops_at_malformed_move() {
        let UciMessage::Info(info) =
            parse_uci_message("info depth 5 score cp 10 pv e2e9 e2e4 nodes 7").unwrap()
        else {
            panic!("Wrong message type");
        };
        assert!(info.pv.is_empty());
        assert_eq!(info.nodes, Some(7));

        let UciMessage::Info(info) =
            parse_uci_message("info depth 5 score cp 10 pv e2e4 zz e7e5").unwrap()
        else {
            panic!("Wrong message type");
        };
        assert_eq!(info.pv.len(), 1);
        assert_eq!(format_uci_move(&info.pv[0]), "e2e4");
    }

    #[test]
    fn test_info_string_is_not_parsed_as_fields() {
        let msg = parse_uci_message("info string depth 5 is not a field").unwrap();
        assert_eq!(msg, UciMessage::Info(EngineInfo::default()));
    }

    #[test]
    fn test_handshake_lines() {
        assert_eq!(parse_uci_message("uciok").unwrap(), UciMessage::UciOk);
        assert_eq!(parse_uci_message("readyok").unwrap(), UciMessage::ReadyOk);
        assert!(matches!(
            parse_uci_message("id name Stockfish 16").unwrap(),
            UciMessage::Id { name, value } if name == "name" && value == "Stockfish 16"
        ));
        assert!(matches!(
            parse_uci_message("option name Hash type spin default 16").unwrap(),
            UciMessage::Option(_)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_uci_message("Stockfish 16 by the Stockfish developers"),
            Err(crate::UciError::UnknownMessage(_))
        ));
        assert!(matches!(
            parse_uci_message("bestmove"),
            Err(crate::UciError::MalformedMessage(_))
        ));
        assert!(parse_uci_move("e2").is_err());
        assert!(parse_uci_move("e2e9").is_err());
        assert!(parse_uci_move("e7e8x").is_err());
    }
}
