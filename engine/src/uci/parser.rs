use super::options::{parse_option_line, EngineOption};
use super::{UciError, UciResult};
use crate::{Score, ScoreBound, SearchInfo};

/// A line the engine prints during the `uci` handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    IdName(String),
    IdAuthor(String),
    Option(EngineOption),
    Unrecognized(String),
}

/// Classify a handshake line
///
/// Identity lines keep the remainder of the line verbatim. Anything that is
/// not an identity or option line comes back as `Unrecognized`; terminators
/// are matched by the session itself.
pub fn parse_uci_message(line: &str) -> UciMessage {
    if let Some(name) = line.strip_prefix("id name ") {
        return UciMessage::IdName(name.to_string());
    }
    if let Some(author) = line.strip_prefix("id author ") {
        return UciMessage::IdAuthor(author.to_string());
    }
    if line.starts_with("option ") {
        return UciMessage::Option(parse_option_line(line));
    }
    UciMessage::Unrecognized(line.to_string())
}

/// Split a `bestmove <m> [ponder <m2>]` line into its move tokens.
pub fn parse_bestmove(line: &str) -> UciResult<(String, Option<String>)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(UciError::ProtocolViolation(format!(
            "bestmove without a move: '{}'",
            line
        )));
    }
    let mv = tokens[1].to_string();
    let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
        Some(tokens[3].to_string())
    } else {
        None
    };
    Ok((mv, ponder))
}

/// Parse an `info ...` line, returning `None` for anything else.
pub fn parse_info_line(line: &str) -> Option<SearchInfo> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first() {
        Some(&"info") => Some(parse_info_tokens(&tokens[1..])),
        _ => None,
    }
}

fn parse_info_tokens(tokens: &[&str]) -> SearchInfo {
    let mut info = SearchInfo::default();
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
                    // Bound qualifier follows the value
                    match tokens.get(i + 1) {
                        Some(&"lowerbound") => {
                            info.bound = Some(ScoreBound::Lower);
                            i += 1;
                        }
                        Some(&"upperbound") => {
                            info.bound = Some(ScoreBound::Upper);
                            i += 1;
                        }
                        _ => {}
                    }
                }
            }
            "pv" => {
                // Collect all moves until next keyword
                i += 1;
                while i < tokens.len() && !is_keyword(tokens[i]) {
                    info.pv.push(tokens[i].to_string());
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
                info.currmove = tokens.get(i).map(|s| s.to_string());
            }
            "hashfull" => {
                i += 1;
                info.hashfull = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "string" => {
                // Free text runs to the end of the line
                break;
            }
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
            | "sbhits"
            | "cpuload"
            | "refutation"
            | "currline"
            | "string"
    )
}
