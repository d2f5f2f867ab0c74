//! Text and JSON rendering of engine responses.

use engine::{EngineIdentity, EngineOption, Score, ScoreBound, SearchInfo, SearchResult};
use serde::Serialize;

/// Identity plus advertised options, as printed by `info --json`.
#[derive(Debug, Serialize)]
pub struct EngineReport<'a> {
    #[serde(flatten)]
    pub identity: &'a EngineIdentity,
    pub options: &'a [EngineOption],
}

/// Render the handshake the way the engine sent it.
pub fn format_report(report: &EngineReport<'_>) -> String {
    let mut out = format!(
        "id name {}\nid author {}\n",
        report.identity.name, report.identity.author
    );
    for option in report.options {
        out.push_str(&format!("option {}\n", option));
    }
    out
}

pub fn format_info(info: &SearchInfo) -> String {
    let mut line = "info".to_string();
    if let Some(depth) = info.depth {
        line.push_str(&format!(" depth {}", depth));
    }
    if let Some(seldepth) = info.seldepth {
        line.push_str(&format!(" seldepth {}", seldepth));
    }
    if let Some(multipv) = info.multipv {
        line.push_str(&format!(" multipv {}", multipv));
    }
    match info.score {
        Some(Score::Centipawns(cp)) => line.push_str(&format!(" score cp {}", cp)),
        Some(Score::Mate(n)) => line.push_str(&format!(" score mate {}", n)),
        None => {}
    }
    match info.bound {
        Some(ScoreBound::Lower) => line.push_str(" lowerbound"),
        Some(ScoreBound::Upper) => line.push_str(" upperbound"),
        None => {}
    }
    if let Some(nodes) = info.nodes {
        line.push_str(&format!(" nodes {}", nodes));
    }
    if let Some(time) = info.time_ms {
        line.push_str(&format!(" time {}", time));
    }
    if !info.pv.is_empty() {
        line.push_str(" pv ");
        line.push_str(&info.pv.join(" "));
    }
    line
}

pub fn format_bestmove(result: &SearchResult) -> String {
    match &result.ponder {
        Some(ponder) => format!("bestmove {} ponder {}", result.best_move, ponder),
        None => format!("bestmove {}", result.best_move),
    }
}
