pub mod config;
pub mod session;
pub mod uci;

pub use config::SessionConfig;
pub use session::{EngineIdentity, UciSession};
pub use uci::{EngineOption, OptionKind, OptionValue, UciError, UciMessage, UciResult};

use serde::Serialize;

/// Parameters for the "go" command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,     // Search depth in plies
    pub movetime: Option<u64>,  // Move time in milliseconds
    pub nodes: Option<u64>,     // Node budget
    pub mate: Option<u32>,      // Search for mate in N moves
    pub wtime: Option<u64>,     // White clock in milliseconds
    pub btime: Option<u64>,     // Black clock in milliseconds
    pub winc: Option<u64>,      // White increment in milliseconds
    pub binc: Option<u64>,      // Black increment in milliseconds
    pub movestogo: Option<u32>, // Moves until the next time control
    pub searchmoves: Vec<String>, // Restrict the search to these root moves
}

impl GoParams {
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn movetime(movetime: u64) -> Self {
        Self {
            movetime: Some(movetime),
            ..Default::default()
        }
    }

    /// Whether the engine will stop on its own. A `go` without any limit
    /// searches until `stop`, which this session never sends.
    pub fn is_bounded(&self) -> bool {
        self.depth.is_some()
            || self.movetime.is_some()
            || self.nodes.is_some()
            || self.mate.is_some()
            || self.wtime.is_some()
            || self.btime.is_some()
    }

    /// Render the `go ...` command line.
    pub fn to_command(&self) -> String {
        let mut go_cmd = "go".to_string();
        let fields: [(&str, Option<u64>); 9] = [
            ("wtime", self.wtime),
            ("btime", self.btime),
            ("winc", self.winc),
            ("binc", self.binc),
            ("movestogo", self.movestogo.map(u64::from)),
            ("depth", self.depth.map(u64::from)),
            ("nodes", self.nodes),
            ("mate", self.mate.map(u64::from)),
            ("movetime", self.movetime),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                go_cmd.push_str(&format!(" {} {}", name, value));
            }
        }
        // Last, so the move list cannot swallow a following field.
        if !self.searchmoves.is_empty() {
            go_cmd.push_str(" searchmoves");
            for mv in &self.searchmoves {
                go_cmd.push(' ');
                go_cmd.push_str(mv);
            }
        }
        go_cmd
    }
}

/// Which `info` lines a search keeps alongside its best move.
///
/// The default discards every info line. Lines carrying a bound-qualified
/// score (`lowerbound`/`upperbound`) are dropped unless explicitly included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub collect_info: bool,
    pub highest_depth_only: bool,
    pub include_upperbounds: bool,
    pub include_lowerbounds: bool,
}

impl SearchFilter {
    /// Keep every exact-score info line.
    pub fn all() -> Self {
        Self {
            collect_info: true,
            ..Default::default()
        }
    }

    /// Keep only the exact-score lines reported at the deepest depth.
    pub fn highest_depth_only() -> Self {
        Self {
            collect_info: true,
            highest_depth_only: true,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self) -> Self {
        self.collect_info = true;
        self.include_upperbounds = true;
        self.include_lowerbounds = true;
        self
    }

    pub fn collects(&self) -> bool {
        self.collect_info
            || self.highest_depth_only
            || self.include_upperbounds
            || self.include_lowerbounds
    }

    /// Whether a single info line survives the bound policy.
    fn admits(&self, info: &SearchInfo) -> bool {
        if info.score.is_none() {
            return false;
        }
        match info.bound {
            Some(ScoreBound::Upper) => self.include_upperbounds,
            Some(ScoreBound::Lower) => self.include_lowerbounds,
            None => true,
        }
    }

    /// Apply the full policy to the info lines of one search.
    pub fn apply(&self, infos: Vec<SearchInfo>) -> Vec<SearchInfo> {
        if !self.collects() {
            return Vec::new();
        }
        let mut kept: Vec<SearchInfo> = infos.into_iter().filter(|i| self.admits(i)).collect();
        if self.highest_depth_only {
            if let Some(max) = kept.iter().filter_map(|i| i.depth).max() {
                kept.retain(|i| i.depth == Some(max));
            }
        }
        kept
    }
}

/// Engine analysis information from one `info` line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub score: Option<Score>,
    pub bound: Option<ScoreBound>,
    pub pv: Vec<String>, // Principal variation, coordinate notation
    pub multipv: Option<u32>,
    pub currmove: Option<String>,
    pub hashfull: Option<u16>,
    pub nps: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Score {
    Centipawns(i32),
    Mate(i32), // Negative for being mated
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// Outcome of one search: raw protocol tokens, no notation conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub best_move: String,
    pub ponder: Option<String>,
    pub infos: Vec<SearchInfo>,
}
