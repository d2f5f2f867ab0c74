//! Runtime defaults for the CLI.
//!
//! Every value has a compile-time default and can be overridden through an
//! environment variable. Command-line flags take precedence over both.

use std::str::FromStr;

/// Default engine executable, looked up on `PATH`.
const DEFAULT_ENGINE: &str = "stockfish";

/// Default search depth in plies.
const DEFAULT_DEPTH: i32 = 10;

/// Default handshake timeout (in seconds).
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Get the engine executable name or path.
///
/// Priority:
/// 1. `BLINDFOLD_ENGINE` env variable if set
/// 2. `stockfish` as fallback
pub fn get_engine() -> String {
    std::env::var("BLINDFOLD_ENGINE").unwrap_or_else(|_| DEFAULT_ENGINE.to_string())
}

/// Get the search depth.
///
/// Priority:
/// 1. `BLINDFOLD_DEPTH` env variable if set (falls back to default if the
///    value cannot be parsed)
/// 2. `10` as fallback
pub fn get_depth() -> i32 {
    parse_or(std::env::var("BLINDFOLD_DEPTH").ok(), DEFAULT_DEPTH)
}

/// Get the handshake timeout in seconds.
///
/// Priority:
/// 1. `BLINDFOLD_HANDSHAKE_TIMEOUT_SECS` env variable if set (falls back to
///    default if the value cannot be parsed as a `u64`)
/// 2. `10` seconds as fallback
pub fn get_handshake_timeout_secs() -> u64 {
    parse_or(
        std::env::var("BLINDFOLD_HANDSHAKE_TIMEOUT_SECS").ok(),
        DEFAULT_HANDSHAKE_TIMEOUT_SECS,
    )
}

/// Get the search timeout in seconds, if any.
///
/// `BLINDFOLD_SEARCH_TIMEOUT_SECS` bounds how long a search may take. Unset
/// or unparseable means searches wait for the engine indefinitely.
pub fn get_search_timeout_secs() -> Option<u64> {
    std::env::var("BLINDFOLD_SEARCH_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
