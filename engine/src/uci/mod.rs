pub mod options;
pub mod parser;

pub use options::{parse_option_line, EngineOption, OptionKind, OptionValue};
pub use parser::{parse_bestmove, parse_info_line, parse_uci_message, UciMessage};

use std::time::Duration;

pub type UciResult<T> = Result<T, UciError>;

#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Engine did not send uciok within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("Handshake failed: {0}")]
    HandshakeFailure(String),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("Engine exited unexpectedly")]
    EngineExited,
    #[error("Engine did not respond within {0:?}")]
    ResponseTimeout(Duration),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Session is closed")]
    SessionClosed,
    #[error("Engine has no stdin")]
    NoStdin,
    #[error("Engine has no stdout")]
    NoStdout,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UciError {
    /// Errors after which the conversation is out of sync and the
    /// session must be torn down.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UciError::EngineExited
                | UciError::ResponseTimeout(_)
                | UciError::HandshakeTimeout(_)
                | UciError::HandshakeFailure(_)
                | UciError::Io(_)
        )
    }
}
