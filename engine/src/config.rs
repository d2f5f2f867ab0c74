//! Tunables for one engine session.

use std::time::Duration;

/// Default time an engine gets to finish the `uci` handshake.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time `close` waits for the process to exit after `quit`.
const DEFAULT_QUIT_GRACE: Duration = Duration::from_secs(1);

/// Default bound on buffered engine output lines.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bound on the whole `uci` ... `uciok` exchange.
    pub handshake_timeout: Duration,
    /// Bound on `isready` and search responses. `None` waits indefinitely.
    pub response_timeout: Option<Duration>,
    /// How long `close` waits for a clean exit before killing the process.
    pub quit_grace: Duration,
    /// Capacity of the channel between the stdout reader task and the session.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            response_timeout: None,
            quit_grace: DEFAULT_QUIT_GRACE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }
}
