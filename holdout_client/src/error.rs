// Error taxonomy for the synchronization layer.
//
// Only channel-level failures surface to the host application; every
// other failure class (unknown entity, malformed message, server-side
// rejection) is recovered locally inside the router/component boundary
// and shows up as a log line, not an error value.

use thiserror::Error;

/// Channel-level failures. `Unreachable` is terminal for the session —
/// there is no automatic reconnect.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The endpoint could not be reached or the connect handshake failed.
    #[error("endpoint unreachable: {0}")]
    Unreachable(#[from] std::io::Error),
    /// A send was attempted while the channel was not open. The message
    /// was dropped, not queued.
    #[error("channel is not open")]
    NotConnected,
    /// The peer closed the channel (or the write half broke) mid-send.
    #[error("channel closed")]
    Closed,
}
