//! ICE-level error kinds, per `spec.md` §7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Stun(#[from] stun::Error),

    #[error(transparent)]
    Turn(#[from] turn::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation would block")]
    WouldBlock,

    #[error("transport closed")]
    Closed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("component is not connected")]
    NotConnected,

    #[error("no candidates available")]
    NoCandidates,

    #[error("no port available in the configured range")]
    PortRangeUnavailable,

    #[error("stream has been removed")]
    StreamRemoved,

    #[error("unknown stream id {0}")]
    UnknownStream(u32),

    #[error("unknown component id {0} in stream {1}")]
    UnknownComponent(u16, u32),
}
