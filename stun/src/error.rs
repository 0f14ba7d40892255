use thiserror::Error;

/// Protocol-level error kinds surfaced by the codec and agent.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("stun message buffer is incomplete")]
    Incomplete,

    #[error("malformed stun message: {0}")]
    Malformed(String),

    #[error("attribute of type {0:#06x} is not implemented")]
    UnimplementedAttribute(u16),

    #[error("invalid error code {0}")]
    InvalidErrorCode(u16),

    #[error("message would exceed the 64 KiB STUN size limit")]
    NoBuf,

    #[error("message failed authentication")]
    Unauthorized,

    #[error("message carries unknown comprehension-required attributes: {0:?}")]
    UnknownAttribute(Vec<u16>),

    #[error("response does not match any outstanding transaction")]
    UnmatchedResponse,

    #[error("fingerprint does not match message contents")]
    BadFingerprint,

    #[error("attribute {0:#06x} not present")]
    NotFound(u16),

    #[error("attribute {0:#06x} has an invalid encoding: {1}")]
    Invalid(u16, String),
}
