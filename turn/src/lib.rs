//! TURN client socket.
//!
//! Grounded in `original_source/socket/turn.c` and `udp-turn.c`: a
//! `TurnSocket` wraps a base datagram socket and speaks one of four
//! dialects to a relay server, trading channel/permission state for the
//! ability to punch a hole in the relay rather than a remote NAT.

pub mod channel;
mod client;
pub mod credentials;
pub mod permission;
pub mod socket;

pub use client::{Received, TurnSocket};
pub use credentials::Credentials;
pub use socket::{BaseSocket, RecvOutcome, SendOutcome};

use thiserror::Error;

/// Which TURN dialect a socket speaks, per `original_source/socket/
/// turn.h`'s `NiceTurnSocketCompatibility` plus the OC2007 vendor variant
/// `spec.md` §4.E adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// RFC 5766 ChannelBind/CreatePermission, long-term credentials.
    Draft9Rfc5766,
    /// Legacy SetActiveDestination, short-term credentials, no indication
    /// auth, base64-encoded username/password.
    Msn,
    /// Legacy SetActiveDestination via a single implicit `Send` request,
    /// short-term credentials, credentials ignored on validation.
    Google,
    /// Microsoft OC2007: SetActiveDestination, long-term credentials,
    /// MS-VERSION/MS-SEQUENCE-NUMBER on every message.
    Oc2007,
}

/// `TURN_MAGIC_COOKIE` attribute value carried by the legacy dialects'
/// `Send`/`SetActiveDestination` requests, distinct from the STUN header
/// cookie. Reconstructed from `original_source/socket/udp-turn.c`'s
/// references to `TURN_MAGIC_COOKIE` (definition filtered out of the
/// retained excerpt); see DESIGN.md.
pub(crate) const TURN_MAGIC_COOKIE: u32 = 0x72C6_4BC6;

/// Attribute type numbers used only by the legacy TURN dialects, not
/// present in the RFC 5389/5766 IANA table `stun::attribute` implements.
/// Reconstructed placeholders (see DESIGN.md), carried generically via
/// `stun::Message::append_u32`/`find32` rather than as dedicated
/// `stun::Attribute` variants, since they never appear outside this
/// crate.
pub(crate) const TYPE_MAGIC_COOKIE_ATTR: u16 = 0x0018;
pub(crate) const TYPE_OPTIONS: u16 = 0x8001;

/// OC2007 announces itself as version `1` in MS-VERSION.
pub(crate) const OC2007_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Stun(#[from] stun::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid turn credentials")]
    InvalidCredentials,

    #[error("no free channel numbers available in 0x4000..=0x7ffe")]
    ChannelRangeExhausted,

    #[error("turn server rejected the request: {0:?}")]
    Rejected(stun::NumericCode),

    #[error("operation would block")]
    WouldBlock,
}
