//! TURN channel bindings.
//!
//! Grounded in `original_source/socket/turn.c`'s `ChannelBinding` struct
//! and `priv_add_channel_binding`'s `0x4000..0xffff` allocation loop.

use std::time::Instant;

use address::Address;

/// RFC 5766 channel numbers live in `0x4000..=0x7ffe`; libnice's search
/// loop stops at `0xffff` but the upper half of that range is reserved.
pub const CHANNEL_RANGE_START: u16 = 0x4000;
pub const CHANNEL_RANGE_END: u16 = 0x7ffe;

/// Binding lifetime is 600 s; refresh 60 s before expiry (§4.E timer table).
pub const CHANNEL_REFRESH_SECS: u64 = 540;

#[derive(Debug, Clone)]
pub struct Channel {
    pub peer: Address,
    /// `0` for the legacy dialects, which have only a single implicit slot.
    pub number: u16,
    pub refresh_at: Instant,
}

impl Channel {
    pub fn new(peer: Address, number: u16, now: Instant) -> Self {
        Self {
            peer,
            number,
            refresh_at: now + std::time::Duration::from_secs(CHANNEL_REFRESH_SECS),
        }
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        now >= self.refresh_at
    }
}

/// Picks the lowest unused channel number in the RFC 5766 range.
pub fn next_free_channel(existing: &[Channel]) -> Option<u16> {
    (CHANNEL_RANGE_START..=CHANNEL_RANGE_END)
        .find(|candidate| !existing.iter().any(|c| c.number == *candidate))
}
