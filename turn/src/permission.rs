//! RFC 5766 CreatePermission lifecycle.
//!
//! `original_source/socket/turn.c` (draft-9) predates CreatePermission
//! entirely — it channel-binds every peer directly. This module is a
//! [SUPPLEMENT]: the permission state machine `spec.md` §4.E describes
//! for the RFC 5766 dialect, built in the same style (plain struct, no
//! hidden allocation, explicit timer) as `turn::channel::Channel`.

use std::time::Instant;

use address::Address;

/// Permission lifetime is 300 s; refresh 60 s before expiry.
pub const PERMISSION_REFRESH_SECS: u64 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// CreatePermission sent, awaiting the response.
    Pending,
    Installed,
}

#[derive(Debug, Clone)]
pub struct Permission {
    pub peer: Address,
    pub state: PermissionState,
    pub refresh_at: Instant,
}

impl Permission {
    pub fn pending(peer: Address, now: Instant) -> Self {
        Self {
            peer,
            state: PermissionState::Pending,
            refresh_at: now,
        }
    }

    pub fn install(&mut self, now: Instant) {
        self.state = PermissionState::Installed;
        self.refresh_at = now + std::time::Duration::from_secs(PERMISSION_REFRESH_SECS);
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.state == PermissionState::Installed && now >= self.refresh_at
    }
}
