//! Transaction retransmission timer.
//!
//! Grounded in `original_source/stun/usages/timer.h`'s
//! `StunTimer`/`StunUsageTimerReturn` state machine and the
//! `STUN_END_TIMEOUT`/retry-count constants in `original_source/socket/
//! udp-turn.c`.

use std::time::{Duration, Instant};

const INITIAL_DELAY_MS: u64 = 600;
const MAX_DELAY_MS: u64 = 4800;
const UNRELIABLE_MAX_RETRIES: u32 = 7;
const RELIABLE_TIMEOUT_MS: u64 = 7900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The timer hasn't expired yet; keep waiting.
    Ok,
    /// The current delay elapsed and a retry is due; the timer has
    /// already rearmed itself with the next (doubled) delay.
    Retransmit,
    /// The transaction has exhausted its retries (or, for a reliable
    /// transport, its single timeout) and should be abandoned.
    Timeout,
}

/// A single outstanding transaction's retransmission schedule.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    deadline: Instant,
    current_delay: Duration,
    retries: u32,
    max_retries: u32,
    reliable: bool,
}

impl Timer {
    /// 600 ms initial delay, doubling on every retransmit up to 4800 ms,
    /// for up to 7 retries (≈9500 ms total, matching `STUN_END_TIMEOUT`).
    pub fn unreliable(now: Instant) -> Self {
        let current_delay = Duration::from_millis(INITIAL_DELAY_MS);
        Self {
            deadline: now + current_delay,
            current_delay,
            retries: 0,
            max_retries: UNRELIABLE_MAX_RETRIES,
            reliable: false,
        }
    }

    /// A single 7900 ms timeout; the underlying transport (e.g. TCP)
    /// already retransmits, so no STUN-level retry is attempted.
    pub fn reliable(now: Instant) -> Self {
        let current_delay = Duration::from_millis(RELIABLE_TIMEOUT_MS);
        Self {
            deadline: now + current_delay,
            current_delay,
            retries: 0,
            max_retries: 0,
            reliable: true,
        }
    }

    /// The only state update: checks `now` against the deadline and, if
    /// it's passed, either rearms for the next retransmit or declares a
    /// timeout.
    pub fn refresh(&mut self, now: Instant) -> Refresh {
        if now < self.deadline {
            return Refresh::Ok;
        }

        if self.reliable || self.retries >= self.max_retries {
            return Refresh::Timeout;
        }

        self.retries += 1;
        let doubled = self.current_delay * 2;
        self.current_delay = if doubled > Duration::from_millis(MAX_DELAY_MS) {
            Duration::from_millis(MAX_DELAY_MS)
        } else {
            doubled
        };
        self.deadline = now + self.current_delay;

        Refresh::Retransmit
    }

    /// Time remaining until the next deadline; purely informational, not
    /// a state transition.
    pub fn remainder(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreliable_retransmits_then_times_out() {
        let t0 = Instant::now();
        let mut timer = Timer::unreliable(t0);

        assert_eq!(timer.refresh(t0), Refresh::Ok);

        let mut now = t0 + Duration::from_millis(INITIAL_DELAY_MS);
        for _ in 0..UNRELIABLE_MAX_RETRIES {
            assert_eq!(timer.refresh(now), Refresh::Retransmit);
            now += timer.remainder(now) + Duration::from_millis(1);
        }
        assert_eq!(timer.refresh(now), Refresh::Timeout);
    }

    #[test]
    fn reliable_has_single_timeout_no_retransmit() {
        let t0 = Instant::now();
        let mut timer = Timer::reliable(t0);
        assert_eq!(timer.refresh(t0), Refresh::Ok);
        let past = t0 + Duration::from_millis(RELIABLE_TIMEOUT_MS + 1);
        assert_eq!(timer.refresh(past), Refresh::Timeout);
    }

    #[test]
    fn delay_caps_at_max() {
        let t0 = Instant::now();
        let mut timer = Timer::unreliable(t0);
        let mut now = t0;
        for _ in 0..UNRELIABLE_MAX_RETRIES {
            now += timer.remainder(now) + Duration::from_millis(1);
            timer.refresh(now);
        }
        assert!(timer.current_delay <= Duration::from_millis(MAX_DELAY_MS));
    }
}
