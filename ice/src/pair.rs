//! Candidate pairs: identity, priority and the per-pair check state
//! machine, per `spec.md` §3/§4.G.

use std::time::Instant;

use stun::timer::Timer;
use stun::TransactionId;

use crate::candidate::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Frozen,
    Waiting,
    InProgress,
    Succeeded,
    Failed,
}

/// RFC 5245 §5.7.2: `min(g,d)*2^32 + max(g,d)*2 + (g>d?1:0)`, where `g`
/// is the controlling side's priority and `d` the controlled side's.
pub fn pair_priority(controlling_priority: u32, controlled_priority: u32) -> u64 {
    let g = controlling_priority as u64;
    let d = controlled_priority as u64;
    let min = g.min(d);
    let max = g.max(d);
    let tie = if g > d { 1 } else { 0 };
    (min << 32) + (max * 2) + tie
}

#[derive(Debug, Clone)]
pub struct CandidatePair {
    pub local: Candidate,
    pub remote: Candidate,
    pub priority: u64,
    pub foundation: String,
    pub state: PairState,
    pub nominated: bool,
    /// Set once a successful check establishes this pair as usable, per
    /// RFC 5245's valid-list (distinct from `nominated`: a pair can be
    /// valid without yet being the nominated one for its component).
    pub valid: bool,
    pub transaction: Option<TransactionId>,
    pub timer: Option<Timer>,
    /// Set when the other side has already sent us a successful,
    /// `USE-CANDIDATE`-bearing check for this pair — nomination requires
    /// both directions to have exchanged one (§4.G "Nomination").
    pub peer_nominated: bool,
}

impl CandidatePair {
    pub fn new(local: Candidate, remote: Candidate, controlling: bool) -> Self {
        let (g, d) = if controlling {
            (local.priority, remote.priority)
        } else {
            (remote.priority, local.priority)
        };
        let foundation = format!("{}:{}", local.foundation, remote.foundation);
        Self {
            local,
            remote,
            priority: pair_priority(g, d),
            foundation,
            state: PairState::Frozen,
            nominated: false,
            valid: false,
            transaction: None,
            timer: None,
            peer_nominated: false,
        }
    }

    pub fn start(&mut self, transaction: TransactionId, now: Instant) {
        self.state = PairState::InProgress;
        self.transaction = Some(transaction);
        self.timer = Some(Timer::unreliable(now));
    }

    pub fn component_id(&self) -> u16 {
        self.local.component_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_priority_is_symmetric_in_magnitude_but_not_in_tiebreak() {
        let a = pair_priority(10, 20);
        let b = pair_priority(20, 10);
        assert_ne!(a, b);
        assert_eq!(a + 1, b);
    }

    #[test]
    fn higher_component_priorities_yield_higher_pair_priority() {
        let low = pair_priority(10, 10);
        let high = pair_priority(20, 20);
        assert!(high > low);
    }
}
