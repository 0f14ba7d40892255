//! Check-list construction and the initial freeze/waiting split, per
//! `spec.md` §4.F/§4.G.

use std::collections::HashMap;

use crate::candidate::Candidate;
use crate::pair::{CandidatePair, PairState};

/// Default cap on pairs retained in a check list (§4.F: "capped at N
/// (default 100) by truncation from the tail").
pub const DEFAULT_MAX_PAIRS: usize = 100;

#[derive(Debug, Default)]
pub struct CheckList {
    pub pairs: Vec<CandidatePair>,
}

impl CheckList {
    /// Cartesian product of `locals`/`remotes` sharing a component id,
    /// deduped by canonical base (a local candidate's base address
    /// paired with a given remote address contributes only once), sorted
    /// by pair priority descending, then capped.
    pub fn build(locals: &[Candidate], remotes: &[Candidate], controlling: bool) -> Self {
        Self::build_capped(locals, remotes, controlling, DEFAULT_MAX_PAIRS)
    }

    pub fn build_capped(locals: &[Candidate], remotes: &[Candidate], controlling: bool, cap: usize) -> Self {
        let mut pairs = Vec::new();
        let mut seen_bases: Vec<(address::Address, address::Address)> = Vec::new();

        for local in locals {
            for remote in remotes {
                if local.component_id != remote.component_id {
                    continue;
                }
                let base_key = (local.base_address, remote.address);
                if seen_bases.iter().any(|(b, r)| b.equal(&base_key.0) && r.equal(&base_key.1)) {
                    continue;
                }
                seen_bases.push(base_key);
                pairs.push(CandidatePair::new(local.clone(), remote.clone(), controlling));
            }
        }

        pairs.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.foundation.cmp(&b.foundation))
        });
        pairs.truncate(cap);

        Self { pairs }
    }

    /// Initial pair states (§4.G): every pair starts `Frozen` except that, for
    /// each foundation with no pair already active, the pair belonging to the
    /// lowest component id is promoted to `Waiting`. A foundation with any
    /// non-`Frozen` pair (preserved across a rebuild, see
    /// `Stream::rebuild_checklist`) is left alone rather than reset, so
    /// in-progress and succeeded checks survive a check-list rebuild
    /// triggered by late-arriving remote candidates.
    pub fn initialize_frozen_set(&mut self) {
        let mut by_foundation: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, pair) in self.pairs.iter().enumerate() {
            by_foundation.entry(pair.foundation.clone()).or_default().push(i);
        }
        for indices in by_foundation.values() {
            let any_active = indices.iter().any(|&i| self.pairs[i].state != PairState::Frozen);
            if any_active {
                continue;
            }
            if let Some(&best) = indices.iter().min_by_key(|&&i| self.pairs[i].component_id()) {
                self.pairs[best].state = PairState::Waiting;
            }
        }
    }

    /// Unfreezes every `Frozen` pair sharing `foundation` (§4.G: "Frozen
    /// -> Waiting when any pair of the same foundation enters
    /// Succeeded").
    pub fn unfreeze_foundation(&mut self, foundation: &str) {
        for pair in self.pairs.iter_mut() {
            if pair.foundation == foundation && pair.state == PairState::Frozen {
                pair.state = PairState::Waiting;
            }
        }
    }

    pub fn component_ids(&self) -> Vec<u16> {
        let mut ids: Vec<u16> = self.pairs.iter().map(|p| p.component_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{priority, Kind, Transport};
    use address::Address;

    fn candidate(component_id: u16, addr: &str, prio: u32) -> Candidate {
        let address = Address::set_from_string(addr).unwrap();
        Candidate {
            kind: Kind::Host,
            transport: Transport::Udp,
            base_address: address,
            address,
            priority: prio,
            foundation: format!("f{}", component_id),
            component_id,
            stream_id: 1,
            ufrag: "u".into(),
            pwd: "p".into(),
            relay_server: None,
            socket: 0,
        }
    }

    #[test]
    fn pairs_only_match_components_and_sort_by_priority_desc() {
        let locals = vec![
            candidate(1, "10.0.0.1:1", priority(Kind::Host, 1, 1)),
            candidate(2, "10.0.0.1:2", priority(Kind::Host, 1, 2)),
        ];
        let remotes = vec![
            candidate(1, "10.0.0.2:1", priority(Kind::Host, 1, 1)),
            candidate(2, "10.0.0.2:2", priority(Kind::Host, 1, 2)),
        ];
        let list = CheckList::build(&locals, &remotes, true);
        assert_eq!(list.pairs.len(), 2);
        assert!(list.pairs[0].priority >= list.pairs[1].priority);
        for pair in &list.pairs {
            assert_eq!(pair.local.component_id, pair.remote.component_id);
        }
    }

    #[test]
    fn initial_freeze_promotes_one_pair_per_foundation() {
        let locals = vec![candidate(1, "10.0.0.1:1", 100)];
        let remotes = vec![candidate(1, "10.0.0.2:1", 100)];
        let mut list = CheckList::build(&locals, &remotes, true);
        list.initialize_frozen_set();
        assert_eq!(list.pairs[0].state, PairState::Waiting);
    }
}
