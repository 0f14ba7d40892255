//! The connectivity-check engine: pair scheduling, triggered checks,
//! role-conflict resolution, nomination and component state transitions.
//! `spec.md` calls this "the hardest part" (§4.G) and the majority of
//! this crate.

use std::collections::VecDeque;
use std::time::Instant;

use address::Address;
use stun::timer::Refresh;
use stun::{Attribute, Class, Message, Method, NumericCode, TransactionId};

use crate::candidate::{self, Candidate, Kind};
use crate::component::ComponentState;
use crate::error::Error;
use crate::event::{Signal, Sink};
use crate::pair::{CandidatePair, PairState};
use crate::stream::Stream;

/// `NICE_NOMINATION_MODE_*`; default `Regular` per SPEC_FULL §4.G.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominationMode {
    Aggressive,
    Regular,
}

/// A pair earmarked to be checked ahead of the ordinary schedule
/// (§4.G "Check scheduler", priority 1): drained FIFO before any
/// `Waiting`/`Frozen` pair is considered.
#[derive(Debug, Clone)]
struct TriggeredEntry {
    stream_id: u32,
    local_address: Address,
    remote_address: Address,
    use_candidate: bool,
}

/// One outgoing Binding-request check in flight, keyed by its
/// transaction id so the response handler can find the stream/pair it
/// belongs to without re-deriving it from message contents.
struct OutstandingCheck {
    stream_id: u32,
    local_address: Address,
    remote_address: Address,
    use_candidate: bool,
}

pub struct Conncheck {
    pub nomination_mode: NominationMode,
    /// `max_connectivity_checks` (§6 configuration table); `0` means
    /// unlimited.
    pub max_connectivity_checks: u32,
    checks_sent: u32,
    triggered: VecDeque<TriggeredEntry>,
    outstanding: std::collections::HashMap<TransactionId, OutstandingCheck>,
}

impl Conncheck {
    pub fn new() -> Self {
        Self {
            nomination_mode: NominationMode::Regular,
            max_connectivity_checks: 0,
            checks_sent: 0,
            triggered: VecDeque::new(),
            outstanding: std::collections::HashMap::new(),
        }
    }

    fn checks_exhausted(&self) -> bool {
        self.max_connectivity_checks != 0 && self.checks_sent >= self.max_connectivity_checks
    }

    /// One scheduler tick for `stream` (§4.G "Check scheduler"): picks at
    /// most one pair — a triggered entry first, then the highest-priority
    /// `Waiting` pair, then the highest-priority unblocked `Frozen` pair —
    /// and emits its Binding request.
    pub fn tick_stream(
        &mut self,
        stream: &mut Stream,
        controlling: bool,
        now: Instant,
        sink: &mut Sink,
    ) -> Result<(), Error> {
        self.advance_timers(stream, now, sink)?;

        if self.checks_exhausted() {
            self.fail_unchecked_pairs(stream, sink);
            self.update_component_states(stream, sink);
            return Ok(());
        }

        if let Some(entry) = self.next_triggered_for(stream.id) {
            self.send_check(stream, &entry.local_address, &entry.remote_address, controlling, entry.use_candidate, now)?;
            return Ok(());
        }

        if let Some((local, remote)) = self.pick_ordinary(stream) {
            self.send_check(stream, &local, &remote, controlling, false, now)?;
        }

        self.maybe_nominate(stream, controlling, now)?;
        self.update_component_states(stream, sink);
        Ok(())
    }

    fn next_triggered_for(&mut self, stream_id: u32) -> Option<TriggeredEntry> {
        let index = self.triggered.iter().position(|e| e.stream_id == stream_id)?;
        self.triggered.remove(index)
    }

    /// Highest-priority `Waiting` pair, or else the highest-priority
    /// `Frozen` pair whose foundation has no other pair already
    /// `Waiting`/`InProgress` (§4.G: "not blocked by its foundation").
    fn pick_ordinary(&self, stream: &Stream) -> Option<(Address, Address)> {
        let waiting = stream
            .checklist
            .pairs
            .iter()
            .filter(|p| p.state == PairState::Waiting)
            .max_by_key(|p| p.priority);
        if let Some(p) = waiting {
            return Some((p.local.address, p.remote.address));
        }

        let blocked_foundations: Vec<&str> = stream
            .checklist
            .pairs
            .iter()
            .filter(|p| matches!(p.state, PairState::Waiting | PairState::InProgress))
            .map(|p| p.foundation.as_str())
            .collect();

        stream
            .checklist
            .pairs
            .iter()
            .filter(|p| p.state == PairState::Frozen && !blocked_foundations.contains(&p.foundation.as_str()))
            .max_by_key(|p| p.priority)
            .map(|p| (p.local.address, p.remote.address))
    }

    fn find_pair_mut<'s>(
        stream: &'s mut Stream,
        local: &Address,
        remote: &Address,
    ) -> Option<&'s mut CandidatePair> {
        stream
            .checklist
            .pairs
            .iter_mut()
            .find(|p| p.local.address.equal(local) && p.remote.address.equal(remote))
    }

    /// Builds and sends a Binding-request check for the pair identified
    /// by `(local, remote)`, per §4.G's "Emitted request contents".
    fn send_check(
        &mut self,
        stream: &mut Stream,
        local: &Address,
        remote: &Address,
        controlling: bool,
        use_candidate: bool,
        now: Instant,
    ) -> Result<(), Error> {
        let remote_ufrag = stream.remote_ufrag.clone();
        let remote_pwd = stream.remote_pwd.clone();
        let (remote_ufrag, remote_pwd) = match (remote_ufrag, remote_pwd) {
            (Some(u), Some(p)) => (u, p),
            _ => return Ok(()),
        };
        let local_ufrag = stream.local_ufrag.clone();
        let tie_breaker = stream.tie_breaker;

        let socket_index = {
            let pair = match Self::find_pair_mut(stream, local, remote) {
                Some(p) => p,
                None => return Ok(()),
            };
            let local_pref = ((pair.local.priority >> 8) & 0xffff) as u16;
            let prflx_priority = candidate::priority(Kind::PeerReflexive, local_pref, pair.local.component_id);
            let use_candidate = use_candidate || self.nomination_mode == NominationMode::Aggressive && controlling;

            let username = format!("{}:{}", remote_ufrag, local_ufrag);
            let mut msg = Message::build_request(Method::Binding).append_u32(stun::TYPE_PRIORITY, prflx_priority)?;
            msg = if controlling {
                msg.append_u64(stun::TYPE_ICE_CONTROLLING, tie_breaker)?
            } else {
                msg.append_u64(stun::TYPE_ICE_CONTROLLED, tie_breaker)?
            };
            if use_candidate {
                msg = msg.append_flag(stun::TYPE_USE_CANDIDATE)?;
            }
            let msg = msg.finish_short(Some(&username), Some(remote_pwd.as_bytes()), None);

            let transaction_id = msg.header.transaction_id;
            pair.start(transaction_id, now);
            self.outstanding.insert(
                transaction_id,
                OutstandingCheck {
                    stream_id: stream.id,
                    local_address: *local,
                    remote_address: *remote,
                    use_candidate,
                },
            );
            self.checks_sent += 1;

            let bytes = msg.to_bytes();
            let component = stream.components.get_mut(&pair.component_id());
            let sock_idx = pair.local.socket;
            if let Some(component) = component {
                if let Some(socket) = component.sockets.get_mut(sock_idx) {
                    socket.send_to(remote, &bytes)?;
                }
            }
            sock_idx
        };
        let _ = socket_index;
        Ok(())
    }

    /// Regular nomination (§4.G "Nomination"): once the controlling
    /// agent has at least one `Succeeded` pair per component and hasn't
    /// already nominated one, reissue the highest-priority succeeded
    /// pair's check with `USE-CANDIDATE`.
    fn maybe_nominate(&mut self, stream: &mut Stream, controlling: bool, now: Instant) -> Result<(), Error> {
        if !controlling || self.nomination_mode != NominationMode::Regular {
            return Ok(());
        }
        let component_ids: Vec<u16> = stream.checklist.component_ids();
        for component_id in component_ids {
            let already_nominating = stream
                .checklist
                .pairs
                .iter()
                .any(|p| p.component_id() == component_id && p.nominated);
            if already_nominating {
                continue;
            }
            let best = stream
                .checklist
                .pairs
                .iter()
                .filter(|p| p.component_id() == component_id && p.state == PairState::Succeeded)
                .max_by_key(|p| p.priority)
                .map(|p| (p.local.address, p.remote.address));
            if let Some((local, remote)) = best {
                self.send_check(stream, &local, &remote, controlling, true, now)?;
            }
        }
        Ok(())
    }

    fn advance_timers(&mut self, stream: &mut Stream, now: Instant, sink: &mut Sink) -> Result<(), Error> {
        let mut timed_out = Vec::new();
        for pair in stream.checklist.pairs.iter_mut() {
            if pair.state != PairState::InProgress {
                continue;
            }
            let refresh = match pair.timer.as_mut() {
                Some(timer) => timer.refresh(now),
                None => continue,
            };
            match refresh {
                Refresh::Ok => {}
                Refresh::Retransmit => {
                    // Retransmission of the same request bytes is handled
                    // by re-sending on the next `tick_stream` via the
                    // triggered queue so the retry carries a fresh
                    // `USE-CANDIDATE`/role snapshot.
                    if let Some(id) = pair.transaction {
                        if let Some(check) = self.outstanding.get(&id) {
                            self.triggered.push_back(TriggeredEntry {
                                stream_id: stream.id,
                                local_address: check.local_address,
                                remote_address: check.remote_address,
                                use_candidate: check.use_candidate,
                            });
                        }
                    }
                }
                Refresh::Timeout => {
                    pair.state = PairState::Failed;
                    if let Some(id) = pair.transaction.take() {
                        timed_out.push(id);
                    }
                }
            }
        }
        for id in timed_out {
            self.outstanding.remove(&id);
        }
        let _ = sink;
        Ok(())
    }

    fn fail_unchecked_pairs(&self, stream: &mut Stream, _sink: &mut Sink) {
        for pair in stream.checklist.pairs.iter_mut() {
            if matches!(pair.state, PairState::Frozen | PairState::Waiting) {
                pair.state = PairState::Failed;
            }
        }
    }

    /// Dispatches an inbound STUN message arriving on one of `stream`'s
    /// component sockets. `local` is the socket's own address (so a
    /// peer-reflexive remote candidate can be built with the right
    /// base/component) and `source` is the datagram's sender.
    pub fn handle_inbound(
        &mut self,
        stream: &mut Stream,
        local: &Address,
        source: &Address,
        bytes: &[u8],
        controlling: &mut bool,
        now: Instant,
        sink: &mut Sink,
    ) -> Result<Option<Vec<u8>>, Error> {
        let (msg, _) = Message::decode(bytes)?;

        match msg.header.class {
            Class::Request if msg.header.method == Method::Binding => {
                self.handle_binding_request(stream, local, source, &msg, controlling, now, sink)
            }
            Class::Success | Class::Error if msg.header.method == Method::Binding => {
                self.handle_binding_response(stream, &msg, controlling, now, sink)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn handle_binding_request(
        &mut self,
        stream: &mut Stream,
        local: &Address,
        source: &Address,
        msg: &Message,
        controlling: &mut bool,
        now: Instant,
        sink: &mut Sink,
    ) -> Result<Option<Vec<u8>>, Error> {
        let has_controlling = msg.find(stun::TYPE_ICE_CONTROLLING).is_some();
        let has_controlled = msg.find(stun::TYPE_ICE_CONTROLLED).is_some();
        if has_controlling && has_controlled {
            let err = Message::build_error(msg, NumericCode::BadRequest, "Bad Request");
            return Ok(Some(err.finish().to_bytes()));
        }

        if stun::verify_username(msg, &stream.local_ufrag).unwrap_or(false) == false {
            let err = Message::build_error(msg, NumericCode::Unauthenticated, "Unauthorized");
            return Ok(Some(err.finish().to_bytes()));
        }
        if !stun::verify_password(msg, stream.local_pwd.as_bytes()).unwrap_or(false) {
            let err = Message::build_error(msg, NumericCode::Unauthenticated, "Unauthorized");
            return Ok(Some(err.finish().to_bytes()));
        }

        // Role conflict (§4.G): peer's asserted role matches ours.
        let peer_tie_breaker = match msg.find(stun::TYPE_ICE_CONTROLLING) {
            Some(Attribute::IceControlling(c)) if *controlling => Some(c.tie_breaker()),
            _ => match msg.find(stun::TYPE_ICE_CONTROLLED) {
                Some(Attribute::IceControlled(c)) if !*controlling => Some(c.tie_breaker()),
                _ => None,
            },
        };
        if let Some(peer_tie_breaker) = peer_tie_breaker {
            // RFC 5245 §7.2.1.1: a controlling agent yields to a peer that
            // also claims controlling only if its own tie-breaker is the
            // smaller of the two; a controlled agent takes over from a
            // peer that also claims controlled only if its own tie-breaker
            // is the larger (or equal) of the two. Otherwise reply 487.
            let switches_role = if *controlling {
                stream.tie_breaker < peer_tie_breaker
            } else {
                stream.tie_breaker >= peer_tie_breaker
            };
            if switches_role {
                *controlling = !*controlling;
            } else {
                let err = Message::build_error(msg, NumericCode::RoleConflict, "Role Conflict");
                return Ok(Some(err.finish().to_bytes()));
            }
        }

        let use_candidate = msg.find(stun::TYPE_USE_CANDIDATE).is_some();

        let component_id = stream
            .components
            .values()
            .find(|c| c.local_candidates.iter().any(|cand| cand.address.equal(local)))
            .map(|c| c.id);

        let mut learned_candidate = None;
        if let Some(component_id) = component_id {
            let already_known = stream
                .components
                .get(&component_id)
                .map(|c| c.remote_candidates.iter().any(|cand| cand.address.equal(source)))
                .unwrap_or(true);
            if !already_known {
                let peer_priority = msg.find32(stun::TYPE_PRIORITY).unwrap_or(0);
                let ufrag = stream.remote_ufrag.clone().unwrap_or_default();
                let pwd = stream.remote_pwd.clone().unwrap_or_default();
                let candidate = Candidate {
                    kind: Kind::PeerReflexive,
                    transport: crate::candidate::Transport::Udp,
                    base_address: *source,
                    address: *source,
                    priority: peer_priority,
                    foundation: format!("prflx-remote-{}", component_id),
                    component_id,
                    stream_id: stream.id,
                    ufrag,
                    pwd,
                    relay_server: None,
                    socket: 0,
                };
                if let Some(component) = stream.components.get_mut(&component_id) {
                    if component.add_remote_candidate(candidate.clone()) {
                        learned_candidate = Some(candidate);
                    }
                }
            }
        }

        if let Some(candidate) = learned_candidate {
            stream.rebuild_checklist(*controlling);
            sink.emit(Signal::NewCandidate {
                stream: stream.id,
                component: candidate.component_id,
                foundation: candidate.foundation.clone(),
            });
        }

        // Emit a triggered check for the pair this request arrived on,
        // learning the pair if it doesn't already exist in the list.
        if let Some(component_id) = component_id {
            let existing = stream
                .checklist
                .pairs
                .iter()
                .any(|p| p.local.address.equal(local) && p.remote.address.equal(source));
            if !existing {
                if let (Some(component), ) = (stream.components.get(&component_id),) {
                    if let (Some(local_cand), Some(remote_cand)) = (
                        component.local_candidates.iter().find(|c| c.address.equal(local)).cloned(),
                        component.remote_candidates.iter().find(|c| c.address.equal(source)).cloned(),
                    ) {
                        let pair = CandidatePair::new(local_cand, remote_cand, *controlling);
                        stream.checklist.pairs.push(pair);
                    }
                }
            }
            if use_candidate {
                if let Some(pair) = Self::find_pair_mut(stream, local, source) {
                    pair.peer_nominated = true;
                    if pair.state == PairState::Succeeded {
                        pair.nominated = true;
                    }
                }
            }
            self.triggered.push_back(TriggeredEntry {
                stream_id: stream.id,
                local_address: *local,
                remote_address: *source,
                use_candidate: false,
            });
        }

        sink.emit(Signal::InitialBindingRequestReceived { stream: stream.id });

        let response = Message::build_response(msg)
            .append_xor_address(stun::TYPE_XOR_MAPPED_ADDRESS, source)?
            .finish_short(None, Some(stream.local_pwd.as_bytes()), None);
        Ok(Some(response.to_bytes()))
    }

    fn handle_binding_response(
        &mut self,
        stream: &mut Stream,
        msg: &Message,
        controlling: &mut bool,
        now: Instant,
        sink: &mut Sink,
    ) -> Result<(), Error> {
        let check = match self.outstanding.remove(&msg.header.transaction_id) {
            Some(c) => c,
            None => return Ok(()),
        };
        if check.stream_id != stream.id {
            self.outstanding.insert(msg.header.transaction_id, check);
            return Ok(());
        }

        match msg.header.class {
            Class::Success => {
                // Peer-reflexive local learning (§4.G): if the mapped
                // address isn't one of our local candidates, mint a new
                // local candidate and rewrite the pair to use it.
                let mapped = msg.find_xor_addr(stun::TYPE_XOR_MAPPED_ADDRESS).ok();
                if let Some(mapped) = mapped {
                    let component_id = Self::find_pair_mut(stream, &check.local_address, &check.remote_address)
                        .map(|p| p.component_id());
                    if let Some(component_id) = component_id {
                        let known = stream
                            .components
                            .get(&component_id)
                            .map(|c| c.local_candidates.iter().any(|cand| cand.address.equal(&mapped)))
                            .unwrap_or(true);
                        if !known {
                            let base = check.local_address;
                            let local_pref = Self::find_pair_mut(stream, &check.local_address, &check.remote_address)
                                .map(|p| ((p.local.priority >> 8) & 0xffff) as u16)
                                .unwrap_or(0);
                            let priority = candidate::priority(Kind::PeerReflexive, local_pref, component_id);
                            let (ufrag, pwd, socket) = stream
                                .components
                                .get(&component_id)
                                .and_then(|c| c.local_candidates.iter().find(|cand| cand.address.equal(&base)))
                                .map(|c| (c.ufrag.clone(), c.pwd.clone(), c.socket))
                                .unwrap_or_default();
                            let candidate = Candidate {
                                kind: Kind::PeerReflexive,
                                transport: crate::candidate::Transport::Udp,
                                base_address: base,
                                address: mapped,
                                priority,
                                foundation: format!("prflx-local-{}", component_id),
                                component_id,
                                stream_id: stream.id,
                                ufrag,
                                pwd,
                                relay_server: None,
                                socket,
                            };
                            if let Some(component) = stream.components.get_mut(&component_id) {
                                component.local_candidates.push(candidate);
                            }
                            if let Some(pair) = Self::find_pair_mut(stream, &check.local_address, &check.remote_address) {
                                pair.local.address = mapped;
                            }
                        }
                    }
                }

                let foundation = {
                    let pair = match Self::find_pair_mut(stream, &check.local_address, &check.remote_address) {
                        Some(p) => p,
                        None => return Ok(()),
                    };
                    pair.state = PairState::Succeeded;
                    pair.valid = true;
                    pair.transaction = None;
                    if check.use_candidate || pair.peer_nominated {
                        pair.nominated = true;
                    }
                    pair.foundation.clone()
                };
                stream.checklist.unfreeze_foundation(&foundation);

                if let Some(pair) = stream
                    .checklist
                    .pairs
                    .iter()
                    .find(|p| p.local.address.equal(&check.local_address) && p.remote.address.equal(&check.remote_address))
                {
                    let (component_id, nominated, local_fnd, remote_fnd) =
                        (pair.component_id(), pair.nominated, pair.local.foundation.clone(), pair.remote.foundation.clone());
                    if nominated {
                        if let Some(component) = stream.components.get_mut(&component_id) {
                            component.selected_pair = Some((local_fnd.clone(), remote_fnd.clone()));
                        }
                        sink.emit(Signal::NewSelectedPair {
                            stream: stream.id,
                            component: component_id,
                            local_foundation: local_fnd,
                            remote_foundation: remote_fnd,
                        });
                    }
                }
            }
            Class::Error => {
                let code = find_error_code(msg);
                if code == Some(NumericCode::RoleConflict) {
                    *controlling = !*controlling;
                    if let Some(pair) = Self::find_pair_mut(stream, &check.local_address, &check.remote_address) {
                        pair.state = PairState::Waiting;
                        pair.transaction = None;
                    }
                } else if let Some(pair) = Self::find_pair_mut(stream, &check.local_address, &check.remote_address) {
                    pair.state = PairState::Failed;
                    pair.transaction = None;
                }
            }
            _ => {}
        }

        self.update_component_states(stream, sink);
        let _ = now;
        Ok(())
    }

    /// §4.G "Selection"/"Component transitions".
    fn update_component_states(&self, stream: &mut Stream, sink: &mut Sink) {
        let component_ids: Vec<u16> = stream.components.keys().copied().collect();
        for component_id in component_ids {
            let pairs_for_component: Vec<&CandidatePair> = stream
                .checklist
                .pairs
                .iter()
                .filter(|p| p.component_id() == component_id)
                .collect();
            if pairs_for_component.is_empty() {
                continue;
            }

            let any_nominated = pairs_for_component.iter().any(|p| p.nominated);
            let any_succeeded = pairs_for_component.iter().any(|p| p.state == PairState::Succeeded || p.nominated);
            let exhausted = pairs_for_component
                .iter()
                .all(|p| matches!(p.state, PairState::Succeeded | PairState::Failed));

            let component = match stream.components.get_mut(&component_id) {
                Some(c) => c,
                None => continue,
            };
            let previous = component.state;
            let next = if any_nominated {
                ComponentState::Ready
            } else if any_succeeded {
                ComponentState::Connected
            } else if exhausted {
                ComponentState::Failed
            } else if previous == ComponentState::Gathering || previous == ComponentState::Disconnected {
                ComponentState::Connecting
            } else {
                previous
            };

            if next != previous {
                component.state = next;
                log::debug!(
                    "stream {} component {}: {:?} -> {:?}",
                    stream.id, component_id, previous, next
                );
                sink.emit(Signal::ComponentStateChanged {
                    stream: stream.id,
                    component: component_id,
                    state: next,
                });
            }
        }
    }
}

impl Default for Conncheck {
    fn default() -> Self {
        Self::new()
    }
}

fn find_error_code(msg: &Message) -> Option<NumericCode> {
    match msg.find(stun::TYPE_ERROR_CODE) {
        Some(Attribute::ErrorCode(ec)) => Some(ec.numeric_code()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nomination_mode_defaults_to_regular() {
        let engine = Conncheck::new();
        assert_eq!(engine.nomination_mode, NominationMode::Regular);
        assert_eq!(engine.max_connectivity_checks, 0);
    }
}
