//! Shared harness for the end-to-end scenarios in `spec.md` §8: two
//! in-process agents talking over real loopback UDP sockets, driven by
//! hand-advanced `Instant`s rather than wall-clock sleeps so retransmit
//! timing is deterministic.

use std::time::{Duration, Instant};

use ice::{Agent, ComponentState};

/// One tick of the harness: advance both agents' conncheck schedulers,
/// then drain every component's sockets so inbound STUN traffic (and any
/// application bytes already in flight) gets processed.
pub fn tick_once(agents: &mut [(&mut Agent, u32, u16)], now: Instant) {
    for (agent, stream, n_components) in agents.iter_mut() {
        agent.tick(now).expect("tick");
        let mut scratch = [0u8; 2048];
        for component in 1..=*n_components {
            // `recv` drains every pending datagram on the component's
            // sockets until none remain; STUN traffic is consumed
            // internally, so a `WouldBlock` here just means "nothing left
            // to read this tick", not an error.
            let _ = agent.recv(*stream, component, &mut scratch);
        }
    }
}

/// Drives `agents` forward in 20 ms steps (the conncheck scheduler's
/// `Ta`, §4.G) until `done` reports success or `max_ticks` elapse.
/// Returns whether `done` was satisfied.
pub fn drive_until(
    agents: &mut [(&mut Agent, u32, u16)],
    max_ticks: u32,
    mut done: impl FnMut(&mut [(&mut Agent, u32, u16)]) -> bool,
) -> bool {
    let mut now = Instant::now();
    for _ in 0..max_ticks {
        tick_once(agents, now);
        if done(agents) {
            return true;
        }
        now += Duration::from_millis(20);
    }
    false
}

pub fn all_components_ready(agents: &mut [(&mut Agent, u32, u16)]) -> bool {
    agents.iter().all(|(agent, stream, n_components)| {
        (1..=*n_components).all(|c| agent.component_state(*stream, c) == Some(ComponentState::Ready))
    })
}

pub fn any_component_failed(agents: &mut [(&mut Agent, u32, u16)]) -> bool {
    agents.iter().any(|(agent, stream, n_components)| {
        (1..=*n_components).any(|c| agent.component_state(*stream, c) == Some(ComponentState::Failed))
    })
}

/// Gathers host candidates for `stream` on `agent` and returns the local
/// ufrag/pwd, ready to be handed to the peer out-of-band the way an SDP
/// offer/answer exchange would.
pub fn gather(agent: &mut Agent, stream: u32) -> (String, String) {
    agent.gather_candidates(stream).expect("gather");
    let (ufrag, pwd) = agent.local_credentials(stream).expect("credentials");
    (ufrag.to_string(), pwd.to_string())
}

/// Exchanges every component's local candidates between two already-
/// gathered streams (§6 `set_remote_candidates`).
pub fn exchange_candidates(a: &mut Agent, sa: u32, b: &mut Agent, sb: u32, n_components: u16) {
    for component in 1..=n_components {
        let from_a = a.local_candidates(sa, component);
        let from_b = b.local_candidates(sb, component);
        b.set_remote_candidates(sb, component, from_a).expect("set remote candidates on b");
        a.set_remote_candidates(sa, component, from_b).expect("set remote candidates on a");
    }
}
