//! `spec.md` §8 end-to-end scenario 2: "Delayed answer" — A starts
//! checking before B's candidates arrive at A; B's candidates are
//! injected into A only after A has seen at least one inbound Binding
//! request (learned here via the `InitialBindingRequestReceived`
//! signal), exercising peer-reflexive candidate learning along the way.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ice::{Agent, AgentConfig, Signal};

use common::{all_components_ready, drive_until};

#[test]
fn delayed_answer_still_reaches_ready() {
    let mut a = Agent::new(AgentConfig {
        controlling_mode: true,
        ..Default::default()
    });
    let mut b = Agent::new(AgentConfig {
        controlling_mode: false,
        ..Default::default()
    });

    let sa = a.add_stream(1);
    let sb = b.add_stream(1);

    let a_saw_request = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&a_saw_request);
        a.connect(move |signal: &Signal| {
            if matches!(signal, Signal::InitialBindingRequestReceived { .. }) {
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    a.gather_candidates(sa).unwrap();
    b.gather_candidates(sb).unwrap();

    let (ufrag_a, pwd_a) = a.local_credentials(sa).map(|(u, p)| (u.to_string(), p.to_string())).unwrap();
    let (ufrag_b, pwd_b) = b.local_credentials(sb).map(|(u, p)| (u.to_string(), p.to_string())).unwrap();

    // Both sides learn credentials up front (as an SDP offer/answer would
    // exchange ice-ufrag/ice-pwd together), but only B gets A's
    // candidates right away; A's view of B stays empty until the delayed
    // injection below.
    a.set_remote_credentials(sa, &ufrag_b, &pwd_b).unwrap();
    b.set_remote_credentials(sb, &ufrag_a, &pwd_a).unwrap();

    let a_candidates = a.local_candidates(sa, 1);
    b.set_remote_candidates(sb, 1, a_candidates).unwrap();

    // Drive until A has observed an inbound Binding request from B (B
    // already has A's candidates and starts checking unprompted).
    let mut now = Instant::now();
    let mut saw_request = false;
    for _ in 0..500 {
        a.tick(now).unwrap();
        b.tick(now).unwrap();
        let mut scratch = [0u8; 2048];
        let _ = a.recv(sa, 1, &mut scratch);
        let _ = b.recv(sb, 1, &mut scratch);
        if a_saw_request.load(Ordering::SeqCst) {
            saw_request = true;
            break;
        }
        now += Duration::from_millis(20);
    }
    assert!(saw_request, "A should observe an inbound Binding request from B before its own candidates are known to B");

    // Now hand B's candidates to A, late.
    let b_candidates = b.local_candidates(sb, 1);
    a.set_remote_candidates(sa, 1, b_candidates).unwrap();

    let reached = drive_until(&mut [(&mut a, sa, 1), (&mut b, sb, 1)], 500, all_components_ready);
    assert!(reached, "both agents should still reach Ready after the delayed candidate injection");
}
