//! `spec.md` §8 end-to-end scenario 4: "Role conflict, both controlling".

mod common;

use ice::{Agent, AgentConfig};

use common::{all_components_ready, drive_until, exchange_candidates, gather};

#[test]
fn both_controlling_resolves_to_exactly_one_controller_and_reaches_ready() {
    let mut a = Agent::new(AgentConfig {
        controlling_mode: true,
        ..Default::default()
    });
    let mut b = Agent::new(AgentConfig {
        controlling_mode: true,
        ..Default::default()
    });

    let sa = a.add_stream(1);
    let sb = b.add_stream(1);

    let (ufrag_a, pwd_a) = gather(&mut a, sa);
    let (ufrag_b, pwd_b) = gather(&mut b, sb);

    a.set_remote_credentials(sa, &ufrag_b, &pwd_b).unwrap();
    b.set_remote_credentials(sb, &ufrag_a, &pwd_a).unwrap();
    exchange_candidates(&mut a, sa, &mut b, sb, 1);

    let reached = drive_until(&mut [(&mut a, sa, 1), (&mut b, sb, 1)], 500, all_components_ready);
    assert!(reached, "both agents should reach Ready despite the initial role conflict");

    assert_ne!(
        a.controlling(),
        b.controlling(),
        "role-conflict resolution must leave exactly one agent controlling"
    );
}
