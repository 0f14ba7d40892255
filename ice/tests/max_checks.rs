//! `spec.md` §8 end-to-end scenario 5: "Max checks = 1". With the cap
//! low enough that not every component's pair can be explored, at least
//! one component on each side ends up `Failed` rather than `Ready`.

mod common;

use ice::{Agent, AgentConfig, ComponentState};

use common::{drive_until, exchange_candidates, gather};

#[test]
fn max_connectivity_checks_of_one_leaves_a_component_failed() {
    let mut a = Agent::new(AgentConfig {
        controlling_mode: true,
        max_connectivity_checks: 1,
        ..Default::default()
    });
    let mut b = Agent::new(AgentConfig {
        controlling_mode: false,
        max_connectivity_checks: 1,
        ..Default::default()
    });

    // Two components means two independent foundations/pairs to explore;
    // a cap of one check per agent can't cover both.
    let sa = a.add_stream(2);
    let sb = b.add_stream(2);

    let (ufrag_a, pwd_a) = gather(&mut a, sa);
    let (ufrag_b, pwd_b) = gather(&mut b, sb);
    a.set_remote_credentials(sa, &ufrag_b, &pwd_b).unwrap();
    b.set_remote_credentials(sb, &ufrag_a, &pwd_a).unwrap();
    exchange_candidates(&mut a, sa, &mut b, sb, 2);

    drive_until(&mut [(&mut a, sa, 2), (&mut b, sb, 2)], 500, |agents| {
        agents.iter().all(|(agent, stream, n)| {
            (1..=*n).all(|c| {
                !matches!(
                    agent.component_state(*stream, c),
                    Some(ComponentState::Connecting) | Some(ComponentState::Gathering)
                )
            })
        })
    });

    let a_failed = (1..=2u16).any(|c| a.component_state(sa, c) == Some(ComponentState::Failed));
    let b_failed = (1..=2u16).any(|c| b.component_state(sb, c) == Some(ComponentState::Failed));
    assert!(a_failed, "A should exhaust its single allowed check before both components succeed");
    assert!(b_failed, "B should exhaust its single allowed check before both components succeed");
}
