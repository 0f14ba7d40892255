//! `spec.md` §8 end-to-end scenario 3: "Wrong password".

mod common;

use ice::{Agent, AgentConfig, ComponentState};

use common::{drive_until, exchange_candidates, gather};

#[test]
fn wrong_remote_credentials_fail_both_components() {
    let mut a = Agent::new(AgentConfig {
        controlling_mode: true,
        ..Default::default()
    });
    let mut b = Agent::new(AgentConfig {
        controlling_mode: false,
        ..Default::default()
    });

    let sa = a.add_stream(2);
    let sb = b.add_stream(2);

    gather(&mut a, sa);
    gather(&mut b, sb);

    // Deliberately wrong on both sides: neither agent's view of the
    // peer's credentials matches what the peer will actually check
    // incoming requests against.
    a.set_remote_credentials(sa, "bogus-ufrag-a", "bogus-password-aaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
    b.set_remote_credentials(sb, "bogus-ufrag-b", "bogus-password-bbbbbbbbbbbbbbbbbbbbbbbb").unwrap();

    exchange_candidates(&mut a, sa, &mut b, sb, 2);

    let both_done = drive_until(&mut [(&mut a, sa, 2), (&mut b, sb, 2)], 500, |agents| {
        agents.iter().all(|(agent, stream, n)| {
            (1..=*n).all(|c| {
                matches!(
                    agent.component_state(*stream, c),
                    Some(ComponentState::Failed)
                )
            })
        })
    });
    assert!(both_done, "both agents' components should end up Failed with mismatched credentials");

    for stream_agent in [(&a, sa), (&b, sb)] {
        let (agent, stream) = stream_agent;
        for component in 1..=2u16 {
            assert_eq!(agent.component_state(stream, component), Some(ComponentState::Failed));
        }
    }

    let mut buf = [0u8; 64];
    assert!(matches!(a.send(sa, 1, b"x"), Err(ice::error::Error::NotConnected)));
    assert!(matches!(b.recv(sb, 1, &mut buf), Err(ice::error::Error::WouldBlock)));
}
