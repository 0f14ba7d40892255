//! `spec.md` §8 end-to-end scenario 1: "Basic UDP fullmode".

mod common;

use ice::{Agent, AgentConfig};

use common::{all_components_ready, drive_until, exchange_candidates, gather};

#[test]
fn basic_udp_fullmode_reaches_ready_and_exchanges_payload() {
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

    let (ufrag_a, pwd_a) = gather(&mut a, sa);
    let (ufrag_b, pwd_b) = gather(&mut b, sb);

    a.set_remote_credentials(sa, &ufrag_b, &pwd_b).unwrap();
    b.set_remote_credentials(sb, &ufrag_a, &pwd_a).unwrap();

    for component in 1..=2u16 {
        assert_eq!(a.local_candidates(sa, component).len(), 1, "host-only gather yields one local candidate");
        assert_eq!(b.local_candidates(sb, component).len(), 1);
    }
    exchange_candidates(&mut a, sa, &mut b, sb, 2);

    let reached = drive_until(&mut [(&mut a, sa, 2), (&mut b, sb, 2)], 500, all_components_ready);
    assert!(reached, "both agents should reach Ready on both components");

    let payload = b"1234567812345678";
    let mut sent = false;
    for _ in 0..50 {
        match a.send(sa, 1, payload) {
            Ok(n) => {
                assert_eq!(n, payload.len());
                sent = true;
                break;
            }
            Err(ice::error::Error::WouldBlock) => continue,
            Err(e) => panic!("unexpected send error: {e}"),
        }
    }
    assert!(sent, "A should be able to send once both sides are Ready");

    let mut buf = [0u8; 64];
    let mut received = None;
    for _ in 0..200 {
        match b.recv(sb, 1, &mut buf) {
            Ok(n) => {
                received = Some(n);
                break;
            }
            Err(ice::error::Error::WouldBlock) => {
                // Keep both sides ticking so retransmits/refreshes don't
                // starve the datagram in flight.
                let now = std::time::Instant::now();
                a.tick(now).unwrap();
                b.tick(now).unwrap();
                continue;
            }
            Err(e) => panic!("unexpected recv error: {e}"),
        }
    }
    let n = received.expect("B should receive A's payload");
    assert_eq!(&buf[..n], payload);
}
