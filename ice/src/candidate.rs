//! Candidate kinds, transports, foundations and priorities.
//!
//! Grounded in `original_source/agent/agent.h`'s candidate type constants
//! and `spec.md` §3/§4.F's priority formula (RFC 5245 §4.1.2).

use std::collections::HashMap;

use address::Address;

/// `NICE_CANDIDATE_TYPE_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Host,
    ServerReflexive,
    PeerReflexive,
    Relayed,
}

impl Kind {
    /// RFC 5245 §4.1.2.1 type preference, used as the top byte of priority.
    fn type_preference(self) -> u32 {
        match self {
            Kind::Host => 126,
            Kind::PeerReflexive => 110,
            Kind::ServerReflexive => 100,
            Kind::Relayed => 0,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Kind::Host => "host",
            Kind::ServerReflexive => "srflx",
            Kind::PeerReflexive => "prflx",
            Kind::Relayed => "relay",
        }
    }
}

/// `NICE_CANDIDATE_TRANSPORT_*`. `spec.md`/[SUPPLEMENT] §3.1 carries all
/// four even though the UDP-only scenarios in §8 only exercise `Udp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    TcpActive,
    TcpPassive,
    TcpSo,
}

impl Transport {
    fn tag(self) -> &'static str {
        match self {
            Transport::Udp => "udp",
            Transport::TcpActive => "tcp-act",
            Transport::TcpPassive => "tcp-pass",
            Transport::TcpSo => "tcp-so",
        }
    }
}

/// RFC 5245 §4.1.2.1: `(type_pref<<24)|(local_pref<<8)|(256-component_id)`.
pub fn priority(kind: Kind, local_preference: u16, component_id: u16) -> u32 {
    (kind.type_preference() << 24) | ((local_preference as u32) << 8) | (256 - component_id as u32)
}

/// Assigns stable short ASCII foundations to candidates sharing
/// `{kind, base address, relay server, transport}`, the way
/// `nice_candidate_ice_priority`'s companion foundation assignment in
/// libnice hands out a fresh integer the first time a tuple is seen and
/// reuses it afterwards.
#[derive(Debug, Default)]
pub struct FoundationTable {
    next: u32,
    assigned: HashMap<(Kind, Address, Option<Address>, Transport), String>,
}

impl FoundationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foundation(
        &mut self,
        kind: Kind,
        base_address: &Address,
        relay_server: Option<&Address>,
        transport: Transport,
    ) -> String {
        let key = (kind, *base_address, relay_server.copied(), transport);
        if let Some(existing) = self.assigned.get(&key) {
            return existing.clone();
        }
        let id = format!("{}-{}", kind.tag(), self.next);
        self.next += 1;
        self.assigned.insert(key, id.clone());
        id
    }
}

/// A potential transport address for one component, per `spec.md` §3.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: Kind,
    pub transport: Transport,
    pub base_address: Address,
    pub address: Address,
    pub priority: u32,
    pub foundation: String,
    pub component_id: u16,
    pub stream_id: u32,
    pub ufrag: String,
    pub pwd: String,
    /// Set for `Relayed` candidates: the TURN server's address.
    pub relay_server: Option<Address>,
    /// Index into the owning component's socket table (§9: "stream own
    /// candidates... pairs hold ids, not pointers" — the same discipline
    /// applies to the socket each candidate sends/receives on).
    pub socket: usize,
}

impl Candidate {
    /// Two candidates are duplicates of each other, for
    /// `set_remote_candidates`'s dedup-by-`{transport, address}` rule
    /// (§6) and for check-list dedup-by-canonical-base (§4.F).
    pub fn duplicates(&self, other: &Candidate) -> bool {
        self.transport == other.transport && self.address.equal(&other.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_outranks_every_other_kind_at_equal_local_preference() {
        let host = priority(Kind::Host, 65535, 1);
        let prflx = priority(Kind::PeerReflexive, 65535, 1);
        let srflx = priority(Kind::ServerReflexive, 65535, 1);
        let relay = priority(Kind::Relayed, 65535, 1);
        assert!(host > prflx);
        assert!(prflx > srflx);
        assert!(srflx > relay);
    }

    #[test]
    fn foundations_are_stable_and_distinguish_tuples() {
        let mut table = FoundationTable::new();
        let base = Address::set_from_string("192.168.1.10:1").unwrap();
        let other_base = Address::set_from_string("192.168.1.11:1").unwrap();

        let a = table.foundation(Kind::Host, &base, None, Transport::Udp);
        let b = table.foundation(Kind::Host, &base, None, Transport::Udp);
        let c = table.foundation(Kind::Host, &other_base, None, Transport::Udp);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
