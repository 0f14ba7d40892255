//! The consumer-facing façade: the operation table and signal set in
//! `spec.md` §6, composing the candidate/pair model, conncheck engine
//! and stream registry into one handle.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, warn};

use address::Address;
use stun::timer::Timer;
use stun::{Class, Message, Method, TransactionId};
use turn::{Credentials, Dialect, TurnSocket};

use crate::candidate::{self, Candidate, FoundationTable, Kind, Transport};
use crate::component::ComponentState;
use crate::conncheck::{Conncheck, NominationMode};
use crate::error::Error;
use crate::event::{Signal, Sink};
use crate::registry::StreamRegistry;
use crate::socket::{DatagramTransport, RelayTransport, UdpTransport};
use crate::stream::Stream;

/// `proxy-type`; traversal itself is not implemented (nothing in the
/// source this was distilled from specifies proxy behavior beyond these
/// knobs), so the field is stored for parity with libnice's property set
/// and otherwise inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    None,
    Socks5,
    Http,
}

#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub kind: Option<ProxyType>,
    pub address: Option<Address>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The enumerated configuration surface from §6, as a plain struct
/// (libnice exposes the same set as `g_object_set` properties; no file
/// format is warranted).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub controlling_mode: bool,
    pub stun_server: Option<(String, u16)>,
    pub max_connectivity_checks: u32,
    pub proxy: ProxyConfig,
    pub ice_udp: bool,
    pub ice_tcp: bool,
    pub upnp: bool,
    pub force_relay: bool,
    pub software: Option<String>,
    pub nomination_mode: NominationMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            controlling_mode: false,
            stun_server: None,
            max_connectivity_checks: 0,
            proxy: ProxyConfig::default(),
            ice_udp: true,
            ice_tcp: false,
            upnp: false,
            force_relay: false,
            software: None,
            nomination_mode: NominationMode::Regular,
        }
    }
}

#[derive(Debug, Clone)]
struct RelayInfo {
    server: Address,
    credentials: Credentials,
    dialect: Dialect,
}

enum GatherTarget {
    ServerReflexive { server: Address },
    Relayed { info: RelayInfo, relay_socket: Option<UdpTransport>, retried: bool },
}

struct GatherJob {
    stream_id: u32,
    component_id: u16,
    transaction_id: TransactionId,
    timer: Timer,
    target: GatherTarget,
}

/// The agent, per §5 a single-threaded cooperative state machine: every
/// public method here runs on whatever thread calls it (the scheduling
/// model's recursive-mutex guard is the caller's responsibility, as
/// documented in §9 — this type holds no lock of its own).
pub struct Agent {
    pub config: AgentConfig,
    controlling: bool,
    streams: StreamRegistry,
    conncheck: Conncheck,
    sink: Sink,
    foundations: FoundationTable,
    gather_jobs: Vec<GatherJob>,
    port_ranges: HashMap<(u32, u16), (u16, u16)>,
    relay_info: HashMap<(u32, u16), RelayInfo>,
    gathering_announced: Vec<u32>,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let controlling = config.controlling_mode;
        let mut conncheck = Conncheck::new();
        conncheck.nomination_mode = config.nomination_mode;
        conncheck.max_connectivity_checks = config.max_connectivity_checks;
        Self {
            config,
            controlling,
            streams: StreamRegistry::new(),
            conncheck,
            sink: Sink::new(),
            foundations: FoundationTable::new(),
            gather_jobs: Vec::new(),
            port_ranges: HashMap::new(),
            relay_info: HashMap::new(),
            gathering_announced: Vec::new(),
        }
    }

    pub fn connect(&mut self, callback: impl FnMut(&Signal) + Send + 'static) {
        self.sink.connect(callback);
    }

    pub fn controlling(&self) -> bool {
        self.controlling
    }

    pub fn add_stream(&mut self, n_components: u16) -> u32 {
        self.streams.add_stream(n_components)
    }

    pub fn remove_stream(&mut self, id: u32) {
        if self.streams.remove_stream(id) {
            self.gather_jobs.retain(|j| j.stream_id != id);
            self.gathering_announced.retain(|&s| s != id);
            self.sink.emit(Signal::StreamsRemoved { ids: vec![id] });
        }
    }

    pub fn set_port_range(&mut self, stream: u32, component: u16, lo: u16, hi: u16) {
        self.port_ranges.insert((stream, component), (lo, hi));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_relay_info(
        &mut self,
        stream: u32,
        component: u16,
        host: Address,
        username: &str,
        password: &[u8],
        dialect: Dialect,
    ) {
        self.relay_info.insert(
            (stream, component),
            RelayInfo {
                server: host,
                credentials: Credentials::plain(username, password.to_vec()),
                dialect,
            },
        );
    }

    pub fn set_remote_credentials(&mut self, stream: u32, ufrag: &str, pwd: &str) -> Result<(), Error> {
        let stream = self.streams.stream_mut(stream).ok_or(Error::UnknownStream(stream))?;
        stream.remote_ufrag = Some(ufrag.to_string());
        stream.remote_pwd = Some(pwd.to_string());
        Ok(())
    }

    /// §6: "Appends; duplicates (by `{transport, address}`) are
    /// ignored." Idempotent per invariant 6: re-adding the same list
    /// leaves the check list unchanged (candidates that already exist
    /// are skipped, so `rebuild_checklist` only runs if something new
    /// actually landed).
    pub fn set_remote_candidates(
        &mut self,
        stream_id: u32,
        component_id: u16,
        candidates: Vec<Candidate>,
    ) -> Result<(), Error> {
        let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;
        let component = stream
            .component_mut(component_id)
            .ok_or(Error::UnknownComponent(component_id, stream_id))?;
        let mut added_any = false;
        for candidate in candidates {
            if component.add_remote_candidate(candidate) {
                added_any = true;
            }
        }
        if added_any {
            stream.rebuild_checklist(self.controlling);
        }
        Ok(())
    }

    /// §6: "Starts host/srflx/relay discovery on configured base
    /// addresses; eventually signals completion." Host candidates bind
    /// immediately; server-reflexive and relayed candidates are
    /// completed asynchronously via [`Agent::tick`].
    pub fn gather_candidates(&mut self, stream_id: u32) -> Result<(), Error> {
        let now = Instant::now();
        let component_ids: Vec<u16> = {
            let stream = self.streams.stream(stream_id).ok_or(Error::UnknownStream(stream_id))?;
            stream.components.keys().copied().collect()
        };
        for component_id in component_ids {
            self.gather_component(stream_id, component_id, now)?;
        }
        self.maybe_announce_gathering_done(stream_id);
        Ok(())
    }

    fn gather_component(&mut self, stream_id: u32, component_id: u16, now: Instant) -> Result<(), Error> {
        let range = self.port_ranges.get(&(stream_id, component_id)).copied();
        let socket = self.bind_host_socket(range)?;
        let local = reachable_address(socket.local_address());
        debug!("stream {} component {}: bound host candidate on {}", stream_id, component_id, local);

        let socket_index = {
            let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;
            let component = stream
                .component_mut(component_id)
                .ok_or(Error::UnknownComponent(component_id, stream_id))?;
            component.sockets.push(Box::new(socket));
            component.state = ComponentState::Gathering;
            component.sockets.len() - 1
        };

        if !self.config.force_relay {
            let foundation = self.foundations.foundation(Kind::Host, &local, None, Transport::Udp);
            let priority = candidate::priority(Kind::Host, 65535, component_id);
            let candidate = {
                let stream = self.streams.stream(stream_id).unwrap();
                Candidate {
                    kind: Kind::Host,
                    transport: Transport::Udp,
                    base_address: local,
                    address: local,
                    priority,
                    foundation,
                    component_id,
                    stream_id,
                    ufrag: stream.local_ufrag.clone(),
                    pwd: stream.local_pwd.clone(),
                    relay_server: None,
                    socket: socket_index,
                }
            };
            self.push_local_candidate(stream_id, component_id, candidate);
        }

        if !self.config.force_relay {
            if let Some((host, port)) = self.config.stun_server.clone() {
                if let Ok(ip) = host.parse::<std::net::IpAddr>() {
                    let server = Address::from_ip(ip, port);
                    self.start_srflx_gather(stream_id, component_id, socket_index, server, now)?;
                }
            }
        }

        if let Some(info) = self.relay_info.get(&(stream_id, component_id)).cloned() {
            self.start_relay_gather(stream_id, component_id, info, range, now)?;
        }

        Ok(())
    }

    fn bind_host_socket(&self, range: Option<(u16, u16)>) -> Result<UdpTransport, Error> {
        match range {
            None => Ok(UdpTransport::bind(Address::from_ip(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0))?),
            Some((lo, hi)) => {
                for port in lo..=hi {
                    let addr = Address::from_ip(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), port);
                    if let Ok(socket) = UdpTransport::bind(addr) {
                        return Ok(socket);
                    }
                }
                Err(Error::PortRangeUnavailable)
            }
        }
    }

    fn start_srflx_gather(
        &mut self,
        stream_id: u32,
        component_id: u16,
        socket_index: usize,
        server: Address,
        now: Instant,
    ) -> Result<(), Error> {
        let msg = Message::build_request(Method::Binding).finish();
        let transaction_id = msg.header.transaction_id;
        self.send_from_component(stream_id, component_id, socket_index, &server, &msg.to_bytes())?;
        self.gather_jobs.push(GatherJob {
            stream_id,
            component_id,
            transaction_id,
            timer: Timer::unreliable(now),
            target: GatherTarget::ServerReflexive { server },
        });
        Ok(())
    }

    fn start_relay_gather(
        &mut self,
        stream_id: u32,
        component_id: u16,
        info: RelayInfo,
        range: Option<(u16, u16)>,
        now: Instant,
    ) -> Result<(), Error> {
        let mut relay_socket = self.bind_host_socket(range)?;
        let msg = Message::build_request(Method::Allocate).finish_long(None, Some(&info.credentials.username), None, None);
        let transaction_id = msg.header.transaction_id;
        relay_socket.send_to(&info.server, &msg.to_bytes())?;
        self.gather_jobs.push(GatherJob {
            stream_id,
            component_id,
            transaction_id,
            timer: Timer::unreliable(now),
            target: GatherTarget::Relayed {
                info,
                relay_socket: Some(relay_socket),
                retried: false,
            },
        });
        Ok(())
    }

    fn send_from_component(
        &mut self,
        stream_id: u32,
        component_id: u16,
        socket_index: usize,
        to: &Address,
        bytes: &[u8],
    ) -> Result<(), Error> {
        let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;
        let component = stream
            .component_mut(component_id)
            .ok_or(Error::UnknownComponent(component_id, stream_id))?;
        if let Some(socket) = component.sockets.get_mut(socket_index) {
            socket.send_to(to, bytes)?;
        }
        Ok(())
    }

    fn push_local_candidate(&mut self, stream_id: u32, component_id: u16, candidate: Candidate) {
        if let Some(stream) = self.streams.stream_mut(stream_id) {
            if let Some(component) = stream.component_mut(component_id) {
                component.local_candidates.push(candidate.clone());
            }
            stream.rebuild_checklist(self.controlling);
        }
        self.sink.emit(Signal::NewCandidate {
            stream: stream_id,
            component: component_id,
            foundation: candidate.foundation,
        });
    }

    fn maybe_announce_gathering_done(&mut self, stream_id: u32) {
        let pending = self.gather_jobs.iter().any(|j| j.stream_id == stream_id);
        if !pending && !self.gathering_announced.contains(&stream_id) {
            self.gathering_announced.push(stream_id);
            self.sink.emit(Signal::CandidateGatheringDone { stream: stream_id });
        }
    }

    /// The single place application bytes flow out: selected-pair send
    /// per §6, failing with `NotConnected` until the component reaches
    /// `Connected`/`Ready`.
    pub fn send(&mut self, stream_id: u32, component_id: u16, bytes: &[u8]) -> Result<usize, Error> {
        let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;

        let selected_pair = {
            let component = stream
                .component_mut(component_id)
                .ok_or(Error::UnknownComponent(component_id, stream_id))?;
            if !matches!(component.state, ComponentState::Connected | ComponentState::Ready) {
                return Err(Error::NotConnected);
            }
            component.selected_pair.clone()
        };
        let (local_foundation, remote_foundation) = selected_pair.ok_or(Error::NotConnected)?;

        let (remote_addr, socket_index) = {
            let pair = stream
                .checklist
                .pairs
                .iter()
                .find(|p| p.local.foundation == local_foundation && p.remote.foundation == remote_foundation)
                .ok_or(Error::NotConnected)?;
            (pair.remote.address, pair.local.socket)
        };

        let component = stream.component_mut(component_id).unwrap();
        let socket = component.sockets.get_mut(socket_index).ok_or(Error::NotConnected)?;
        match socket.send_to(&remote_addr, bytes)? {
            turn::SendOutcome::Sent(n) => Ok(n),
            turn::SendOutcome::WouldBlock => Err(Error::WouldBlock),
        }
    }

    /// Delivers application bytes only; protocol traffic is consumed
    /// internally by [`Agent::tick`].
    pub fn recv(&mut self, stream_id: u32, component_id: u16, buf: &mut [u8]) -> Result<usize, Error> {
        let now = Instant::now();
        self.pump_component(stream_id, component_id, now, buf)
    }

    fn pump_component(&mut self, stream_id: u32, component_id: u16, now: Instant, out: &mut [u8]) -> Result<usize, Error> {
        let mut scratch = [0u8; 2048];
        loop {
            let (source, n, socket_index) = {
                let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;
                let component = stream
                    .component_mut(component_id)
                    .ok_or(Error::UnknownComponent(component_id, stream_id))?;
                let mut found = None;
                for (index, socket) in component.sockets.iter_mut().enumerate() {
                    match socket.recv_from(&mut scratch) {
                        Ok((from, turn::RecvOutcome::Received(n))) => {
                            found = Some((from, n, index));
                            break;
                        }
                        Ok((_, turn::RecvOutcome::WouldBlock)) => continue,
                        Err(_) => continue,
                    }
                }
                match found {
                    Some(v) => v,
                    None => return Err(Error::WouldBlock),
                }
            };

            let local = {
                let stream = self.streams.stream(stream_id).unwrap();
                let component = stream.component(component_id).unwrap();
                component.sockets[socket_index].local_address()
            };

            if self.handle_gather_response(stream_id, &scratch[..n], now) {
                continue;
            }

            let stream = self.streams.stream_mut(stream_id).ok_or(Error::UnknownStream(stream_id))?;
            if stun::validate(&scratch[..n]).is_ok() {
                let reply = self
                    .conncheck
                    .handle_inbound(stream, &local, &source, &scratch[..n], &mut self.controlling, now, &mut self.sink)?;
                if let Some(reply) = reply {
                    let component = stream.component_mut(component_id).unwrap();
                    if let Some(socket) = component.sockets.get_mut(socket_index) {
                        socket.send_to(&source, &reply)?;
                    }
                }
                continue;
            }

            let len = n.min(out.len());
            out[..len].copy_from_slice(&scratch[..len]);
            return Ok(len);
        }
    }

    /// Advances retransmission timers and relay channel/permission
    /// maintenance, and drives the conncheck scheduler for every stream.
    /// Call periodically from the event loop (§5).
    pub fn tick(&mut self, now: Instant) -> Result<(), Error> {
        self.advance_gather_jobs(now)?;
        for id in self.streams.ids() {
            let controlling = self.controlling;
            if let Some(stream) = self.streams.stream_mut(id) {
                self.conncheck.tick_stream(stream, controlling, now, &mut self.sink)?;
            }
            self.maybe_announce_gathering_done(id);
        }
        Ok(())
    }

    fn advance_gather_jobs(&mut self, now: Instant) -> Result<(), Error> {
        let mut finished_streams = Vec::new();
        let mut i = 0;
        while i < self.gather_jobs.len() {
            let timed_out = self.gather_jobs[i].timer.refresh(now) == stun::timer::Refresh::Timeout;
            if timed_out {
                let job = self.gather_jobs.remove(i);
                finished_streams.push(job.stream_id);
                continue;
            }
            i += 1;
        }
        for stream_id in finished_streams {
            self.maybe_announce_gathering_done(stream_id);
        }
        Ok(())
    }

    /// Processes one datagram `bytes` against the agent's outstanding
    /// gather jobs (server-reflexive or relay discovery). Returns `true`
    /// if it was consumed as a gather response.
    fn handle_gather_response(&mut self, stream_id: u32, bytes: &[u8], now: Instant) -> bool {
        let (msg, _) = match Message::decode(bytes) {
            Ok(v) => v,
            Err(_) => return false,
        };
        let index = match self
            .gather_jobs
            .iter()
            .position(|j| j.stream_id == stream_id && j.transaction_id == msg.header.transaction_id)
        {
            Some(i) => i,
            None => return false,
        };

        let job = self.gather_jobs.remove(index);
        match job.target {
            GatherTarget::ServerReflexive { .. } => {
                if msg.header.class == Class::Success {
                    if let Ok(mapped) = msg.find_xor_addr(stun::TYPE_XOR_MAPPED_ADDRESS) {
                        self.complete_srflx(job.stream_id, job.component_id, mapped);
                    }
                }
            }
            GatherTarget::Relayed { info, relay_socket, retried } => {
                self.handle_allocate_response(job.stream_id, job.component_id, info, relay_socket, retried, &msg, now);
            }
        }
        true
    }

    fn complete_srflx(&mut self, stream_id: u32, component_id: u16, mapped: Address) {
        let priority = candidate::priority(Kind::ServerReflexive, 65535, component_id);
        let (base, socket_index, ufrag, pwd) = {
            let stream = match self.streams.stream(stream_id) {
                Some(s) => s,
                None => return,
            };
            let component = match stream.component(component_id) {
                Some(c) => c,
                None => return,
            };
            let (base, socket_index) = component
                .local_candidates
                .iter()
                .find(|c| c.kind == Kind::Host)
                .map(|c| (c.base_address, c.socket))
                .unwrap_or((mapped, 0));
            (base, socket_index, stream.local_ufrag.clone(), stream.local_pwd.clone())
        };
        let foundation = self.foundations.foundation(Kind::ServerReflexive, &base, None, Transport::Udp);
        let candidate = Candidate {
            kind: Kind::ServerReflexive,
            transport: Transport::Udp,
            base_address: base,
            address: mapped,
            priority,
            foundation,
            component_id,
            stream_id,
            ufrag,
            pwd,
            relay_server: None,
            socket: socket_index,
        };
        self.push_local_candidate(stream_id, component_id, candidate);
    }

    fn handle_allocate_response(
        &mut self,
        stream_id: u32,
        component_id: u16,
        info: RelayInfo,
        relay_socket: Option<UdpTransport>,
        retried: bool,
        msg: &Message,
        now: Instant,
    ) {
        let mut relay_socket = match relay_socket {
            Some(s) => s,
            None => return,
        };

        if msg.header.class == Class::Error && !retried {
            let realm = msg.find_string(stun::TYPE_REALM).ok();
            let nonce = msg.find_string(stun::TYPE_NONCE).ok();
            let key = realm
                .as_deref()
                .zip(std::str::from_utf8(&info.credentials.password).ok())
                .map(|(realm, password)| stun::long_term_key(&info.credentials.username, realm, password));
            let retry = Message::build_request(Method::Allocate).finish_long(
                realm.as_deref(),
                Some(&info.credentials.username),
                nonce.as_deref(),
                key.as_ref().map(|k| k.as_slice()),
            );
            let transaction_id = retry.header.transaction_id;
            if relay_socket.send_to(&info.server, &retry.to_bytes()).is_ok() {
                self.gather_jobs.push(GatherJob {
                    stream_id,
                    component_id,
                    transaction_id,
                    timer: Timer::unreliable(now),
                    target: GatherTarget::Relayed {
                        info,
                        relay_socket: Some(relay_socket),
                        retried: true,
                    },
                });
            }
            return;
        }

        if msg.header.class != Class::Success {
            warn!(
                "stream {} component {}: turn allocate rejected by {}",
                stream_id, component_id, info.server
            );
            return;
        }

        let relayed = match msg.find_xor_addr(stun::TYPE_XOR_RELAYED_ADDRESS) {
            Ok(addr) => addr,
            Err(_) => return,
        };
        debug!(
            "stream {} component {}: relayed candidate {} via {}",
            stream_id, component_id, relayed, info.server
        );

        let turn_socket = TurnSocket::new(relay_socket, info.server, info.credentials.clone(), info.dialect);
        let transport = RelayTransport::new(turn_socket, relayed);

        let (socket_index, ufrag, pwd) = {
            let stream = match self.streams.stream_mut(stream_id) {
                Some(s) => s,
                None => return,
            };
            let component = match stream.component_mut(component_id) {
                Some(c) => c,
                None => return,
            };
            component.sockets.push(Box::new(transport));
            (component.sockets.len() - 1, stream.local_ufrag.clone(), stream.local_pwd.clone())
        };

        let foundation = self
            .foundations
            .foundation(Kind::Relayed, &relayed, Some(&info.server), Transport::Udp);
        let priority = candidate::priority(Kind::Relayed, 65535, component_id);
        let candidate = Candidate {
            kind: Kind::Relayed,
            transport: Transport::Udp,
            base_address: relayed,
            address: relayed,
            priority,
            foundation,
            component_id,
            stream_id,
            ufrag,
            pwd,
            relay_server: Some(info.server),
            socket: socket_index,
        };
        self.push_local_candidate(stream_id, component_id, candidate);
    }

    /// ICE restart (§4.G): every stream regenerates credentials and
    /// drops its remote candidates/check list.
    pub fn restart(&mut self) {
        for id in self.streams.ids() {
            if let Some(stream) = self.streams.stream_mut(id) {
                stream.restart();
            }
        }
    }

    /// Local ufrag/pwd for a stream, for callers (e.g. an SDP offerer)
    /// that need to advertise `ice-ufrag`/`ice-pwd`.
    pub fn local_credentials(&self, stream_id: u32) -> Option<(&str, &str)> {
        let stream = self.streams.stream(stream_id)?;
        Some((&stream.local_ufrag, &stream.local_pwd))
    }

    /// Local candidates gathered so far for one component, for callers
    /// building `a=candidate` lines.
    pub fn local_candidates(&self, stream_id: u32, component_id: u16) -> Vec<Candidate> {
        self.streams
            .stream(stream_id)
            .and_then(|s| s.component(component_id))
            .map(|c| c.local_candidates.clone())
            .unwrap_or_default()
    }

    /// Whether gathering for a stream has completed (§6:
    /// `CandidateGatheringDone`), for callers that poll rather than
    /// subscribe via [`Agent::connect`].
    pub fn gathering_done(&self, stream_id: u32) -> bool {
        self.streams.stream(stream_id).map(|s| s.gathering_done).unwrap_or(false)
    }

    /// Current state of one component, for callers that poll rather than
    /// subscribe to `ComponentStateChanged` via [`Agent::connect`].
    pub fn component_state(&self, stream_id: u32, component_id: u16) -> Option<ComponentState> {
        self.streams.stream(stream_id)?.component(component_id).map(|c| c.state)
    }

    #[cfg(test)]
    fn stream_mut_for_test(&mut self, id: u32) -> Option<&mut Stream> {
        self.streams.stream_mut(id)
    }
}

/// Host candidates bind to the unspecified address so gathering doesn't
/// need interface enumeration (§2.1: no `pnet` dependency). A candidate
/// advertised as `0.0.0.0` is useless to a peer, so the published
/// address falls back to loopback, which a socket bound to the
/// unspecified address also accepts traffic on.
fn reachable_address(addr: Address) -> Address {
    match addr {
        Address::V4 { octets: [0, 0, 0, 0], port } => {
            Address::from_ip(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), port)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_defaults_to_controlled_and_regular_nomination() {
        let agent = Agent::new(AgentConfig::default());
        assert!(!agent.controlling());
        assert_eq!(agent.conncheck.nomination_mode, NominationMode::Regular);
    }

    #[test]
    fn add_stream_allocates_components() {
        let mut agent = Agent::new(AgentConfig::default());
        let id = agent.add_stream(2);
        assert_eq!(id, 1);
        assert!(agent.stream_mut_for_test(id).unwrap().component(1).is_some());
        assert!(agent.stream_mut_for_test(id).unwrap().component(2).is_some());
    }

    #[test]
    fn remove_unknown_stream_is_a_no_op() {
        let mut agent = Agent::new(AgentConfig::default());
        agent.remove_stream(42);
    }
}
