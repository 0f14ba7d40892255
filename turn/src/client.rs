//! The TURN client state machine: channel/permission lifecycle, Send/Data
//! indications, retransmission and long-term-credential challenge/response.
//!
//! Grounded in `original_source/socket/turn.c` (draft-9, `NiceTurnSocket`'s
//! single ChannelBind path) and `original_source/socket/udp-turn.c` (RFC
//! 5766 CreatePermission lifecycle and timer constants), generalized over
//! the four dialects `spec.md` §4.E tabulates.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use address::Address;
use stun::timer::{Refresh, Timer};
use stun::{Attribute, Class, Message, Method, NumericCode, TransactionId};

use crate::channel::{next_free_channel, Channel};
use crate::credentials::{Challenge, Credentials};
use crate::permission::{Permission, PermissionState};
use crate::socket::{BaseSocket, RecvOutcome, SendOutcome};
use crate::{Dialect, Error, OC2007_VERSION, TYPE_MAGIC_COOKIE_ATTR, TYPE_OPTIONS, TURN_MAGIC_COOKIE};

const RECV_BUF_LEN: usize = 2048;

/// What a call to [`TurnSocket::recv`] delivered.
#[derive(Debug, PartialEq, Eq)]
pub enum Received {
    /// Application bytes from `peer`, written to the caller's buffer.
    Data { peer: Address, len: usize },
    /// A protocol message (ChannelBind/CreatePermission response, Send
    /// response, etc.) was consumed; nothing for the upper layer.
    Handled,
    WouldBlock,
}

struct PendingBinding {
    peer: Address,
    number: u16,
    transaction_id: TransactionId,
    timer: Timer,
    retried: bool,
}

struct PendingPermission {
    peer: Address,
    timer: Timer,
    retried: bool,
}

/// Wraps a base datagram socket, speaking one of the four dialects in
/// `spec.md` §4.E's table to a single TURN server.
pub struct TurnSocket<S: BaseSocket> {
    base: S,
    server: Address,
    credentials: Credentials,
    dialect: Dialect,

    channels: Vec<Channel>,
    pending_channel_queue: VecDeque<Address>,
    current_binding: Option<PendingBinding>,

    permissions: Vec<Permission>,
    current_permissions: HashMap<TransactionId, PendingPermission>,
    send_queue: HashMap<Address, VecDeque<Vec<u8>>>,

    challenge: Challenge,
    ms_connection_id: Option<u32>,
    ms_sequence: u32,

    /// Set once a Google-dialect `Send` response carries the OPTIONS bit;
    /// every channel but the one in use is then discarded (§4.E.1).
    locked: bool,
}

impl<S: BaseSocket> TurnSocket<S> {
    pub fn new(base: S, server: Address, credentials: Credentials, dialect: Dialect) -> Self {
        Self {
            base,
            server,
            credentials,
            dialect,
            channels: Vec::new(),
            pending_channel_queue: VecDeque::new(),
            current_binding: None,
            permissions: Vec::new(),
            current_permissions: HashMap::new(),
            send_queue: HashMap::new(),
            challenge: Challenge::default(),
            ms_connection_id: None,
            ms_sequence: 0,
            locked: false,
        }
    }

    fn supports_channel_data(&self) -> bool {
        true
    }

    fn uses_channel_bind(&self) -> bool {
        matches!(self.dialect, Dialect::Draft9Rfc5766)
    }

    fn long_term_key(&self) -> Option<[u8; 16]> {
        let realm = self.challenge.realm.as_deref()?;
        let password = std::str::from_utf8(&self.credentials.password).ok()?;
        Some(stun::long_term_key(&self.credentials.username, realm, password))
    }

    fn channel_for(&self, peer: &Address) -> Option<&Channel> {
        self.channels.iter().find(|c| c.peer.equal(peer))
    }

    fn permission_for(&self, peer: &Address) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.peer.equal(peer))
    }

    fn enqueue(&mut self, peer: &Address, bytes: &[u8]) {
        self.send_queue
            .entry(*peer)
            .or_insert_with(VecDeque::new)
            .push_back(bytes.to_vec());
    }

    fn flush_queue(&mut self, peer: &Address) -> Result<(), Error> {
        let pending = self.send_queue.remove(peer).unwrap_or_default();
        for bytes in pending {
            self.send(Instant::now(), peer, &bytes)?;
        }
        Ok(())
    }

    /// Sends `bytes` to `peer`, relaying through the TURN server. Returns
    /// [`SendOutcome::WouldBlock`] while a permission or channel bind is
    /// still pending; the data is buffered and flushed once it installs.
    pub fn send(&mut self, now: Instant, peer: &Address, bytes: &[u8]) -> Result<SendOutcome, Error> {
        if self.supports_channel_data() {
            if let Some(channel) = self.channel_for(peer) {
                return self.send_channel_data(channel.number, bytes);
            }
        }

        match self.dialect {
            Dialect::Draft9Rfc5766 => self.send_rfc5766(now, peer, bytes),
            Dialect::Msn | Dialect::Google | Dialect::Oc2007 => self.send_legacy(now, peer, bytes),
        }
    }

    fn send_channel_data(&mut self, number: u16, bytes: &[u8]) -> Result<SendOutcome, Error> {
        let mut framed = Vec::with_capacity(4 + bytes.len());
        framed.extend_from_slice(&number.to_be_bytes());
        framed.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        framed.extend_from_slice(bytes);
        match self.base.send_to(&self.server, &framed)? {
            SendOutcome::Sent(_) => Ok(SendOutcome::Sent(bytes.len())),
            SendOutcome::WouldBlock => Ok(SendOutcome::WouldBlock),
        }
    }

    fn send_rfc5766(&mut self, now: Instant, peer: &Address, bytes: &[u8]) -> Result<SendOutcome, Error> {
        match self.permission_for(peer).map(|p| p.state) {
            Some(PermissionState::Installed) => {
                let msg = Message::build_indication(Method::Send)
                    .append_xor_address(stun::TYPE_XOR_PEER_ADDRESS, peer)?
                    .append_raw(stun::TYPE_DATA, bytes.to_vec())?
                    .finish();
                self.base.send_to(&self.server, &msg.to_bytes())?;
                self.request_channel_bind(now, peer)?;
                Ok(SendOutcome::Sent(bytes.len()))
            }
            Some(PermissionState::Pending) => {
                self.enqueue(peer, bytes);
                Ok(SendOutcome::WouldBlock)
            }
            None => {
                self.create_permission(now, peer)?;
                self.enqueue(peer, bytes);
                Ok(SendOutcome::WouldBlock)
            }
        }
    }

    fn create_permission(&mut self, now: Instant, peer: &Address) -> Result<(), Error> {
        let mut msg = Message::build_request(Method::CreatePermission)
            .append_xor_address(stun::TYPE_XOR_PEER_ADDRESS, peer)?;
        msg = self.authenticate_long_term(msg);
        let transaction_id = msg.header.transaction_id;
        self.base.send_to(&self.server, &msg.to_bytes())?;
        self.permissions.push(Permission::pending(*peer, now));
        self.current_permissions.insert(
            transaction_id,
            PendingPermission {
                peer: *peer,
                timer: Timer::unreliable(now),
                retried: false,
            },
        );
        Ok(())
    }

    fn authenticate_long_term(&self, msg: Message) -> Message {
        msg.finish_long(
            self.challenge.realm.as_deref(),
            Some(&self.credentials.username),
            self.challenge.nonce.as_deref(),
            self.long_term_key().as_ref().map(|k| k.as_slice()),
        )
    }

    /// Requests a channel binding for `peer`, queueing it if another bind
    /// is already in flight (invariant: at most one `ChannelBind` request
    /// in flight at a time).
    fn request_channel_bind(&mut self, now: Instant, peer: &Address) -> Result<(), Error> {
        if self.channel_for(peer).is_some() || self.pending_channel_queue.contains(peer) {
            return Ok(());
        }
        if self.current_binding.is_some() {
            self.pending_channel_queue.push_back(*peer);
            return Ok(());
        }
        self.start_channel_bind(now, *peer)
    }

    fn start_channel_bind(&mut self, now: Instant, peer: Address) -> Result<(), Error> {
        let number = if self.uses_channel_bind() {
            next_free_channel(&self.channels).ok_or(Error::ChannelRangeExhausted)?
        } else {
            0
        };

        let msg = self.build_binding_request(&peer, number)?;
        let transaction_id = msg.header.transaction_id;
        self.base.send_to(&self.server, &msg.to_bytes())?;
        self.current_binding = Some(PendingBinding {
            peer,
            number,
            transaction_id,
            timer: Timer::unreliable(now),
            retried: false,
        });
        Ok(())
    }

    /// Builds a fresh ChannelBind (RFC 5766) or SetActiveDestination
    /// (legacy dialects) request for `peer`/`number`, signed per-dialect.
    fn build_binding_request(&mut self, peer: &Address, number: u16) -> Result<Message, Error> {
        let method = if self.uses_channel_bind() {
            Method::ChannelBind
        } else {
            Method::SetActiveDestination
        };
        let mut msg = Message::build_request(method).append_xor_address(stun::TYPE_XOR_PEER_ADDRESS, peer)?;
        if self.uses_channel_bind() {
            let mut channel_number_value = number.to_be_bytes().to_vec();
            channel_number_value.extend_from_slice(&[0, 0]);
            msg = msg.append_raw(stun::TYPE_CHANNEL_NUMBER, channel_number_value)?;
        }
        self.sign_binding_request(msg)
    }

    fn sign_binding_request(&mut self, msg: Message) -> Result<Message, Error> {
        match self.dialect {
            Dialect::Draft9Rfc5766 => Ok(self.authenticate_long_term(msg)),
            Dialect::Msn => Ok(msg.finish_short(
                Some(&self.credentials.username),
                Some(&self.credentials.password),
                None,
            )),
            Dialect::Google => {
                let msg = msg.append_u32(TYPE_MAGIC_COOKIE_ATTR, TURN_MAGIC_COOKIE)?;
                Ok(msg.finish())
            }
            Dialect::Oc2007 => {
                self.ms_sequence += 1;
                let msg = msg.append_u32(TYPE_MAGIC_COOKIE_ATTR, TURN_MAGIC_COOKIE)?;
                let msg = msg.append_u32(stun::TYPE_MS_VERSION, OC2007_VERSION)?;
                let msg = msg.append_u32(stun::TYPE_MS_SEQUENCE_NUMBER, self.ms_sequence)?;
                Ok(self.authenticate_long_term(msg))
            }
        }
    }

    fn send_legacy(&mut self, now: Instant, peer: &Address, bytes: &[u8]) -> Result<SendOutcome, Error> {
        self.request_channel_bind(now, peer)?;
        self.enqueue(peer, bytes);
        Ok(SendOutcome::WouldBlock)
    }

    /// Receives one datagram, dispatching STUN control traffic to the
    /// internal state machine and returning application bytes (channel
    /// data, legacy-dialect payloads or raw passthrough) to the caller.
    pub fn recv(&mut self, now: Instant, buf: &mut [u8]) -> Result<Received, Error> {
        let mut raw = [0u8; RECV_BUF_LEN];
        let (from, outcome) = self.base.recv_from(&mut raw)?;
        let n = match outcome {
            RecvOutcome::WouldBlock => return Ok(Received::WouldBlock),
            RecvOutcome::Received(n) => n,
        };
        let data = &raw[..n];

        if from.equal(&self.server) && stun::validate(data).is_ok() {
            return self.handle_server_message(now, data, buf);
        }

        if n >= 4 {
            let number = u16::from_be_bytes([data[0], data[1]]);
            if let Some(channel) = self.channels.iter().find(|c| c.number == number) {
                let len = (u16::from_be_bytes([data[2], data[3]]) as usize).min(n - 4);
                buf[..len].copy_from_slice(&data[4..4 + len]);
                return Ok(Received::Data {
                    peer: channel.peer,
                    len,
                });
            }
        }

        buf[..n].copy_from_slice(data);
        Ok(Received::Data { peer: from, len: n })
    }

    fn handle_server_message(&mut self, now: Instant, data: &[u8], buf: &mut [u8]) -> Result<Received, Error> {
        let (msg, _) = Message::decode(data)?;

        if msg.header.class == Class::Indication && msg.header.method == Method::Data {
            return self.handle_data_indication(&msg, buf);
        }

        match msg.header.method {
            Method::Send => {
                self.handle_send_response(&msg);
                Ok(Received::Handled)
            }
            Method::SetActiveDestination | Method::ChannelBind => {
                self.handle_binding_response(now, &msg)?;
                Ok(Received::Handled)
            }
            Method::CreatePermission => {
                self.handle_permission_response(now, &msg)?;
                Ok(Received::Handled)
            }
            _ => Ok(Received::Handled),
        }
    }

    fn handle_data_indication(&mut self, msg: &Message, buf: &mut [u8]) -> Result<Received, Error> {
        let peer = msg.find_xor_addr(stun::TYPE_XOR_PEER_ADDRESS)?;
        let data = match msg.find(stun::TYPE_DATA) {
            Some(Attribute::Data(d)) => d.bytes().to_vec(),
            _ => return Ok(Received::Handled),
        };
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(Received::Data { peer, len })
    }

    /// A `Send` response carries no useful payload; the Google dialect's
    /// OPTIONS bit additionally "locks" the binding in use, discarding
    /// every other channel (§4.E.1).
    fn handle_send_response(&mut self, msg: &Message) {
        if self.dialect != Dialect::Google {
            return;
        }
        if let Ok(options) = msg.find32(TYPE_OPTIONS) {
            if options & 0x1 != 0 {
                if let Some(locked_peer) = self.channels.first().map(|c| c.peer) {
                    self.channels.retain(|c| c.peer.equal(&locked_peer));
                    self.locked = true;
                }
            }
        }
    }

    fn handle_binding_response(&mut self, now: Instant, msg: &Message) -> Result<(), Error> {
        let pending = match &self.current_binding {
            Some(p) if p.transaction_id == msg.header.transaction_id => self.current_binding.take().unwrap(),
            _ => return Ok(()),
        };

        match msg.header.class {
            Class::Success => {
                self.channels.retain(|c| !c.peer.equal(&pending.peer));
                self.channels.push(Channel::new(pending.peer, pending.number, now));
                self.flush_queue(&pending.peer)?;
            }
            Class::Error => {
                let code = find_error_code(msg);
                let fresh_challenge = matches!(
                    code,
                    Some(NumericCode::Unauthenticated) | Some(NumericCode::StaleNonce)
                );
                if fresh_challenge && !pending.retried {
                    self.update_challenge(msg);
                    let peer = pending.peer;
                    let number = pending.number;
                    let msg = self.build_binding_request(&peer, number)?;
                    let transaction_id = msg.header.transaction_id;
                    self.base.send_to(&self.server, &msg.to_bytes())?;
                    self.current_binding = Some(PendingBinding {
                        peer,
                        number,
                        transaction_id,
                        timer: Timer::unreliable(now),
                        retried: true,
                    });
                } else {
                    self.advance_pending_bindings(now)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_permission_response(&mut self, now: Instant, msg: &Message) -> Result<(), Error> {
        let pending = match self.current_permissions.remove(&msg.header.transaction_id) {
            Some(p) => p,
            None => return Ok(()),
        };

        match msg.header.class {
            Class::Success => {
                if let Some(permission) = self.permissions.iter_mut().find(|p| p.peer.equal(&pending.peer)) {
                    permission.install(now);
                }
                self.flush_queue(&pending.peer)?;
            }
            Class::Error => {
                let code = find_error_code(msg);
                let fresh_challenge = matches!(
                    code,
                    Some(NumericCode::Unauthenticated) | Some(NumericCode::StaleNonce)
                );
                if fresh_challenge && !pending.retried {
                    self.update_challenge(msg);
                    let peer = pending.peer;
                    let mut msg = Message::build_request(Method::CreatePermission)
                        .append_xor_address(stun::TYPE_XOR_PEER_ADDRESS, &peer)?;
                    msg = self.authenticate_long_term(msg);
                    let transaction_id = msg.header.transaction_id;
                    self.base.send_to(&self.server, &msg.to_bytes())?;
                    self.current_permissions.insert(
                        transaction_id,
                        PendingPermission {
                            peer,
                            timer: Timer::unreliable(now),
                            retried: true,
                        },
                    );
                } else {
                    // Servers without RFC 5766 support reject CreatePermission
                    // outright; treat it as installed and let the conncheck
                    // layer discover whether the relay actually works.
                    if let Some(permission) = self.permissions.iter_mut().find(|p| p.peer.equal(&pending.peer)) {
                        permission.install(now);
                    }
                    self.flush_queue(&pending.peer)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn update_challenge(&mut self, msg: &Message) {
        let realm = msg.find_string(stun::TYPE_REALM).ok();
        let nonce = msg.find_string(stun::TYPE_NONCE).ok();
        self.challenge.update(realm, nonce);
    }

    fn advance_pending_bindings(&mut self, now: Instant) -> Result<(), Error> {
        if self.current_binding.is_some() {
            return Ok(());
        }
        if let Some(peer) = self.pending_channel_queue.pop_front() {
            self.start_channel_bind(now, peer)?;
        }
        Ok(())
    }

    /// Advances retransmission timers and refreshes for channels,
    /// permissions, and any in-flight ChannelBind/CreatePermission
    /// request. Returns the peers whose channel or permission expired
    /// without a successful refresh.
    pub fn tick(&mut self, now: Instant) -> Result<(), Error> {
        let binding_outcome = match &mut self.current_binding {
            Some(pending) => Some((pending.timer.refresh(now), pending.peer, pending.number)),
            None => None,
        };
        match binding_outcome {
            Some((Refresh::Ok, ..)) | None => {}
            Some((Refresh::Retransmit, peer, number)) => {
                let msg = self.build_binding_request(&peer, number)?;
                let transaction_id = msg.header.transaction_id;
                self.base.send_to(&self.server, &msg.to_bytes())?;
                if let Some(pending) = &mut self.current_binding {
                    pending.transaction_id = transaction_id;
                }
            }
            Some((Refresh::Timeout, ..)) => {
                self.current_binding = None;
                self.advance_pending_bindings(now)?;
            }
        }

        let mut retransmit_permissions = Vec::new();
        let mut expired = Vec::new();
        for (id, pending) in self.current_permissions.iter_mut() {
            match pending.timer.refresh(now) {
                Refresh::Ok => {}
                Refresh::Retransmit => retransmit_permissions.push(*id),
                Refresh::Timeout => expired.push(*id),
            }
        }
        for id in expired {
            self.current_permissions.remove(&id);
        }
        for old_id in retransmit_permissions {
            if let Some(pending) = self.current_permissions.remove(&old_id) {
                let peer = pending.peer;
                let mut msg = Message::build_request(Method::CreatePermission)
                    .append_xor_address(stun::TYPE_XOR_PEER_ADDRESS, &peer)?;
                msg = self.authenticate_long_term(msg);
                let new_id = msg.header.transaction_id;
                self.base.send_to(&self.server, &msg.to_bytes())?;
                self.current_permissions.insert(new_id, pending);
            }
        }

        for channel in self.channels.clone() {
            if channel.needs_refresh(now) {
                self.request_channel_bind(now, &channel.peer)?;
            }
        }

        let stale_peers: Vec<Address> = self
            .permissions
            .iter()
            .filter(|p| p.needs_refresh(now))
            .map(|p| p.peer)
            .collect();
        for peer in stale_peers {
            self.create_permission(now, &peer)?;
        }

        Ok(())
    }
}

fn find_error_code(msg: &Message) -> Option<NumericCode> {
    match msg.find(stun::TYPE_ERROR_CODE) {
        Some(Attribute::ErrorCode(ec)) => Some(ec.numeric_code()),
        _ => None,
    }
}
