//! The datagram socket abstraction the core consumes, per `spec.md` §6,
//! plus a concrete UDP implementation used by candidate gathering and,
//! wrapped by a [`turn::TurnSocket`], by the TURN client.

use std::io;
use std::net::UdpSocket;

use address::Address;
pub use turn::{RecvOutcome, SendOutcome};

/// `{send_to, recv_from, close, is_reliable, fileno}` from §6. Reliable
/// transports (TCP/TLS base sockets) additionally require RFC 4571
/// framing, out of scope for the UDP-only scenarios in §8 but left as a
/// documented extension point via `is_reliable`.
pub trait DatagramTransport {
    fn send_to(&mut self, addr: &Address, bytes: &[u8]) -> io::Result<SendOutcome>;
    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(Address, RecvOutcome)>;
    fn local_address(&self) -> Address;
    fn close(&mut self);
    fn is_reliable(&self) -> bool;
}

/// A non-blocking UDP socket, bound once at construction. Implements
/// both [`DatagramTransport`] (for use as a candidate's local socket)
/// and [`turn::BaseSocket`] (so the same type can back a
/// [`turn::TurnSocket`]) since the two traits share a method shape by
/// design (§4.E: "wraps a base datagram socket").
pub struct UdpTransport {
    socket: UdpSocket,
    local: Address,
    closed: bool,
}

impl UdpTransport {
    pub fn bind(addr: Address) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr.copy_to_sockaddr())?;
        socket.set_nonblocking(true)?;
        let local = Address::set_from_sockaddr(socket.local_addr()?);
        Ok(Self {
            socket,
            local,
            closed: false,
        })
    }

    fn send(&self, addr: &Address, bytes: &[u8]) -> io::Result<SendOutcome> {
        match self.socket.send_to(bytes, addr.copy_to_sockaddr()) {
            Ok(n) => Ok(SendOutcome::Sent(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(SendOutcome::WouldBlock),
            Err(e) => Err(e),
        }
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<(Address, RecvOutcome)> {
        match self.socket.recv_from(buf) {
            Ok((n, from)) => Ok((Address::set_from_sockaddr(from), RecvOutcome::Received(n))),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                Ok((self.local, RecvOutcome::WouldBlock))
            }
            Err(e) => Err(e),
        }
    }
}

impl DatagramTransport for UdpTransport {
    fn send_to(&mut self, addr: &Address, bytes: &[u8]) -> io::Result<SendOutcome> {
        self.send(addr, bytes)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(Address, RecvOutcome)> {
        self.recv(buf)
    }

    fn local_address(&self) -> Address {
        self.local
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_reliable(&self) -> bool {
        false
    }
}

impl turn::BaseSocket for UdpTransport {
    fn send_to(&mut self, addr: &Address, bytes: &[u8]) -> io::Result<SendOutcome> {
        self.send(addr, bytes)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(Address, RecvOutcome)> {
        self.recv(buf)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_reliable(&self) -> bool {
        false
    }
}

fn turn_error_to_io(err: turn::Error) -> io::Error {
    match err {
        turn::Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// Adapts a [`turn::TurnSocket`] to [`DatagramTransport`] so a relayed
/// candidate's channel/permission plumbing stays behind the same
/// `send_to`/`recv_from` contract every other candidate kind uses
/// (§4.E: "wraps a base datagram socket").
pub struct RelayTransport {
    turn: turn::TurnSocket<UdpTransport>,
    relayed_address: Address,
    closed: bool,
}

impl RelayTransport {
    pub fn new(turn: turn::TurnSocket<UdpTransport>, relayed_address: Address) -> Self {
        Self {
            turn,
            relayed_address,
            closed: false,
        }
    }

    pub fn tick(&mut self, now: std::time::Instant) -> Result<(), turn::Error> {
        self.turn.tick(now)
    }
}

impl DatagramTransport for RelayTransport {
    fn send_to(&mut self, addr: &Address, bytes: &[u8]) -> io::Result<SendOutcome> {
        self.turn
            .send(std::time::Instant::now(), addr, bytes)
            .map_err(turn_error_to_io)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<(Address, RecvOutcome)> {
        match self
            .turn
            .recv(std::time::Instant::now(), buf)
            .map_err(turn_error_to_io)?
        {
            turn::Received::Data { peer, len } => Ok((peer, RecvOutcome::Received(len))),
            turn::Received::Handled => Ok((self.relayed_address, RecvOutcome::WouldBlock)),
            turn::Received::WouldBlock => Ok((self.relayed_address, RecvOutcome::WouldBlock)),
        }
    }

    fn local_address(&self) -> Address {
        self.relayed_address
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_reliable(&self) -> bool {
        false
    }
}
