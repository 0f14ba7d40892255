//! Datagram socket abstraction the TURN client wraps.
//!
//! Mirrors libnice's `NiceSocket` vtable (`send`/`recv`/`is_reliable`/
//! `close`/`fileno` in `socket/socket.h`), generalized to a Rust trait so
//! `TurnSocket` can wrap anything from a real UDP socket to a loopback
//! test fixture.

use address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(usize),
    WouldBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    Received(usize),
    WouldBlock,
}

/// The base socket a [`crate::TurnSocket`] sends/receives through. Reliable
/// implementations (TCP, pseudo-TCP) are expected to apply RFC 4571
/// framing themselves; the TURN layer above neither knows nor cares.
pub trait BaseSocket {
    fn send_to(&mut self, to: &Address, bytes: &[u8]) -> std::io::Result<SendOutcome>;
    fn recv_from(&mut self, buf: &mut [u8]) -> std::io::Result<(Address, RecvOutcome)>;
    fn close(&mut self);
    fn is_reliable(&self) -> bool;
}
