//! Shared wire encoding for STUN/TURN address-bearing attributes
//! (MAPPED-ADDRESS, XOR-MAPPED-ADDRESS, XOR-PEER-ADDRESS,
//! XOR-RELAYED-ADDRESS): a 1-byte reserved field, a 1-byte family, a
//! 2-byte port and 4 or 16 address bytes.

use address::Address;

use crate::error::Error;

const FAMILY_V4: u8 = 0x01;
const FAMILY_V6: u8 = 0x02;

pub(crate) fn encode_plain(addr: &Address) -> Vec<u8> {
    let mut out = Vec::with_capacity(20);
    out.push(0);
    match addr {
        Address::V4 { octets, port } => {
            out.push(FAMILY_V4);
            out.extend_from_slice(&port.to_be_bytes());
            out.extend_from_slice(octets);
        }
        Address::V6 { octets, port, .. } => {
            out.push(FAMILY_V6);
            out.extend_from_slice(&port.to_be_bytes());
            out.extend_from_slice(octets);
        }
    }
    out
}

pub(crate) fn decode_plain(typ: u16, value: &[u8]) -> Result<Address, Error> {
    if value.len() < 4 {
        return Err(Error::Invalid(typ, "address attribute too short".into()));
    }
    let family = value[1];
    let port = u16::from_be_bytes([value[2], value[3]]);
    match family {
        FAMILY_V4 if value.len() == 8 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(&value[4..8]);
            Ok(Address::V4 { octets, port })
        }
        FAMILY_V6 if value.len() == 20 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&value[4..20]);
            Ok(Address::V6 {
                octets,
                scope_id: 0,
                port,
            })
        }
        _ => Err(Error::Invalid(typ, "unknown address family".into())),
    }
}

fn xor_pad(cookie: u32, txid: &[u8; 12]) -> [u8; 16] {
    let mut pad = [0u8; 16];
    pad[..4].copy_from_slice(&cookie.to_be_bytes());
    pad[4..].copy_from_slice(txid);
    pad
}

pub(crate) fn encode_xor(addr: &Address, cookie: u32, txid: &[u8; 12]) -> Vec<u8> {
    let pad = xor_pad(cookie, txid);
    let mut out = Vec::with_capacity(20);
    out.push(0);
    let port = addr.port() ^ (cookie >> 16) as u16;
    match addr {
        Address::V4 { octets, .. } => {
            out.push(FAMILY_V4);
            out.extend_from_slice(&port.to_be_bytes());
            for (b, p) in octets.iter().zip(pad.iter()) {
                out.push(b ^ p);
            }
        }
        Address::V6 { octets, .. } => {
            out.push(FAMILY_V6);
            out.extend_from_slice(&port.to_be_bytes());
            for (b, p) in octets.iter().zip(pad.iter()) {
                out.push(b ^ p);
            }
        }
    }
    out
}

pub(crate) fn decode_xor(
    typ: u16,
    value: &[u8],
    cookie: u32,
    txid: &[u8; 12],
) -> Result<Address, Error> {
    if value.len() < 4 {
        return Err(Error::Invalid(typ, "address attribute too short".into()));
    }
    let family = value[1];
    let xport = u16::from_be_bytes([value[2], value[3]]);
    let port = xport ^ (cookie >> 16) as u16;
    let pad = xor_pad(cookie, txid);
    match family {
        FAMILY_V4 if value.len() == 8 => {
            let mut octets = [0u8; 4];
            for (i, (b, p)) in value[4..8].iter().zip(pad.iter()).enumerate() {
                octets[i] = b ^ p;
            }
            Ok(Address::V4 { octets, port })
        }
        FAMILY_V6 if value.len() == 20 => {
            let mut octets = [0u8; 16];
            for (i, (b, p)) in value[4..20].iter().zip(pad.iter()).enumerate() {
                octets[i] = b ^ p;
            }
            Ok(Address::V6 {
                octets,
                scope_id: 0,
                port,
            })
        }
        _ => Err(Error::Invalid(typ, "unknown address family".into())),
    }
}
