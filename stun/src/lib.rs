//! STUN (RFC 5389 and legacy dialects) message codec, transaction timer
//! and agent.

mod attribute;
pub mod agent;
pub mod error;
pub mod timer;
mod transaction_id;

use address::Address;
use hmac::{Hmac, Mac, NewMac};
use sha1::Sha1;

pub use crate::attribute::{
    Attribute, ChannelNumber, Data, ErrorCode, Fingerprint, IceControlled, IceControlling,
    MappedAddress, MessageIntegrity, MsSequenceNumber, MsVersion, Nonce, NumericCode, Priority,
    Realm, Software, Tlv, Unknown, UnknownAttributes, UseCandidate, Username, XorMappedAddress,
    XorPeerAddress, XorRelayedAddress,
};
pub use crate::attribute::{
    TYPE_CHANNEL_NUMBER, TYPE_DATA, TYPE_ERROR_CODE, TYPE_ICE_CONTROLLED, TYPE_ICE_CONTROLLING,
    TYPE_MS_SEQUENCE_NUMBER, TYPE_MS_VERSION, TYPE_NONCE, TYPE_PRIORITY, TYPE_REALM,
    TYPE_USE_CANDIDATE, TYPE_USERNAME, TYPE_XOR_MAPPED_ADDRESS, TYPE_XOR_PEER_ADDRESS,
    TYPE_XOR_RELAYED_ADDRESS,
};
use crate::attribute::TYPE_MESSAGE_INTEGRITY;
pub use crate::error::Error;
pub use crate::transaction_id::TransactionId;

type HmacSha1 = Hmac<Sha1>;

pub const MAGIC_COOKIE: u32 = 0x_2112_A442;
const FINGERPRINT_COOKIE: u32 = 0x_5354_554E;
const HEADER_LEN: usize = 20;
const MAX_MESSAGE_SIZE: usize = 0x_1_0000;

/// STUN/TURN method numbers, per `original_source/stun/stun-msg.h`: not
/// only RFC 5389 Binding, but the legacy RFC 3489 and TURN (RFC 5766)
/// methods the TURN client and OC2007/MSN/Google dialects need.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Binding,
    SharedSecret,
    Allocate,
    SetActiveDestination,
    Connect,
    Send,
    Data,
    CreatePermission,
    ChannelBind,
}

impl Method {
    fn to_u16(self) -> u16 {
        match self {
            Method::Binding => 0x001,
            Method::SharedSecret => 0x002,
            Method::Allocate => 0x003,
            Method::SetActiveDestination => 0x004,
            Method::Connect => 0x005,
            Method::Send => 0x006,
            Method::Data => 0x007,
            Method::CreatePermission => 0x008,
            Method::ChannelBind => 0x009,
        }
    }

    fn from_u16(m: u16) -> Result<Self, Error> {
        match m {
            0x001 => Ok(Method::Binding),
            0x002 => Ok(Method::SharedSecret),
            0x003 => Ok(Method::Allocate),
            0x004 => Ok(Method::SetActiveDestination),
            0x005 => Ok(Method::Connect),
            0x006 => Ok(Method::Send),
            0x007 => Ok(Method::Data),
            0x008 => Ok(Method::CreatePermission),
            0x009 => Ok(Method::ChannelBind),
            other => Err(Error::Malformed(format!("unknown stun method {:#05x}", other))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Class {
    Request,
    Indication,
    Success,
    Error,
}

impl Class {
    fn to_bits(self) -> u8 {
        match self {
            Class::Request => 0b00,
            Class::Indication => 0b01,
            Class::Success => 0b10,
            Class::Error => 0b11,
        }
    }

    fn from_bits(c: u8) -> Self {
        match c {
            0b00 => Class::Request,
            0b01 => Class::Indication,
            0b10 => Class::Success,
            _ => Class::Error,
        }
    }
}

//         0                 1
//         2  3  4 5 6 7 8 9 0 1 2 3 4 5
//
//        +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//        |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
//        |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
//        +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//
// Figure 3: Format of STUN Message Type Field
//
// https://tools.ietf.org/html/rfc5389#section-6
fn encode_message_type(class: Class, method: Method) -> u16 {
    let c = class.to_bits() as u16;
    let m = method.to_u16();

    let c_0 = c & 0b_01;
    let c_1 = (c & 0b_10) >> 1;

    let m_3_0 = m & 0b_0000_0000_1111;
    let m_6_4 = (m & 0b_0000_0111_0000) >> 4;
    let m_11_7 = (m & 0b_1111_1000_0000) >> 7;

    (m_11_7 << 9) | (c_1 << 8) | (m_6_4 << 5) | (c_0 << 4) | m_3_0
}

fn decode_message_type(mt: u16) -> Result<(Class, Method), Error> {
    if mt & 0b_1100_0000_0000_0000 != 0 {
        return Err(Error::Malformed(
            "top two bits of message type must be zero".into(),
        ));
    }

    let m_11_7 = (mt >> 9) & 0b_1_1111;
    let c_1 = (mt >> 8) & 0b_1;
    let m_6_4 = (mt >> 5) & 0b_111;
    let c_0 = (mt >> 4) & 0b_1;
    let m_3_0 = mt & 0b_1111;

    let c = ((c_1 << 1) | c_0) as u8;
    let m = (m_11_7 << 6) | (m_6_4 << 3) | m_3_0;

    let class = Class::from_bits(c);
    let method = Method::from_u16(m)?;

    Ok((class, method))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub class: Class,
    pub method: Method,
    pub length: u16,
    pub transaction_id: TransactionId,
}

impl Header {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mt = encode_message_type(self.class, self.method);

        let mut header_bytes = Vec::with_capacity(HEADER_LEN);
        header_bytes.extend(&mt.to_be_bytes());
        header_bytes.extend(&self.length.to_be_bytes());
        header_bytes.extend(&MAGIC_COOKIE.to_be_bytes());
        header_bytes.extend(self.transaction_id.as_bytes());

        header_bytes
    }
}

fn parse_header(input: &[u8]) -> Result<Header, Error> {
    if input.len() < HEADER_LEN {
        return Err(Error::Incomplete);
    }

    let mt = u16::from_be_bytes([input[0], input[1]]);
    let (class, method) = decode_message_type(mt)?;

    let length = u16::from_be_bytes([input[2], input[3]]);

    let cookie = u32::from_be_bytes([input[4], input[5], input[6], input[7]]);
    if cookie != MAGIC_COOKIE {
        return Err(Error::Malformed("bad magic cookie".into()));
    }

    let mut txid_bytes = [0u8; 12];
    txid_bytes.copy_from_slice(&input[8..20]);
    let transaction_id = TransactionId::from_bytes(txid_bytes);

    Ok(Header {
        class,
        method,
        length,
        transaction_id,
    })
}

/// Checks that `bytes` begins with a well-formed STUN message and returns
/// its total on-wire length (header plus attributes). Returns
/// `Error::Incomplete` if `bytes` doesn't yet hold enough data to decide,
/// and `Error::Malformed` for anything structurally invalid.
pub fn validate(bytes: &[u8]) -> Result<usize, Error> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Incomplete);
    }

    let mt = u16::from_be_bytes([bytes[0], bytes[1]]);
    decode_message_type(mt)?;

    let length = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
    if length % 4 != 0 {
        return Err(Error::Malformed(
            "message length is not 4-byte aligned".into(),
        ));
    }

    let cookie = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if cookie != MAGIC_COOKIE {
        return Err(Error::Malformed("bad magic cookie".into()));
    }

    let total = HEADER_LEN + length;
    if bytes.len() < total {
        return Err(Error::Incomplete);
    }

    let mut cursor = &bytes[HEADER_LEN..total];
    while !cursor.is_empty() {
        if cursor.len() < 4 {
            return Err(Error::Malformed("truncated attribute header".into()));
        }
        let attr_len = u16::from_be_bytes([cursor[2], cursor[3]]) as usize;
        let padded = attribute::align4(attr_len);
        if cursor.len() < 4 + padded {
            return Err(Error::Malformed(
                "attribute value overruns declared message length".into(),
            ));
        }
        cursor = &cursor[4 + padded..];
    }

    Ok(total)
}

/// True iff `bytes` is long enough to be a STUN message, carries the
/// magic cookie, and its FINGERPRINT attribute (if present) checksums
/// correctly. Used to tell STUN apart from muxed media on the same port.
pub fn demux(bytes: &[u8]) -> bool {
    let total = match validate(bytes) {
        Ok(total) => total,
        Err(_) => return false,
    };
    let msg = &bytes[..total];

    let mut offset = HEADER_LEN;
    let mut cursor = &msg[HEADER_LEN..];
    let mut fingerprint = None;

    while cursor.len() >= 4 {
        let typ = u16::from_be_bytes([cursor[0], cursor[1]]);
        let len = u16::from_be_bytes([cursor[2], cursor[3]]) as usize;
        let padded = attribute::align4(len);
        if cursor.len() < 4 + padded {
            break;
        }
        if typ == attribute::TYPE_FINGERPRINT && len == 4 {
            let value = u32::from_be_bytes([cursor[4], cursor[5], cursor[6], cursor[7]]);
            fingerprint = Some((offset, value));
        }
        offset += 4 + padded;
        cursor = &cursor[4 + padded..];
    }

    match fingerprint {
        Some((fpr_offset, value)) => {
            let mut prefix = msg[..fpr_offset].to_vec();
            let rewritten_length = (fpr_offset - HEADER_LEN) as u16;
            prefix[2..4].copy_from_slice(&rewritten_length.to_be_bytes());
            (crc32fast::hash(&prefix) ^ FINGERPRINT_COOKIE) == value
        }
        None => false,
    }
}

fn parse_attributes(input: &[u8], txid: &[u8; 12]) -> Result<Vec<Attribute>, Error> {
    let mut attrs = Vec::new();
    let mut cursor = input;
    let mut seen_message_integrity = false;

    while !cursor.is_empty() {
        if cursor.len() < 4 {
            return Err(Error::Malformed("truncated attribute header".into()));
        }
        let typ = u16::from_be_bytes([cursor[0], cursor[1]]);
        let len = u16::from_be_bytes([cursor[2], cursor[3]]) as usize;
        let padded = attribute::align4(len);
        if cursor.len() < 4 + padded {
            return Err(Error::Malformed("attribute value is truncated".into()));
        }
        let value = &cursor[4..4 + len];

        // Attributes after MESSAGE-INTEGRITY are ignored except FINGERPRINT.
        if seen_message_integrity && typ != attribute::TYPE_FINGERPRINT {
            cursor = &cursor[4 + padded..];
            continue;
        }

        let attr = attribute::parse(typ, value, MAGIC_COOKIE, txid)?;
        if typ == TYPE_MESSAGE_INTEGRITY {
            seen_message_integrity = true;
        }
        let is_fingerprint = typ == attribute::TYPE_FINGERPRINT;
        attrs.push(attr);
        cursor = &cursor[4 + padded..];
        if is_fingerprint {
            break;
        }
    }

    Ok(attrs)
}

fn tlv_size(attribute: &Attribute) -> u16 {
    (4 + attribute::align4(attribute.value().len())) as u16
}

/// Encodes one attribute, re-deriving XOR-address attributes against the
/// message's real cookie/transaction id rather than the placeholder
/// their own [`Tlv::value`] uses for generic framing.
fn attribute_to_bytes(attr: &Attribute, txid: &[u8; 12]) -> Vec<u8> {
    let (typ, value) = match attr {
        Attribute::XorMappedAddress(a) => (a.typ(), a.encode(MAGIC_COOKIE, txid)),
        Attribute::XorPeerAddress(a) => (a.typ(), a.encode(MAGIC_COOKIE, txid)),
        Attribute::XorRelayedAddress(a) => (a.typ(), a.encode(MAGIC_COOKIE, txid)),
        other => return other.to_bytes(),
    };
    let padded = attribute::align4(value.len());
    let mut out = Vec::with_capacity(4 + padded);
    out.extend_from_slice(&typ.to_be_bytes());
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(&value);
    out.resize(4 + padded, 0);
    out
}

fn attributes_before(attrs: &[Attribute], typ: u16) -> Vec<&Attribute> {
    let mut out = Vec::new();
    for a in attrs {
        if a.typ() == typ {
            break;
        }
        out.push(a);
    }
    out
}

/// HMAC-SHA1 over the header (with `length` rewritten to cover the
/// MESSAGE-INTEGRITY attribute but not FINGERPRINT) and the attributes
/// preceding it, per RFC 5389 §15.4.
fn compute_message_integrity(header: Header, attrs_before_mi: &[&Attribute], key: &[u8]) -> Vec<u8> {
    let attrs_len: usize = attrs_before_mi.iter().map(|a| tlv_size(a) as usize).sum();
    let mut h = header;
    h.length = (attrs_len + 24) as u16;
    let txid = *h.transaction_id.as_bytes();

    let mut input = h.to_bytes();
    for a in attrs_before_mi {
        input.extend(attribute_to_bytes(a, &txid));
    }

    let mut mac = HmacSha1::new_varkey(key).expect("hmac accepts any key length");
    mac.update(&input);
    mac.finalize().into_bytes().to_vec()
}

/// `MD5(username ":" realm ":" password)`, the long-term-credential HMAC
/// key per RFC 5389 §15.4.
pub fn long_term_key(username: &str, realm: &str, password: &str) -> [u8; 16] {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(realm.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub attributes: Vec<Attribute>,
}

impl Message {
    /// Decodes one STUN message from the front of `bytes`, returning it
    /// along with its total on-wire length.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), Error> {
        let total = validate(bytes)?;
        let header = parse_header(&bytes[..total])?;
        let txid = *header.transaction_id.as_bytes();
        let attributes = parse_attributes(&bytes[HEADER_LEN..total], &txid)?;
        Ok((Message { header, attributes }, total))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let txid = *self.header.transaction_id.as_bytes();
        let mut bytes = self.header.to_bytes();
        for attribute in &self.attributes {
            bytes.extend(attribute_to_bytes(attribute, &txid));
        }
        bytes
    }

    pub fn base(header: Header) -> Self {
        Self {
            header,
            attributes: vec![],
        }
    }

    pub fn build_request(method: Method) -> Self {
        Self::base(Header {
            class: Class::Request,
            method,
            length: 0,
            transaction_id: TransactionId::generate(),
        })
    }

    pub fn build_indication(method: Method) -> Self {
        Self::base(Header {
            class: Class::Indication,
            method,
            length: 0,
            transaction_id: TransactionId::generate(),
        })
    }

    pub fn build_response(request: &Message) -> Self {
        Self::base(Header {
            class: Class::Success,
            method: request.header.method,
            length: 0,
            transaction_id: request.header.transaction_id,
        })
    }

    pub fn build_error(request: &Message, numeric_code: NumericCode, reason: &str) -> Self {
        Self::base(Header {
            class: Class::Error,
            method: request.header.method,
            length: 0,
            transaction_id: request.header.transaction_id,
        })
        .and_attribute(Attribute::ErrorCode(ErrorCode::new(numeric_code, reason)))
    }

    /// A 420 (Unknown Attribute) response enumerating the comprehension-
    /// required attributes the request carried that this implementation
    /// doesn't recognize.
    pub fn build_unknown_attribute_error(request: &Message, unknown: Vec<u16>) -> Self {
        Self::build_error(request, NumericCode::UnknownAttribute, "Unknown Attribute").and_attribute(
            Attribute::UnknownAttributes(UnknownAttributes::new(unknown)),
        )
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.header.length = attributes.iter().map(tlv_size).sum();
        self.attributes = attributes;
        self
    }

    pub fn and_attribute(mut self, attribute: Attribute) -> Self {
        self.header.length += tlv_size(&attribute);
        self.attributes.push(attribute);
        self
    }

    fn checked_and_attribute(self, attribute: Attribute) -> Result<Self, Error> {
        let projected = HEADER_LEN + self.header.length as usize + tlv_size(&attribute) as usize;
        if projected > MAX_MESSAGE_SIZE {
            return Err(Error::NoBuf);
        }
        Ok(self.and_attribute(attribute))
    }

    pub fn append_flag(self, typ: u16) -> Result<Self, Error> {
        self.append_raw(typ, vec![])
    }

    pub fn append_u32(self, typ: u16, value: u32) -> Result<Self, Error> {
        self.append_raw(typ, value.to_be_bytes().to_vec())
    }

    pub fn append_u64(self, typ: u16, value: u64) -> Result<Self, Error> {
        self.append_raw(typ, value.to_be_bytes().to_vec())
    }

    pub fn append_string(self, typ: u16, value: &str) -> Result<Self, Error> {
        self.append_raw(typ, value.as_bytes().to_vec())
    }

    pub fn append_address(self, typ: u16, addr: &Address) -> Result<Self, Error> {
        self.append_raw(typ, attribute::address_codec::encode_plain(addr))
    }

    pub fn append_xor_address(self, typ: u16, addr: &Address) -> Result<Self, Error> {
        let txid = *self.header.transaction_id.as_bytes();
        let bytes = attribute::address_codec::encode_xor(addr, MAGIC_COOKIE, &txid);
        self.append_raw(typ, bytes)
    }

    /// Generic escape hatch for attribute types without a dedicated
    /// typed constructor (used by callers building type numbers that
    /// aren't known until runtime).
    pub fn append_raw(self, typ: u16, value: Vec<u8>) -> Result<Self, Error> {
        self.checked_and_attribute(Attribute::Unknown(Unknown::new(typ, value)))
    }

    pub fn with_message_integrity(self, key: &[u8]) -> Self {
        let attrs_before: Vec<&Attribute> = self.attributes.iter().collect();
        let mac = compute_message_integrity(self.header, &attrs_before, key);
        self.and_attribute(Attribute::MessageIntegrity(MessageIntegrity::new(mac)))
    }

    pub fn with_fingerprint(self) -> Self {
        let mut h = self.header;
        h.length += 8;
        let txid = *h.transaction_id.as_bytes();
        let mut bytes = h.to_bytes();
        for a in &self.attributes {
            bytes.extend(attribute_to_bytes(a, &txid));
        }
        let checksum = crc32fast::hash(&bytes) ^ FINGERPRINT_COOKIE;
        self.and_attribute(Attribute::Fingerprint(Fingerprint(checksum)))
    }

    /// Appends MESSAGE-INTEGRITY under a long-term credential (`key` is
    /// `MD5(username:realm:password)`, see [`long_term_key`]) and then
    /// FINGERPRINT. Omits MESSAGE-INTEGRITY if `key` is `None`.
    pub fn finish_long(
        self,
        realm: Option<&str>,
        username: Option<&str>,
        nonce: Option<&str>,
        key: Option<&[u8]>,
    ) -> Self {
        let mut msg = self;
        if let Some(u) = username {
            msg = msg.and_attribute(Attribute::Username(Username::new(u)));
        }
        if let Some(r) = realm {
            msg = msg.and_attribute(Attribute::Realm(Realm::new(r)));
        }
        if let Some(n) = nonce {
            msg = msg.and_attribute(Attribute::Nonce(Nonce::new(n)));
        }
        if let Some(key) = key {
            msg = msg.with_message_integrity(key);
        }
        msg.with_fingerprint()
    }

    /// Appends MESSAGE-INTEGRITY under a short-term credential (HMAC key
    /// is the password bytes directly) and then FINGERPRINT. Omits
    /// MESSAGE-INTEGRITY if `password` is `None`.
    pub fn finish_short(
        self,
        username: Option<&str>,
        password: Option<&[u8]>,
        nonce: Option<&str>,
    ) -> Self {
        let mut msg = self;
        if let Some(u) = username {
            msg = msg.and_attribute(Attribute::Username(Username::new(u)));
        }
        if let Some(n) = nonce {
            msg = msg.and_attribute(Attribute::Nonce(Nonce::new(n)));
        }
        if let Some(pwd) = password {
            msg = msg.with_message_integrity(pwd);
        }
        msg.with_fingerprint()
    }

    pub fn finish(self) -> Self {
        self.with_fingerprint()
    }

    pub fn find(&self, typ: u16) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.typ() == typ)
    }

    pub fn find32(&self, typ: u16) -> Result<u32, Error> {
        let attr = self.find(typ).ok_or(Error::NotFound(typ))?;
        let v = attr.value();
        let bytes: [u8; 4] = v
            .as_slice()
            .try_into()
            .map_err(|_| Error::Invalid(typ, "expected a 4-byte value".into()))?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn find64(&self, typ: u16) -> Result<u64, Error> {
        let attr = self.find(typ).ok_or(Error::NotFound(typ))?;
        let v = attr.value();
        let bytes: [u8; 8] = v
            .as_slice()
            .try_into()
            .map_err(|_| Error::Invalid(typ, "expected an 8-byte value".into()))?;
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn find_string(&self, typ: u16) -> Result<String, Error> {
        let attr = self.find(typ).ok_or(Error::NotFound(typ))?;
        String::from_utf8(attr.value()).map_err(|_| Error::Invalid(typ, "not valid utf-8".into()))
    }

    pub fn find_addr(&self, typ: u16) -> Result<Address, Error> {
        match self.find(typ) {
            Some(Attribute::MappedAddress(a)) => Ok(a.address()),
            Some(_) => Err(Error::Invalid(typ, "not an address attribute".into())),
            None => Err(Error::NotFound(typ)),
        }
    }

    pub fn find_xor_addr(&self, typ: u16) -> Result<Address, Error> {
        match self.find(typ) {
            Some(Attribute::XorMappedAddress(a)) => Ok(a.address()),
            Some(Attribute::XorPeerAddress(a)) => Ok(a.address()),
            Some(Attribute::XorRelayedAddress(a)) => Ok(a.address()),
            Some(_) => Err(Error::Invalid(typ, "not a xor-address attribute".into())),
            None => Err(Error::NotFound(typ)),
        }
    }

    /// Type numbers of comprehension-required attributes this message
    /// carries that decoded as [`Unknown`].
    pub fn unknown_comprehension_required(&self) -> Vec<u16> {
        self.attributes
            .iter()
            .filter(|a| a.is_unrecognized_required())
            .map(|a| a.typ())
            .collect()
    }
}

pub fn verify_key(msg: &Message, key: &[u8]) -> Result<bool, Error> {
    let mi_bytes = match msg.find(TYPE_MESSAGE_INTEGRITY) {
        Some(Attribute::MessageIntegrity(mi)) => mi.as_bytes().to_vec(),
        _ => return Err(Error::Unauthorized),
    };
    let attrs_before = attributes_before(&msg.attributes, TYPE_MESSAGE_INTEGRITY);
    let expected = compute_message_integrity(msg.header, &attrs_before, key);
    Ok(mi_bytes == expected)
}

pub fn verify_password(msg: &Message, password: &[u8]) -> Result<bool, Error> {
    verify_key(msg, password)
}

/// USERNAME must be `<remote-ufrag>:<local-ufrag>`; this checks the
/// local half matches.
pub fn verify_username(msg: &Message, local_ufrag: &str) -> Result<bool, Error> {
    match msg.find(TYPE_USERNAME) {
        Some(Attribute::Username(u)) => match u.split_ufrags() {
            Some((_remote, local)) => Ok(local == local_ufrag),
            None => Ok(false),
        },
        Some(_) => Err(Error::Invalid(TYPE_USERNAME, "not a username attribute".into())),
        None => Err(Error::NotFound(TYPE_USERNAME)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Matched,
    Error(NumericCode),
    Mismatch,
}

/// Ensures `response` answers `request`: same method and transaction id,
/// and (if `key` is supplied) a valid MESSAGE-INTEGRITY.
pub fn match_messages(response: &Message, request: &Message, key: Option<&[u8]>) -> MatchResult {
    if response.header.method != request.header.method {
        return MatchResult::Mismatch;
    }
    if response.header.transaction_id != request.header.transaction_id {
        return MatchResult::Mismatch;
    }
    if let Some(key) = key {
        match verify_key(response, key) {
            Ok(true) => {}
            _ => return MatchResult::Mismatch,
        }
    }
    if response.header.class == Class::Error {
        return match response.find(TYPE_ERROR_CODE) {
            Some(Attribute::ErrorCode(ec)) => MatchResult::Error(ec.numeric_code()),
            _ => MatchResult::Error(NumericCode::ServerError),
        };
    }
    MatchResult::Matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_txid() -> TransactionId {
        TransactionId::from_bytes([0u8; 12])
    }

    #[test]
    fn parse_header() {
        #[rustfmt::skip]
        let input = vec![
            0x_01, 0x_01, 0x_00, 0x_00,
            0x_21, 0x_12, 0x_A4, 0x_42,
            0x_00, 0x_00, 0x_00, 0x_00,
            0x_00, 0x_00, 0x_00, 0x_00,
            0x_00, 0x_00, 0x_00, 0x_00,
        ];
        let expected = Header {
            class: Class::Success,
            method: Method::Binding,
            length: 0,
            transaction_id: zero_txid(),
        };
        let actual = super::parse_header(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn serialize_header() {
        let header = Header {
            class: Class::Success,
            method: Method::Binding,
            length: 0,
            transaction_id: zero_txid(),
        };
        #[rustfmt::skip]
        let expected = vec![
            0x_01, 0x_01, 0x_00, 0x_00,
            0x_21, 0x_12, 0x_A4, 0x_42,
            0x_00, 0x_00, 0x_00, 0x_00,
            0x_00, 0x_00, 0x_00, 0x_00,
            0x_00, 0x_00, 0x_00, 0x_00,
        ];
        let actual = header.to_bytes();
        assert_eq!(expected, actual);
    }

    #[test]
    fn round_trips_empty_binding_request() {
        let msg = Message::build_request(Method::Binding);
        let bytes = msg.to_bytes();
        let (decoded, total) = Message::decode(&bytes).unwrap();
        assert_eq!(total, bytes.len());
        assert_eq!(decoded.header.method, Method::Binding);
        assert_eq!(decoded.header.class, Class::Request);
        assert!(decoded.attributes.is_empty());
    }

    #[test]
    fn round_trips_xor_mapped_address_over_nonzero_txid() {
        let addr = Address::V4 {
            octets: [192, 0, 2, 9],
            port: 4242,
        };
        let msg = Message::build_response(&Message::build_request(Method::Binding))
            .and_attribute(Attribute::XorMappedAddress(XorMappedAddress::new(addr)));
        let bytes = msg.to_bytes();
        let (decoded, _) = Message::decode(&bytes).unwrap();
        match decoded.find(attribute::TYPE_XOR_MAPPED_ADDRESS) {
            Some(Attribute::XorMappedAddress(x)) => assert_eq!(x.address(), addr),
            other => panic!("unexpected attribute: {:?}", other),
        }
    }

    #[test]
    fn validates_incomplete_messages() {
        assert_eq!(validate(&[0u8; 10]), Err(Error::Incomplete));
    }

    #[test]
    fn demux_accepts_message_with_valid_fingerprint() {
        let msg = Message::build_request(Method::Binding).finish();
        assert!(demux(&msg.to_bytes()));
    }

    #[test]
    fn demux_rejects_tampered_fingerprint() {
        let msg = Message::build_request(Method::Binding).finish();
        let mut bytes = msg.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(!demux(&bytes));
    }

    #[test]
    fn short_term_integrity_round_trips() {
        let password = b"swordfish";
        let msg = Message::build_request(Method::Binding)
            .finish_short(Some("frag:ufrag"), Some(password), None);
        let (decoded, _) = Message::decode(&msg.to_bytes()).unwrap();
        assert!(verify_password(&decoded, password).unwrap());
        assert!(!verify_password(&decoded, b"wrong").unwrap());
    }

    #[test]
    fn long_term_integrity_round_trips() {
        let key = long_term_key("alice", "example.org", "hunter2");
        let msg =
            Message::build_request(Method::Allocate).finish_long(Some("example.org"), Some("alice"), None, Some(&key));
        let (decoded, _) = Message::decode(&msg.to_bytes()).unwrap();
        assert!(verify_key(&decoded, &key).unwrap());
    }

    #[test]
    fn verify_username_checks_local_ufrag() {
        let msg = Message::build_request(Method::Binding)
            .and_attribute(Attribute::Username(Username::new("remote:local")));
        assert!(verify_username(&msg, "local").unwrap());
        assert!(!verify_username(&msg, "other").unwrap());
    }

    #[test]
    fn match_messages_rejects_mismatched_transaction() {
        let request = Message::build_request(Method::Binding);
        let other_request = Message::build_request(Method::Binding);
        let response = Message::build_response(&other_request);
        assert_eq!(
            match_messages(&response, &request, None),
            MatchResult::Mismatch
        );
    }

    #[test]
    fn match_messages_reports_error_code() {
        let request = Message::build_request(Method::Binding);
        let response = Message::build_error(&request, NumericCode::RoleConflict, "conflict");
        assert_eq!(
            match_messages(&response, &request, None),
            MatchResult::Error(NumericCode::RoleConflict)
        );
    }

    #[test]
    fn append_raw_enforces_no_buf() {
        let msg = Message::build_request(Method::Binding);
        let big = vec![0u8; MAX_MESSAGE_SIZE];
        assert_eq!(
            msg.append_raw(attribute::TYPE_UNKNOWN_ATTRIBUTES, big),
            Err(Error::NoBuf)
        );
    }
}
