//! STUN attribute TLVs.
//!
//! Each attribute lives in its own module and implements [`Tlv`]. The
//! [`Attribute`] enum is generated from the unit-variant list below by
//! `#[simplified]`, which rewrites each bare variant `Foo` into a tuple
//! variant `Foo(Foo)` wrapping the same-named type.
//!
//! https://www.iana.org/assignments/stun-parameters/stun-parameters.xhtml

pub(crate) mod address_codec;
mod channel_number;
mod data;
mod error_code;
mod fingerprint;
mod ice_controlled;
mod ice_controlling;
mod mapped_address;
mod message_integrity;
mod ms_sequence_number;
mod ms_version;
mod nonce;
mod priority;
mod realm;
mod software;
mod unknown;
mod unknown_attributes;
mod use_candidate;
mod username;
mod xor_mapped_address;
mod xor_peer_address;
mod xor_relayed_address;

pub use channel_number::ChannelNumber;
pub use data::Data;
pub use error_code::{ErrorCode, NumericCode};
pub use fingerprint::Fingerprint;
pub use ice_controlled::IceControlled;
pub use ice_controlling::IceControlling;
pub use mapped_address::MappedAddress;
pub use message_integrity::MessageIntegrity;
pub use ms_sequence_number::MsSequenceNumber;
pub use ms_version::MsVersion;
pub use nonce::Nonce;
pub use priority::Priority;
pub use realm::Realm;
pub use software::Software;
pub use unknown::Unknown;
pub use unknown_attributes::UnknownAttributes;
pub use use_candidate::UseCandidate;
pub use username::Username;
pub use xor_mapped_address::XorMappedAddress;
pub use xor_peer_address::XorPeerAddress;
pub use xor_relayed_address::XorRelayedAddress;

use crate::error::Error;
use simplified_enum::simplified;

pub const TYPE_MAPPED_ADDRESS: u16 = 0x0001;
pub const TYPE_USERNAME: u16 = 0x0006;
pub const TYPE_MESSAGE_INTEGRITY: u16 = 0x0008;
pub const TYPE_ERROR_CODE: u16 = 0x0009;
pub const TYPE_UNKNOWN_ATTRIBUTES: u16 = 0x000a;
pub const TYPE_CHANNEL_NUMBER: u16 = 0x000c;
pub const TYPE_XOR_PEER_ADDRESS: u16 = 0x0012;
pub const TYPE_DATA: u16 = 0x0013;
pub const TYPE_REALM: u16 = 0x0014;
pub const TYPE_NONCE: u16 = 0x0015;
pub const TYPE_XOR_RELAYED_ADDRESS: u16 = 0x0016;
pub const TYPE_PRIORITY: u16 = 0x0024;
pub const TYPE_USE_CANDIDATE: u16 = 0x0025;
pub const TYPE_XOR_MAPPED_ADDRESS: u16 = 0x0020;
pub const TYPE_SOFTWARE: u16 = 0x8022;
pub const TYPE_FINGERPRINT: u16 = 0x8028;
pub const TYPE_ICE_CONTROLLED: u16 = 0x8029;
pub const TYPE_ICE_CONTROLLING: u16 = 0x802a;

/// OC2007 dialect attributes, not in the IANA STUN parameters registry.
/// Numbers reconstructed from `original_source/socket/{turn,udp-turn}.c`,
/// which reference these by name but not by wire value in the retained
/// excerpt; see DESIGN.md.
pub const TYPE_MS_VERSION: u16 = 0x8008;
pub const TYPE_MS_SEQUENCE_NUMBER: u16 = 0x8050;

/// Whether comprehension of an attribute is mandatory. Attribute type
/// numbers below `0x8000` are comprehension-required; an agent that
/// doesn't understand one must reject the message.
pub fn comprehension_required(typ: u16) -> bool {
    typ < 0x8000
}

pub(crate) fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Common behaviour of a STUN attribute TLV.
pub trait Tlv {
    fn typ(&self) -> u16;
    fn length(&self) -> u16;
    fn value(&self) -> Vec<u8>;

    /// Encodes the full TLV: 2-byte type, 2-byte length, value, then
    /// zero padding out to a 4-byte boundary.
    fn to_bytes(&self) -> Vec<u8> {
        let value = self.value();
        let padded = align4(value.len());
        let mut out = Vec::with_capacity(4 + padded);
        out.extend_from_slice(&self.typ().to_be_bytes());
        out.extend_from_slice(&self.length().to_be_bytes());
        out.extend_from_slice(&value);
        out.resize(4 + padded, 0);
        out
    }
}

#[simplified]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    MappedAddress,
    Username,
    MessageIntegrity,
    ErrorCode,
    UnknownAttributes,
    ChannelNumber,
    XorPeerAddress,
    Data,
    Realm,
    Nonce,
    XorRelayedAddress,
    Priority,
    UseCandidate,
    XorMappedAddress,
    Software,
    IceControlled,
    IceControlling,
    Fingerprint,
    MsVersion,
    MsSequenceNumber,
    Unknown,
}

// `impl_enum::with_methods` would auto-generate this dispatch, but its
// expansion can't be checked without a compiler at hand, so it's
// written out by hand here; see DESIGN.md.
impl Tlv for Attribute {
    fn typ(&self) -> u16 {
        match self {
            Attribute::MappedAddress(a) => a.typ(),
            Attribute::Username(a) => a.typ(),
            Attribute::MessageIntegrity(a) => a.typ(),
            Attribute::ErrorCode(a) => a.typ(),
            Attribute::UnknownAttributes(a) => a.typ(),
            Attribute::ChannelNumber(a) => a.typ(),
            Attribute::XorPeerAddress(a) => a.typ(),
            Attribute::Data(a) => a.typ(),
            Attribute::Realm(a) => a.typ(),
            Attribute::Nonce(a) => a.typ(),
            Attribute::XorRelayedAddress(a) => a.typ(),
            Attribute::Priority(a) => a.typ(),
            Attribute::UseCandidate(a) => a.typ(),
            Attribute::XorMappedAddress(a) => a.typ(),
            Attribute::Software(a) => a.typ(),
            Attribute::IceControlled(a) => a.typ(),
            Attribute::IceControlling(a) => a.typ(),
            Attribute::Fingerprint(a) => a.typ(),
            Attribute::MsVersion(a) => a.typ(),
            Attribute::MsSequenceNumber(a) => a.typ(),
            Attribute::Unknown(a) => a.typ(),
        }
    }

    fn length(&self) -> u16 {
        match self {
            Attribute::MappedAddress(a) => a.length(),
            Attribute::Username(a) => a.length(),
            Attribute::MessageIntegrity(a) => a.length(),
            Attribute::ErrorCode(a) => a.length(),
            Attribute::UnknownAttributes(a) => a.length(),
            Attribute::ChannelNumber(a) => a.length(),
            Attribute::XorPeerAddress(a) => a.length(),
            Attribute::Data(a) => a.length(),
            Attribute::Realm(a) => a.length(),
            Attribute::Nonce(a) => a.length(),
            Attribute::XorRelayedAddress(a) => a.length(),
            Attribute::Priority(a) => a.length(),
            Attribute::UseCandidate(a) => a.length(),
            Attribute::XorMappedAddress(a) => a.length(),
            Attribute::Software(a) => a.length(),
            Attribute::IceControlled(a) => a.length(),
            Attribute::IceControlling(a) => a.length(),
            Attribute::Fingerprint(a) => a.length(),
            Attribute::MsVersion(a) => a.length(),
            Attribute::MsSequenceNumber(a) => a.length(),
            Attribute::Unknown(a) => a.length(),
        }
    }

    fn value(&self) -> Vec<u8> {
        match self {
            Attribute::MappedAddress(a) => a.value(),
            Attribute::Username(a) => a.value(),
            Attribute::MessageIntegrity(a) => a.value(),
            Attribute::ErrorCode(a) => a.value(),
            Attribute::UnknownAttributes(a) => a.value(),
            Attribute::ChannelNumber(a) => a.value(),
            Attribute::XorPeerAddress(a) => a.value(),
            Attribute::Data(a) => a.value(),
            Attribute::Realm(a) => a.value(),
            Attribute::Nonce(a) => a.value(),
            Attribute::XorRelayedAddress(a) => a.value(),
            Attribute::Priority(a) => a.value(),
            Attribute::UseCandidate(a) => a.value(),
            Attribute::XorMappedAddress(a) => a.value(),
            Attribute::Software(a) => a.value(),
            Attribute::IceControlled(a) => a.value(),
            Attribute::IceControlling(a) => a.value(),
            Attribute::Fingerprint(a) => a.value(),
            Attribute::MsVersion(a) => a.value(),
            Attribute::MsSequenceNumber(a) => a.value(),
            Attribute::Unknown(a) => a.value(),
        }
    }
}

impl Attribute {
    /// True if this attribute carries a comprehension-required type
    /// number (`< 0x8000`) that we decoded only as [`Unknown`].
    pub fn is_unrecognized_required(&self) -> bool {
        matches!(self, Attribute::Unknown(u) if comprehension_required(u.typ))
    }
}

/// Parses one attribute's already-sliced value bytes, given the type
/// number read from its TLV header. `cookie` and `txid` are needed to
/// undo the XOR obfuscation on address-bearing attributes.
pub fn parse(typ: u16, value: &[u8], cookie: u32, txid: &[u8; 12]) -> Result<Attribute, Error> {
    let attr = match typ {
        TYPE_MAPPED_ADDRESS => Attribute::MappedAddress(MappedAddress::parse(value)?),
        TYPE_USERNAME => Attribute::Username(Username::parse(value)?),
        TYPE_MESSAGE_INTEGRITY => Attribute::MessageIntegrity(MessageIntegrity::parse(value)?),
        TYPE_ERROR_CODE => Attribute::ErrorCode(ErrorCode::parse(value)?),
        TYPE_UNKNOWN_ATTRIBUTES => Attribute::UnknownAttributes(UnknownAttributes::parse(value)?),
        TYPE_CHANNEL_NUMBER => Attribute::ChannelNumber(ChannelNumber::parse(value)?),
        TYPE_XOR_PEER_ADDRESS => {
            Attribute::XorPeerAddress(XorPeerAddress::parse(value, cookie, txid)?)
        }
        TYPE_DATA => Attribute::Data(Data::parse(value)?),
        TYPE_REALM => Attribute::Realm(Realm::parse(value)?),
        TYPE_NONCE => Attribute::Nonce(Nonce::parse(value)?),
        TYPE_XOR_RELAYED_ADDRESS => {
            Attribute::XorRelayedAddress(XorRelayedAddress::parse(value, cookie, txid)?)
        }
        TYPE_PRIORITY => Attribute::Priority(Priority::parse(value)?),
        TYPE_USE_CANDIDATE => Attribute::UseCandidate(UseCandidate::parse(value)?),
        TYPE_XOR_MAPPED_ADDRESS => {
            Attribute::XorMappedAddress(XorMappedAddress::parse(value, cookie, txid)?)
        }
        TYPE_SOFTWARE => Attribute::Software(Software::parse(value)?),
        TYPE_ICE_CONTROLLED => Attribute::IceControlled(IceControlled::parse(value)?),
        TYPE_ICE_CONTROLLING => Attribute::IceControlling(IceControlling::parse(value)?),
        TYPE_FINGERPRINT => Attribute::Fingerprint(Fingerprint::parse(value)?),
        TYPE_MS_VERSION => Attribute::MsVersion(MsVersion::parse(value)?),
        TYPE_MS_SEQUENCE_NUMBER => Attribute::MsSequenceNumber(MsSequenceNumber::parse(value)?),
        other => Attribute::Unknown(Unknown::new(other, value.to_vec())),
    };
    Ok(attr)
}
