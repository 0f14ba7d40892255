use address::Address;

use crate::attribute::{address_codec, Tlv, TYPE_MAPPED_ADDRESS};
use crate::error::Error;

/// MAPPED-ADDRESS, RFC 5389 §15.1: the server's reflexive view of the
/// request's source address, sent in plain (non-XOR) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedAddress(pub Address);

impl MappedAddress {
    pub fn new(addr: Address) -> Self {
        MappedAddress(addr)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        address_codec::decode_plain(TYPE_MAPPED_ADDRESS, value).map(MappedAddress)
    }
}

impl Tlv for MappedAddress {
    fn typ(&self) -> u16 {
        TYPE_MAPPED_ADDRESS
    }

    fn length(&self) -> u16 {
        self.value().len() as u16
    }

    fn value(&self) -> Vec<u8> {
        address_codec::encode_plain(&self.0)
    }
}
