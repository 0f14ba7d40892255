use address::Address;

use crate::attribute::{address_codec, Tlv, TYPE_XOR_PEER_ADDRESS};
use crate::error::Error;

/// XOR-PEER-ADDRESS, RFC 5766 §14.3: the remote peer's transport address,
/// carried on CreatePermission/ChannelBind requests and Send/Data
/// indications, XOR-obscured the same way as XOR-MAPPED-ADDRESS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorPeerAddress(pub Address);

impl XorPeerAddress {
    pub fn new(addr: Address) -> Self {
        XorPeerAddress(addr)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    pub fn parse(value: &[u8], cookie: u32, txid: &[u8; 12]) -> Result<Self, Error> {
        address_codec::decode_xor(TYPE_XOR_PEER_ADDRESS, value, cookie, txid).map(XorPeerAddress)
    }

    pub(crate) fn encode(&self, cookie: u32, txid: &[u8; 12]) -> Vec<u8> {
        address_codec::encode_xor(&self.0, cookie, txid)
    }
}

impl Tlv for XorPeerAddress {
    fn typ(&self) -> u16 {
        TYPE_XOR_PEER_ADDRESS
    }

    fn length(&self) -> u16 {
        self.value().len() as u16
    }

    fn value(&self) -> Vec<u8> {
        address_codec::encode_xor(&self.0, crate::MAGIC_COOKIE, &[0u8; 12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_v4() {
        let addr = Address::V4 {
            octets: [198, 51, 100, 7],
            port: 4000,
        };
        let txid = [3u8; 12];
        let encoded = address_codec::encode_xor(&addr, crate::MAGIC_COOKIE, &txid);
        let decoded = XorPeerAddress::parse(&encoded, crate::MAGIC_COOKIE, &txid).unwrap();
        assert_eq!(decoded.address(), addr);
    }
}
