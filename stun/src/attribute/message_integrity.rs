use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_MESSAGE_INTEGRITY;
const HMAC_SHA1_LEN: usize = 20;

/// MESSAGE-INTEGRITY, RFC 5389 §15.4: a 20-byte HMAC-SHA1 over the message
/// up to and including this attribute's header, with the length field
/// temporarily rewritten to exclude FINGERPRINT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIntegrity(Vec<u8>);

impl MessageIntegrity {
    pub fn new(value: Vec<u8>) -> Self {
        Self(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        if value.len() != HMAC_SHA1_LEN {
            return Err(Error::Invalid(TYPE, "expected a 20-byte HMAC-SHA1".into()));
        }
        Ok(Self(value.to_vec()))
    }
}

impl Tlv for MessageIntegrity {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        self.0.len() as u16
    }

    fn value(&self) -> Vec<u8> {
        self.0.clone()
    }
}
