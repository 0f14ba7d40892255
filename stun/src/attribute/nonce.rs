use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_NONCE;

/// NONCE, RFC 5389 §15.8: the server-issued opaque challenge string echoed
/// back on the retried request of a long-term-credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    pub fn new(value: &str) -> Self {
        Self(value.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let s = std::str::from_utf8(value)
            .map_err(|_| Error::Invalid(TYPE, "nonce is not valid utf-8".into()))?;
        Ok(Self(s.to_owned()))
    }
}

impl Tlv for Nonce {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        self.0.len() as u16
    }

    fn value(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}
