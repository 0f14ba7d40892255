use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_SOFTWARE;

/// SOFTWARE, RFC 5389 §15.10: a free-form description of the software
/// that produced a request or response, used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Software(String);

impl Software {
    pub fn new(value: &str) -> Self {
        Self(value.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let s = std::str::from_utf8(value)
            .map_err(|_| Error::Invalid(TYPE, "software is not valid utf-8".into()))?;
        Ok(Self(s.to_owned()))
    }
}

impl Tlv for Software {
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
