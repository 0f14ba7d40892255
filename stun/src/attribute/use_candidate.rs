use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_USE_CANDIDATE;

/// USE-CANDIDATE, RFC 5245 §19.1: a zero-length flag attribute set by the
/// controlling agent on a check it wants to nominate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UseCandidate;

impl UseCandidate {
    pub fn parse(_value: &[u8]) -> Result<Self, Error> {
        Ok(UseCandidate)
    }
}

impl Tlv for UseCandidate {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        0
    }

    fn value(&self) -> Vec<u8> {
        vec![]
    }
}
