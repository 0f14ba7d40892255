use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_ICE_CONTROLLING;

/// ICE-CONTROLLING, RFC 5245 §19.1: the sender's 64-bit tie-breaker,
/// carried on a check when it believes it is the controlling agent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IceControlling(pub u64);

impl IceControlling {
    pub fn tie_breaker(&self) -> u64 {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 8] = value
            .try_into()
            .map_err(|_| Error::Invalid(TYPE, "ice-controlling must be 8 bytes".into()))?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }
}

impl Tlv for IceControlling {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        8
    }

    fn value(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }
}
