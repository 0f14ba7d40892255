use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_PRIORITY;

/// PRIORITY, RFC 5245 §19.1: the peer-reflexive priority the sender would
/// assign its own candidate if discovery promoted it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Priority(pub u32);

impl Priority {
    pub fn priority(&self) -> u32 {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 4] = value
            .try_into()
            .map_err(|_| Error::Invalid(TYPE, "priority must be 4 bytes".into()))?;
        Ok(Self(u32::from_be_bytes(bytes)))
    }
}

impl Tlv for Priority {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        4
    }

    fn value(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }
}
