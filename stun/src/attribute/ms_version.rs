use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_MS_VERSION;

/// MS-VERSION, the OC2007 dialect's version marker attribute: a 4-byte
/// value (`1` for OC2007, `2` for OC2007 R2) announcing which Microsoft
/// STUN/TURN variant the peer speaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MsVersion(pub u32);

impl MsVersion {
    pub fn version(&self) -> u32 {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 4] = value
            .try_into()
            .map_err(|_| Error::Invalid(TYPE, "ms-version must be 4 bytes".into()))?;
        Ok(Self(u32::from_be_bytes(bytes)))
    }
}

impl Tlv for MsVersion {
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
