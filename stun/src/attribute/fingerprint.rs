use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_FINGERPRINT;

/// FINGERPRINT, RFC 5389 §15.5: CRC32 of the message up to this attribute,
/// XORed with `0x5354554e` to distinguish STUN from payloads whose own
/// checksums happen to collide.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fingerprint(pub u32);

impl Fingerprint {
    pub fn crc(&self) -> u32 {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 4] = value
            .try_into()
            .map_err(|_| Error::Invalid(TYPE, "fingerprint must be 4 bytes".into()))?;
        Ok(Self(u32::from_be_bytes(bytes)))
    }
}

impl Tlv for Fingerprint {
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
