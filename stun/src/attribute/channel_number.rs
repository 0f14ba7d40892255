use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_CHANNEL_NUMBER;

/// CHANNEL-NUMBER, RFC 5766 §14.1: the 16-bit channel number plus a
/// reserved 16-bit field, used by `ChannelBind` requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelNumber(pub u16);

impl ChannelNumber {
    pub fn number(&self) -> u16 {
        self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        if value.len() < 2 {
            return Err(Error::Invalid(TYPE, "channel-number value too short".into()));
        }
        Ok(Self(u16::from_be_bytes([value[0], value[1]])))
    }
}

impl Tlv for ChannelNumber {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        4
    }

    fn value(&self) -> Vec<u8> {
        let mut out = self.0.to_be_bytes().to_vec();
        out.extend_from_slice(&[0, 0]);
        out
    }
}
