use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_MS_SEQUENCE_NUMBER;

/// MS-SEQUENCE-NUMBER, the OC2007 dialect's reliability attribute: a
/// 20-byte connection id followed by a 4-byte sequence number, used to
/// acknowledge and order `Data` indications on connections that predate
/// RFC 5766 ChannelBind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsSequenceNumber {
    connection_id: [u8; 20],
    sequence_number: u32,
}

impl MsSequenceNumber {
    pub fn new(connection_id: [u8; 20], sequence_number: u32) -> Self {
        Self {
            connection_id,
            sequence_number,
        }
    }

    pub fn connection_id(&self) -> [u8; 20] {
        self.connection_id
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        if value.len() != 24 {
            return Err(Error::Invalid(
                TYPE,
                "ms-sequence-number must be 24 bytes".into(),
            ));
        }
        let mut connection_id = [0u8; 20];
        connection_id.copy_from_slice(&value[..20]);
        let sequence_number = u32::from_be_bytes(value[20..24].try_into().unwrap());
        Ok(Self {
            connection_id,
            sequence_number,
        })
    }
}

impl Tlv for MsSequenceNumber {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        24
    }

    fn value(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24);
        out.extend_from_slice(&self.connection_id);
        out.extend_from_slice(&self.sequence_number.to_be_bytes());
        out
    }
}
