use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_DATA;

/// DATA, RFC 5766 §14.9: the raw application payload carried by a TURN
/// `Send`/`Data` indication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data(Vec<u8>);

impl Data {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        Ok(Self(value.to_vec()))
    }
}

impl Tlv for Data {
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
