use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_USERNAME;

/// USERNAME, RFC 5389 §15.3. During conncheck exchanges the value is
/// `<remote-ufrag>:<local-ufrag>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn new(username: &str) -> Self {
        Self(username.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a conncheck USERNAME of the form `remote-ufrag:local-ufrag`.
    pub fn split_ufrags(&self) -> Option<(&str, &str)> {
        self.0.split_once(':')
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        let s = std::str::from_utf8(value)
            .map_err(|_| Error::Invalid(TYPE, "username is not valid utf-8".into()))?;
        Ok(Self(s.to_owned()))
    }
}

impl Tlv for Username {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_conncheck_username() {
        let u = Username::new("remoteufrag:localufrag");
        assert_eq!(u.split_ufrags(), Some(("remoteufrag", "localufrag")));
    }
}
