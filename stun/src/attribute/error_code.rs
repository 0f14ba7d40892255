use crate::attribute::Tlv;
use crate::error::Error;

const TYPE: u16 = crate::attribute::TYPE_ERROR_CODE;

/// Well-known ERROR-CODE numbers from RFC 5389/5245/5766.
/// `Other` preserves any numeric code the table doesn't name, so parsing
/// never fails on a legitimate but unlisted code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericCode {
    TryAlternate,
    BadRequest,
    Unauthenticated,
    Forbidden,
    MobilityForbidden,
    UnknownAttribute,
    AllocationMismatch,
    StaleNonce,
    AddressFamilyNotSupported,
    WrongCredentials,
    UnsupportedTransportProtocol,
    PeerAddressFamilyMismatch,
    ConnectionAlreadyExists,
    ConnectionTimeoutOrFailure,
    AllocationQuotaReached,
    RoleConflict,
    ServerError,
    InsufficientCapacity,
    Other(u16),
}

impl NumericCode {
    pub fn code(self) -> u16 {
        match self {
            NumericCode::TryAlternate => 300,
            NumericCode::BadRequest => 400,
            NumericCode::Unauthenticated => 401,
            NumericCode::Forbidden => 403,
            NumericCode::MobilityForbidden => 405,
            NumericCode::UnknownAttribute => 420,
            NumericCode::AllocationMismatch => 437,
            NumericCode::StaleNonce => 438,
            NumericCode::AddressFamilyNotSupported => 440,
            NumericCode::WrongCredentials => 441,
            NumericCode::UnsupportedTransportProtocol => 442,
            NumericCode::PeerAddressFamilyMismatch => 443,
            NumericCode::ConnectionAlreadyExists => 446,
            NumericCode::ConnectionTimeoutOrFailure => 447,
            NumericCode::AllocationQuotaReached => 486,
            NumericCode::RoleConflict => 487,
            NumericCode::ServerError => 500,
            NumericCode::InsufficientCapacity => 508,
            NumericCode::Other(n) => n,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            300 => NumericCode::TryAlternate,
            400 => NumericCode::BadRequest,
            401 => NumericCode::Unauthenticated,
            403 => NumericCode::Forbidden,
            405 => NumericCode::MobilityForbidden,
            420 => NumericCode::UnknownAttribute,
            437 => NumericCode::AllocationMismatch,
            438 => NumericCode::StaleNonce,
            440 => NumericCode::AddressFamilyNotSupported,
            441 => NumericCode::WrongCredentials,
            442 => NumericCode::UnsupportedTransportProtocol,
            443 => NumericCode::PeerAddressFamilyMismatch,
            446 => NumericCode::ConnectionAlreadyExists,
            447 => NumericCode::ConnectionTimeoutOrFailure,
            486 => NumericCode::AllocationQuotaReached,
            487 => NumericCode::RoleConflict,
            500 => NumericCode::ServerError,
            508 => NumericCode::InsufficientCapacity,
            other => NumericCode::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    numeric_code: NumericCode,
    reason_phrase: String,
}

impl ErrorCode {
    pub fn new(numeric_code: NumericCode, reason_phrase: &str) -> Self {
        Self {
            numeric_code,
            reason_phrase: reason_phrase.to_owned(),
        }
    }

    pub fn numeric_code(&self) -> NumericCode {
        self.numeric_code
    }

    pub fn code(&self) -> u16 {
        self.numeric_code.code()
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    pub fn parse(value: &[u8]) -> Result<Self, Error> {
        if value.len() < 4 {
            return Err(Error::Invalid(TYPE, "error-code value too short".into()));
        }
        let class_and_number = u32::from_be_bytes([0, 0, value[2], value[3]]);
        let class = (class_and_number >> 8) & 0b111;
        let number = class_and_number & 0xff;
        if !(3..=6).contains(&class) || number > 99 {
            return Err(Error::InvalidErrorCode((class * 100 + number) as u16));
        }
        let code = (class * 100 + number) as u16;
        let reason_phrase = String::from_utf8(value[4..].to_vec())
            .map_err(|_| Error::Invalid(TYPE, "reason phrase is not valid utf-8".into()))?;
        let reason_phrase = reason_phrase.trim_end_matches('\0').to_owned();

        Ok(Self {
            numeric_code: NumericCode::from_code(code),
            reason_phrase,
        })
    }
}

impl Tlv for ErrorCode {
    fn typ(&self) -> u16 {
        TYPE
    }

    fn length(&self) -> u16 {
        (4 + self.reason_phrase.len()) as u16
    }

    fn value(&self) -> Vec<u8> {
        let code = self.numeric_code.code() as u32;
        let class = code / 100;
        let number = code % 100;
        let class_and_number = class << 8 | number;

        let mut value_field = class_and_number.to_be_bytes().to_vec();
        value_field.extend_from_slice(self.reason_phrase.as_bytes());
        value_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Tlv as _;

    #[test]
    fn round_trips_reason_phrase() {
        let err = ErrorCode::new(NumericCode::RoleConflict, "Role Conflict");
        let value = err.value();
        let parsed = ErrorCode::parse(&value).unwrap();
        assert_eq!(parsed.code(), 487);
        assert_eq!(parsed.reason_phrase(), "Role Conflict");
    }

    #[test]
    fn round_trip_bytes() {
        #[rustfmt::skip]
        let input = [
            0x_00, 0x_00, 0x_03, 0x_00,
            0x_6D, 0x_63, 0x_68, 0x_6C,
            0x_72, 0x_68, 0x_77,
        ];

        let attr = ErrorCode::parse(&input).unwrap();
        assert_eq!(attr.code(), 300);
        assert_eq!(attr.reason_phrase(), "mchlrhw");
    }
}
