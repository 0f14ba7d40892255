//! Family-agnostic IP+port address, shared by the STUN codec, the TURN
//! client and the ICE conncheck engine.
//!
//! Mirrors libnice's `agent/address.c`: a tagged union of the address
//! family plus a host-order port, with no hidden allocations and total
//! conversions to/from `std::net::SocketAddr`.

use std::convert::TryFrom;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid address string: {0}")]
    InvalidAddress(String),
}

/// IP version of an [`Address`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

/// A host-order port plus a family-tagged IP address.
///
/// Equality (`PartialEq`) compares family, octets, scope id and port.
/// Use [`Address::equal_no_port`] to compare the IP alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    V4 { octets: [u8; 4], port: u16 },
    V6 {
        octets: [u8; 16],
        scope_id: u32,
        port: u16,
    },
}

impl Address {
    pub fn from_ip(ip: IpAddr, port: u16) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4 {
                octets: v4.octets(),
                port,
            },
            IpAddr::V6(v6) => Address::V6 {
                octets: v6.octets(),
                scope_id: 0,
                port,
            },
        }
    }

    /// Builds an `Address` from a platform socket address.
    ///
    /// `spec.md` names this `set_from_sockaddr`; since Rust addresses are
    /// immutable values rather than out-parameters, this is a constructor.
    pub fn set_from_sockaddr(sa: SocketAddr) -> Self {
        match sa {
            SocketAddr::V4(v4) => Address::V4 {
                octets: v4.ip().octets(),
                port: v4.port(),
            },
            SocketAddr::V6(v6) => Address::V6 {
                octets: v6.ip().octets(),
                scope_id: v6.scope_id(),
                port: v6.port(),
            },
        }
    }

    /// Writes this address out as a platform socket address.
    pub fn copy_to_sockaddr(&self) -> SocketAddr {
        match *self {
            Address::V4 { octets, port } => {
                SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(octets), port))
            }
            Address::V6 {
                octets,
                scope_id,
                port,
            } => SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::from(octets), port, 0, scope_id)),
        }
    }

    /// Parses a numeric `ip:port` (or bracketed `[ip]:port` for IPv6)
    /// string. No DNS resolution is performed.
    pub fn set_from_string(s: &str) -> Result<Self, Error> {
        SocketAddr::from_str(s)
            .map(Address::set_from_sockaddr)
            .map_err(|_| Error::InvalidAddress(s.to_owned()))
    }

    pub fn ip(&self) -> IpAddr {
        match *self {
            Address::V4 { octets, .. } => IpAddr::V4(Ipv4Addr::from(octets)),
            Address::V6 { octets, .. } => IpAddr::V6(Ipv6Addr::from(octets)),
        }
    }

    pub fn port(&self) -> u16 {
        match *self {
            Address::V4 { port, .. } | Address::V6 { port, .. } => port,
        }
    }

    pub fn with_port(&self, port: u16) -> Self {
        match *self {
            Address::V4 { octets, .. } => Address::V4 { octets, port },
            Address::V6 { octets, scope_id, .. } => Address::V6 {
                octets,
                scope_id,
                port,
            },
        }
    }

    pub fn ip_version(&self) -> IpVersion {
        match self {
            Address::V4 { .. } => IpVersion::V4,
            Address::V6 { .. } => IpVersion::V6,
        }
    }

    /// Full equality, including port. Equivalent to `==`; kept as a named
    /// method to match `spec.md`'s `equal` operation.
    pub fn equal(&self, other: &Address) -> bool {
        self == other
    }

    /// Equality ignoring port.
    pub fn equal_no_port(&self, other: &Address) -> bool {
        match (self, other) {
            (Address::V4 { octets: a, .. }, Address::V4 { octets: b, .. }) => a == b,
            (
                Address::V6 {
                    octets: a,
                    scope_id: sa,
                    ..
                },
                Address::V6 {
                    octets: b,
                    scope_id: sb,
                    ..
                },
            ) => a == b && sa == sb,
            _ => false,
        }
    }

    /// True for loopback, RFC 1918, link-local and ULA ranges, matching
    /// `nice_address_is_private`.
    pub fn is_private(&self) -> bool {
        match *self {
            Address::V4 {
                octets: [a, b, ..], ..
            } => {
                let v4 = Ipv4Addr::from([a, b, 0, 0]);
                v4.is_loopback()
                    || v4.is_link_local()
                    || a == 10
                    || (a == 172 && (16..=31).contains(&b))
                    || (a == 192 && b == 168)
            }
            Address::V6 { octets, .. } => {
                let v6 = Ipv6Addr::from(octets);
                v6.is_loopback() || is_link_local_v6(&octets) || is_unique_local_v6(&octets)
            }
        }
    }
}

fn is_link_local_v6(octets: &[u8; 16]) -> bool {
    octets[0] == 0xfe && (octets[1] & 0xc0) == 0x80
}

fn is_unique_local_v6(octets: &[u8; 16]) -> bool {
    (octets[0] & 0xfe) == 0xfc
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip_version() {
            IpVersion::V4 => write!(f, "{}:{}", self.ip(), self.port()),
            IpVersion::V6 => write!(f, "[{}]:{}", self.ip(), self.port()),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::set_from_string(s)
    }
}

impl From<SocketAddr> for Address {
    fn from(sa: SocketAddr) -> Self {
        Address::set_from_sockaddr(sa)
    }
}

impl TryFrom<Address> for SocketAddr {
    type Error = std::convert::Infallible;

    fn try_from(addr: Address) -> Result<Self, Self::Error> {
        Ok(addr.copy_to_sockaddr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_v4_through_sockaddr() {
        let sa: SocketAddr = "192.168.1.10:4242".parse().unwrap();
        let addr = Address::set_from_sockaddr(sa);
        assert_eq!(addr.copy_to_sockaddr(), sa);
        assert_eq!(addr.port(), 4242);
        assert_eq!(addr.ip_version(), IpVersion::V4);
    }

    #[test]
    fn round_trips_v6_through_sockaddr() {
        let sa: SocketAddr = "[fe80::1]:5000".parse().unwrap();
        let addr = Address::set_from_sockaddr(sa);
        assert_eq!(addr.copy_to_sockaddr(), sa);
        assert_eq!(addr.ip_version(), IpVersion::V6);
    }

    #[test]
    fn parses_numeric_strings_only() {
        assert!(Address::set_from_string("127.0.0.1:1").is_ok());
        assert!(Address::set_from_string("localhost:1").is_err());
        assert!(Address::set_from_string("not an address").is_err());
    }

    #[test]
    fn equal_no_port_ignores_port() {
        let a = Address::set_from_string("10.0.0.1:1").unwrap();
        let b = Address::set_from_string("10.0.0.1:2").unwrap();
        assert!(a.equal_no_port(&b));
        assert!(!a.equal(&b));
    }

    #[test]
    fn classifies_private_ranges() {
        for s in &[
            "10.1.2.3:1",
            "172.16.0.1:1",
            "172.31.255.255:1",
            "192.168.0.1:1",
            "127.0.0.1:1",
            "169.254.1.1:1",
        ] {
            let addr = Address::set_from_string(s).unwrap();
            assert!(addr.is_private(), "{} should be private", s);
        }

        for s in &["8.8.8.8:1", "1.1.1.1:1", "172.32.0.1:1", "172.15.0.1:1"] {
            let addr = Address::set_from_string(s).unwrap();
            assert!(!addr.is_private(), "{} should not be private", s);
        }
    }

    #[test]
    fn classifies_private_v6() {
        let loopback = Address::set_from_string("[::1]:1").unwrap();
        assert!(loopback.is_private());

        let link_local = Address::set_from_string("[fe80::1]:1").unwrap();
        assert!(link_local.is_private());

        let ula = Address::set_from_string("[fd00::1]:1").unwrap();
        assert!(ula.is_private());

        let global = Address::set_from_string("[2001:4860:4860::8888]:1").unwrap();
        assert!(!global.is_private());
    }

    #[test]
    fn display_matches_expected_format() {
        let v4 = Address::set_from_string("1.2.3.4:80").unwrap();
        assert_eq!(v4.to_string(), "1.2.3.4:80");

        let v6 = Address::set_from_string("[::1]:80").unwrap();
        assert_eq!(v6.to_string(), "[::1]:80");
    }
}
