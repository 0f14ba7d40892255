//! Interactive Connectivity Establishment (RFC 5245/8445).
//!
//! Candidate gathering, connectivity checks and the consumer-facing
//! [`Agent`] façade, grounded in `original_source/agent/*` and
//! `spec.md` §3/§4/§6. Wire encoding (STUN) and relay punching (TURN)
//! live in the `stun`/`turn` crates this one composes.

pub mod agent;
pub mod candidate;
pub mod checklist;
pub mod component;
pub mod conncheck;
pub mod error;
pub mod event;
pub mod pair;
pub mod registry;
pub mod socket;
pub mod stream;

pub use agent::{Agent, AgentConfig, ProxyConfig, ProxyType};
pub use candidate::{Candidate, Kind, Transport};
pub use component::ComponentState;
pub use conncheck::NominationMode;
pub use error::Error;
pub use event::Signal;
pub use socket::{DatagramTransport, UdpTransport};
