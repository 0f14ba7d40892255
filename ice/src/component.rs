//! Component record and state machine, per `spec.md` §3/§4.G/§4.H.

use crate::candidate::Candidate;
use crate::socket::DatagramTransport;

/// Declared in rank order (lowest to highest) so that `#[derive(Ord)]`
/// gives exactly the ordering §4.H's stream-state-as-min needs:
/// `Failed < Disconnected < Gathering < Connecting < Connected < Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentState {
    Failed,
    Disconnected,
    Gathering,
    Connecting,
    Connected,
    Ready,
}

pub struct Component {
    pub id: u16,
    pub state: ComponentState,
    pub local_candidates: Vec<Candidate>,
    pub remote_candidates: Vec<Candidate>,
    /// `(local foundation, remote foundation)` of the currently selected
    /// pair, once one has been nominated.
    pub selected_pair: Option<(String, String)>,
    pub sockets: Vec<Box<dyn DatagramTransport + Send>>,
}

impl Component {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            state: ComponentState::Disconnected,
            local_candidates: Vec::new(),
            remote_candidates: Vec::new(),
            selected_pair: None,
            sockets: Vec::new(),
        }
    }

    /// §6: "duplicates (by `{transport, address}`) are ignored".
    pub fn add_remote_candidate(&mut self, candidate: Candidate) -> bool {
        if self.remote_candidates.iter().any(|c| c.duplicates(&candidate)) {
            return false;
        }
        self.remote_candidates.push(candidate);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_state_orders_ready_highest_and_failed_lowest() {
        assert!(ComponentState::Ready > ComponentState::Connected);
        assert!(ComponentState::Connected > ComponentState::Connecting);
        assert!(ComponentState::Connecting > ComponentState::Gathering);
        assert!(ComponentState::Gathering > ComponentState::Disconnected);
        assert!(ComponentState::Disconnected > ComponentState::Failed);
    }
}
