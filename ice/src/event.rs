//! Signal dispatch: §9's "registered callback table keyed by event
//! kind, invoked from the event loop thread only, never re-entrantly"
//! standing in for the source's GObject signal hub.

use crate::component::ComponentState;

/// Edge-triggered events to the upper layer, per `spec.md` §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    CandidateGatheringDone { stream: u32 },
    NewCandidate { stream: u32, component: u16, foundation: String },
    NewSelectedPair { stream: u32, component: u16, local_foundation: String, remote_foundation: String },
    ComponentStateChanged { stream: u32, component: u16, state: ComponentState },
    InitialBindingRequestReceived { stream: u32 },
    StreamsRemoved { ids: Vec<u32> },
    ReliableTransportWritable { stream: u32, component: u16 },
}

/// A registered callback table. Callbacks run synchronously on whatever
/// thread calls [`Sink::emit`] (in practice, the agent's single event
/// loop thread, per §5's single-threaded scheduling model) and must not
/// call back into the agent (§9: "never re-entrantly").
#[derive(Default)]
pub struct Sink {
    callbacks: Vec<Box<dyn FnMut(&Signal) + Send>>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, callback: impl FnMut(&Signal) + Send + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn emit(&mut self, signal: Signal) {
        for callback in self.callbacks.iter_mut() {
            callback(&signal);
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
