//! Stream registry: monotonic id allocation and lookup, per `spec.md`
//! §4.H.

use std::collections::HashMap;

use crate::stream::Stream;

#[derive(Default)]
pub struct StreamRegistry {
    streams: HashMap<u32, Stream>,
    next_id: u32,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            streams: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn add_stream(&mut self, n_components: u16) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.streams.insert(id, Stream::new(id, n_components));
        id
    }

    /// Closes every socket owned by the stream's components and removes
    /// it. The caller is responsible for emitting `streams-removed`
    /// exactly once (§4.H) — a single call can remove several streams
    /// at once, which is one signal, not one per stream.
    pub fn remove_stream(&mut self, id: u32) -> bool {
        match self.streams.remove(&id) {
            Some(mut stream) => {
                for component in stream.components.values_mut() {
                    for socket in component.sockets.iter_mut() {
                        socket.close();
                    }
                }
                true
            }
            None => false,
        }
    }

    pub fn stream(&self, id: u32) -> Option<&Stream> {
        self.streams.get(&id)
    }

    pub fn stream_mut(&mut self, id: u32) -> Option<&mut Stream> {
        self.streams.get_mut(&id)
    }

    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.streams.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Stream> {
        self.streams.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_ids_are_monotonic_starting_at_one() {
        let mut registry = StreamRegistry::new();
        let a = registry.add_stream(2);
        let b = registry.add_stream(1);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn remove_stream_is_idempotent_on_unknown_id() {
        let mut registry = StreamRegistry::new();
        assert!(!registry.remove_stream(42));
    }
}
