//! Stream record: components, credentials, tie-breaker and check list,
//! per `spec.md` §3/§4.H.

use std::collections::HashMap;

use rand::Rng;

use crate::checklist::CheckList;
use crate::component::Component;

fn rand_ice_string(len: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            // ALPHABET is non-empty and fixed-size; indexing never panics.
            ALPHABET[rng.gen_range(0..ALPHABET.len())] as char
        })
        .collect()
}

pub struct Stream {
    pub id: u32,
    pub components: HashMap<u16, Component>,
    pub local_ufrag: String,
    pub local_pwd: String,
    pub remote_ufrag: Option<String>,
    pub remote_pwd: Option<String>,
    pub tie_breaker: u64,
    pub checklist: CheckList,
    pub gathering_done: bool,
}

impl Stream {
    pub fn new(id: u32, n_components: u16) -> Self {
        let mut components = HashMap::new();
        for component_id in 1..=n_components {
            components.insert(component_id, Component::new(component_id));
        }
        Self {
            id,
            components,
            local_ufrag: rand_ice_string(8),
            local_pwd: rand_ice_string(24),
            remote_ufrag: None,
            remote_pwd: None,
            tie_breaker: rand::thread_rng().gen(),
            checklist: CheckList::default(),
            gathering_done: false,
        }
    }

    pub fn component(&self, id: u16) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: u16) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    /// Rebuilds the check list from the current local/remote candidate
    /// sets across every component (§4.F). Pairs that already existed
    /// (matched by local/remote address) carry their check state over
    /// unchanged, so a rebuild triggered by late-arriving remote
    /// candidates or a freshly learned peer-reflexive candidate doesn't
    /// discard in-progress or succeeded checks; only genuinely new pairs
    /// go through the initial freeze/waiting split (§4.G).
    pub fn rebuild_checklist(&mut self, controlling: bool) {
        let locals: Vec<_> = self
            .components
            .values()
            .flat_map(|c| c.local_candidates.iter().cloned())
            .collect();
        let remotes: Vec<_> = self
            .components
            .values()
            .flat_map(|c| c.remote_candidates.iter().cloned())
            .collect();
        let mut new_list = CheckList::build(&locals, &remotes, controlling);
        for new_pair in new_list.pairs.iter_mut() {
            if let Some(old) = self
                .checklist
                .pairs
                .iter()
                .find(|p| p.local.address.equal(&new_pair.local.address) && p.remote.address.equal(&new_pair.remote.address))
            {
                new_pair.state = old.state;
                new_pair.nominated = old.nominated;
                new_pair.valid = old.valid;
                new_pair.transaction = old.transaction;
                new_pair.timer = old.timer;
                new_pair.peer_nominated = old.peer_nominated;
            }
        }
        new_list.initialize_frozen_set();
        self.checklist = new_list;
    }

    /// ICE restart (§4.G): fresh credentials, remote candidates and
    /// check list cleared; the stream waits for new remote candidates
    /// to arrive before checks can resume.
    pub fn restart(&mut self) {
        self.local_ufrag = rand_ice_string(8);
        self.local_pwd = rand_ice_string(24);
        self.remote_ufrag = None;
        self.remote_pwd = None;
        for component in self.components.values_mut() {
            component.remote_candidates.clear();
            component.selected_pair = None;
        }
        self.checklist = CheckList::default();
    }
}
