use std::{
    collections::{HashSet, VecDeque},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::config::env::DedupConfig;

struct DedupState {
    order: VecDeque<(Instant, String)>,
    seen: HashSet<String>,
}

/// Bounded record of recently seen event ids. The platform redelivers the
/// same `event_id` on timeout; check-and-insert must be atomic so two
/// concurrent deliveries cannot both pass.
pub struct DedupStore {
    window: Duration,
    max_entries: usize,
    state: Mutex<DedupState>,
}

impl DedupStore {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            window: config.window,
            max_entries: config.max_entries.max(1),
            state: Mutex::new(DedupState {
                order: VecDeque::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Records `event_id` as in-flight. Returns `false` when the id was
    /// already recorded within the retention window.
    pub fn check_and_insert(&self, event_id: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();

        loop {
            let expired = matches!(
                state.order.front(),
                Some((seen_at, _)) if now.duration_since(*seen_at) > self.window
            );
            if !expired {
                break;
            }
            if let Some((_, id)) = state.order.pop_front() {
                state.seen.remove(&id);
            }
        }

        if state.seen.contains(event_id) {
            return false;
        }

        while state.order.len() >= self.max_entries {
            match state.order.pop_front() {
                Some((_, oldest)) => {
                    state.seen.remove(&oldest);
                }
                None => break,
            }
        }

        state.seen.insert(event_id.to_string());
        state.order.push_back((now, event_id.to_string()));
        true
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.state.lock().seen.len()
    }
}
