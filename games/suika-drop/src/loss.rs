use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use drop_engine::EntityId;

/// Counts how many consecutive steps each ball has spent on the death line.
#[derive(Debug)]
pub struct LossDetector {
    counters: BTreeMap<EntityId, u32>,
    threshold: u32,
}

impl LossDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            counters: BTreeMap::new(),
            threshold,
        }
    }

    /// Feed the balls touching the line this step. Returns the first ball whose
    /// count reached the threshold.
    pub fn observe(&mut self, touching: &[EntityId]) -> Option<EntityId> {
        // Contact ended: the count starts over next time
        self.counters.retain(|id, _| touching.contains(id));

        let mut tripped = None;
        for &id in touching {
            let count = match self.counters.entry(id) {
                Entry::Vacant(slot) => *slot.insert(0),
                Entry::Occupied(mut slot) => {
                    *slot.get_mut() += 1;
                    *slot.get()
                }
            };
            if count >= self.threshold && tripped.is_none() {
                tripped = Some(id);
            }
        }
        tripped
    }

    pub fn count(&self, id: EntityId) -> Option<u32> {
        self.counters.get(&id).copied()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }
}
