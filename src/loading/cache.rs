//! Single-flight memoization of completed builds.

use std::sync::{Arc, Condvar, Mutex};

use hashbrown::HashMap;

use super::builder::BuildArtifact;
use super::inputs::Fingerprint;
use crate::Error;

enum SlotState {
    Building,
    Ready(Arc<BuildArtifact>),
    Failed,
}

struct BuildSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl BuildSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Building),
            ready: Condvar::new(),
        }
    }
}

/// Fingerprint-keyed cache guaranteeing at most one physical build per key.
///
/// The first caller for an uncached key becomes the owner of its slot and
/// runs the build; concurrent callers for the same key block on the slot
/// and share the owner's result. A failed build removes its slot before
/// returning, so no poisoned entry survives and retrying the key is safe.
#[derive(Default)]
pub(crate) struct BuildCache {
    slots: Mutex<HashMap<Fingerprint, Arc<BuildSlot>>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(&self, key: &Fingerprint, build: F) -> Result<Arc<BuildArtifact>, Error>
    where
        F: FnOnce() -> Result<BuildArtifact, Error>,
    {
        let mut build = Some(build);
        loop {
            let (slot, owner) = {
                let mut slots = self.slots.lock().expect("build cache lock poisoned");
                match slots.get(key) {
                    Some(slot) => (Arc::clone(slot), false),
                    None => {
                        let slot = Arc::new(BuildSlot::new());
                        slots.insert(key.clone(), Arc::clone(&slot));
                        (slot, true)
                    }
                }
            };

            if owner {
                let build = build.take().expect("cache owner claimed twice");
                return match build() {
                    Ok(artifact) => {
                        let artifact = Arc::new(artifact);
                        *slot.state.lock().expect("build slot lock poisoned") =
                            SlotState::Ready(Arc::clone(&artifact));
                        slot.ready.notify_all();
                        Ok(artifact)
                    }
                    Err(error) => {
                        self.remove_slot(key, &slot);
                        *slot.state.lock().expect("build slot lock poisoned") = SlotState::Failed;
                        slot.ready.notify_all();
                        Err(error)
                    }
                };
            }

            let mut state = slot.state.lock().expect("build slot lock poisoned");
            while matches!(*state, SlotState::Building) {
                state = slot
                    .ready
                    .wait(state)
                    .expect("build slot lock poisoned");
            }
            match &*state {
                SlotState::Ready(artifact) => return Ok(Arc::clone(artifact)),
                // The owner failed and removed the entry; contend again so
                // one waiter becomes the next owner.
                SlotState::Failed | SlotState::Building => {}
            }
        }
    }

    /// Completed artifact for `key`, if one is cached.
    pub fn lookup(&self, key: &Fingerprint) -> Option<Arc<BuildArtifact>> {
        let slot = {
            let slots = self.slots.lock().expect("build cache lock poisoned");
            Arc::clone(slots.get(key)?)
        };
        let state = slot.state.lock().expect("build slot lock poisoned");
        match &*state {
            SlotState::Ready(artifact) => Some(Arc::clone(artifact)),
            _ => None,
        }
    }

    /// Number of completed cached builds.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().expect("build cache lock poisoned");
        slots
            .values()
            .filter(|slot| {
                matches!(
                    *slot.state.lock().expect("build slot lock poisoned"),
                    SlotState::Ready(_)
                )
            })
            .count()
    }

    /// Drop completed entries; in-flight builds keep their slots.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().expect("build cache lock poisoned");
        slots.retain(|_, slot| {
            matches!(
                *slot.state.lock().expect("build slot lock poisoned"),
                SlotState::Building
            )
        });
    }

    fn remove_slot(&self, key: &Fingerprint, slot: &Arc<BuildSlot>) {
        let mut slots = self.slots.lock().expect("build cache lock poisoned");
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
    }
}
