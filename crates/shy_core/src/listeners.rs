//! Push notification for committed progress changes

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle for a registered progress listener
    pub struct ProgressListenerId;
}

/// Callback receiving the new progress value
pub type ProgressListener = Rc<dyn Fn(f64)>;

/// Listener list dispatched over a snapshot, so callbacks may subscribe,
/// unsubscribe, or re-enter the coordinator.
#[derive(Default)]
pub struct ProgressListeners {
    listeners: RefCell<SlotMap<ProgressListenerId, ProgressListener>>,
}

impl ProgressListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: ProgressListener) -> ProgressListenerId {
        self.listeners.borrow_mut().insert(listener)
    }

    pub fn remove(&self, id: ProgressListenerId) -> bool {
        self.listeners.borrow_mut().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    pub fn dispatch(&self, progress: f64) {
        let snapshot: SmallVec<[ProgressListener; 4]> =
            self.listeners.borrow().values().cloned().collect();
        for listener in snapshot {
            listener(progress);
        }
    }
}
