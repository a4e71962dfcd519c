//! Passive view registry
//!
//! Realized but hidden tab views, kept scrolled to the current progress so
//! they already look collapsed (or expanded) when revealed.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::adapter::force_scroll_to;
use crate::view::{ViewHandle, ViewId};

/// Views in registration order
type Members = IndexMap<ViewId, ViewHandle, FxBuildHasher>;

/// Snapshot of members taken before calling into views
type Snapshot = SmallVec<[ViewHandle; 4]>;

/// Set of passive views. Mutated only by the coordinator.
#[derive(Default)]
pub struct PassiveViewRegistry {
    members: RefCell<Members>,
    epsilon: f64,
}

impl PassiveViewRegistry {
    pub fn new(epsilon: f64) -> Self {
        Self {
            members: RefCell::new(Members::default()),
            epsilon,
        }
    }

    /// Add `view` and immediately scroll it to `progress`.
    ///
    /// Re-registering a member replaces its handle and re-syncs it.
    pub fn register(&self, view: ViewHandle, progress: f64, threshold: f64) {
        let id = view.id();
        self.members.borrow_mut().insert(id, Rc::clone(&view));
        tracing::debug!("{} registered as passive", id);
        force_scroll_to(view.as_ref(), progress, threshold, self.epsilon);
    }

    /// Remove `id`; removing a non-member is a no-op. Returns the handle if it was a member.
    pub fn unregister(&self, id: ViewId) -> Option<ViewHandle> {
        let removed = self.members.borrow_mut().shift_remove(&id);
        if removed.is_some() {
            tracing::debug!("{} left the passive set", id);
        }
        removed
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.members.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Member ids in registration order
    pub fn ids(&self) -> Vec<ViewId> {
        self.members.borrow().keys().copied().collect()
    }

    /// Scroll every member to `progress`.
    ///
    /// Iterates a snapshot: a view's scroll callback may re-enter the
    /// coordinator and change membership while this runs.
    pub fn on_progress_changed(&self, progress: f64, threshold: f64) {
        let snapshot: Snapshot = self.members.borrow().values().cloned().collect();
        for view in snapshot {
            force_scroll_to(view.as_ref(), progress, threshold, self.epsilon);
        }
    }
}
