//! In-memory scroll view
//!
//! `SimScrollView` behaves like a native scroll container as far as the
//! engine can tell: offsets are clamped to the scrollable extent, programmatic
//! scrolls notify listeners synchronously from inside the call, and content
//! readiness can be toggled to model tabs that realize late. Headless drivers
//! and tests use it in place of a real UI toolkit.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::view::{ListenerId, OffsetChanged, OffsetListener, ScrollView, ViewId};

/// A programmatic scroll command received by a [`SimScrollView`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCommand {
    pub offset: f64,
    pub animate: bool,
}

/// Simulated scrollable view
pub struct SimScrollView {
    id: ViewId,
    offset: Cell<f64>,
    max_offset: Cell<f64>,
    ready: Cell<bool>,
    deferred: Cell<bool>,
    listeners: RefCell<SlotMap<ListenerId, OffsetListener>>,
    commands: RefCell<Vec<ScrollCommand>>,
    queued: RefCell<Vec<OffsetChanged>>,
}

impl SimScrollView {
    /// Create a view scrollable over `[0, max_offset]`
    pub fn new(id: u64, max_offset: f64, ready: bool) -> Rc<Self> {
        Rc::new(Self {
            id: ViewId(id),
            offset: Cell::new(0.0),
            max_offset: Cell::new(max_offset.max(0.0)),
            ready: Cell::new(ready),
            deferred: Cell::new(false),
            listeners: RefCell::new(SlotMap::with_key()),
            commands: RefCell::new(Vec::new()),
            queued: RefCell::new(Vec::new()),
        })
    }

    /// A view whose content is already realized
    pub fn ready(id: u64, max_offset: f64) -> Rc<Self> {
        Self::new(id, max_offset, true)
    }

    /// A view whose content has not been realized yet
    pub fn unrealized(id: u64, max_offset: f64) -> Rc<Self> {
        Self::new(id, max_offset, false)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    pub fn max_offset(&self) -> f64 {
        self.max_offset.get()
    }

    /// Change the scrollable extent; the offset is re-clamped silently
    pub fn set_max_offset(&self, max_offset: f64) {
        let max_offset = max_offset.max(0.0);
        self.max_offset.set(max_offset);
        self.offset.set(self.offset.get().min(max_offset));
    }

    /// Queue notifications instead of dispatching them from inside the
    /// scroll call, as hosts with a deferred view-changed event do
    pub fn set_deferred_notifications(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    /// Dispatch notifications queued while deferred
    pub fn flush_notifications(&self) {
        let queued: Vec<OffsetChanged> = self.queued.borrow_mut().drain(..).collect();
        for change in queued {
            self.dispatch(&change);
        }
    }

    /// Simulate a user drag/wheel frame ending at `offset`
    pub fn user_scroll_to(&self, offset: f64) {
        self.move_to(offset, true);
    }

    /// Simulate a non-interactive frame (inertia, snap) ending at `offset`
    pub fn settle_to(&self, offset: f64) {
        self.move_to(offset, false);
    }

    /// Programmatic scroll commands received so far
    pub fn commands(&self) -> Vec<ScrollCommand> {
        self.commands.borrow().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn move_to(&self, offset: f64, is_interactive: bool) {
        let clamped = offset.clamp(0.0, self.max_offset.get());
        if clamped == self.offset.get() {
            return;
        }
        self.offset.set(clamped);
        self.notify(OffsetChanged::new(clamped, is_interactive));
    }

    fn notify(&self, change: OffsetChanged) {
        if self.deferred.get() {
            self.queued.borrow_mut().push(change);
        } else {
            self.dispatch(&change);
        }
    }

    fn dispatch(&self, change: &OffsetChanged) {
        // Listeners may unsubscribe (or scroll this view again) while running
        let listeners: Vec<OffsetListener> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl ScrollView for SimScrollView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn vertical_offset(&self) -> f64 {
        self.offset.get()
    }

    fn scroll_to_vertical_offset(&self, offset: f64, animate: bool) {
        self.commands
            .borrow_mut()
            .push(ScrollCommand { offset, animate });
        self.move_to(offset, false);
    }

    fn is_content_ready(&self) -> bool {
        self.ready.get()
    }

    fn subscribe(&self, listener: OffsetListener) -> ListenerId {
        self.listeners.borrow_mut().insert(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(id);
    }
}
