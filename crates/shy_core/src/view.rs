//! Scrollable view boundary
//!
//! The engine never owns a scroll view. Hosts wrap their native scroll
//! container in a [`ScrollView`] implementation and hand the engine an
//! `Rc<dyn ScrollView>`.

use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;

new_key_type! {
    /// Handle returned by [`ScrollView::subscribe`]
    pub struct ListenerId;
}

/// Stable identity of a scrollable view (typically the tab content root)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Offset-changed notification payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetChanged {
    /// Current vertical offset
    pub offset: f64,
    /// True while a user gesture is in progress, false for settle/inertia
    /// frames and programmatic scrolls
    pub is_interactive: bool,
}

impl OffsetChanged {
    pub fn new(offset: f64, is_interactive: bool) -> Self {
        Self {
            offset,
            is_interactive,
        }
    }
}

/// Offset-changed listener
pub type OffsetListener = Rc<dyn Fn(&OffsetChanged)>;

/// A scrollable view as seen by the engine.
///
/// All methods are called on the UI thread. `scroll_to_vertical_offset` may
/// synchronously notify subscribed listeners before it returns; the engine
/// is written to tolerate that.
pub trait ScrollView {
    /// Identity used for registry membership and binding
    fn id(&self) -> ViewId;

    /// Current vertical offset
    fn vertical_offset(&self) -> f64;

    /// Programmatic scroll command
    fn scroll_to_vertical_offset(&self, offset: f64, animate: bool);

    /// Whether the view's scrollable content has been realized
    fn is_content_ready(&self) -> bool;

    /// Register an offset-changed listener
    fn subscribe(&self, listener: OffsetListener) -> ListenerId;

    /// Remove a listener registered with [`ScrollView::subscribe`].
    ///
    /// Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId);
}

/// Shared view handle
pub type ViewHandle = Rc<dyn ScrollView>;
