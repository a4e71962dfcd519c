//! Scroll signal adapter
//!
//! Bridges one view's offset-changed notifications to the coordinator, and
//! issues programmatic scrolls back to the view without hearing its own echo.
//!
//! Two guards break the feedback loop:
//!
//! - a suppression depth raised around `scroll_to_vertical_offset`, which
//!   swallows the notification a view fires synchronously from inside the call
//! - an expected-echo slot for hosts that report programmatic scrolls on a
//!   later turn; the first matching notification is swallowed, anything else
//!   clears the slot and is processed normally

use std::cell::Cell;
use std::rc::Rc;

use crate::view::{ListenerId, OffsetChanged, OffsetListener, ScrollView, ViewHandle, ViewId};

/// Offset notification forwarded to the coordinator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSignal {
    pub view: ViewId,
    pub offset: f64,
    pub is_interactive: bool,
    /// False when the adapter is still settling and the signal is a user
    /// gesture asking to take over as the live source
    pub authoritative: bool,
}

/// Receiver for forwarded signals
pub type SignalSink = Rc<dyn Fn(ScrollSignal)>;

/// Issue a programmatic scroll so `view` shows `progress`.
///
/// Returns false (and issues nothing) when the view already shows the same
/// progress: its offset, clamped to `[0, threshold]`, is within `epsilon` of
/// the target. A view scrolled past the threshold stays put at progress 1.
pub fn force_scroll_to(view: &dyn ScrollView, progress: f64, threshold: f64, epsilon: f64) -> bool {
    let target = progress * threshold;
    let current = view.vertical_offset();
    if (current.clamp(0.0, threshold.max(0.0)) - target).abs() < epsilon {
        tracing::trace!(
            "{} already at {:.2} (target {:.2}), skipping scroll",
            view.id(),
            current,
            target
        );
        return false;
    }
    tracing::trace!("{} force-scroll {:.2} -> {:.2}", view.id(), current, target);
    view.scroll_to_vertical_offset(target, false);
    true
}

#[derive(Debug, Default)]
struct AdapterFlags {
    authoritative: Cell<bool>,
    suppress_depth: Cell<u32>,
    echo_seen: Cell<bool>,
    expected_echo: Cell<Option<f64>>,
}

/// Binds one scroll view to the coordinator
pub struct ScrollSignalAdapter {
    view: ViewHandle,
    flags: Rc<AdapterFlags>,
    listener: Cell<Option<ListenerId>>,
    epsilon: f64,
}

impl ScrollSignalAdapter {
    pub fn new(view: ViewHandle, epsilon: f64) -> Self {
        Self {
            view,
            flags: Rc::new(AdapterFlags::default()),
            listener: Cell::new(None),
            epsilon,
        }
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    pub fn view_id(&self) -> ViewId {
        self.view.id()
    }

    pub fn is_attached(&self) -> bool {
        self.listener.get().is_some()
    }

    /// Whether offsets from this view currently drive progress
    pub fn is_authoritative(&self) -> bool {
        self.flags.authoritative.get()
    }

    pub fn set_authoritative(&self, authoritative: bool) {
        self.flags.authoritative.set(authoritative);
    }

    /// Register the offset-changed listener. Attaching twice is a no-op.
    pub fn attach(&self, sink: SignalSink) {
        if self.is_attached() {
            return;
        }

        let flags = Rc::clone(&self.flags);
        let view_id = self.view.id();
        let epsilon = self.epsilon;
        let listener: OffsetListener = Rc::new(move |change: &OffsetChanged| {
            if flags.suppress_depth.get() > 0 {
                flags.echo_seen.set(true);
                tracing::trace!("{} echo at {:.2} suppressed", view_id, change.offset);
                return;
            }
            if let Some(expected) = flags.expected_echo.take() {
                if (change.offset - expected).abs() < epsilon {
                    tracing::trace!("{} deferred echo at {:.2} dropped", view_id, change.offset);
                    return;
                }
            }

            let authoritative = flags.authoritative.get();
            if !authoritative && !change.is_interactive {
                // Settle animation of a freshly bound view
                return;
            }

            sink(ScrollSignal {
                view: view_id,
                offset: change.offset,
                is_interactive: change.is_interactive,
                authoritative,
            });
        });

        let id = self.view.subscribe(listener);
        self.listener.set(Some(id));
        tracing::debug!("{} adapter attached", view_id);
    }

    /// Remove the listener. Safe to call repeatedly or without a prior attach.
    pub fn detach(&self) {
        self.flags.authoritative.set(false);
        self.flags.expected_echo.set(None);
        if let Some(id) = self.listener.take() {
            self.view.unsubscribe(id);
            tracing::debug!("{} adapter detached", self.view.id());
        }
    }

    /// Programmatically scroll the bound view to `progress`, swallowing the
    /// echo the scroll produces.
    pub fn force_scroll_to(&self, progress: f64, threshold: f64) -> bool {
        let flags = &self.flags;
        flags.echo_seen.set(false);
        flags.suppress_depth.set(flags.suppress_depth.get() + 1);
        let issued = force_scroll_to(self.view.as_ref(), progress, threshold, self.epsilon);
        flags.suppress_depth.set(flags.suppress_depth.get() - 1);

        if issued && !flags.echo_seen.get() && self.is_attached() {
            flags.expected_echo.set(Some(progress * threshold));
        }
        issued
    }
}

impl Drop for ScrollSignalAdapter {
    fn drop(&mut self) {
        self.detach();
    }
}
