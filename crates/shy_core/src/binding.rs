//! Active binding state machine
//!
//! ```text
//!            select                      ready
//!   Idle ───────────────► AwaitingReady ───────► Bound
//!    ▲                        │  ▲                │
//!    │ abandon (unbound)      │  │ select         │ select
//!    └────────────────────────┘  └────────────────┘
//!                             │ select
//!                             ▼
//!                         Rebinding ──── ready ──► Bound
//! ```
//!
//! `Rebinding` is a wait that superseded another wait before it completed.
//! An abandoned wait (timeout) falls back to `Bound` when a previous view is
//! still bound, otherwise to `Idle`.

/// Coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingPhase {
    /// No view bound and nothing pending
    #[default]
    Idle,
    /// A view was selected and its content is not realized yet
    AwaitingReady,
    /// A newer selection replaced a wait that had not completed
    Rebinding,
    /// An adapter is attached to the active view
    Bound,
}

/// Inputs to [`BindingPhase::on_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingEvent {
    /// A different view was selected
    Select,
    /// The currently bound view was selected again
    Reselect,
    /// The pending view's content is ready and the adapter is attached
    Ready,
    /// The pending wait was abandoned; `bound` tells whether an older
    /// binding is still in place
    Abandon { bound: bool },
    /// The bound view was torn down
    Unbind,
    /// The engine released every view
    Release,
}

impl BindingPhase {
    /// Next phase for `event`, or `None` if the event does not apply
    pub fn on_event(&self, event: BindingEvent) -> Option<Self> {
        use BindingEvent::*;
        use BindingPhase::*;
        match (self, event) {
            (Idle | Bound, Select) => Some(AwaitingReady),
            (AwaitingReady | Rebinding, Select) => Some(Rebinding),
            (AwaitingReady | Rebinding, Reselect) => Some(Bound),
            (AwaitingReady | Rebinding, Ready) => Some(Bound),
            (AwaitingReady | Rebinding, Abandon { bound: true }) => Some(Bound),
            (AwaitingReady | Rebinding, Abandon { bound: false }) => Some(Idle),
            (Bound, Unbind) => Some(Idle),
            (AwaitingReady | Rebinding | Bound, Release) => Some(Idle),
            _ => None,
        }
    }

    /// Whether a readiness wait is outstanding
    pub fn is_waiting(&self) -> bool {
        matches!(self, BindingPhase::AwaitingReady | BindingPhase::Rebinding)
    }
}
