//! Shy Header Core
//!
//! Keeps a collapsing header in step with a set of scrollable tab views:
//!
//! - **Progress State**: normalized collapse progress and its threshold
//! - **Binding**: one active view drives progress; switching tabs rebinds
//!   without jumps, waiting for content when it is not realized yet
//! - **Passive Views**: every other realized tab follows progress
//! - **Visual Publishing**: a lock-free sampler for the render layer
//!
//! Everything runs on the UI thread. Views are shared as `Rc<dyn ScrollView>`
//! and time is passed in explicitly, so the engine can be driven by a real
//! frame loop, a tokio current-thread runtime, or a test.
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use shy_core::sim::SimScrollView;
//! use shy_core::{ActiveBindingCoordinator, SyncConfig};
//!
//! let coordinator = ActiveBindingCoordinator::new(SyncConfig::with_threshold(100.0)).unwrap();
//! let now = Instant::now();
//!
//! let first = SimScrollView::ready(1, 1000.0);
//! let second = SimScrollView::ready(2, 1000.0);
//! coordinator.on_item_realized(second.clone(), now);
//! coordinator.select_view(first.clone(), now);
//!
//! // Scrolling the active tab moves the header and the hidden tab
//! first.user_scroll_to(40.0);
//! assert_eq!(coordinator.progress(), 0.4);
//! assert_eq!(shy_core::ScrollView::vertical_offset(&*second), 40.0);
//! ```

pub mod adapter;
pub mod binding;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod listeners;
pub mod progress;
pub mod publisher;
pub mod readiness;
pub mod registry;
pub mod sim;
pub mod view;

pub use adapter::{ScrollSignal, ScrollSignalAdapter};
pub use binding::{BindingEvent, BindingPhase};
pub use config::SyncConfig;
pub use coordinator::ActiveBindingCoordinator;
pub use error::{Result, SyncError};
pub use listeners::ProgressListenerId;
pub use progress::{compute_progress, ProgressState};
pub use publisher::{ProgressSampler, VisualProgressPublisher, VisualSample};
pub use readiness::{wait_until_ready, ReadyOutcome, ReadyTicket};
pub use registry::PassiveViewRegistry;
pub use view::{OffsetChanged, ScrollView, ViewHandle, ViewId};
