//! Readiness waits
//!
//! A newly selected tab's content is often realized a few frames after the
//! selection. Every selection mints a [`ReadyTicket`] carrying the
//! coordinator's generation at that moment; a wait resolves to a
//! [`ReadyOutcome`] and is handed back together with its ticket. The
//! coordinator compares the ticket generation with its current one and
//! discards results from superseded selections.

use std::time::Duration;

use crate::view::{ScrollView, ViewId};

/// Cancellation handle for one selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReadyTicket {
    pub generation: u64,
    pub view: ViewId,
}

/// How a readiness wait ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyOutcome {
    Ready,
    TimedOut,
}

/// Wait until `view` reports realized content, polling every `poll`.
///
/// Resolves to [`ReadyOutcome::TimedOut`] after `timeout`. Never touches
/// coordinator state; pass the outcome to
/// [`crate::ActiveBindingCoordinator::resume`] with the ticket.
pub async fn wait_until_ready(view: &dyn ScrollView, timeout: Duration, poll: Duration) -> ReadyOutcome {
    let ready = async {
        loop {
            if view.is_content_ready() {
                return;
            }
            tokio::time::sleep(poll).await;
        }
    };

    match tokio::time::timeout(timeout, ready).await {
        Ok(()) => ReadyOutcome::Ready,
        Err(_) => {
            tracing::debug!("{} not ready after {:?}", view.id(), timeout);
            ReadyOutcome::TimedOut
        }
    }
}
