//! Active binding coordinator
//!
//! The engine facade. Owns the authoritative [`ProgressState`], the single
//! live [`ScrollSignalAdapter`], the [`PassiveViewRegistry`], the
//! [`VisualProgressPublisher`], and push listeners. Every mutation of shared
//! state goes through here, on the UI thread.
//!
//! # Rebinding protocol
//!
//! 1. `select_view` bumps the generation, cancels any pending wait, and
//!    either binds at once (content already realized) or starts a wait
//!    bounded by `ready_timeout`.
//! 2. The wait resumes from `notify_ready`, `on_item_realized`, `tick`
//!    polling, or `resume` with a ticket from the async wait. Results carrying
//!    an old generation are dropped.
//! 3. Binding hands the outgoing view to the passive set, attaches the new
//!    adapter, force-scrolls the new view to the current progress, and makes
//!    it live after `settle_delay` (immediately when it sits at the top, or as
//!    soon as the user starts a gesture on it).
//!
//! No `RefCell` borrow is held across a call into a view or a listener. Views
//! may notify synchronously from inside a programmatic scroll and listeners
//! may call back into the coordinator.
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use shy_core::sim::SimScrollView;
//! use shy_core::{ActiveBindingCoordinator, SyncConfig};
//!
//! let coordinator = ActiveBindingCoordinator::new(SyncConfig::with_threshold(150.0)).unwrap();
//! let sampler = coordinator.subscribe_visual();
//!
//! let tab = SimScrollView::ready(1, 2000.0);
//! coordinator.select_view(tab.clone(), Instant::now());
//!
//! tab.user_scroll_to(75.0);
//! assert_eq!(coordinator.progress(), 0.5);
//! assert_eq!(sampler.progress(), 0.5);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::adapter::{ScrollSignal, ScrollSignalAdapter, SignalSink};
use crate::binding::{BindingEvent, BindingPhase};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::listeners::{ProgressListener, ProgressListenerId, ProgressListeners};
use crate::progress::ProgressState;
use crate::publisher::{ProgressSampler, VisualProgressPublisher, VisualSample};
use crate::readiness::{wait_until_ready, ReadyOutcome, ReadyTicket};
use crate::registry::PassiveViewRegistry;
use crate::view::{ViewHandle, ViewId};

struct PendingBind {
    ticket: ReadyTicket,
    view: ViewHandle,
    deadline: Instant,
}

struct CoordinatorInner {
    weak_self: Weak<CoordinatorInner>,
    config: SyncConfig,
    state: RefCell<ProgressState>,
    phase: Cell<BindingPhase>,
    generation: Cell<u64>,
    pending: RefCell<Option<PendingBind>>,
    active: RefCell<Option<Rc<ScrollSignalAdapter>>>,
    settle_deadline: Cell<Option<Instant>>,
    passive: PassiveViewRegistry,
    publisher: VisualProgressPublisher,
    listeners: ProgressListeners,
}

/// Scroll-progress synchronization engine. Cloning yields another handle
/// to the same engine.
#[derive(Clone)]
pub struct ActiveBindingCoordinator {
    inner: Rc<CoordinatorInner>,
}

impl ActiveBindingCoordinator {
    /// Create an engine with nothing bound and progress 0
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let state = ProgressState::new(config.threshold);
        let inner = Rc::new_cyclic(|weak_self| CoordinatorInner {
            weak_self: weak_self.clone(),
            config,
            state: RefCell::new(state),
            phase: Cell::new(BindingPhase::Idle),
            generation: Cell::new(0),
            pending: RefCell::new(None),
            active: RefCell::new(None),
            settle_deadline: Cell::new(None),
            passive: PassiveViewRegistry::new(config.epsilon),
            publisher: VisualProgressPublisher::new(VisualSample {
                progress: state.progress(),
                threshold: state.threshold(),
            }),
            listeners: ProgressListeners::new(),
        });
        Ok(Self { inner })
    }

    // =========================================================================
    // Progress surface
    // =========================================================================

    /// Current configuration, with the live threshold
    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            threshold: self.threshold(),
            ..self.inner.config
        }
    }

    pub fn progress(&self) -> f64 {
        self.inner.state.borrow().progress()
    }

    pub fn threshold(&self) -> f64 {
        self.inner.state.borrow().threshold()
    }

    /// Progress an offset maps to under the current threshold
    pub fn compute_progress(&self, offset: f64) -> f64 {
        self.inner.state.borrow().compute_progress(offset)
    }

    /// Assign progress from outside (e.g. "expand header" button).
    ///
    /// Scrolls the active view and every passive view to match. Returns
    /// `Ok(false)` without side effects when the value is unchanged.
    pub fn set_progress(&self, value: f64) -> Result<bool> {
        let changed = self
            .inner
            .state
            .borrow_mut()
            .set_progress(value)
            .map_err(|err| {
                tracing::warn!("rejected progress assignment: {}", err);
                err
            })?;
        if !changed {
            return Ok(false);
        }

        let active = self.inner.active.borrow().clone();
        if let Some(adapter) = active {
            let (progress, threshold) = self.inner.snapshot();
            adapter.force_scroll_to(progress, threshold);
        }
        self.inner.propagate();
        Ok(true)
    }

    /// Assign the collapse distance.
    ///
    /// Stored progress is kept; samplers and listeners are told so they
    /// can recompute their mapping. Views are not scrolled.
    pub fn set_threshold(&self, value: f64) -> Result<bool> {
        let changed = self
            .inner
            .state
            .borrow_mut()
            .set_threshold(value)
            .map_err(|err| {
                tracing::warn!("rejected threshold assignment: {}", err);
                err
            })?;
        if !changed {
            return Ok(false);
        }
        tracing::debug!("threshold set to {}", value);
        self.inner.publish();
        self.inner.listeners.dispatch(self.progress());
        Ok(true)
    }

    /// Connect a render-layer consumer
    pub fn subscribe_visual(&self) -> ProgressSampler {
        self.inner.publisher.subscribe()
    }

    /// Register a callback fired on every committed progress change
    pub fn on_progress_changed<F: Fn(f64) + 'static>(&self, listener: F) -> ProgressListenerId {
        let listener: ProgressListener = Rc::new(listener);
        self.inner.listeners.add(listener)
    }

    pub fn remove_progress_listener(&self, id: ProgressListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    // =========================================================================
    // Binding surface
    // =========================================================================

    pub fn phase(&self) -> BindingPhase {
        self.inner.phase.get()
    }

    /// Monotonic selection counter; the value carried by the latest ticket
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.inner.active.borrow().as_ref().map(|a| a.view_id())
    }

    /// Whether the active view currently drives progress
    pub fn is_live(&self) -> bool {
        self.inner
            .active
            .borrow()
            .as_ref()
            .is_some_and(|a| a.is_authoritative())
    }

    /// View whose readiness is being awaited
    pub fn pending_view(&self) -> Option<ViewId> {
        self.inner.pending.borrow().as_ref().map(|p| p.ticket.view)
    }

    /// Ticket of the outstanding wait, if any
    pub fn pending_ticket(&self) -> Option<ReadyTicket> {
        self.inner.pending.borrow().as_ref().map(|p| p.ticket)
    }

    /// Passive members in registration order
    pub fn passive_views(&self) -> Vec<ViewId> {
        self.inner.passive.ids()
    }

    /// Tab selection changed to `view`.
    ///
    /// Cancels any outstanding wait. Binds immediately when the view's
    /// content is realized, otherwise waits for it.
    pub fn select_view(&self, view: ViewHandle, now: Instant) -> ReadyTicket {
        let inner = &self.inner;
        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);
        let ticket = ReadyTicket {
            generation,
            view: view.id(),
        };

        let superseded = inner.pending.borrow_mut().take();
        if let Some(old) = superseded {
            tracing::debug!(
                "selection of {} cancels wait for {} (generation {})",
                ticket.view,
                old.ticket.view,
                old.ticket.generation
            );
        }

        if self.active_view() == Some(ticket.view) {
            inner.transition(BindingEvent::Reselect);
            return ticket;
        }

        inner.transition(BindingEvent::Select);
        if view.is_content_ready() {
            inner.bind(view, now);
        } else {
            tracing::debug!("{} selected, waiting for content", ticket.view);
            *inner.pending.borrow_mut() = Some(PendingBind {
                ticket,
                view,
                deadline: now + inner.config.ready_timeout,
            });
        }
        ticket
    }

    /// The pending view reported its content realized.
    ///
    /// A report arriving at or after the wait's deadline abandons the wait
    /// instead of binding.
    pub fn notify_ready(&self, view: ViewId, now: Instant) -> bool {
        match self.pending_ticket() {
            Some(ticket) if ticket.view == view => self.inner.try_complete(now),
            _ => {
                tracing::trace!("ready notification for {} ignored", view);
                false
            }
        }
    }

    /// Apply the outcome of an async readiness wait.
    ///
    /// Returns false when the ticket is stale (a newer selection happened)
    /// or the outcome could not be applied.
    pub fn resume(&self, ticket: ReadyTicket, outcome: ReadyOutcome, now: Instant) -> bool {
        if ticket.generation != self.generation() || self.pending_ticket() != Some(ticket) {
            tracing::debug!(
                "stale readiness result for {} (generation {}, current {})",
                ticket.view,
                ticket.generation,
                self.generation()
            );
            return false;
        }
        match outcome {
            ReadyOutcome::Ready => self.inner.try_complete(now),
            ReadyOutcome::TimedOut => {
                self.inner.abandon("timed out");
                true
            }
        }
    }

    /// Advance time-based work: readiness polling, wait timeout, settle delay
    pub fn tick(&self, now: Instant) {
        let inner = &self.inner;
        if inner.pending.borrow().is_some() {
            inner.try_complete(now);
        }

        if let Some(deadline) = inner.settle_deadline.get() {
            if now >= deadline {
                inner.go_live();
            }
        }
    }

    /// Select `view` and, if its content is not realized yet, wait for it
    /// on the current tokio task.
    ///
    /// The future is `!Send`; run it on a current-thread runtime or a
    /// `LocalSet`. Returns whether `view` ended up bound.
    pub async fn select_view_and_wait(&self, view: ViewHandle) -> bool {
        let ticket = self.select_view(Rc::clone(&view), tokio::time::Instant::now().into_std());
        if self.pending_ticket() == Some(ticket) {
            let outcome = wait_until_ready(
                view.as_ref(),
                self.inner.config.ready_timeout,
                self.inner.config.ready_poll_interval,
            )
            .await;
            self.resume(ticket, outcome, tokio::time::Instant::now().into_std());
        }
        self.active_view() == Some(ticket.view)
    }

    // =========================================================================
    // Tab lifecycle
    // =========================================================================

    /// A tab's content was realized. Hidden views join the passive set;
    /// the pending view completes its wait.
    pub fn on_item_realized(&self, view: ViewHandle, now: Instant) {
        let id = view.id();
        if self.active_view() == Some(id) {
            return;
        }
        if self.pending_view() == Some(id)
            && (self.inner.try_complete(now) || self.pending_view() == Some(id))
        {
            return;
        }
        let (progress, threshold) = self.inner.snapshot();
        self.inner.passive.register(view, progress, threshold);
    }

    /// A tab's content is being torn down
    pub fn on_item_unrealizing(&self, view: ViewId) {
        let inner = &self.inner;
        inner.passive.unregister(view);

        if self.active_view() == Some(view) {
            let adapter = inner.active.borrow_mut().take();
            if let Some(adapter) = adapter {
                adapter.detach();
            }
            inner.settle_deadline.set(None);
            inner.transition(BindingEvent::Unbind);
            tracing::debug!("active {} torn down", view);
        }
    }

    /// Detach from every view and cancel any wait (header teardown)
    pub fn release(&self) {
        let inner = &self.inner;
        inner.generation.set(inner.generation.get() + 1);
        inner.pending.borrow_mut().take();
        inner.settle_deadline.set(None);
        let adapter = inner.active.borrow_mut().take();
        if let Some(adapter) = adapter {
            adapter.detach();
        }
        for id in inner.passive.ids() {
            inner.passive.unregister(id);
        }
        inner.transition(BindingEvent::Release);
    }
}

impl CoordinatorInner {
    fn snapshot(&self) -> (f64, f64) {
        let state = self.state.borrow();
        (state.progress(), state.threshold())
    }

    fn transition(&self, event: BindingEvent) {
        let current = self.phase.get();
        if let Some(next) = current.on_event(event) {
            tracing::trace!("binding {:?} --{:?}--> {:?}", current, event, next);
            self.phase.set(next);
        }
    }

    fn sink(&self) -> SignalSink {
        let weak = self.weak_self.clone();
        Rc::new(move |signal: ScrollSignal| {
            if let Some(inner) = weak.upgrade() {
                inner.on_signal(signal);
            }
        })
    }

    /// Bind the pending view if its content is realized. An expired wait
    /// is abandoned first, whatever the view reports.
    fn try_complete(&self, now: Instant) -> bool {
        let (view, deadline) = match self.pending.borrow().as_ref() {
            Some(pending) => (Rc::clone(&pending.view), pending.deadline),
            None => return false,
        };
        if now >= deadline {
            self.abandon("timed out");
            return false;
        }
        if !view.is_content_ready() {
            return false;
        }
        self.bind(view, now);
        true
    }

    fn abandon(&self, reason: &str) {
        let pending = self.pending.borrow_mut().take();
        if let Some(pending) = pending {
            tracing::debug!(
                "abandoning wait for {} (generation {}): {}",
                pending.ticket.view,
                pending.ticket.generation,
                reason
            );
            let bound = self.active.borrow().is_some();
            self.transition(BindingEvent::Abandon { bound });
        }
    }

    fn bind(&self, view: ViewHandle, now: Instant) {
        let generation = self.generation.get();
        self.pending.borrow_mut().take();
        self.settle_deadline.set(None);

        // The outgoing view joins the passive set before the new adapter
        // attaches, so some view always reflects progress
        let outgoing = self.active.borrow_mut().take();
        if let Some(old) = outgoing {
            old.detach();
            let (progress, threshold) = self.snapshot();
            self.passive.register(Rc::clone(old.view()), progress, threshold);
        }
        if self.generation.get() != generation {
            return;
        }

        let id = view.id();
        self.passive.unregister(id);
        let adapter = Rc::new(ScrollSignalAdapter::new(Rc::clone(&view), self.config.epsilon));
        adapter.attach(self.sink());
        *self.active.borrow_mut() = Some(Rc::clone(&adapter));
        self.transition(BindingEvent::Ready);
        tracing::debug!("{} bound (generation {})", id, generation);

        let (progress, threshold) = self.snapshot();
        adapter.force_scroll_to(progress, threshold);
        if self.generation.get() != generation {
            return;
        }

        if view.vertical_offset() > 0.0 && !self.config.settle_delay.is_zero() {
            self.settle_deadline.set(Some(now + self.config.settle_delay));
        } else {
            self.go_live();
        }
    }

    fn go_live(&self) {
        self.settle_deadline.set(None);
        let active = self.active.borrow().clone();
        let Some(adapter) = active else {
            return;
        };
        adapter.set_authoritative(true);
        tracing::debug!("{} is now the live progress source", adapter.view_id());

        // Content shorter than the target offset leaves the view elsewhere;
        // what the view shows wins
        let offset = adapter.view().vertical_offset();
        self.apply_offset(offset);
    }

    fn on_signal(&self, signal: ScrollSignal) {
        let active = self.active.borrow().as_ref().map(|a| a.view_id());
        if active != Some(signal.view) {
            tracing::trace!("signal from inactive {} dropped", signal.view);
            return;
        }
        if !signal.authoritative {
            // User grabbed the view before the settle delay elapsed
            self.go_live();
            return;
        }
        self.apply_offset(signal.offset);
    }

    fn apply_offset(&self, offset: f64) {
        let changed = self.state.borrow_mut().update_from_offset(offset);
        if changed {
            self.propagate();
        }
    }

    fn publish(&self) {
        let (progress, threshold) = self.snapshot();
        self.publisher.publish(VisualSample {
            progress,
            threshold,
        });
    }

    /// Fan a committed change out to samplers, passive views, and listeners.
    /// Each stage reads the value current at its own dispatch.
    fn propagate(&self) {
        self.publish();
        let (progress, threshold) = self.snapshot();
        tracing::trace!("progress {:.4}", progress);
        self.passive.on_progress_changed(progress, threshold);
        let progress = self.state.borrow().progress();
        self.listeners.dispatch(progress);
    }
}
