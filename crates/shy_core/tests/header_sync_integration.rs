//! Integration tests for the header synchronization engine
//!
//! These tests drive the coordinator the way a tab container would:
//! - Realize, select and tear down tabs backed by simulated scroll views
//! - Scroll the active tab and check progress fan-out
//! - Race selections against readiness waits, on the sync and async paths

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use shy_core::adapter::force_scroll_to;
use shy_core::sim::{ScrollCommand, SimScrollView};
use shy_core::{
    compute_progress, ActiveBindingCoordinator, BindingPhase, ReadyOutcome, ScrollView,
    SyncConfig, ViewHandle, ViewId,
};
use tokio::task::LocalSet;

fn coordinator() -> ActiveBindingCoordinator {
    ActiveBindingCoordinator::new(SyncConfig::with_threshold(150.0)).unwrap()
}

fn count_changes(c: &ActiveBindingCoordinator) -> Rc<RefCell<Vec<f64>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    c.on_progress_changed(move |p| seen_clone.borrow_mut().push(p));
    seen
}

#[test]
fn test_compute_progress_clamps_and_handles_zero_threshold() {
    for threshold in [1.0_f64, 60.0, 150.0, 333.3] {
        for offset in [-50.0_f64, 0.0, 10.0, 75.0, 150.0, 400.0] {
            let expected = (offset / threshold).clamp(0.0, 1.0);
            assert_eq!(compute_progress(offset, threshold), expected);
        }
    }
    assert_eq!(compute_progress(75.0, 0.0), 0.0);
}

#[test]
fn test_active_scroll_moves_passive_views() {
    let c = coordinator();
    let sampler = c.subscribe_visual();
    let now = Instant::now();

    let active = SimScrollView::ready(1, 2000.0);
    let left = SimScrollView::ready(2, 2000.0);
    let right = SimScrollView::ready(3, 2000.0);
    c.on_item_realized(left.clone(), now);
    c.on_item_realized(right.clone(), now);
    c.select_view(active.clone(), now);

    active.user_scroll_to(75.0);

    assert_eq!(c.progress(), 0.5);
    assert_eq!(sampler.progress(), 0.5);
    assert_eq!(left.vertical_offset(), 75.0);
    assert_eq!(right.vertical_offset(), 75.0);
    assert_eq!(c.passive_views(), vec![ViewId(2), ViewId(3)]);
}

#[test]
fn test_late_tab_is_synced_before_going_live() {
    let c = coordinator();
    let start = Instant::now();
    let first = SimScrollView::ready(1, 2000.0);
    c.select_view(first.clone(), start);
    first.user_scroll_to(75.0);
    assert_eq!(c.progress(), 0.5);

    let late = SimScrollView::unrealized(2, 2000.0);
    let ticket = c.select_view(late.clone(), start);
    assert_eq!(c.phase(), BindingPhase::AwaitingReady);
    assert_eq!(c.pending_ticket(), Some(ticket));
    assert_eq!(c.active_view(), Some(ViewId(1)));

    let realized_at = start + Duration::from_millis(40);
    late.set_ready(true);
    c.on_item_realized(late.clone(), realized_at);

    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(c.active_view(), Some(ViewId(2)));
    assert_eq!(
        late.commands(),
        vec![ScrollCommand {
            offset: 75.0,
            animate: false
        }]
    );
    assert!(!c.is_live());

    c.tick(realized_at + Duration::from_millis(150));
    assert!(c.is_live());
    assert_eq!(c.progress(), 0.5);

    late.user_scroll_to(150.0);
    assert_eq!(c.progress(), 1.0);
    assert_eq!(first.vertical_offset(), 150.0);
}

#[test]
fn test_threshold_drop_keeps_stored_progress() {
    let c = coordinator();
    let now = Instant::now();
    let active = SimScrollView::ready(1, 2000.0);
    c.select_view(active.clone(), now);
    c.set_progress(0.6).unwrap();
    assert_eq!(active.vertical_offset(), 90.0);

    c.set_threshold(0.0).unwrap();
    assert_eq!(c.compute_progress(90.0), 0.0);
    assert_eq!(c.progress(), 0.6);

    active.user_scroll_to(120.0);
    assert_eq!(c.progress(), 0.0);
}

#[test]
fn test_threshold_change_notifies_without_scrolling() {
    let c = coordinator();
    let mut sampler = c.subscribe_visual();
    let seen = count_changes(&c);
    let now = Instant::now();
    let active = SimScrollView::ready(1, 2000.0);
    c.select_view(active.clone(), now);
    active.clear_commands();

    assert!(c.set_threshold(300.0).unwrap());
    assert!(sampler.has_changed());
    assert_eq!(sampler.sample().threshold, 300.0);
    assert_eq!(seen.borrow().len(), 1);
    assert!(active.commands().is_empty());

    assert!(!c.set_threshold(300.0).unwrap());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_repeated_set_progress_propagates_once() {
    let c = coordinator();
    let mut sampler = c.subscribe_visual();
    let seen = count_changes(&c);
    let now = Instant::now();
    let hidden = SimScrollView::ready(2, 2000.0);
    c.on_item_realized(hidden.clone(), now);

    assert!(c.set_progress(0.4).unwrap());
    assert!(!c.set_progress(0.4).unwrap());

    assert_eq!(*seen.borrow(), vec![0.4]);
    assert_eq!(hidden.commands().len(), 1);
    assert_eq!(sampler.sample().progress, 0.4);
    assert!(!sampler.has_changed());
}

#[test]
fn test_force_scroll_round_trip() {
    let view = SimScrollView::ready(1, 2000.0);
    for p in [0.0, 0.25, 0.5, 0.8, 1.0] {
        force_scroll_to(view.as_ref(), p, 150.0, 0.5);
        let back = compute_progress(view.vertical_offset(), 150.0);
        assert!((back - p).abs() < 1e-9);
    }
}

#[test]
fn test_programmatic_scroll_is_not_reported_back() {
    let c = coordinator();
    let seen = count_changes(&c);
    let now = Instant::now();
    let active = SimScrollView::ready(1, 2000.0);
    c.select_view(active.clone(), now);

    c.set_progress(0.5).unwrap();
    assert_eq!(active.vertical_offset(), 75.0);
    assert_eq!(*seen.borrow(), vec![0.5]);

    // Hosts that report programmatic scrolls on a later turn
    active.set_deferred_notifications(true);
    c.set_progress(0.2).unwrap();
    active.flush_notifications();
    assert_eq!(*seen.borrow(), vec![0.5, 0.2]);
    assert_eq!(c.progress(), 0.2);
}

#[test]
fn test_superseded_selection_result_is_ignored() {
    let c = coordinator();
    let start = Instant::now();
    let a = SimScrollView::unrealized(1, 2000.0);
    let b = SimScrollView::unrealized(2, 2000.0);

    let ticket_a = c.select_view(a.clone(), start);
    let ticket_b = c.select_view(b.clone(), start);
    assert_eq!(c.phase(), BindingPhase::Rebinding);
    assert!(ticket_b.generation > ticket_a.generation);

    b.set_ready(true);
    assert!(c.notify_ready(ViewId(2), start));
    assert_eq!(c.active_view(), Some(ViewId(2)));

    a.set_ready(true);
    let generation = c.generation();
    assert!(!c.resume(ticket_a, ReadyOutcome::Ready, start));
    assert!(!c.notify_ready(ViewId(1), start));
    assert_eq!(c.active_view(), Some(ViewId(2)));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(c.generation(), generation);
    assert_eq!(a.listener_count(), 0);
}

#[test]
fn test_wait_times_out_on_tick() {
    let c = coordinator();
    let start = Instant::now();
    let current = SimScrollView::ready(1, 2000.0);
    let never = SimScrollView::unrealized(2, 2000.0);
    c.select_view(current.clone(), start);
    c.select_view(never.clone(), start);

    c.tick(start + Duration::from_millis(1999));
    assert_eq!(c.phase(), BindingPhase::AwaitingReady);
    c.tick(start + Duration::from_secs(2));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(c.pending_view(), None);
    assert_eq!(c.active_view(), Some(ViewId(1)));

    // Realizing afterwards only adds it as a passive view
    never.set_ready(true);
    c.on_item_realized(never.clone(), start + Duration::from_secs(3));
    assert_eq!(c.active_view(), Some(ViewId(1)));
    assert_eq!(c.passive_views(), vec![ViewId(2)]);
}

#[test]
fn test_ready_report_after_deadline_does_not_bind() {
    let c = coordinator();
    let start = Instant::now();
    let current = SimScrollView::ready(1, 2000.0);
    let late = SimScrollView::unrealized(2, 2000.0);
    c.select_view(current.clone(), start);
    c.select_view(late.clone(), start);

    late.set_ready(true);
    assert!(!c.notify_ready(ViewId(2), start + Duration::from_secs(5)));
    assert_eq!(c.active_view(), Some(ViewId(1)));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(c.pending_view(), None);
    assert_eq!(late.listener_count(), 0);
}

#[test]
fn test_realization_after_deadline_joins_passive_set() {
    let c = coordinator();
    let start = Instant::now();
    let current = SimScrollView::ready(1, 2000.0);
    let late = SimScrollView::unrealized(2, 2000.0);
    c.select_view(current.clone(), start);
    c.select_view(late.clone(), start);

    late.set_ready(true);
    c.on_item_realized(late.clone(), start + Duration::from_secs(10));
    assert_eq!(c.active_view(), Some(ViewId(1)));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(c.passive_views(), vec![ViewId(2)]);
}

#[test]
fn test_resume_ready_after_deadline_falls_back() {
    let c = coordinator();
    let start = Instant::now();
    let late = SimScrollView::unrealized(1, 2000.0);
    let ticket = c.select_view(late.clone(), start);

    late.set_ready(true);
    assert!(!c.resume(ticket, ReadyOutcome::Ready, start + Duration::from_secs(10)));
    assert_eq!(c.active_view(), None);
    assert_eq!(c.phase(), BindingPhase::Idle);
}

#[test]
fn test_tick_after_deadline_wins_over_late_readiness() {
    let c = coordinator();
    let start = Instant::now();
    let current = SimScrollView::ready(1, 2000.0);
    let late = SimScrollView::unrealized(2, 2000.0);
    c.select_view(current.clone(), start);
    c.select_view(late.clone(), start);

    late.set_ready(true);
    c.tick(start + Duration::from_secs(3));
    assert_eq!(c.active_view(), Some(ViewId(1)));
    assert_eq!(c.pending_view(), None);
}

#[test]
fn test_timeout_with_nothing_bound_returns_to_idle() {
    let c = coordinator();
    let start = Instant::now();
    let never = SimScrollView::unrealized(1, 2000.0);
    c.select_view(never, start);
    c.tick(start + Duration::from_secs(5));
    assert_eq!(c.phase(), BindingPhase::Idle);
}

#[test]
fn test_tick_binds_pending_view_once_ready() {
    let c = coordinator();
    let start = Instant::now();
    let view = SimScrollView::unrealized(1, 2000.0);
    c.select_view(view.clone(), start);

    c.tick(start + Duration::from_millis(16));
    assert_eq!(c.phase(), BindingPhase::AwaitingReady);
    view.set_ready(true);
    c.tick(start + Duration::from_millis(32));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert!(c.is_live());
}

#[test]
fn test_outgoing_view_detached_before_incoming_attached() {
    let c = coordinator();
    let now = Instant::now();
    let a = SimScrollView::ready(1, 2000.0);
    let b = SimScrollView::ready(2, 2000.0);
    c.on_item_realized(b.clone(), now);
    c.select_view(a.clone(), now);
    assert_eq!(c.passive_views(), vec![ViewId(2)]);

    c.select_view(b.clone(), now);
    assert_eq!(c.passive_views(), vec![ViewId(1)]);
    assert_eq!(a.listener_count(), 0);
    assert_eq!(b.listener_count(), 1);

    // The old view now follows instead of driving
    b.user_scroll_to(30.0);
    assert_eq!(a.vertical_offset(), 30.0);
    a.user_scroll_to(500.0);
    assert_eq!(c.progress(), 0.2);
}

#[test]
fn test_unrealizing_pending_target_keeps_wait() {
    let c = coordinator();
    let start = Instant::now();
    let current = SimScrollView::ready(1, 2000.0);
    let target = SimScrollView::unrealized(2, 2000.0);
    c.select_view(current.clone(), start);
    c.select_view(target.clone(), start);

    c.on_item_unrealizing(ViewId(2));
    assert_eq!(c.pending_view(), Some(ViewId(2)));

    target.set_ready(true);
    c.on_item_realized(target.clone(), start + Duration::from_millis(20));
    assert_eq!(c.active_view(), Some(ViewId(2)));
}

#[test]
fn test_short_content_adopts_actual_offset() {
    let c = coordinator();
    let now = Instant::now();
    let tall = SimScrollView::ready(1, 2000.0);
    let short = SimScrollView::ready(2, 40.0);
    c.select_view(tall.clone(), now);
    tall.user_scroll_to(150.0);
    assert_eq!(c.progress(), 1.0);

    c.select_view(short.clone(), now);
    assert_eq!(short.vertical_offset(), 40.0);
    c.tick(now + Duration::from_millis(150));
    assert!((c.progress() - 40.0 / 150.0).abs() < 1e-9);
}

#[test]
fn test_listener_removal() {
    let c = coordinator();
    let calls = Rc::new(Cell::new(0));
    let calls_clone = Rc::clone(&calls);
    let id = c.on_progress_changed(move |_| calls_clone.set(calls_clone.get() + 1));

    c.set_progress(0.3).unwrap();
    assert!(c.remove_progress_listener(id));
    c.set_progress(0.6).unwrap();
    assert_eq!(calls.get(), 1);
    assert!(!c.remove_progress_listener(id));
}

#[tokio::test(start_paused = true)]
async fn test_async_selection_superseded_by_newer_one() {
    let c = coordinator();
    let a = SimScrollView::unrealized(1, 2000.0);
    let b = SimScrollView::ready(2, 2000.0);
    let local = LocalSet::new();

    let c_a = c.clone();
    let a_handle: ViewHandle = a.clone();
    let first = local.spawn_local(async move { c_a.select_view_and_wait(a_handle).await });

    let c_b = c.clone();
    let b_handle: ViewHandle = b.clone();
    let a_late = Rc::clone(&a);
    let second = local.spawn_local(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let bound = c_b.select_view_and_wait(b_handle).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        a_late.set_ready(true);
        bound
    });

    let (first, second) = local
        .run_until(async { (first.await.unwrap(), second.await.unwrap()) })
        .await;

    assert!(!first);
    assert!(second);
    assert_eq!(c.active_view(), Some(ViewId(2)));
    assert_eq!(c.phase(), BindingPhase::Bound);
    assert_eq!(a.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_async_wait_times_out_and_keeps_binding() {
    let c = coordinator();
    let current = SimScrollView::ready(1, 2000.0);
    let never = SimScrollView::unrealized(2, 2000.0);

    assert!(c.select_view_and_wait(current.clone()).await);
    let started = tokio::time::Instant::now();
    assert!(!c.select_view_and_wait(never.clone()).await);

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(c.active_view(), Some(ViewId(1)));
    assert_eq!(c.phase(), BindingPhase::Bound);
}
