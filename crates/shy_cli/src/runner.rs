//! Scenario runner over a simulated tabbed page
//!
//! Every tab owns a [`SimScrollView`]. Time is virtual: only `wait` and
//! `tick` steps advance the clock, one frame at a time, ticking the
//! coordinator and the header's frame sampler on each frame.

use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use shy_animation::FrameSampler;
use shy_core::sim::SimScrollView;
use shy_core::{ActiveBindingCoordinator, ScrollView, ViewId};

use crate::config::ShyConfig;
use crate::report::{ReportStatus, ScenarioReport, StepRecord};
use crate::scenario::{Scenario, ScenarioStep};

/// Outcome of applying one step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Passed { note: Option<String> },
    Failed { message: String },
}

/// Simulated page: header engine plus one scroll view per tab
pub struct Page {
    coordinator: ActiveBindingCoordinator,
    tabs: Vec<Rc<SimScrollView>>,
    frames: FrameSampler,
    origin: Instant,
    frame_ms: u64,
    elapsed_ms: u64,
    elapsed_frames: u64,
}

impl Page {
    /// Build the page with every tab realized and the first one selected
    pub fn new(config: &ShyConfig) -> Result<Self> {
        let coordinator = ActiveBindingCoordinator::new(config.sync)?;
        let frames = FrameSampler::new(coordinator.subscribe_visual(), config.header);
        let max_offset = config.page.max_offset();
        let tabs = (0..config.page.tabs)
            .map(|tab| SimScrollView::ready(tab as u64, max_offset))
            .collect();

        let page = Self {
            coordinator,
            tabs,
            frames,
            origin: Instant::now(),
            frame_ms: config.page.frame_ms.max(1),
            elapsed_ms: 0,
            elapsed_frames: 0,
        };

        let now = page.now();
        for view in &page.tabs {
            page.coordinator.on_item_realized(view.clone(), now);
        }
        if let Some(first) = page.tabs.first() {
            page.coordinator.select_view(first.clone(), now);
        }
        tracing::info!(
            "page ready: {} tabs, threshold {}, scroll extent {}",
            page.tabs.len(),
            page.coordinator.threshold(),
            max_offset
        );
        Ok(page)
    }

    pub fn coordinator(&self) -> &ActiveBindingCoordinator {
        &self.coordinator
    }

    pub fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.elapsed_ms)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    pub fn tab(&self, tab: usize) -> Result<&Rc<SimScrollView>> {
        match self.tabs.get(tab) {
            Some(view) => Ok(view),
            None => bail!("tab {} out of range (page has {} tabs)", tab, self.tabs.len()),
        }
    }

    pub fn active_tab(&self) -> Option<usize> {
        self.coordinator.active_view().map(tab_index)
    }

    /// Run one frame lasting `ms`
    fn frame(&mut self, ms: u64) {
        self.elapsed_ms += ms;
        self.elapsed_frames += 1;
        self.coordinator.tick(self.now());
        self.frames.tick();
    }

    fn wait(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(self.frame_ms);
            remaining -= step;
            self.frame(step);
        }
    }

    pub fn apply(&mut self, step: &ScenarioStep) -> Result<StepOutcome> {
        if let Some(tab) = step.tab() {
            self.tab(tab)?;
        }

        let coordinator = &self.coordinator;
        let now = self.now();
        let passed = StepOutcome::Passed { note: None };
        let outcome = match *step {
            ScenarioStep::Select { tab } => {
                let ticket = coordinator.select_view(self.tab(tab)?.clone(), now);
                if coordinator.pending_ticket() == Some(ticket) {
                    StepOutcome::Passed {
                        note: Some(format!("waiting for tab {tab} to realize")),
                    }
                } else {
                    passed
                }
            }
            ScenarioStep::Realize { tab } => {
                let view = self.tab(tab)?;
                view.set_ready(true);
                coordinator.on_item_realized(view.clone(), now);
                passed
            }
            ScenarioStep::Unrealize { tab } => {
                let view = self.tab(tab)?;
                coordinator.on_item_unrealizing(view.id());
                // Recycled content comes back scrolled to the top
                view.set_ready(false);
                view.settle_to(0.0);
                passed
            }
            ScenarioStep::Scroll {
                tab,
                offset,
                interactive,
            } => {
                let view = self.tab(tab)?;
                if interactive {
                    view.user_scroll_to(offset);
                } else {
                    view.settle_to(offset);
                }
                passed
            }
            ScenarioStep::Wait { ms } => {
                self.wait(ms);
                passed
            }
            ScenarioStep::Tick { frames } => {
                for _ in 0..frames {
                    self.frame(self.frame_ms);
                }
                passed
            }
            ScenarioStep::SetProgress { value } => match coordinator.set_progress(value) {
                Ok(_) => passed,
                Err(err) => StepOutcome::Passed {
                    note: Some(format!("rejected: {err}")),
                },
            },
            ScenarioStep::SetThreshold { value } => match coordinator.set_threshold(value) {
                Ok(_) => passed,
                Err(err) => StepOutcome::Passed {
                    note: Some(format!("rejected: {err}")),
                },
            },
            ScenarioStep::AssertProgress { value, tolerance } => {
                let actual = coordinator.progress();
                check(
                    (actual - value).abs() <= tolerance,
                    format!("expected progress {value} (±{tolerance}), got {actual}"),
                )
            }
            ScenarioStep::AssertOffset {
                tab,
                value,
                tolerance,
            } => {
                let actual = self.tab(tab)?.vertical_offset();
                check(
                    (actual - value).abs() <= tolerance,
                    format!("expected tab {tab} at offset {value} (±{tolerance}), got {actual}"),
                )
            }
            ScenarioStep::AssertActive { tab } => {
                let actual = self.active_tab();
                check(
                    actual == tab,
                    format!("expected active tab {tab:?}, got {actual:?}"),
                )
            }
            ScenarioStep::AssertLive { live } => {
                let actual = self.coordinator.is_live();
                check(actual == live, format!("expected live={live}, got {actual}"))
            }
        };
        Ok(outcome)
    }

    fn record(&self, index: usize, step: &ScenarioStep, note: Option<String>) -> StepRecord {
        StepRecord {
            index,
            step: step.kind(),
            progress: self.coordinator.progress(),
            active_tab: self.active_tab(),
            live: self.coordinator.is_live(),
            elapsed_ms: self.elapsed_ms,
            note,
        }
    }

    fn report(
        &self,
        name: Option<String>,
        steps: Vec<StepRecord>,
        failure: Option<(usize, &'static str, String)>,
    ) -> ScenarioReport {
        let (status, failed_step_index, assertion, message) = match failure {
            Some((index, assertion, message)) => (
                ReportStatus::Failed,
                Some(index),
                Some(assertion.to_string()),
                Some(message),
            ),
            None => (ReportStatus::Passed, None, None, None),
        };
        let progress = self.coordinator.progress();
        ScenarioReport {
            name,
            status,
            failed_step_index,
            assertion,
            message,
            elapsed_frames: self.elapsed_frames,
            elapsed_ms: self.elapsed_ms,
            changed_frames: self.frames.changed_frame_count(),
            progress,
            threshold: self.coordinator.threshold(),
            active_tab: self.active_tab(),
            header: shy_animation::HeaderTransform::at(self.frames.layout(), progress),
            steps,
        }
    }
}

fn tab_index(id: ViewId) -> usize {
    id.0 as usize
}

fn check(ok: bool, message: String) -> StepOutcome {
    if ok {
        StepOutcome::Passed { note: None }
    } else {
        StepOutcome::Failed { message }
    }
}

/// Run `scenario` against a fresh page. Stops at the first failed assertion.
pub fn run(scenario: &Scenario, config: &ShyConfig) -> Result<ScenarioReport> {
    let mut page = Page::new(config)?;
    let mut records = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!("step {}: {:?}", index, step);
        match page.apply(step)? {
            StepOutcome::Passed { note } => {
                if let Some(note) = &note {
                    tracing::info!("step {} ({}): {}", index, step.kind(), note);
                }
                records.push(page.record(index, step, note));
            }
            StepOutcome::Failed { message } => {
                tracing::warn!("step {} ({}) failed: {}", index, step.kind(), message);
                records.push(page.record(index, step, Some(message.clone())));
                return Ok(page.report(
                    scenario.name.clone(),
                    records,
                    Some((index, step.kind(), message)),
                ));
            }
        }
    }

    tracing::info!(
        "{} steps passed in {} frames ({}ms virtual)",
        records.len(),
        page.elapsed_frames(),
        page.elapsed_ms()
    );
    Ok(page.report(scenario.name.clone(), records, None))
}
