//! Scenario definition for headless header runs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Scenario bundled with the binary
pub const BUNDLED_SCENARIO: &str = include_str!("../scenarios/tab_switch.json");

/// Sequence of steps driven against a simulated page
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_SCENARIO)
    }
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f64 {
    1e-3
}

/// One scenario step. Tabs are zero-based indices into the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Tab selection changed
    Select { tab: usize },
    /// Tab content realized
    Realize { tab: usize },
    /// Tab content torn down
    Unrealize { tab: usize },
    /// Scroll a tab's view; a user gesture unless `interactive` is false
    Scroll {
        tab: usize,
        offset: f64,
        #[serde(default = "default_true")]
        interactive: bool,
    },
    /// Advance virtual time
    Wait { ms: u64 },
    /// Advance a number of frames
    Tick { frames: u32 },
    SetProgress { value: f64 },
    SetThreshold { value: f64 },
    AssertProgress {
        value: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    AssertOffset {
        tab: usize,
        value: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
    AssertActive { tab: Option<usize> },
    AssertLive { live: bool },
}

impl ScenarioStep {
    /// Step name as written in scenario files
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioStep::Select { .. } => "select",
            ScenarioStep::Realize { .. } => "realize",
            ScenarioStep::Unrealize { .. } => "unrealize",
            ScenarioStep::Scroll { .. } => "scroll",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::SetProgress { .. } => "set_progress",
            ScenarioStep::SetThreshold { .. } => "set_threshold",
            ScenarioStep::AssertProgress { .. } => "assert_progress",
            ScenarioStep::AssertOffset { .. } => "assert_offset",
            ScenarioStep::AssertActive { .. } => "assert_active",
            ScenarioStep::AssertLive { .. } => "assert_live",
        }
    }

    /// Tab index the step refers to, if any
    pub fn tab(&self) -> Option<usize> {
        match self {
            ScenarioStep::Select { tab }
            | ScenarioStep::Realize { tab }
            | ScenarioStep::Unrealize { tab }
            | ScenarioStep::Scroll { tab, .. }
            | ScenarioStep::AssertOffset { tab, .. } => Some(*tab),
            ScenarioStep::AssertActive { tab } => *tab,
            _ => None,
        }
    }
}
