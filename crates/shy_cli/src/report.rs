//! Report output for scenario runs

use anyhow::Result;
use serde::Serialize;
use shy_animation::HeaderTransform;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// State observed right after one step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub step: &'static str,
    pub progress: f64,
    pub active_tab: Option<usize>,
    pub live: bool,
    pub elapsed_ms: u64,
    /// Rejections and other non-fatal remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Machine-readable result of a scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    /// Frames whose sampled progress differed from the previous frame
    pub changed_frames: u64,
    pub progress: f64,
    pub threshold: f64,
    pub active_tab: Option<usize>,
    pub header: HeaderTransform,
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Human-readable step table and verdict
    pub fn write_summary<W: Write>(&self, writer: &mut W) -> Result<()> {
        if let Some(name) = &self.name {
            writeln!(writer, "scenario: {name}")?;
        }
        for record in &self.steps {
            let active = record
                .active_tab
                .map_or_else(|| "-".to_string(), |tab| tab.to_string());
            write!(
                writer,
                "{:>4}  {:<16} progress {:.4}  active {:<3} {:<7} t={}ms",
                record.index,
                record.step,
                record.progress,
                active,
                match (record.live, record.active_tab) {
                    (true, _) => "live",
                    (false, Some(_)) => "settling",
                    (false, None) => "idle",
                },
                record.elapsed_ms
            )?;
            if let Some(note) = &record.note {
                write!(writer, "  ({note})")?;
            }
            writeln!(writer)?;
        }

        match self.status {
            ReportStatus::Passed => writeln!(
                writer,
                "PASSED: {} steps, {} frames ({} changed), progress {:.4}, header offset {:.1}, title scale {:.3}",
                self.steps.len(),
                self.elapsed_frames,
                self.changed_frames,
                self.progress,
                self.header.panel_offset_y,
                self.header.title_scale
            )?,
            ReportStatus::Failed => writeln!(
                writer,
                "FAILED at step {}: {} - {}",
                self.failed_step_index.unwrap_or_default(),
                self.assertion.as_deref().unwrap_or("unknown"),
                self.message.as_deref().unwrap_or("")
            )?,
        }
        Ok(())
    }
}
