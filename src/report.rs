use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

/// A step annotation recorded while a scenario runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// Milliseconds since the scenario started
    pub at_ms: u64,
}

/// A file archived with a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
}

/// Result of one scenario, with its trail of steps and screenshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub description: String,
    pub status: Status,
    /// Failure message
    pub message: Option<String>,
    pub duration_ms: u64,
    pub steps: Vec<Step>,
    pub attachments: Vec<Attachment>,
}

/// All scenario outcomes of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioOutcome>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.status == Status::Passed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Writes `report.json` into `dir`, creating it if needed
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        std::fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join("report.json");
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

#[derive(Debug)]
struct Active {
    name: String,
    description: String,
    started: Instant,
    steps: Vec<Step>,
    attachments: Vec<Attachment>,
}

/// Shared sink for step annotations and attachments
///
/// Cloning gives another handle to the same sink. Steps recorded while no
/// scenario is active are only logged.
#[derive(Debug, Clone, Default)]
pub struct Report {
    active: Arc<Mutex<Option<Active>>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting for a scenario, discarding any unfinished one
    pub fn begin(&self, name: &str, description: &str) {
        ::log::info!("=== Scenario: {} ===", name);
        *self.lock() = Some(Active {
            name: name.to_string(),
            description: description.to_string(),
            started: Instant::now(),
            steps: Vec::new(),
            attachments: Vec::new(),
        });
    }

    /// Record a step annotation
    pub fn step(&self, name: impl Into<String>) {
        let name = name.into();
        ::log::info!("STEP: {}", name);
        if let Some(active) = self.lock().as_mut() {
            let at_ms = active.started.elapsed().as_millis() as u64;
            active.steps.push(Step { name, at_ms });
        }
    }

    /// Archive a file with the active scenario
    pub fn attach(&self, name: &str, path: &Path) {
        ::log::debug!("Attached {} ({})", name, path.display());
        if let Some(active) = self.lock().as_mut() {
            active.attachments.push(Attachment {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    /// Close the active scenario
    ///
    /// Returns `None` when no scenario was started.
    pub fn finish(&self, status: Status, message: Option<String>) -> Option<ScenarioOutcome> {
        let active = self.lock().take()?;
        let duration_ms = active.started.elapsed().as_millis() as u64;

        match status {
            Status::Passed => ::log::info!("PASSED {} in {}ms", active.name, duration_ms),
            Status::Failed => ::log::error!(
                "FAILED {} in {}ms: {}",
                active.name,
                duration_ms,
                message.as_deref().unwrap_or("")
            ),
        }

        Some(ScenarioOutcome {
            name: active.name,
            description: active.description,
            status,
            message,
            duration_ms,
            steps: active.steps,
            attachments: active.attachments,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Active>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}
