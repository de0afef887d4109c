//! Per-step outcomes and the report of a whole run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::plan::Step;

/// How a single step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed {
        exit_code: Option<i32>,
        diagnostic: String,
    },
    Skipped {
        reason: String,
    },
}

impl StepOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    /// Short label written to the run log footer of a step.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            StepOutcome::Succeeded => "ok".to_string(),
            StepOutcome::Failed {
                exit_code: Some(code),
                ..
            } => format!("failed (exit {code})"),
            StepOutcome::Failed { exit_code: None, .. } => "failed".to_string(),
            StepOutcome::Skipped { reason } => format!("skipped ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    /// Command line as run; `None` for steps with no external process.
    pub command: Option<String>,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

/// Everything a run did, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub log_file: PathBuf,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    /// `true` when the fail-fast policy stopped the run early.
    pub aborted: bool,
}

impl RunReport {
    #[must_use]
    pub fn success(&self) -> bool {
        !self.steps.iter().any(|s| s.outcome.is_failure())
    }

    #[must_use]
    pub fn failed_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|s| s.outcome.is_failure())
            .map(|s| s.step)
            .collect()
    }

    #[must_use]
    pub fn outcome_of(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }
}
