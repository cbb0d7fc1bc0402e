//! Pipeline stage tracking.

use crate::error::{Result, StateError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stage of a build, declared in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PipelineStage {
    /// Nothing started
    Idle,
    /// Determining the build version
    ResolvingVersion,
    /// Running the test gate
    Testing,
    /// Running the external bundler
    Bundling,
    /// Launching the bundled executables
    SmokeTesting,
    /// Writing checksums and version info
    Finalizing,
    /// Creating distribution archives
    Packaging,
    /// Updating the changelog
    GeneratingChangelog,
    /// Build completed successfully
    Done,
    /// Build aborted
    Failed,
}

impl PipelineStage {
    /// Stages that may be bypassed by flags or configuration
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            PipelineStage::Testing
                | PipelineStage::SmokeTesting
                | PipelineStage::Packaging
                | PipelineStage::GeneratingChangelog
        )
    }

    /// `Done` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "Idle"),
            PipelineStage::ResolvingVersion => write!(f, "Resolving Version"),
            PipelineStage::Testing => write!(f, "Testing"),
            PipelineStage::Bundling => write!(f, "Bundling"),
            PipelineStage::SmokeTesting => write!(f, "Smoke Testing"),
            PipelineStage::Finalizing => write!(f, "Finalizing"),
            PipelineStage::Packaging => write!(f, "Packaging"),
            PipelineStage::GeneratingChangelog => write!(f, "Generating Changelog"),
            PipelineStage::Done => write!(f, "Done"),
            PipelineStage::Failed => write!(f, "Failed"),
        }
    }
}

/// A stage the pipeline entered
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    /// Stage entered
    pub stage: PipelineStage,
    /// When it was entered
    pub entered_at: DateTime<Utc>,
}

/// Current stage plus history
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    /// Timestamp when the build started
    pub started_at: DateTime<Utc>,
    /// Current stage
    pub current: PipelineStage,
    /// Stages entered, oldest first
    pub history: Vec<StageRecord>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    /// Start in [`PipelineStage::Idle`]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            current: PipelineStage::Idle,
            history: vec![StageRecord {
                stage: PipelineStage::Idle,
                entered_at: now,
            }],
        }
    }

    /// Whether `to` may follow the current stage.
    ///
    /// Stages only move forward; optional stages may be skipped, required
    /// ones may not. Any non-terminal stage may fail.
    pub fn can_transition(&self, to: PipelineStage) -> bool {
        let from = self.current;
        if from.is_terminal() {
            return false;
        }
        if to == PipelineStage::Failed {
            return true;
        }
        if to <= from {
            return false;
        }
        // Every stage strictly between `from` and `to` must be optional
        let skipped_required = STAGE_ORDER
            .iter()
            .filter(|s| **s > from && **s < to)
            .any(|s| !s.is_optional());
        !skipped_required
    }

    /// Move to `to`, recording the time.
    pub fn transition(&mut self, to: PipelineStage) -> Result<()> {
        if !self.can_transition(to) {
            return Err(StateError::InvalidTransition {
                from: self.current.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        log::debug!("Pipeline: {} → {}", self.current, to);
        self.current = to;
        self.history.push(StageRecord {
            stage: to,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    /// Mark the build failed unless it already finished.
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.current = PipelineStage::Failed;
            self.history.push(StageRecord {
                stage: PipelineStage::Failed,
                entered_at: Utc::now(),
            });
        }
    }

    /// Check if a specific stage was entered
    pub fn has_entered(&self, stage: PipelineStage) -> bool {
        self.history.iter().any(|r| r.stage == stage)
    }

    /// Stages entered, in order
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.history.iter().map(|r| r.stage).collect()
    }

    /// Time since the build started
    pub fn elapsed_time(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

const STAGE_ORDER: [PipelineStage; 9] = [
    PipelineStage::Idle,
    PipelineStage::ResolvingVersion,
    PipelineStage::Testing,
    PipelineStage::Bundling,
    PipelineStage::SmokeTesting,
    PipelineStage::Finalizing,
    PipelineStage::Packaging,
    PipelineStage::GeneratingChangelog,
    PipelineStage::Done,
];

/// Render a duration as `1h 2m 3s`
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineStage::*;

    #[test]
    fn test_full_run() {
        let mut state = PipelineState::new();
        for stage in [
            ResolvingVersion,
            Testing,
            Bundling,
            SmokeTesting,
            Finalizing,
            Packaging,
            GeneratingChangelog,
            Done,
        ] {
            state.transition(stage).unwrap();
        }
        assert_eq!(state.stages().len(), 9);
        assert!(state.current.is_terminal());
    }

    #[test]
    fn test_optional_stages_skippable() {
        let mut state = PipelineState::new();
        state.transition(ResolvingVersion).unwrap();
        state.transition(Bundling).unwrap();
        state.transition(Finalizing).unwrap();
        state.transition(Done).unwrap();
        assert!(!state.has_entered(Testing));
    }

    #[test]
    fn test_required_stage_cannot_be_skipped() {
        let mut state = PipelineState::new();
        state.transition(ResolvingVersion).unwrap();
        assert!(state.transition(Finalizing).is_err());
        assert_eq!(state.current, ResolvingVersion);
    }

    #[test]
    fn test_no_going_back() {
        let mut state = PipelineState::new();
        state.transition(ResolvingVersion).unwrap();
        state.transition(Bundling).unwrap();
        assert!(state.transition(Testing).is_err());
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut state = PipelineState::new();
        state.transition(ResolvingVersion).unwrap();
        state.fail();
        assert_eq!(state.current, Failed);
        assert!(state.transition(Bundling).is_err());
        state.fail();
        assert_eq!(state.stages().iter().filter(|s| **s == Failed).count(), 1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_duration(chrono::Duration::seconds(3725)), "1h 2m 5s");
    }
}
