//! State tracking for build pipelines.
//!
//! A build moves strictly forward through its stages; the state machine
//! rejects anything else so a failing stage can never be followed by a later
//! one.

mod pipeline_state;

pub use pipeline_state::{PipelineStage, PipelineState, StageRecord, format_duration};
