//! `session/init-context`: many providers composed into one response.

pub mod aggregator;
pub mod progress;
pub mod workdir;

pub use aggregator::{AggregationFailure, AggregationOutcome, Aggregator, RunState, Stage, StageFailure};
pub use progress::{noop_progress, NoopProgressReporter, ProgressCollector, ProgressEvent, ProgressReporter};
pub use workdir::WorkdirScope;

/// Resource key of the composite session resource.
pub const SESSION_KEY: &str = "session/init-context";
