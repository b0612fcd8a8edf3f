//! Progress reporting for aggregation runs.
//!
//! Reports are observational: implementations must never fail the caller.

use std::sync::Mutex;

use async_trait::async_trait;

#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// `completed` of `total` stages are done; `stage` is the one that just
    /// finished.
    async fn report(&self, completed: usize, total: usize, stage: &str);
}

/// Reporter for callers that do not want progress.
pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _completed: usize, _total: usize, _stage: &str) {}
}

pub fn noop_progress() -> &'static dyn ProgressReporter {
    &NoopProgressReporter
}

/// One recorded progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub stage: String,
}

/// Buffers reports so they can be sent ahead of the response.
#[derive(Debug, Default)]
pub struct ProgressCollector {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressCollector {
    pub fn take(&self) -> Vec<ProgressEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl ProgressReporter for ProgressCollector {
    async fn report(&self, completed: usize, total: usize, stage: &str) {
        let event = ProgressEvent {
            completed,
            total,
            stage: stage.to_string(),
        };
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collector_records_in_order_and_drains() {
        let collector = ProgressCollector::default();
        collector.report(1, 2, "rules").await;
        collector.report(2, 2, "tasks").await;

        let events = collector.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].stage, "rules");
        assert_eq!((events[1].completed, events[1].total), (2, 2));
        assert!(collector.take().is_empty());
    }

    #[tokio::test]
    async fn noop_reporter_does_nothing() {
        noop_progress().report(1, 1, "x").await;
    }
}
