//! EventSink の実装
//!
//! - `TracingEventSink`: tracing の trace レベルに流す（既定）
//! - `RecordingEventSink`: メモリに溜める（テスト用）
//! - `NoopEventSink`: 何もしない

use std::sync::Mutex;

use tracing::trace;

use crate::domain::{RunnerEvent, RunnerEventKind};
use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &RunnerEvent) {
        match &event.kind {
            RunnerEventKind::TaskStarted => trace!(
                run = %event.run,
                task = %event.name,
                "running task {} of {}: {}",
                event.index,
                event.total,
                event.name
            ),
            RunnerEventKind::TaskFinished { error } => trace!(
                run = %event.run,
                task = %event.name,
                error = error.as_deref(),
                "ran task {} of {}: {}",
                event.index,
                event.total,
                event.name
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &RunnerEvent) {}
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<RunnerEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunnerEvent> {
        // poison されても記録済みのイベントは読める
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events for one task name, in emission order.
    pub fn events_for(&self, name: &str) -> Vec<RunnerEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &RunnerEvent) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event.clone());
    }
}
