//! Events - runner が発行する観測イベント
//!
//! `index` は 1 始まりの起動順の位置です。完了順ではありません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RunId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEventKind {
    TaskStarted,
    TaskFinished {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// One observability record keyed by task name and position (`index` of `total`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerEvent {
    pub run: RunId,
    pub at: DateTime<Utc>,
    pub index: usize,
    pub total: usize,
    pub name: String,
    #[serde(flatten)]
    pub kind: RunnerEventKind,
}

impl RunnerEvent {
    pub fn is_started(&self) -> bool {
        matches!(self.kind, RunnerEventKind::TaskStarted)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.kind, RunnerEventKind::TaskFinished { .. })
    }

    /// `Some(true)` for a successful finish, `Some(false)` for a failed one.
    pub fn succeeded(&self) -> Option<bool> {
        match &self.kind {
            RunnerEventKind::TaskStarted => None,
            RunnerEventKind::TaskFinished { error } => Some(error.is_none()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    #[test]
    fn finished_event_json_shape() {
        let ev = RunnerEvent {
            run: RunId::from_ulid(Ulid::nil()),
            at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            index: 2,
            total: 3,
            name: "B".into(),
            kind: RunnerEventKind::TaskFinished {
                error: Some("boom".into()),
            },
        };

        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "task_finished");
        assert_eq!(v["error"], "boom");
        assert_eq!(v["index"], 2);
        assert_eq!(ev.succeeded(), Some(false));
    }
}
