//! Errors - エラー型と分類
//!
//! # 分類
//! - `ClientError`: control plane 呼び出しの失敗（NotFound は区別可能）
//! - `ManifestError`: desired object の組み立て失敗
//! - `StepError`: 1 ステップの失敗 + そのステップを表す固定フレーズ
//! - `TaskError`: タスクから漏れた `StepError` にタスク名を付けたもの

use thiserror::Error;

use super::resource::ObjectKey;

/// Control plane call failure.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{key} not found")]
    NotFound { key: ObjectKey },

    #[error("conflict on {key}: {message}")]
    Conflict { key: ObjectKey, message: String },

    #[error("forbidden on {key}: {message}")]
    Forbidden { key: ObjectKey, message: String },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Api(String),
}

impl ClientError {
    pub fn api(message: impl Into<String>) -> Self {
        ClientError::Api(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Manifest factory failure.
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Invalid(String),

    #[error("missing value for {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum StepCause {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// A single create/update/get/delete/wait/build call failed.
///
/// `action` is a fixed phrase naming the resource and action, e.g.
/// "reconciling Prometheus Operator Deployment".
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct StepError {
    action: String,
    #[source]
    source: StepCause,
}

impl StepError {
    pub fn new(action: impl Into<String>, source: impl Into<StepCause>) -> Self {
        Self {
            action: action.into(),
            source: source.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn cause(&self) -> &StepCause {
        &self.source
    }
}

/// Extension for attaching the step phrase while propagating with `?`.
pub trait StepContext<T> {
    fn step(self, action: &str) -> Result<T, StepError>;
}

impl<T, E: Into<StepCause>> StepContext<T> for Result<T, E> {
    fn step(self, action: &str) -> Result<T, StepError> {
        self.map_err(|e| StepError::new(action, e))
    }
}

/// A task's convergence failed; carries the task name for attribution.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("running task {name} failed: {source}")]
    Failed {
        name: String,
        #[source]
        source: StepError,
    },

    #[error("running task {name} failed: worker panicked")]
    Panicked { name: String },

    #[error("running task {name} failed: worker aborted")]
    Aborted { name: String },
}

impl TaskError {
    pub fn task_name(&self) -> &str {
        match self {
            TaskError::Failed { name, .. }
            | TaskError::Panicked { name }
            | TaskError::Aborted { name } => name,
        }
    }
}
