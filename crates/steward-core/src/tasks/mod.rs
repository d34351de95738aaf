//! Tasks - 並行実行される reconciliation の単位
//!
//! # 構成
//! - `Task` trait: 引数なしの `run()` だけを持つ
//! - `TaskSpec`: 名前と Task の組（名前はログとエラーの帰属にだけ使う）
//! - `SimpleTask`: 固定の create-or-update 列
//! - `OperatorTask`: 依存順のステップ + legacy deployment の移行 + CRD 待ち

pub mod operator;
pub mod simple;

use std::fmt;

use async_trait::async_trait;

use crate::domain::StepError;

pub use self::operator::{LegacyDeployment, OperatorTask};
pub use self::simple::{ApplyStep, SimpleTask};

/// A unit of convergence.
///
/// Steps inside one `run` are strictly sequential and fail fast; the first
/// failing step is returned and the rest are never invoked. Tasks keep no
/// state between runs, so running one twice against an unchanged desired
/// state issues no new writes.
#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self) -> Result<(), StepError>;
}

/// Named binding of a task, used for logging and error attribution.
///
/// Names are not checked for uniqueness; duplicates make diagnostics ambiguous.
pub struct TaskSpec {
    name: String,
    task: Box<dyn Task>,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, task: impl Task + 'static) -> Self {
        Self {
            name: name.into(),
            task: Box::new(task),
        }
    }

    pub fn from_boxed(name: impl Into<String>, task: Box<dyn Task>) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec").field("name", &self.name).finish()
    }
}
