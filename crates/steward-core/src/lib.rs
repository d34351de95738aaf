//! steward-core
//!
//! Reconciliation task orchestration: a named set of independent tasks runs
//! concurrently against a control plane and one aggregated result is returned.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, resource, errors, events）
//! - **ports**: 外部コラボレータの抽象（ControlPlane, OperatorManifests, EventSink, Clock）
//! - **tasks**: Task trait, TaskSpec, SimpleTask, OperatorTask
//! - **app**: TaskRunner, StewardConfig
//! - **impls**: in-memory 実装（開発・テスト用）
//! - **observability**: tracing-subscriber の初期化

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod tasks;

pub use app::{StewardConfig, TaskRunner};
pub use domain::{StepError, TaskError};
pub use tasks::{OperatorTask, SimpleTask, Task, TaskSpec};
