//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryControlPlane**: 呼び出しを記録する control plane
//! - **StaticOperatorManifests**: 設定値から作る manifest factory
//! - **TracingEventSink / RecordingEventSink / NoopEventSink**

pub mod event_sink;
pub mod inmem_control_plane;
pub mod static_manifests;

pub use self::event_sink::{NoopEventSink, RecordingEventSink, TracingEventSink};
pub use self::inmem_control_plane::{Call, InMemoryControlPlane, Op};
pub use self::static_manifests::StaticOperatorManifests;
