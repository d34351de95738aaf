//! Ports - 抽象化レイヤー
//!
//! tasks / runner が消費する外部コラボレータのインターフェースです。
//! 実装は `impls`（in-memory）か、利用側のクレートが提供します。

pub mod clock;
pub mod control_plane;
pub mod event_sink;
pub mod id_generator;
pub mod manifests;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::control_plane::ControlPlane;
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::manifests::OperatorManifests;
