//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **TaskRunner**: TaskSpec 群の fan-out / join と失敗の集約
//! - **StewardConfig**: 設定の読み込みと検証

pub mod config;
pub mod runner;

pub use self::config::{ConfigError, StewardConfig};
pub use self::runner::TaskRunner;
