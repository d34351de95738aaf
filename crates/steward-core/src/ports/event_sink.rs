//! EventSink port - runner の観測イベントの出力先
//!
//! runner にはグローバルな logger ではなく明示的に sink を渡します。

use crate::domain::RunnerEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RunnerEvent);
}
