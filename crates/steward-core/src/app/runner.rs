//! TaskRunner - TaskSpec 群を並行に実行し、結果を 1 つにまとめる
//!
//! # 集約ルール
//! - 全タスクを起動し、兄弟が失敗しても止めない（キャンセル伝播なし）
//! - 全タスクの終了を待ってから返す
//! - 返すのは **最初に完了した** 失敗（JoinSet の完了順）。起動順ではない
//! - それ以外の失敗も集約前に 1 件ずつ error ログと sink に出す

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinError, JoinSet};
use tracing::{Instrument, debug, error, info_span};

use crate::domain::{RunId, RunnerEvent, RunnerEventKind, TaskError};
use crate::impls::TracingEventSink;
use crate::ports::{Clock, ControlPlane, EventSink, IdGenerator, SystemClock, UlidGenerator};
use crate::tasks::TaskSpec;

/// Runs one reconciliation cycle. Created per cycle and consumed by `run_all`.
///
/// # 使用例
/// ```ignore
/// let runner = TaskRunner::new(client.clone(), vec![
///     TaskSpec::new("PrometheusOperator", OperatorTask::new(client, factory, "Prometheus Operator")),
/// ]);
/// runner.run_all().await?;
/// ```
pub struct TaskRunner {
    client: Arc<dyn ControlPlane>,
    tasks: Vec<TaskSpec>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl TaskRunner {
    pub fn new(client: Arc<dyn ControlPlane>, tasks: Vec<TaskSpec>) -> Self {
        Self {
            client,
            tasks,
            sink: Arc::new(TracingEventSink),
            clock: Arc::new(SystemClock),
            ids: Box::new(UlidGenerator::new(SystemClock)),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Clock used for event timestamps and the run id.
    pub fn with_clock<C: Clock + Clone + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock.clone());
        self.ids = Box::new(UlidGenerator::new(clock));
        self
    }

    pub fn client(&self) -> &Arc<dyn ControlPlane> {
        &self.client
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Run a single spec inline, attributing a failure to its name.
    pub async fn execute_task(&self, spec: &TaskSpec) -> Result<(), TaskError> {
        execute(spec).await
    }

    /// Launch every task concurrently and wait for all of them.
    pub async fn run_all(self) -> Result<(), TaskError> {
        let run = self.ids.generate_run_id();
        let total = self.tasks.len();
        let span = info_span!("run_all", %run, total);

        let reporter = Reporter {
            run,
            total,
            sink: self.sink,
            clock: self.clock,
        };
        join_all(reporter, self.tasks).instrument(span).await
    }
}

async fn execute(spec: &TaskSpec) -> Result<(), TaskError> {
    spec.task()
        .run()
        .await
        .map_err(|source| TaskError::Failed {
            name: spec.name().to_string(),
            source,
        })
}

/// Emits runner events for one cycle.
#[derive(Clone)]
struct Reporter {
    run: RunId,
    total: usize,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl Reporter {
    fn emit(&self, index: usize, name: &str, kind: RunnerEventKind) {
        self.sink.emit(&RunnerEvent {
            run: self.run,
            at: self.clock.now(),
            index,
            total: self.total,
            name: name.to_string(),
            kind,
        });
    }

    fn started(&self, index: usize, name: &str) {
        self.emit(index, name, RunnerEventKind::TaskStarted);
    }

    fn finished(&self, index: usize, name: &str, result: &Result<(), TaskError>) {
        let error = result.as_ref().err().map(ToString::to_string);
        self.emit(index, name, RunnerEventKind::TaskFinished { error });
    }
}

async fn join_all(reporter: Reporter, tasks: Vec<TaskSpec>) -> Result<(), TaskError> {
    let mut set = JoinSet::new();
    // panic した worker の名前を引くため（index は 1 始まり）
    let mut launched: HashMap<task::Id, (usize, String)> = HashMap::with_capacity(tasks.len());

    for (i, spec) in tasks.into_iter().enumerate() {
        let index = i + 1;
        let name = spec.name().to_string();
        let reporter = reporter.clone();

        let handle = set.spawn(
            async move {
                reporter.started(index, spec.name());
                let result = execute(&spec).await;
                reporter.finished(index, spec.name(), &result);
                result
            }
            .in_current_span(),
        );
        launched.insert(handle.id(), (index, name));
    }

    let mut first: Option<TaskError> = None;
    let mut failed = 0usize;

    while let Some(joined) = set.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(join_err) => {
                // worker 内で finished を出せなかったので、ここで補う
                let err = from_join_error(&launched, &join_err);
                if let Some((index, name)) = launched.get(&join_err.id()) {
                    reporter.emit(
                        *index,
                        name,
                        RunnerEventKind::TaskFinished {
                            error: Some(err.to_string()),
                        },
                    );
                }
                Err(err)
            }
        };

        let Err(err) = result else {
            continue;
        };
        failed += 1;
        error!(task = err.task_name(), error = %err, "task failed");
        if first.is_none() {
            first = Some(err);
        }
    }

    debug!(failed, "all tasks finished");
    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn from_join_error(launched: &HashMap<task::Id, (usize, String)>, err: &JoinError) -> TaskError {
    let name = launched
        .get(&err.id())
        .map(|(_, name)| name.clone())
        .unwrap_or_default();
    if err.is_panic() {
        TaskError::Panicked { name }
    } else {
        TaskError::Aborted { name }
    }
}
