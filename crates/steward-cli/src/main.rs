use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use steward_core::domain::{
    ApiVersion, Manifest, ObjectKey, ResourceKind, StepContext, StepError,
};
use steward_core::impls::{InMemoryControlPlane, StaticOperatorManifests};
use steward_core::observability::logger_init;
use steward_core::ports::ControlPlane;
use steward_core::{OperatorTask, SimpleTask, StewardConfig, Task, TaskRunner, TaskSpec};

/// 監視対象 namespace を数えるだけのタスク（外部 Task 実装の例）
struct NamespaceInventoryTask {
    client: Arc<dyn ControlPlane>,
}

#[async_trait]
impl Task for NamespaceInventoryTask {
    async fn run(&self) -> Result<(), StepError> {
        let namespaces = self
            .client
            .namespaces_to_monitor()
            .await
            .step("listing namespaces to monitor")?;
        info!(count = namespaces.len(), "namespaces to monitor");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CycleSummary {
    cycle: u32,
    ok: bool,
    writes: usize,
    objects: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn service(namespace: &str, name: &str, port: u16) -> Manifest {
    Manifest::new(
        ApiVersion::new(ApiVersion::CORE_V1),
        ObjectKey::namespaced(ResourceKind::Service, namespace, name),
    )
    .with_label("app.kubernetes.io/name", name)
    .with_spec(json!({ "ports": [{ "port": port }] }))
}

fn service_account(namespace: &str, name: &str) -> Manifest {
    Manifest::new(
        ApiVersion::new(ApiVersion::CORE_V1),
        ObjectKey::namespaced(ResourceKind::ServiceAccount, namespace, name),
    )
}

/// TaskSpec は cycle ごとに作り直す
fn build_tasks(cfg: &StewardConfig, client: &Arc<InMemoryControlPlane>) -> Vec<TaskSpec> {
    let cp: Arc<dyn ControlPlane> = client.clone();
    let factory = Arc::new(StaticOperatorManifests::new(&cfg.namespace));
    let ns = cfg.namespace.clone();

    let grafana = {
        let (a, b) = (ns.clone(), ns.clone());
        SimpleTask::new(cp.clone())
            .apply("Grafana ServiceAccount", move || {
                Ok(service_account(&a, "grafana"))
            })
            .apply("Grafana Service", move || Ok(service(&b, "grafana", 3000)))
    };
    let alertmanager = {
        let a = ns.clone();
        SimpleTask::new(cp.clone()).apply("Alertmanager Service", move || {
            Ok(service(&a, "alertmanager-main", 9093))
        })
    };

    vec![
        TaskSpec::new(
            "PrometheusOperator",
            OperatorTask::new(cp.clone(), factory, &cfg.component).with_legacy(cfg.legacy.clone()),
        ),
        TaskSpec::new("Grafana", grafana),
        TaskSpec::new("Alertmanager", alertmanager),
        TaskSpec::new("NamespaceInventory", NamespaceInventoryTask { client: cp }),
    ]
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match std::env::args().nth(1) {
        Some(path) => StewardConfig::load(&path),
        None => Ok(StewardConfig::default()),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("steward: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logger_init(&cfg.logger) {
        eprintln!("steward: {e}");
        return ExitCode::FAILURE;
    }

    // 旧 API 形状の deployment が残っている状態から始める
    let client = Arc::new(
        InMemoryControlPlane::new().with_namespaces(cfg.monitored_namespaces.clone()),
    );
    client
        .seed(
            Manifest::new(
                ApiVersion::new(cfg.legacy.api_version.clone()),
                ObjectKey::namespaced(ResourceKind::Deployment, &cfg.namespace, "prometheus-operator"),
            )
            .with_label(&cfg.legacy.label_key, &cfg.legacy.label_value),
        )
        .await;

    for cycle in 1..=cfg.cycles.max(1) {
        let before = client.writes().await;
        let runner = TaskRunner::new(client.clone(), build_tasks(&cfg, &client));
        let result = runner.run_all().await;

        let summary = CycleSummary {
            cycle,
            ok: result.is_ok(),
            writes: client.writes().await - before,
            objects: client.len().await,
            error: result.as_ref().err().map(ToString::to_string),
        };
        match serde_json::to_string(&summary) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(error = %e, "encoding cycle summary failed"),
        }

        if let Err(e) = result {
            error!(cycle, error = %e, "reconciliation cycle failed");
            return ExitCode::FAILURE;
        }
        info!(cycle, writes = summary.writes, "reconciliation cycle finished");
    }

    ExitCode::SUCCESS
}
