//! SimpleTask - create-or-update を固定順で並べただけのタスク
//!
//! 移行や待機のロジックは持たない。各ステップは
//! "initializing <resource>" → "reconciling <resource>" の 2 段で失敗を包む。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Manifest, ManifestError, StepContext, StepError};
use crate::ports::ControlPlane;
use crate::tasks::Task;

type BuildFn = dyn Fn() -> Result<Manifest, ManifestError> + Send + Sync;

/// One create-or-update of a single remote object.
pub struct ApplyStep {
    resource: String,
    build: Box<BuildFn>,
}

impl ApplyStep {
    /// `resource` names the object in error phrases, e.g. "Grafana Service".
    pub fn new<F>(resource: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<Manifest, ManifestError> + Send + Sync + 'static,
    {
        Self {
            resource: resource.into(),
            build: Box::new(build),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

pub struct SimpleTask {
    client: Arc<dyn ControlPlane>,
    steps: Vec<ApplyStep>,
}

impl SimpleTask {
    pub fn new(client: Arc<dyn ControlPlane>) -> Self {
        Self {
            client,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: ApplyStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Shorthand for `step(ApplyStep::new(..))`.
    pub fn apply<F>(self, resource: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<Manifest, ManifestError> + Send + Sync + 'static,
    {
        self.step(ApplyStep::new(resource, build))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl Task for SimpleTask {
    async fn run(&self) -> Result<(), StepError> {
        for step in &self.steps {
            let manifest =
                (step.build)().step(&format!("initializing {}", step.resource))?;
            self.client
                .create_or_update(&manifest)
                .await
                .step(&format!("reconciling {}", step.resource))?;
            debug!(resource = %step.resource, key = %manifest.key, "reconciled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiVersion, ClientError, ObjectKey, ResourceKind};
    use crate::impls::{Call, InMemoryControlPlane, Op};

    fn service(name: &str) -> Manifest {
        Manifest::new(
            ApiVersion::new(ApiVersion::CORE_V1),
            ObjectKey::namespaced(ResourceKind::Service, "mon", name),
        )
    }

    #[tokio::test]
    async fn applies_steps_in_order() {
        let cp = Arc::new(InMemoryControlPlane::new());
        let task = SimpleTask::new(cp.clone())
            .apply("Grafana Service", || Ok(service("grafana")))
            .apply("Alertmanager Service", || Ok(service("alertmanager")));

        task.run().await.unwrap();

        let names: Vec<String> = cp
            .calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateOrUpdate(key) => Some(key.name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["grafana", "alertmanager"]);
    }

    #[tokio::test]
    async fn build_failure_stops_before_any_write() {
        let cp = Arc::new(InMemoryControlPlane::new());
        let task = SimpleTask::new(cp.clone())
            .apply("Grafana Service", || {
                Err(ManifestError::Missing("grafana image".into()))
            })
            .apply("Alertmanager Service", || Ok(service("alertmanager")));

        let err = task.run().await.unwrap_err();

        assert_eq!(err.action(), "initializing Grafana Service");
        assert!(cp.calls().await.is_empty());
    }

    #[tokio::test]
    async fn client_failure_is_wrapped_and_fails_fast() {
        let cp = Arc::new(InMemoryControlPlane::new());
        cp.fail_on(Op::CreateOrUpdate, ClientError::api("boom")).await;
        let task = SimpleTask::new(cp.clone())
            .apply("Grafana Service", || Ok(service("grafana")))
            .apply("Alertmanager Service", || Ok(service("alertmanager")));

        let err = task.run().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "reconciling Grafana Service failed: boom"
        );
        assert_eq!(cp.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_task_succeeds() {
        let cp = Arc::new(InMemoryControlPlane::new());
        let task = SimpleTask::new(cp);
        assert!(task.is_empty());
        task.run().await.unwrap();
    }
}
