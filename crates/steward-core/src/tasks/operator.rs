//! OperatorTask - operator の Deployment 一式を依存順に収束させる
//!
//! # ステップ（fail-fast）
//! 1. ServiceAccount
//! 2. ClusterRole
//! 3. ClusterRoleBinding
//! 4. Service
//! 5. 監視対象 namespace の列挙 → Deployment の組み立て
//! 6. 旧 API 形状の Deployment が legacy ラベル付きで残っていれば foreground 削除
//! 7. Deployment の create-or-update
//! 8. CRD の ready 待ち
//! 9. ServiceMonitor
//!
//! 6 と 7 はトランザクションではない。同じリソース集合に対して runner が
//! 同時に 1 つしか動かない前提（single writer）に依存している。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    ApiVersion, DeletePropagation, Manifest, ManifestError, StepContext, StepError,
};
use crate::ports::{ControlPlane, OperatorManifests};
use crate::tasks::Task;

/// Marker of a deployment left behind by an earlier reconciliation.
///
/// The object is fetched through `api_version` at the desired deployment's
/// coordinates and removed only when `label_key=label_value` is set on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyDeployment {
    pub api_version: String,
    pub label_key: String,
    pub label_value: String,
    /// Name used in error phrases, e.g. "prometheus-operator".
    pub display_name: String,
}

impl Default for LegacyDeployment {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::APPS_V1BETA2.to_string(),
            label_key: "k8s-app".to_string(),
            label_value: "prometheus-operator".to_string(),
            display_name: "prometheus-operator".to_string(),
        }
    }
}

impl LegacyDeployment {
    pub fn matches(&self, observed: &Manifest) -> bool {
        observed.label(&self.label_key) == Some(self.label_value.as_str())
    }
}

pub struct OperatorTask {
    client: Arc<dyn ControlPlane>,
    factory: Arc<dyn OperatorManifests>,
    component: String,
    legacy: LegacyDeployment,
}

impl OperatorTask {
    /// `component` names the operator in error phrases, e.g. "Prometheus Operator".
    pub fn new(
        client: Arc<dyn ControlPlane>,
        factory: Arc<dyn OperatorManifests>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            client,
            factory,
            component: component.into(),
            legacy: LegacyDeployment::default(),
        }
    }

    pub fn with_legacy(mut self, legacy: LegacyDeployment) -> Self {
        self.legacy = legacy;
        self
    }

    fn initializing(&self, what: &str) -> String {
        format!("initializing {} {}", self.component, what)
    }

    fn reconciling(&self, what: &str) -> String {
        format!("reconciling {} {}", self.component, what)
    }

    async fn apply(
        &self,
        what: &str,
        built: Result<Manifest, ManifestError>,
    ) -> Result<(), StepError> {
        let manifest = built.step(&self.initializing(what))?;
        self.client
            .create_or_update(&manifest)
            .await
            .step(&self.reconciling(what))
    }

    /// Removes a legacy deployment at the desired deployment's coordinates.
    ///
    /// Not-found means there is nothing to migrate. Any other fetch error is
    /// fatal, as is a failed delete.
    async fn migrate_legacy(&self, desired: &Manifest) -> Result<(), StepError> {
        let api = ApiVersion::new(self.legacy.api_version.clone());
        let found = match self.client.get(&api, &desired.key).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => {
                debug!(key = %desired.key, "no legacy deployment to migrate");
                return Ok(());
            }
            Err(e) => {
                return Err(StepError::new(
                    format!(
                        "retrieving existing {} deployment",
                        self.legacy.display_name
                    ),
                    e,
                ));
            }
        };

        if !self.legacy.matches(&found) {
            return Ok(());
        }

        info!(key = %found.key, api = %api, "deleting legacy deployment");
        self.client
            .delete(&api, &found.key, DeletePropagation::Foreground)
            .await
            .step(&format!("deleting old {} deployment", self.legacy.display_name))
    }
}

#[async_trait]
impl Task for OperatorTask {
    async fn run(&self) -> Result<(), StepError> {
        self.apply("ServiceAccount", self.factory.service_account())
            .await?;
        self.apply("ClusterRole", self.factory.cluster_role()).await?;
        self.apply("ClusterRoleBinding", self.factory.cluster_role_binding())
            .await?;
        self.apply("Service", self.factory.service()).await?;

        let namespaces = self
            .client
            .namespaces_to_monitor()
            .await
            .step("listing namespaces to monitor")?;
        let deployment = self
            .factory
            .deployment(&namespaces)
            .step(&self.initializing("Deployment"))?;

        self.migrate_legacy(&deployment).await?;

        self.client
            .create_or_update(&deployment)
            .await
            .step(&self.reconciling("Deployment"))?;

        self.client
            .wait_for_crds_ready()
            .await
            .step("waiting for Prometheus CRDs to become available")?;

        self.apply("ServiceMonitor", self.factory.service_monitor())
            .await
    }
}
