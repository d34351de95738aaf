//! Remote resource model.
//!
//! The core never owns remote objects; a `Manifest` only lives for the scope of
//! one reconciliation step.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of remote objects the tasks converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    ServiceAccount,
    ClusterRole,
    ClusterRoleBinding,
    Service,
    Deployment,
    ServiceMonitor,
    CustomResourceDefinition,
}

impl ResourceKind {
    /// Cluster-scoped kinds carry no namespace.
    pub fn is_cluster_scoped(self) -> bool {
        matches!(
            self,
            ResourceKind::ClusterRole
                | ResourceKind::ClusterRoleBinding
                | ResourceKind::CustomResourceDefinition
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::Service => "Service",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ServiceMonitor => "ServiceMonitor",
            ResourceKind::CustomResourceDefinition => "CustomResourceDefinition",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (kind, namespace, name) coordinates of a remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn namespaced(
        kind: ResourceKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn cluster(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// API group/version an object is read or written through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(String);

impl ApiVersion {
    pub const CORE_V1: &'static str = "v1";
    pub const APPS_V1: &'static str = "apps/v1";
    /// Deployment shape used before the selector change.
    pub const APPS_V1BETA2: &'static str = "apps/v1beta2";
    pub const RBAC_V1: &'static str = "rbac.authorization.k8s.io/v1";
    pub const MONITORING_V1: &'static str = "monitoring.coreos.com/v1";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How dependents of a deleted object are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeletePropagation {
    /// Dependents (replica sets, pods) are removed before the delete completes.
    Foreground,
    Background,
    Orphan,
}

/// A desired (or observed) remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub api_version: ApiVersion,
    pub key: ObjectKey,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub spec: serde_json::Value,
}

impl Manifest {
    pub fn new(api_version: ApiVersion, key: ObjectKey) -> Self {
        Self {
            api_version,
            key,
            labels: BTreeMap::new(),
            spec: serde_json::Value::Null,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.spec = spec;
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn kind(&self) -> ResourceKind {
        self.key.kind
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.key.namespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_scoped_kinds() {
        assert!(ResourceKind::ClusterRole.is_cluster_scoped());
        assert!(ResourceKind::ClusterRoleBinding.is_cluster_scoped());
        assert!(!ResourceKind::Deployment.is_cluster_scoped());
        assert!(!ResourceKind::ServiceAccount.is_cluster_scoped());
    }

    #[test]
    fn object_key_display() {
        let ns = ObjectKey::namespaced(ResourceKind::Deployment, "mon", "prometheus-operator");
        assert_eq!(ns.to_string(), "Deployment mon/prometheus-operator");

        let cluster = ObjectKey::cluster(ResourceKind::ClusterRole, "prometheus-operator");
        assert_eq!(cluster.to_string(), "ClusterRole prometheus-operator");
    }

    #[test]
    fn manifest_labels_are_readable() {
        let m = Manifest::new(
            ApiVersion::new(ApiVersion::APPS_V1BETA2),
            ObjectKey::namespaced(ResourceKind::Deployment, "mon", "po"),
        )
        .with_label("k8s-app", "prometheus-operator");

        assert_eq!(m.label("k8s-app"), Some("prometheus-operator"));
        assert_eq!(m.label("app"), None);
        assert_eq!(m.namespace(), Some("mon"));
    }

    #[test]
    fn manifest_json_shape() {
        let m = Manifest::new(
            ApiVersion::new(ApiVersion::CORE_V1),
            ObjectKey::cluster(ResourceKind::ClusterRole, "x"),
        );
        let v = serde_json::to_value(&m).unwrap();

        assert_eq!(v["api_version"], "v1");
        assert_eq!(v["key"]["kind"], "ClusterRole");
        // 空の labels / namespace は出力しない
        assert!(v.get("labels").is_none());
        assert!(v["key"].get("namespace").is_none());
    }
}
