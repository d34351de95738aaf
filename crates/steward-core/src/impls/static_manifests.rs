//! StaticOperatorManifests - 設定値だけから operator の manifest を組み立てる
//!
//! demo バイナリとテスト用。本番の manifest factory は利用側が提供する。

use std::collections::BTreeSet;

use serde_json::json;

use crate::domain::{ApiVersion, Manifest, ManifestError, ObjectKey, ResourceKind};
use crate::ports::OperatorManifests;

pub const NAME_LABEL: &str = "app.kubernetes.io/name";

#[derive(Debug, Clone)]
pub struct StaticOperatorManifests {
    namespace: String,
    name: String,
    image: String,
}

impl StaticOperatorManifests {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: "prometheus-operator".to_string(),
            image: "quay.io/prometheus-operator/prometheus-operator:latest".to_string(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    fn namespaced(&self, api: &str, kind: ResourceKind) -> Result<Manifest, ManifestError> {
        if self.namespace.is_empty() {
            return Err(ManifestError::Missing(format!("{kind} namespace")));
        }
        Ok(Manifest::new(
            ApiVersion::new(api),
            ObjectKey::namespaced(kind, &self.namespace, &self.name),
        )
        .with_label(NAME_LABEL, &self.name))
    }

    fn cluster(&self, kind: ResourceKind) -> Manifest {
        Manifest::new(
            ApiVersion::new(ApiVersion::RBAC_V1),
            ObjectKey::cluster(kind, &self.name),
        )
        .with_label(NAME_LABEL, &self.name)
    }
}

impl OperatorManifests for StaticOperatorManifests {
    fn service_account(&self) -> Result<Manifest, ManifestError> {
        self.namespaced(ApiVersion::CORE_V1, ResourceKind::ServiceAccount)
    }

    fn cluster_role(&self) -> Result<Manifest, ManifestError> {
        Ok(self.cluster(ResourceKind::ClusterRole).with_spec(json!({
            "rules": [
                { "apiGroups": ["monitoring.coreos.com"], "resources": ["*"], "verbs": ["*"] },
                { "apiGroups": ["apps"], "resources": ["statefulsets"], "verbs": ["*"] }
            ]
        })))
    }

    fn cluster_role_binding(&self) -> Result<Manifest, ManifestError> {
        Ok(self
            .cluster(ResourceKind::ClusterRoleBinding)
            .with_spec(json!({
                "roleRef": { "kind": "ClusterRole", "name": self.name },
                "subjects": [
                    { "kind": "ServiceAccount", "name": self.name, "namespace": self.namespace }
                ]
            })))
    }

    fn service(&self) -> Result<Manifest, ManifestError> {
        Ok(self
            .namespaced(ApiVersion::CORE_V1, ResourceKind::Service)?
            .with_spec(json!({
                "ports": [{ "name": "http", "port": 8080 }],
                "selector": { NAME_LABEL: self.name }
            })))
    }

    fn deployment(&self, namespaces: &BTreeSet<String>) -> Result<Manifest, ManifestError> {
        if self.image.is_empty() {
            return Err(ManifestError::Missing("prometheus-operator image".into()));
        }
        Ok(self
            .namespaced(ApiVersion::APPS_V1, ResourceKind::Deployment)?
            .with_spec(json!({
                "selector": { "matchLabels": { NAME_LABEL: self.name } },
                "image": self.image,
                "namespaces": namespaces
            })))
    }

    fn service_monitor(&self) -> Result<Manifest, ManifestError> {
        Ok(self
            .namespaced(ApiVersion::MONITORING_V1, ResourceKind::ServiceMonitor)?
            .with_spec(json!({
                "endpoints": [{ "port": "http" }],
                "selector": { "matchLabels": { NAME_LABEL: self.name } }
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_lists_namespaces_and_uses_new_labels() {
        let f = StaticOperatorManifests::new("mon");
        let ns: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();

        let d = f.deployment(&ns).unwrap();

        assert_eq!(d.api_version.as_str(), ApiVersion::APPS_V1);
        assert_eq!(d.spec["namespaces"], json!(["a", "b"]));
        // legacy ラベルは付けない（付けると毎回移行対象になる）
        assert_eq!(d.label("k8s-app"), None);
        assert_eq!(d.label(NAME_LABEL), Some("prometheus-operator"));
    }

    #[test]
    fn cluster_scoped_objects_have_no_namespace() {
        let f = StaticOperatorManifests::new("mon");
        assert_eq!(f.cluster_role().unwrap().namespace(), None);
        assert_eq!(f.cluster_role_binding().unwrap().namespace(), None);
    }

    #[test]
    fn missing_image_is_an_error() {
        let f = StaticOperatorManifests::new("mon").with_image("");
        let err = f.deployment(&BTreeSet::new()).unwrap_err();
        assert!(matches!(err, ManifestError::Missing(_)));
    }

    #[test]
    fn empty_namespace_is_an_error() {
        let f = StaticOperatorManifests::new("");
        assert!(f.service_account().is_err());
    }
}
