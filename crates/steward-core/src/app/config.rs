//! StewardConfig - reconciliation 設定
//!
//! JSON で読み込む。欠けているフィールドは既定値、未知のフィールドはエラー。

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::LoggerConfig;
use crate::tasks::LegacyDeployment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StewardConfig {
    /// Namespace the operator is deployed into.
    pub namespace: String,

    /// Component display name used in error phrases.
    pub component: String,

    /// Namespaces reported by the in-memory control plane of the demo binary.
    pub monitored_namespaces: Vec<String>,

    pub legacy: LegacyDeployment,

    pub logger: LoggerConfig,

    /// Reconciliation cycles the demo binary runs back to back.
    pub cycles: u32,
}

impl Default for StewardConfig {
    fn default() -> Self {
        Self {
            namespace: "openshift-monitoring".to_string(),
            component: "Prometheus Operator".to_string(),
            monitored_namespaces: vec!["openshift-monitoring".to_string()],
            legacy: LegacyDeployment::default(),
            logger: LoggerConfig::default(),
            cycles: 1,
        }
    }
}

impl StewardConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: StewardConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".into()));
        }
        if self.legacy.label_key.is_empty() {
            return Err(ConfigError::Invalid(
                "legacy.label_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::LoggerFormat;
    use rstest::rstest;

    #[test]
    fn empty_object_is_all_defaults() {
        let cfg = StewardConfig::from_json("{}").unwrap();
        assert_eq!(cfg, StewardConfig::default());
        assert_eq!(cfg.legacy.api_version, "apps/v1beta2");
        assert_eq!(cfg.legacy.label_key, "k8s-app");
        assert_eq!(cfg.legacy.label_value, "prometheus-operator");
    }

    #[test]
    fn partial_config_overrides() {
        let cfg = StewardConfig::from_json(
            r#"{
              "namespace": "mon",
              "cycles": 3,
              "logger": { "format": "json", "level": "debug" },
              "legacy": { "label_value": "old-operator" }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.namespace, "mon");
        assert_eq!(cfg.cycles, 3);
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.legacy.label_value, "old-operator");
        assert_eq!(cfg.legacy.label_key, "k8s-app");
    }

    #[rstest]
    #[case(r#"{ "nmespace": "typo" }"#)]
    #[case(r#"{ "cycles": "many" }"#)]
    #[case(r#"{ "logger": { "format": "xml" } }"#)]
    fn malformed_config_is_a_parse_error(#[case] raw: &str) {
        assert!(matches!(
            StewardConfig::from_json(raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn blank_namespace_is_invalid() {
        assert!(matches!(
            StewardConfig::from_json(r#"{ "namespace": " " }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = StewardConfig::load("/nonexistent/steward.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
