//! Manifest factory port.
//!
//! desired state の決定はここの責務です。tasks は組み立てた結果を適用するだけ。

use std::collections::BTreeSet;

use crate::domain::{Manifest, ManifestError};

/// Builds the desired objects of an operator deployment.
pub trait OperatorManifests: Send + Sync {
    fn service_account(&self) -> Result<Manifest, ManifestError>;

    fn cluster_role(&self) -> Result<Manifest, ManifestError>;

    fn cluster_role_binding(&self) -> Result<Manifest, ManifestError>;

    fn service(&self) -> Result<Manifest, ManifestError>;

    fn deployment(&self, namespaces: &BTreeSet<String>) -> Result<Manifest, ManifestError>;

    fn service_monitor(&self) -> Result<Manifest, ManifestError>;
}
