//! ControlPlane port - リモート control plane へのクライアント
//!
//! ワイヤプロトコルは実装側の責務です。この trait は tasks が消費する
//! create-or-update / get / delete / wait の primitive だけを定義します。

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{ApiVersion, ClientError, DeletePropagation, Manifest, ObjectKey};

/// Shared handle to the control plane.
///
/// 複数タスクから同時に呼ばれます。同時実行制御（楽観的ロック等）は
/// リモート側に任せ、クライアント側ではロックしません。
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Create the object if absent, otherwise update it to the desired state.
    /// Applying an unchanged desired state is a no-op.
    async fn create_or_update(&self, manifest: &Manifest) -> Result<(), ClientError>;

    /// Fetch an object through a specific API shape.
    /// Absence is reported as `ClientError::NotFound`.
    async fn get(&self, api: &ApiVersion, key: &ObjectKey) -> Result<Manifest, ClientError>;

    async fn delete(
        &self,
        api: &ApiVersion,
        key: &ObjectKey,
        propagation: DeletePropagation,
    ) -> Result<(), ClientError>;

    async fn namespaces_to_monitor(&self) -> Result<BTreeSet<String>, ClientError>;

    /// Block until the operator-owned CRDs report ready. Timeout policy is the
    /// implementation's.
    async fn wait_for_crds_ready(&self) -> Result<(), ClientError>;
}
