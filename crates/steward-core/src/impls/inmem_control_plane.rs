//! InMemoryControlPlane - 開発・テスト用の control plane
//!
//! # 実装詳細
//! - オブジェクトは `ObjectKey` で保持する（API version に依らず同じ実体が見える）
//! - create-or-update は保存済みと等しければ書き込みを記録しない
//! - 全呼び出しを `Call` として記録する（失敗した呼び出しも含む）
//! - `Op` ごとに失敗を注入できる（1 回だけ / 常に）

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ApiVersion, ClientError, DeletePropagation, Manifest, ObjectKey};
use crate::ports::ControlPlane;

/// Operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateOrUpdate,
    Get,
    Delete,
    NamespacesToMonitor,
    WaitForCrdsReady,
}

/// Journal entry for one control plane call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateOrUpdate(ObjectKey),
    Get(ApiVersion, ObjectKey),
    Delete(ApiVersion, ObjectKey, DeletePropagation),
    NamespacesToMonitor,
    WaitForCrdsReady,
}

struct Failure {
    error: ClientError,
    once: bool,
}

#[derive(Default)]
struct State {
    objects: HashMap<ObjectKey, Manifest>,
    namespaces: BTreeSet<String>,
    calls: Vec<Call>,
    failures: HashMap<Op, Failure>,
    writes: usize,
}

impl State {
    /// 呼び出しを記録し、注入された失敗があれば返す
    fn enter(&mut self, op: Op, call: Call) -> Result<(), ClientError> {
        self.calls.push(call);
        let Some(failure) = self.failures.get(&op) else {
            return Ok(());
        };
        let error = failure.error.clone();
        if failure.once {
            self.failures.remove(&op);
        }
        Err(error)
    }
}

#[derive(Default)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces<I, S>(self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // 構築中なので他に参照はない
        let mut state = self.state.into_inner();
        state.namespaces = namespaces.into_iter().map(Into::into).collect();
        Self {
            state: Mutex::new(state),
        }
    }

    /// Store an object directly, bypassing the journal and write counter.
    pub async fn seed(&self, manifest: Manifest) {
        let mut state = self.state.lock().await;
        state.objects.insert(manifest.key.clone(), manifest);
    }

    /// Fail every call of `op` until `clear_failures`.
    pub async fn fail_on(&self, op: Op, error: ClientError) {
        let mut state = self.state.lock().await;
        state.failures.insert(op, Failure { error, once: false });
    }

    /// Fail the next call of `op` only.
    pub async fn fail_once(&self, op: Op, error: ClientError) {
        let mut state = self.state.lock().await;
        state.failures.insert(op, Failure { error, once: true });
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    pub async fn object(&self, key: &ObjectKey) -> Option<Manifest> {
        self.state.lock().await.objects.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    /// Number of create-or-update calls that changed stored state.
    pub async fn writes(&self) -> usize {
        self.state.lock().await.writes
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn create_or_update(&self, manifest: &Manifest) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.enter(Op::CreateOrUpdate, Call::CreateOrUpdate(manifest.key.clone()))?;

        if state.objects.get(&manifest.key) == Some(manifest) {
            return Ok(());
        }
        state.objects.insert(manifest.key.clone(), manifest.clone());
        state.writes += 1;
        Ok(())
    }

    async fn get(&self, api: &ApiVersion, key: &ObjectKey) -> Result<Manifest, ClientError> {
        let mut state = self.state.lock().await;
        state.enter(Op::Get, Call::Get(api.clone(), key.clone()))?;

        state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound { key: key.clone() })
    }

    async fn delete(
        &self,
        api: &ApiVersion,
        key: &ObjectKey,
        propagation: DeletePropagation,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.enter(
            Op::Delete,
            Call::Delete(api.clone(), key.clone(), propagation),
        )?;

        match state.objects.remove(key) {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound { key: key.clone() }),
        }
    }

    async fn namespaces_to_monitor(&self) -> Result<BTreeSet<String>, ClientError> {
        let mut state = self.state.lock().await;
        state.enter(Op::NamespacesToMonitor, Call::NamespacesToMonitor)?;
        Ok(state.namespaces.clone())
    }

    async fn wait_for_crds_ready(&self) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        state.enter(Op::WaitForCrdsReady, Call::WaitForCrdsReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;

    fn sa(name: &str) -> Manifest {
        Manifest::new(
            ApiVersion::new(ApiVersion::CORE_V1),
            ObjectKey::namespaced(ResourceKind::ServiceAccount, "mon", name),
        )
    }

    #[tokio::test]
    async fn unchanged_create_or_update_is_not_a_write() {
        let cp = InMemoryControlPlane::new();

        cp.create_or_update(&sa("a")).await.unwrap();
        cp.create_or_update(&sa("a")).await.unwrap();
        assert_eq!(cp.writes().await, 1);

        let changed = sa("a").with_label("x", "y");
        cp.create_or_update(&changed).await.unwrap();
        assert_eq!(cp.writes().await, 2);
        assert_eq!(cp.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let cp = InMemoryControlPlane::new();
        let err = cp
            .get(&ApiVersion::new(ApiVersion::CORE_V1), &sa("a").key)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let cp = InMemoryControlPlane::new();
        cp.seed(sa("a")).await;
        let api = ApiVersion::new(ApiVersion::CORE_V1);

        cp.delete(&api, &sa("a").key, DeletePropagation::Foreground)
            .await
            .unwrap();

        assert!(cp.is_empty().await);
        let again = cp
            .delete(&api, &sa("a").key, DeletePropagation::Foreground)
            .await
            .unwrap_err();
        assert!(again.is_not_found());
    }

    #[tokio::test]
    async fn fail_once_clears_after_first_call() {
        let cp = InMemoryControlPlane::new();
        cp.fail_once(Op::WaitForCrdsReady, ClientError::Timeout("crds".into()))
            .await;

        assert!(cp.wait_for_crds_ready().await.is_err());
        assert!(cp.wait_for_crds_ready().await.is_ok());
    }

    #[tokio::test]
    async fn fail_on_persists_until_cleared() {
        let cp = InMemoryControlPlane::new().with_namespaces(["a", "b"]);
        cp.fail_on(Op::NamespacesToMonitor, ClientError::api("down"))
            .await;

        assert!(cp.namespaces_to_monitor().await.is_err());
        assert!(cp.namespaces_to_monitor().await.is_err());

        cp.clear_failures().await;
        let ns = cp.namespaces_to_monitor().await.unwrap();
        assert_eq!(ns.len(), 2);
    }
}
