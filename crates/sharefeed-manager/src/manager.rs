use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use sharefeed_conductor::ConductorTransport;
use sharefeed_store::{
    local_user_id, KeyValueStore, LocalShareStore, RemoteShareStore, ShareStore, StoreError,
};
use sharefeed_types::{
    ConnectionSettings, ConnectionSettingsUpdate, RetrievalOptions, ShareDraft, ShareId,
    ShareRecord, StorageMode,
};
use sharefeed_wire::BackendKind;
use tracing::{debug, info, warn};

use crate::cache::AvailabilityCache;
use crate::clock::{Clock, SystemClock};
use crate::error::{ManagerError, ManagerResult};
use crate::settings::SettingsRepository;

/// Answer to an explicit connection status query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub mode: StorageMode,
    pub remote_available: bool,
    /// Backend the next operation would use; `None` when remote mode is
    /// forced and the remote cannot serve.
    pub active_backend: Option<BackendKind>,
}

struct ResolverState {
    cache: AvailabilityCache,
    /// Adapter built for the current settings, dropped on reset.
    remote: Option<Arc<RemoteShareStore>>,
    /// Bumped on every reset so a probe that straddles one is discarded.
    generation: u64,
}

impl ResolverState {
    fn reset(&mut self) {
        self.cache.reset();
        self.remote = None;
        self.generation += 1;
    }
}

enum Route {
    Local,
    Remote(Arc<RemoteShareStore>),
}

impl Route {
    fn kind(&self) -> BackendKind {
        match self {
            Self::Local => BackendKind::Local,
            Self::Remote(_) => BackendKind::Remote,
        }
    }
}

/// Routes every share operation to the local or the remote backend.
///
/// Mode and connection settings are read from the key-value store on each
/// call, so changes made by another process are picked up. Only remote
/// availability is cached; no connection is held between calls.
pub struct StorageManager {
    settings: SettingsRepository,
    local: Arc<LocalShareStore>,
    transport: Arc<dyn ConductorTransport>,
    clock: Arc<dyn Clock>,
    state: Mutex<ResolverState>,
}

impl StorageManager {
    /// Create a manager over a key-value store and a conductor transport.
    pub fn new(kv: Arc<dyn KeyValueStore>, transport: Arc<dyn ConductorTransport>) -> Self {
        Self {
            settings: SettingsRepository::new(kv.clone()),
            local: Arc::new(LocalShareStore::new(kv)),
            transport,
            clock: Arc::new(SystemClock),
            state: Mutex::new(ResolverState {
                cache: AvailabilityCache::default(),
                remote: None,
                generation: 0,
            }),
        }
    }

    /// Use `clock` for cache expiry and share timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// How long a probe result stays fresh.
    pub fn with_check_interval(mut self, check_interval_ms: u64) -> Self {
        self.state.get_mut().expect("lock poisoned").cache =
            AvailabilityCache::new(check_interval_ms);
        self
    }

    /// Connection settings used until the user stores their own.
    pub fn with_default_settings(mut self, defaults: ConnectionSettings) -> Self {
        self.settings = SettingsRepository::with_defaults(self.settings.kv().clone(), defaults);
        self
    }

    /// Persisted mode and connection settings.
    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    /// Snapshot of the availability cache.
    pub fn cache(&self) -> AvailabilityCache {
        self.state().cache
    }

    /// The backend the next operation would use.
    pub async fn active_store(&self) -> ManagerResult<Arc<dyn ShareStore>> {
        let route = self.resolve().await?;
        Ok(self.store_for(route))
    }

    /// Assign identity, time, and the local author to a draft, then save it.
    pub async fn share(&self, draft: ShareDraft) -> ManagerResult<ShareRecord> {
        let user = local_user_id(self.settings.kv().as_ref()).await?;
        let record = draft
            .into_record(ShareId::generate(), self.clock.now_ms(), &user)
            .map_err(StoreError::from)?;
        self.save_share(record).await
    }

    /// Save a complete record to the active backend.
    pub async fn save_share(&self, record: ShareRecord) -> ManagerResult<ShareRecord> {
        let store = self.active_store().await?;
        let saved = store.save_share(record).await?;
        info!(backend = store.name(), id = %saved.id, "share saved");
        Ok(saved)
    }

    /// Read shares from the active backend, newest first.
    pub async fn get_shares(&self, options: &RetrievalOptions) -> ManagerResult<Vec<ShareRecord>> {
        let store = self.active_store().await?;
        Ok(store.get_shares(options).await?)
    }

    /// Look up one share on the active backend.
    pub async fn get_share(&self, id: &str) -> ManagerResult<Option<ShareRecord>> {
        let store = self.active_store().await?;
        Ok(store.get_share(id).await?)
    }

    /// Delete a share from the active backend.
    ///
    /// Fails with [`StoreError::Unsupported`] when that backend cannot
    /// actually remove records.
    pub async fn delete_share(&self, id: &str) -> ManagerResult<()> {
        let store = self.active_store().await?;
        if !store.supports_delete() {
            return Err(StoreError::Unsupported {
                operation: "delete",
                backend: store.name(),
            }
            .into());
        }
        store.delete_share(id).await?;
        Ok(())
    }

    /// Probe now, regardless of cache age, and report the outcome.
    pub async fn check_connection(&self) -> ManagerResult<ConnectionStatus> {
        self.state().cache.expire();
        let mode = self.settings.mode().await?;
        let active_backend = match self.resolve().await {
            Ok(route) => Some(route.kind()),
            Err(ManagerError::BackendUnavailable { .. }) => None,
            Err(e) => return Err(e),
        };
        Ok(ConnectionStatus {
            mode,
            remote_available: self.state().cache.is_available,
            active_backend,
        })
    }

    /// Persist a new mode and reset the availability cache.
    pub async fn set_mode(&self, mode: StorageMode) -> ManagerResult<()> {
        self.settings.set_mode(mode).await?;
        self.reset_connection();
        info!(%mode, "storage mode changed");
        Ok(())
    }

    /// Merge and persist settings, then reset the availability cache.
    pub async fn update_connection_settings(
        &self,
        update: &ConnectionSettingsUpdate,
    ) -> ManagerResult<ConnectionSettings> {
        let merged = self.settings.update_connection_settings(update).await?;
        self.reset_connection();
        info!(
            admin_port = merged.admin_port,
            app_port = merged.app_port,
            enabled = merged.enabled,
            "connection settings updated"
        );
        Ok(merged)
    }

    /// Forget cached availability and the remote adapter.
    pub fn reset_connection(&self) {
        self.state().reset();
        debug!("connection state reset");
    }

    fn state(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().expect("lock poisoned")
    }

    fn store_for(&self, route: Route) -> Arc<dyn ShareStore> {
        match route {
            Route::Local => self.local.clone() as Arc<dyn ShareStore>,
            Route::Remote(remote) => remote,
        }
    }

    async fn resolve(&self) -> ManagerResult<Route> {
        let mode = self.settings.mode().await?;
        let settings = self.settings.connection_settings().await?;

        match mode {
            StorageMode::Local => return Ok(Route::Local),
            StorageMode::Auto if !settings.enabled => return Ok(Route::Local),
            StorageMode::Remote if !settings.enabled => {
                return Err(ManagerError::BackendUnavailable {
                    reason: "remote storage is disabled in connection settings".into(),
                })
            }
            _ => {}
        }

        let remote = self.remote_for(settings);
        if self.remote_available(&remote).await {
            return Ok(Route::Remote(remote));
        }
        if mode == StorageMode::Remote {
            return Err(ManagerError::BackendUnavailable {
                reason: format!("conductor not reachable on app port {}", settings.app_port),
            });
        }
        debug!("remote unavailable; using local storage");
        Ok(Route::Local)
    }

    fn remote_for(&self, settings: ConnectionSettings) -> Arc<RemoteShareStore> {
        let mut state = self.state();
        let cached = state
            .remote
            .as_ref()
            .filter(|r| *r.settings() == settings)
            .cloned();
        if let Some(remote) = cached {
            return remote;
        }
        if state.remote.is_some() {
            debug!("connection settings changed; discarding cached availability");
            state.reset();
        }
        let remote = Arc::new(RemoteShareStore::new(self.transport.clone(), settings));
        state.remote = Some(remote.clone());
        remote
    }

    async fn remote_available(&self, remote: &RemoteShareStore) -> bool {
        let generation = {
            let state = self.state();
            if !state.cache.is_stale(self.clock.now_ms()) {
                return state.cache.is_available;
            }
            state.generation
        };

        let available = remote.probe().await;
        if available {
            info!(app_port = remote.settings().app_port, "remote backend available");
        } else {
            warn!(app_port = remote.settings().app_port, "remote backend unavailable");
        }

        let mut state = self.state();
        if state.generation == generation {
            state.cache.record(self.clock.now_ms(), available);
        } else {
            debug!("connection reset during probe; result discarded");
        }
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use sharefeed_conductor::{
        AdminSession, AppAuthToken, AppSession, ConductorResult, InMemoryConductor,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;
    use sharefeed_store::MemoryKeyValueStore;

    struct Fixture {
        conductor: InMemoryConductor,
        clock: Arc<ManualClock>,
        manager: StorageManager,
    }

    async fn fixture(mode: StorageMode, settings: ConnectionSettings) -> Fixture {
        let conductor = InMemoryConductor::new();
        let clock = Arc::new(ManualClock::new(1_000_000));
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let manager = StorageManager::new(kv, Arc::new(conductor.clone()))
            .with_clock(clock.clone())
            .with_check_interval(30_000);
        manager.settings().set_mode(mode).await.unwrap();
        manager
            .settings()
            .update_connection_settings(&ConnectionSettingsUpdate {
                admin_port: Some(settings.admin_port),
                app_port: Some(settings.app_port),
                enabled: Some(settings.enabled),
            })
            .await
            .unwrap();
        Fixture {
            conductor,
            clock,
            manager,
        }
    }

    fn enabled() -> ConnectionSettings {
        ConnectionSettings::new(0, 8888, true)
    }

    fn touched(conductor: &InMemoryConductor) -> usize {
        conductor.admin_connects() + conductor.app_connects()
    }

    #[tokio::test]
    async fn local_mode_never_probes() {
        let f = fixture(StorageMode::Local, ConnectionSettings::new(4444, 8888, true)).await;
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap();
        assert_eq!(touched(&f.conductor), 0);
    }

    #[tokio::test]
    async fn auto_mode_with_remote_disabled_never_probes() {
        let f = fixture(StorageMode::Auto, ConnectionSettings::new(4444, 8888, false)).await;
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(touched(&f.conductor), 0);
    }

    #[tokio::test]
    async fn auto_mode_falls_back_to_local_transparently() {
        let f = fixture(StorageMode::Auto, enabled()).await;
        f.conductor.set_app_up(false);

        let saved = f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap();
        let listed = f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(f.manager.get_share(&saved.id).await.unwrap(), Some(saved));
        assert_eq!(f.conductor.entry_count(), 0);
    }

    #[tokio::test]
    async fn probes_once_per_interval() {
        let f = fixture(StorageMode::Auto, enabled()).await;
        f.conductor.set_app_up(false);

        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        f.clock.advance(29_999);
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(f.conductor.app_connects(), 1);

        f.clock.advance(30_001);
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(f.conductor.app_connects(), 2);
    }

    #[tokio::test]
    async fn reachable_remote_serves_reads_and_writes() {
        let f = fixture(StorageMode::Auto, enabled()).await;

        let saved = f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap();
        assert!(saved.id.starts_with('u'));
        assert_eq!(f.conductor.entry_count(), 1);
        // One probe plus one connect for the save itself.
        assert_eq!(f.conductor.app_connects(), 2);

        let listed = f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(listed, vec![saved]);
        assert_eq!(f.conductor.app_connects(), 3);
    }

    #[tokio::test]
    async fn remote_mode_unreachable_is_hard_failure() {
        let f = fixture(StorageMode::Remote, enabled()).await;
        f.conductor.set_app_up(false);
        let err = f.manager.get_shares(&RetrievalOptions::all()).await.unwrap_err();
        assert!(matches!(err, ManagerError::BackendUnavailable { .. }));
    }

    #[tokio::test]
    async fn remote_mode_disabled_fails_without_probe() {
        let f = fixture(StorageMode::Remote, ConnectionSettings::new(4444, 8888, false)).await;
        let err = f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap_err();
        assert!(matches!(err, ManagerError::BackendUnavailable { .. }));
        assert_eq!(touched(&f.conductor), 0);
    }

    #[tokio::test]
    async fn set_mode_resets_cache() {
        let f = fixture(StorageMode::Auto, enabled()).await;
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert!(f.manager.cache().is_available);

        f.manager.set_mode(StorageMode::Auto).await.unwrap();
        let cache = f.manager.cache();
        assert_eq!(cache.last_checked_at, None);
        assert!(!cache.is_available);

        f.conductor.set_app_up(false);
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert!(!f.manager.cache().is_available);
    }

    /// Holds the first app connect until `release` is notified.
    struct GatedConductor {
        inner: InMemoryConductor,
        armed: AtomicBool,
        parked: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl ConductorTransport for GatedConductor {
        async fn connect_admin(&self, port: u16) -> ConductorResult<Box<dyn AdminSession>> {
            self.inner.connect_admin(port).await
        }

        async fn connect_app(
            &self,
            port: u16,
            token: Option<AppAuthToken>,
        ) -> ConductorResult<Box<dyn AppSession>> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            self.inner.connect_app(port, token).await
        }
    }

    #[tokio::test]
    async fn reset_mid_check_discards_result() {
        let conductor = InMemoryConductor::new();
        let gate = Arc::new(GatedConductor {
            inner: conductor.clone(),
            armed: AtomicBool::new(true),
            parked: Notify::new(),
            release: Notify::new(),
        });
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let manager = Arc::new(
            StorageManager::new(kv, gate.clone()).with_clock(Arc::new(ManualClock::new(1_000_000))),
        );
        manager
            .update_connection_settings(&ConnectionSettingsUpdate {
                app_port: Some(8888),
                enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let read = tokio::spawn({
            let manager = manager.clone();
            async move { manager.get_shares(&RetrievalOptions::all()).await }
        });
        gate.parked.notified().await;
        manager.reset_connection();
        gate.release.notify_one();
        read.await.unwrap().unwrap();

        let cache = manager.cache();
        assert_eq!(cache.last_checked_at, None);
        assert!(!cache.is_available);

        // The next operation checks again instead of trusting the old result.
        let before = conductor.app_connects();
        manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        assert_eq!(conductor.app_connects(), before + 2);
        assert!(manager.cache().last_checked_at.is_some());
    }

    #[tokio::test]
    async fn settings_update_reprobes_with_new_ports() {
        let f = fixture(StorageMode::Auto, enabled()).await;
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        let connects = f.conductor.app_connects();

        let merged = f
            .manager
            .update_connection_settings(&ConnectionSettingsUpdate {
                app_port: Some(9999),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(merged, ConnectionSettings::new(0, 9999, true));
        assert_eq!(f.manager.cache().last_checked_at, None);

        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        // Fresh probe plus the read.
        assert_eq!(f.conductor.app_connects(), connects + 2);
    }

    #[tokio::test]
    async fn check_connection_probes_inside_interval() {
        let f = fixture(StorageMode::Auto, enabled()).await;
        f.manager.get_shares(&RetrievalOptions::all()).await.unwrap();
        f.conductor.set_app_up(false);

        let status = f.manager.check_connection().await.unwrap();
        assert_eq!(
            status,
            ConnectionStatus {
                mode: StorageMode::Auto,
                remote_available: false,
                active_backend: Some(BackendKind::Local),
            }
        );
    }

    #[tokio::test]
    async fn check_connection_in_forced_remote_mode() {
        let f = fixture(StorageMode::Remote, enabled()).await;
        f.conductor.set_app_up(false);
        let status = f.manager.check_connection().await.unwrap();
        assert_eq!(status.active_backend, None);
        assert!(!status.remote_available);

        f.conductor.set_app_up(true);
        let status = f.manager.check_connection().await.unwrap();
        assert_eq!(status.active_backend, Some(BackendKind::Remote));
        assert!(status.remote_available);
    }

    #[tokio::test]
    async fn delete_depends_on_backend() {
        let f = fixture(StorageMode::Local, enabled()).await;
        let saved = f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap();
        f.manager.delete_share(&saved.id).await.unwrap();
        f.manager.delete_share(&saved.id).await.unwrap();
        assert!(f.manager.get_shares(&RetrievalOptions::all()).await.unwrap().is_empty());

        f.manager.set_mode(StorageMode::Remote).await.unwrap();
        let err = f.manager.delete_share("anything").await.unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Store(StoreError::Unsupported { backend: "remote", .. })
        ));
    }

    #[tokio::test]
    async fn draft_without_url_is_rejected() {
        let f = fixture(StorageMode::Local, enabled()).await;
        let err = f.manager.share(ShareDraft::new("", "A")).await.unwrap_err();
        assert!(matches!(err, ManagerError::Store(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn shares_carry_persisted_author_and_clock_time() {
        let f = fixture(StorageMode::Local, enabled()).await;
        let a = f.manager.share(ShareDraft::new("https://a.com", "A")).await.unwrap();
        f.clock.advance(5);
        let b = f.manager.share(ShareDraft::new("https://b.com", "")).await.unwrap();
        assert_eq!(a.shared_by, b.shared_by);
        assert_eq!(a.shared_at, 1_000_000);
        assert_eq!(b.shared_at, 1_000_005);
        assert_eq!(b.title, "Untitled");
    }
}
