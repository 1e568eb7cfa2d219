//! In-process conductor for tests and demo runs.
//!
//! [`InMemoryConductor`] implements [`ConductorTransport`] without any
//! sockets. It answers the sharefeed zome functions from an in-memory entry
//! list, can be told to refuse any handshake step, and counts every connect
//! and call so callers can assert how often the remote was touched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use sharefeed_types::now_ms;
use sharefeed_wire::{LedgerHash, RemoteShareInfo, RemoteShareItem};

use crate::error::{ConductorError, ConductorResult, Interface};
use crate::message::{functions, AppAuthToken, CellId, RemoteCall};
use crate::transport::{AdminSession, AppSession, ConductorTransport};

/// Length of a ledger hash: 3-byte type prefix, 32-byte digest, 4-byte location.
const HASH_LEN: usize = 39;
const ACTION_PREFIX: [u8; 3] = [0x84, 0x29, 0x24];
const AGENT_PREFIX: [u8; 3] = [0x84, 0x20, 0x24];

struct Behaviour {
    admin_up: bool,
    app_up: bool,
    cells: usize,
    token_fails: bool,
    calls_fail: bool,
    fixed_created_at: Option<i64>,
}

struct Inner {
    behaviour: RwLock<Behaviour>,
    entries: RwLock<Vec<RemoteShareInfo>>,
    last_token: RwLock<Option<AppAuthToken>>,
    admin_connects: AtomicUsize,
    app_connects: AtomicUsize,
    calls: AtomicUsize,
    agent: LedgerHash,
}

/// A conductor that lives entirely in memory.
///
/// Cloning shares the same state.
#[derive(Clone)]
pub struct InMemoryConductor {
    inner: Arc<Inner>,
}

impl InMemoryConductor {
    /// A healthy conductor with one cell.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                behaviour: RwLock::new(Behaviour {
                    admin_up: true,
                    app_up: true,
                    cells: 1,
                    token_fails: false,
                    calls_fail: false,
                    fixed_created_at: None,
                }),
                entries: RwLock::new(Vec::new()),
                last_token: RwLock::new(None),
                admin_connects: AtomicUsize::new(0),
                app_connects: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                agent: hash_with_prefix(AGENT_PREFIX, 0xA6),
            }),
        }
    }

    /// Start with the admin interface up or down.
    pub fn with_admin(self, up: bool) -> Self {
        self.set_admin_up(up);
        self
    }

    /// Start with the app interface up or down.
    pub fn with_app(self, up: bool) -> Self {
        self.set_app_up(up);
        self
    }

    /// Number of cells the admin interface reports.
    pub fn with_cells(self, cells: usize) -> Self {
        self.behaviour().cells = cells;
        self
    }

    /// Refuse every app token request.
    pub fn with_failing_token(self) -> Self {
        self.behaviour().token_fails = true;
        self
    }

    /// Fail every remote function call.
    pub fn with_failing_calls(self) -> Self {
        self.behaviour().calls_fail = true;
        self
    }

    /// Stamp every created entry with this microsecond timestamp.
    pub fn with_created_at(self, micros: i64) -> Self {
        self.behaviour().fixed_created_at = Some(micros);
        self
    }

    /// Take the admin interface up or down.
    pub fn set_admin_up(&self, up: bool) {
        self.behaviour().admin_up = up;
    }

    /// Take the app interface up or down.
    pub fn set_app_up(&self, up: bool) {
        self.behaviour().app_up = up;
    }

    /// Seed an already-committed entry.
    pub fn insert(&self, info: RemoteShareInfo) {
        self.inner
            .entries
            .write()
            .expect("lock poisoned")
            .push(info);
    }

    /// Number of committed share entries.
    pub fn entry_count(&self) -> usize {
        self.inner.entries.read().expect("lock poisoned").len()
    }

    /// Admin connects attempted so far.
    pub fn admin_connects(&self) -> usize {
        self.inner.admin_connects.load(Ordering::SeqCst)
    }

    /// App connects attempted so far.
    pub fn app_connects(&self) -> usize {
        self.inner.app_connects.load(Ordering::SeqCst)
    }

    /// Remote function calls made so far.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Token presented by the most recent app connection, if any.
    pub fn last_app_token(&self) -> Option<AppAuthToken> {
        self.inner.last_token.read().expect("lock poisoned").clone()
    }

    /// The agent key reported as author of created entries.
    pub fn agent(&self) -> &LedgerHash {
        &self.inner.agent
    }

    fn behaviour(&self) -> std::sync::RwLockWriteGuard<'_, Behaviour> {
        self.inner.behaviour.write().expect("lock poisoned")
    }

    fn create(&self, payload: Value) -> ConductorResult<Value> {
        let item: RemoteShareItem = serde_json::from_value(payload)?;
        let created_at = self
            .inner
            .behaviour
            .read()
            .expect("lock poisoned")
            .fixed_created_at
            .unwrap_or_else(|| now_ms() as i64 * 1_000);
        let mut entries = self.inner.entries.write().expect("lock poisoned");
        let info = RemoteShareInfo {
            action_hash: hash_with_prefix(ACTION_PREFIX, entries.len() as u64 + 1),
            share_item: item,
            created_at,
            author: self.inner.agent.clone(),
        };
        entries.push(info.clone());
        Ok(serde_json::to_value(info)?)
    }

    fn recent(&self) -> ConductorResult<Value> {
        let entries = self.inner.entries.read().expect("lock poisoned");
        let mut recent: Vec<&RemoteShareInfo> = entries.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(serde_json::to_value(recent)?)
    }
}

impl Default for InMemoryConductor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryConductor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConductor")
            .field("entries", &self.entry_count())
            .field("calls", &self.calls())
            .finish()
    }
}

fn hash_with_prefix(prefix: [u8; 3], seed: u64) -> LedgerHash {
    let mut bytes = Vec::with_capacity(HASH_LEN);
    bytes.extend_from_slice(&prefix);
    bytes.extend((0..HASH_LEN - 3).map(|i| (seed >> ((i % 8) * 8)) as u8 ^ i as u8));
    LedgerHash::new(bytes)
}

#[async_trait]
impl ConductorTransport for InMemoryConductor {
    async fn connect_admin(&self, port: u16) -> ConductorResult<Box<dyn AdminSession>> {
        self.inner.admin_connects.fetch_add(1, Ordering::SeqCst);
        if !self.inner.behaviour.read().expect("lock poisoned").admin_up {
            return Err(ConductorError::Connect {
                interface: Interface::Admin,
                port,
                reason: "connection refused".into(),
            });
        }
        Ok(Box::new(MemoryAdmin {
            conductor: self.clone(),
        }))
    }

    async fn connect_app(
        &self,
        port: u16,
        token: Option<AppAuthToken>,
    ) -> ConductorResult<Box<dyn AppSession>> {
        self.inner.app_connects.fetch_add(1, Ordering::SeqCst);
        if !self.inner.behaviour.read().expect("lock poisoned").app_up {
            return Err(ConductorError::Connect {
                interface: Interface::App,
                port,
                reason: "connection refused".into(),
            });
        }
        *self.inner.last_token.write().expect("lock poisoned") = token;
        Ok(Box::new(MemoryApp {
            conductor: self.clone(),
        }))
    }
}

struct MemoryAdmin {
    conductor: InMemoryConductor,
}

#[async_trait]
impl AdminSession for MemoryAdmin {
    async fn issue_app_token(&self, installed_app_id: &str) -> ConductorResult<AppAuthToken> {
        let behaviour = self.conductor.inner.behaviour.read().expect("lock poisoned");
        if behaviour.token_fails {
            return Err(ConductorError::TokenIssuance(format!(
                "app {installed_app_id} is not installed"
            )));
        }
        Ok(AppAuthToken(installed_app_id.as_bytes().to_vec()))
    }

    async fn list_cell_ids(&self) -> ConductorResult<Vec<CellId>> {
        let cells = self.conductor.inner.behaviour.read().expect("lock poisoned").cells;
        Ok((0..cells)
            .map(|i| CellId {
                dna_hash: vec![i as u8; 4],
                agent_key: self.conductor.agent().as_bytes().to_vec(),
            })
            .collect())
    }

    async fn authorize_signing_credentials(&self, _cell: &CellId) -> ConductorResult<()> {
        Ok(())
    }
}

struct MemoryApp {
    conductor: InMemoryConductor,
}

#[async_trait]
impl AppSession for MemoryApp {
    async fn call(&self, call: RemoteCall) -> ConductorResult<Value> {
        self.conductor.inner.calls.fetch_add(1, Ordering::SeqCst);
        let fails = self
            .conductor
            .inner
            .behaviour
            .read()
            .expect("lock poisoned")
            .calls_fail;
        if fails {
            return Err(ConductorError::CallFailed {
                function: call.fn_name,
                message: "zome call rejected".into(),
            });
        }
        match call.fn_name.as_str() {
            functions::CREATE_SHARE_ITEM => self.conductor.create(call.payload),
            functions::GET_RECENT_SHARES => self.conductor.recent(),
            other => Err(ConductorError::CallFailed {
                function: other.to_string(),
                message: "function not found in zome".into(),
            }),
        }
    }
}
