// src/adapters/memory.rs
use crate::{
    Error, KeyEndorsementPolicy, LedgerAdapter,
    write_set::{Write, WriteSet},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Default)]
struct WorldState {
    data: BTreeMap<String, Vec<u8>>,
    policies: BTreeMap<String, Vec<u8>>,
}

#[derive(Clone)]
struct MemoryStore {
    world: Arc<Mutex<WorldState>>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            world: Arc::new(Mutex::new(WorldState::default())),
            fail_commits: Arc::new(AtomicBool::new(false)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex
        .lock()
        .map_err(|_| Error::Adapter("memory store lock poisoned".to_string()))
}

/// In-process ledger: committed world state plus per-key policies.
///
/// Handles created with [`MemoryAdapter::as_caller`] share the same world
/// state, so several organizations can act on one ledger.
pub struct MemoryAdapter {
    store: MemoryStore,
    caller_org: Mutex<Option<String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            caller_org: Mutex::new(None),
        }
    }

    pub fn with_caller_org(org: &str) -> Self {
        Self {
            store: MemoryStore::new(),
            caller_org: Mutex::new(Some(org.to_string())),
        }
    }

    /// Another handle on the same ledger, submitting as `org`.
    pub fn as_caller(&self, org: &str) -> Self {
        Self {
            store: self.store.clone(),
            caller_org: Mutex::new(Some(org.to_string())),
        }
    }

    pub fn set_caller_org(&self, org: &str) -> Result<(), Error> {
        *lock(&self.caller_org)? = Some(org.to_string());
        Ok(())
    }

    /// Make every following commit fail with [`Error::Adapter`] until reset.
    pub fn fail_commits(&self, fail: bool) {
        self.store.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerAdapter for MemoryAdapter {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let world = lock(&self.store.world)?;
        Ok(world.data.get(key).cloned())
    }

    async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, Error> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Ok(Vec::new());
        }

        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };

        let world = lock(&self.store.world)?;
        Ok(world
            .data
            .range::<str, _>((lower, upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn get_key_policy(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let world = lock(&self.store.world)?;
        Ok(world.policies.get(key).cloned())
    }

    async fn caller_org_id(&self) -> Result<String, Error> {
        lock(&self.caller_org)?
            .clone()
            .ok_or_else(|| Error::Adapter("no caller identity in context".to_string()))
    }

    async fn commit(&self, write_set: &WriteSet) -> Result<(), Error> {
        if self.store.fail_commits.load(Ordering::SeqCst) {
            return Err(Error::Adapter(format!(
                "commit of transaction {} failed",
                write_set.tx_id()
            )));
        }

        let mut world = lock(&self.store.world)?;

        // Step 1: endorsement check against policies as they stood before this tx
        for key in write_set.keys() {
            if let Some(bytes) = world.policies.get(key) {
                let policy = KeyEndorsementPolicy::from_bytes(bytes)?;
                if !policy.is_satisfied_by(write_set.endorsers()) {
                    warn!(
                        tx_id = %write_set.tx_id(),
                        key,
                        endorsers = ?write_set.endorsers(),
                        required = ?policy.list_orgs(),
                        "endorsement policy not satisfied"
                    );
                    return Err(Error::EndorsementPolicyFailure {
                        key: key.to_string(),
                    });
                }
            }
        }

        // Step 2: every policy being installed must decode
        for write in write_set.writes() {
            if let Write::SetKeyPolicy { policy, .. } = write {
                KeyEndorsementPolicy::from_bytes(policy)?;
            }
        }

        // Step 3: apply
        for write in write_set.writes() {
            match write {
                Write::Put { key, value } => {
                    world.data.insert(key.clone(), value.clone());
                }
                Write::Delete { key } => {
                    world.data.remove(key);
                    world.policies.remove(key);
                }
                Write::SetKeyPolicy { key, policy } => {
                    world.policies.insert(key.clone(), policy.clone());
                }
            }
        }

        debug!(
            tx_id = %write_set.tx_id(),
            writes = write_set.writes().len(),
            "write set committed"
        );

        Ok(())
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}
