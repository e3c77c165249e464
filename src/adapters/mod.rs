// src/adapters/mod.rs
pub mod memory;

pub use memory::MemoryAdapter;

use async_trait::async_trait;

use crate::{error::Error, write_set::WriteSet};

/// -----------------------------
/// Ledger adapter contract
/// -----------------------------
///
/// The ledger platform owns ordering, consensus and endorsement validation.
/// Reads see committed state only; writes are staged in a [`WriteSet`] and
/// handed over in one `commit` call.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    /// Committed value for `key`, `None` when absent.
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Committed `(key, value)` pairs with `start <= key < end`, sorted by key.
    /// An empty bound is open on that side.
    async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, Error>;

    /// Endorsement policy currently installed on `key`.
    async fn get_key_policy(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Organization of the client that submitted the current transaction.
    async fn caller_org_id(&self) -> Result<String, Error>;

    /// Apply every write in `write_set` atomically.
    /// Implementors MUST:
    /// 1. Validate each written key against the policy installed before this
    ///    transaction, using `write_set.endorsers()`
    /// 2. Reject the whole set with `EndorsementPolicyFailure` if any key fails
    /// 3. Apply all writes in order, or none of them
    async fn commit(&self, write_set: &WriteSet) -> Result<(), Error>;
}
