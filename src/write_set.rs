// src/write_set.rs
use std::collections::BTreeSet;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
    SetKeyPolicy { key: String, policy: Vec<u8> },
}

impl Write {
    pub fn key(&self) -> &str {
        match self {
            Write::Put { key, .. } | Write::Delete { key } | Write::SetKeyPolicy { key, .. } => {
                key
            }
        }
    }
}

/// Staged writes of a single transaction.
///
/// Adapters apply a write set all-or-nothing. A data write and the policy
/// write for the same key therefore land together.
#[derive(Debug, Clone)]
pub struct WriteSet {
    tx_id: Uuid,
    endorsers: BTreeSet<String>,
    writes: Vec<Write>,
}

impl WriteSet {
    pub fn new(endorser: impl Into<String>) -> Self {
        Self {
            tx_id: Uuid::now_v7(),
            endorsers: BTreeSet::from([endorser.into()]),
            writes: Vec::new(),
        }
    }

    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    pub fn endorsers(&self) -> &BTreeSet<String> {
        &self.endorsers
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Distinct keys touched by this write set, in first-write order.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.writes
            .iter()
            .map(Write::key)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    pub fn put(&mut self, key: &str, value: Vec<u8>) -> &mut Self {
        self.writes.push(Write::Put {
            key: key.to_string(),
            value,
        });
        self
    }

    pub fn delete(&mut self, key: &str) -> &mut Self {
        self.writes.push(Write::Delete {
            key: key.to_string(),
        });
        self
    }

    pub fn set_key_policy(&mut self, key: &str, policy: Vec<u8>) -> &mut Self {
        self.writes.push(Write::SetKeyPolicy {
            key: key.to_string(),
            policy,
        });
        self
    }
}
