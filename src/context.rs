// src/context.rs
use crate::{LedgerAdapter, error::Error};

/// Identity of the client that submitted a transaction.
///
/// The dispatcher resolves it once per invocation and passes it to the
/// service explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    org: String,
}

impl Caller {
    pub fn new(org: impl Into<String>) -> Self {
        Self { org: org.into() }
    }

    pub async fn from_adapter(adapter: &dyn LedgerAdapter) -> Result<Self, Error> {
        Ok(Self::new(adapter.caller_org_id().await?))
    }

    pub fn org(&self) -> &str {
        &self.org
    }
}
