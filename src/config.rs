// src/config.rs
use serde::Deserialize;

use crate::{error::Error, policy::Role};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Role every principal in an installed key policy is tagged with.
    pub endorsement_role: Role,
}

impl ServiceConfig {
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Deserialize(e.to_string()))
    }
}
