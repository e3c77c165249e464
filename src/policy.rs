// src/policy.rs
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Trust level a principal must hold for its endorsement to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Peer,
    Admin,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Member => "member",
            Role::Peer => "peer",
            Role::Admin => "admin",
            Role::Client => "client",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub org: String,
    pub role: Role,
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.org, self.role)
    }
}

/// Wire form of a key policy: any `out_of` of the listed principals.
#[derive(Debug, Serialize, Deserialize)]
struct PolicyEnvelope {
    out_of: usize,
    principals: Vec<Principal>,
}

/// Per-key endorsement policy.
///
/// Organizations are combined with OR semantics: an endorsement from any one
/// listed organization satisfies the policy. Each organization appears at most
/// once; adding an org again replaces its role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEndorsementPolicy {
    orgs: BTreeMap<String, Role>,
}

impl KeyEndorsementPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a policy previously produced by [`KeyEndorsementPolicy::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let envelope: PolicyEnvelope =
            serde_json::from_slice(bytes).map_err(|e| Error::InvalidPolicy(e.to_string()))?;

        if envelope.principals.is_empty() {
            return Err(Error::InvalidPolicy("no principals".to_string()));
        }
        if envelope.out_of != 1 {
            return Err(Error::InvalidPolicy(format!(
                "unsupported threshold {}",
                envelope.out_of
            )));
        }

        let orgs = envelope
            .principals
            .into_iter()
            .map(|p| (p.org, p.role))
            .collect();

        Ok(Self { orgs })
    }

    pub fn add_orgs<I, S>(&mut self, role: Role, orgs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for org in orgs {
            self.orgs.insert(org.as_ref().to_string(), role);
        }
        self
    }

    pub fn del_orgs<I, S>(&mut self, orgs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for org in orgs {
            self.orgs.remove(org.as_ref());
        }
        self
    }

    /// Listed organizations in lexical order.
    pub fn list_orgs(&self) -> Vec<String> {
        self.orgs.keys().cloned().collect()
    }

    pub fn principals(&self) -> Vec<Principal> {
        self.orgs
            .iter()
            .map(|(org, role)| Principal {
                org: org.clone(),
                role: *role,
            })
            .collect()
    }

    /// True when at least one endorsing organization is listed.
    pub fn is_satisfied_by(&self, endorsers: &BTreeSet<String>) -> bool {
        endorsers.iter().any(|org| self.orgs.contains_key(org))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        if self.orgs.is_empty() {
            return Err(Error::InvalidPolicy(
                "a policy must name at least one organization".to_string(),
            ));
        }

        let envelope = PolicyEnvelope {
            out_of: 1,
            principals: self.principals(),
        };

        serde_json::to_vec(&envelope).map_err(|e| Error::Serialize(e.to_string()))
    }
}

/// Build the policy bytes for "any one of `orgs`, at `role`".
///
/// Fails with [`Error::InvalidPolicy`] when `orgs` is empty.
pub fn build_org_policy<I, S>(orgs: I, role: Role) -> Result<Vec<u8>, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    KeyEndorsementPolicy::new().add_orgs(role, orgs).to_bytes()
}
