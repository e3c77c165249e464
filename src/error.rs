// src/error.rs
use std::fmt::Display;

use crate::service::AssetOp;

#[derive(Debug)]
pub enum Error {
    AlreadyExists { op: AssetOp, id: String },
    NotFound { op: AssetOp, id: String },
    /// Any other failure raised while running `op` against key `id`.
    Failed {
        op: AssetOp,
        id: String,
        source: Box<Error>,
    },
    EndorsementPolicyFailure { key: String },
    InvalidPolicy(String),
    InvalidArgument(String),
    Serialize(String),
    Deserialize(String),
    Adapter(String),
}

impl Error {
    /// Attach the operation and key to an error that does not carry them yet.
    pub fn during(self, op: AssetOp, id: &str) -> Self {
        match self {
            Error::AlreadyExists { .. } | Error::NotFound { .. } | Error::Failed { .. } => self,
            other => Error::Failed {
                op,
                id: id.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with operation context peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::Failed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::AlreadyExists { op, id } => {
                write!(f, "{}: the asset {} already exists", op, id)
            }
            Error::NotFound { op, id } => write!(f, "{}: the asset {} does not exist", op, id),
            Error::Failed { op, id, source } if id.is_empty() => write!(f, "{}: {}", op, source),
            Error::Failed { op, id, source } => write!(f, "{} {}: {}", op, id, source),
            Error::EndorsementPolicyFailure { key } => {
                write!(f, "Endorsement policy failure for key {}", key)
            }
            Error::InvalidPolicy(msg) => write!(f, "Invalid policy: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::Serialize(err) => write!(f, "Serialization error: {}", err),
            Error::Deserialize(err) => write!(f, "Deserialization error: {}", err),
            Error::Adapter(err) => write!(f, "Adapter error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Failed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
