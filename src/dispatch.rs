// src/dispatch.rs
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AssetOp, AssetService, Caller, Error};

/// A transaction proposal as it arrives from a client: a function name and
/// positional string arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(function: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(raw).map_err(|e| Error::InvalidArgument(e.to_string()))
    }
}

/// Routes invocations to [`AssetService`].
///
/// The caller's organization is resolved from the ledger adapter here and
/// nowhere else, then passed to the service explicitly.
pub struct Dispatcher {
    service: AssetService,
}

impl Dispatcher {
    pub fn new(service: AssetService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &AssetService {
        &self.service
    }

    /// Execute `invocation` and encode its result.
    ///
    /// Records, lists and policies are returned as JSON, `AssetExists` as
    /// `true`/`false`, and mutations as an empty payload.
    pub async fn dispatch(&self, invocation: &Invocation) -> Result<Vec<u8>, Error> {
        let op: AssetOp = invocation.function.parse()?;
        let args = &invocation.args;
        debug!(%op, argc = args.len(), "dispatching invocation");

        match op {
            AssetOp::Create => {
                let [id, value, owner] = expect_args::<3>(op, args)?;
                let caller = self.caller().await?;
                self.service
                    .create_asset(&caller, id, parse_value(value)?, owner)
                    .await?;
                Ok(Vec::new())
            }
            AssetOp::Read => {
                let [id] = expect_args::<1>(op, args)?;
                self.service.read_asset(id).await?.to_bytes()
            }
            AssetOp::Update => {
                let [id, value] = expect_args::<2>(op, args)?;
                let caller = self.caller().await?;
                self.service
                    .update_asset(&caller, id, parse_value(value)?)
                    .await?;
                Ok(Vec::new())
            }
            AssetOp::Delete => {
                let [id] = expect_args::<1>(op, args)?;
                let caller = self.caller().await?;
                self.service.delete_asset(&caller, id).await?;
                Ok(Vec::new())
            }
            AssetOp::Transfer => {
                let [id, new_owner, new_owner_org] = expect_args::<3>(op, args)?;
                let caller = self.caller().await?;
                self.service
                    .transfer_asset(&caller, id, new_owner, new_owner_org)
                    .await?;
                Ok(Vec::new())
            }
            AssetOp::Exists => {
                let [id] = expect_args::<1>(op, args)?;
                let exists = self.service.asset_exists(id).await?;
                Ok(exists.to_string().into_bytes())
            }
            AssetOp::GetAll => {
                expect_args::<0>(op, args)?;
                let assets = self.service.get_all_assets().await?;
                serde_json::to_vec(&assets).map_err(|e| Error::Serialize(e.to_string()))
            }
            AssetOp::ReadPolicy => {
                let [id] = expect_args::<1>(op, args)?;
                let policy = self.service.read_asset_policy(id).await?;
                serde_json::to_vec(&policy.principals())
                    .map_err(|e| Error::Serialize(e.to_string()))
            }
        }
    }

    async fn caller(&self) -> Result<Caller, Error> {
        Caller::from_adapter(self.service.adapter()).await
    }
}

fn expect_args<const N: usize>(op: AssetOp, args: &[String]) -> Result<[&str; N], Error> {
    if args.len() != N {
        return Err(Error::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            op,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

fn parse_value(raw: &str) -> Result<i64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("value {:?} is not an integer", raw)))
}
