// src/service.rs
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::{
    Asset, Caller, Error, KeyEndorsementPolicy, LedgerAdapter, ServiceConfig,
    policy::build_org_policy, write_set::WriteSet,
};

/// Operations exposed by [`AssetService`], named as the dispatcher sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetOp {
    Create,
    Read,
    Update,
    Delete,
    Transfer,
    Exists,
    GetAll,
    ReadPolicy,
}

impl AssetOp {
    pub fn name(&self) -> &'static str {
        match self {
            AssetOp::Create => "CreateAsset",
            AssetOp::Read => "ReadAsset",
            AssetOp::Update => "UpdateAsset",
            AssetOp::Delete => "DeleteAsset",
            AssetOp::Transfer => "TransferAsset",
            AssetOp::Exists => "AssetExists",
            AssetOp::GetAll => "GetAllAssets",
            AssetOp::ReadPolicy => "ReadAssetPolicy",
        }
    }
}

impl fmt::Display for AssetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreateAsset" => Ok(AssetOp::Create),
            "ReadAsset" => Ok(AssetOp::Read),
            "UpdateAsset" => Ok(AssetOp::Update),
            "DeleteAsset" => Ok(AssetOp::Delete),
            "TransferAsset" => Ok(AssetOp::Transfer),
            "AssetExists" => Ok(AssetOp::Exists),
            "GetAllAssets" => Ok(AssetOp::GetAll),
            "ReadAssetPolicy" => Ok(AssetOp::ReadPolicy),
            other => Err(Error::InvalidArgument(format!("unknown function {}", other))),
        }
    }
}

/// Asset operations over a ledger whose keys carry their own endorsement policy.
///
/// The service holds no state between calls: every operation reads through
/// the adapter and stages its writes into one [`WriteSet`]. Mutations are
/// endorsed by the explicit [`Caller`]; whether that endorsement is enough
/// is decided by the ledger at commit time.
#[derive(Clone)]
pub struct AssetService {
    adapter: Arc<dyn LedgerAdapter>,
    config: ServiceConfig,
}

impl AssetService {
    pub fn new(adapter: Box<dyn LedgerAdapter>) -> Self {
        Self::with_config(adapter, ServiceConfig::default())
    }

    pub fn with_config(adapter: Box<dyn LedgerAdapter>, config: ServiceConfig) -> Self {
        Self {
            adapter: adapter.into(),
            config,
        }
    }

    pub fn adapter(&self) -> &dyn LedgerAdapter {
        self.adapter.as_ref()
    }

    pub fn adapter_arc(&self) -> Arc<dyn LedgerAdapter> {
        Arc::clone(&self.adapter)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ==================== Operations ====================

    /// Create `id` owned by `owner`; the caller's organization becomes the
    /// owning org and the only endorser of later writes.
    pub async fn create_asset(
        &self,
        caller: &Caller,
        id: &str,
        value: i64,
        owner: &str,
    ) -> Result<(), Error> {
        observe(AssetOp::Create, id, async {
            if self.is_present(id).await? {
                return Err(Error::AlreadyExists {
                    op: AssetOp::Create,
                    id: id.to_string(),
                });
            }

            let asset = Asset::new(id, value, owner, caller.org());
            let policy = build_org_policy([caller.org()], self.config.endorsement_role)?;

            let mut write_set = WriteSet::new(caller.org());
            write_set
                .put(id, asset.to_bytes()?)
                .set_key_policy(id, policy);
            self.commit(&write_set).await?;

            info!(
                tx_id = %write_set.tx_id(),
                id,
                owner,
                owner_org = caller.org(),
                "asset created"
            );
            Ok(())
        })
        .await
    }

    pub async fn read_asset(&self, id: &str) -> Result<Asset, Error> {
        observe(AssetOp::Read, id, self.fetch(AssetOp::Read, id)).await
    }

    /// Overwrite the value of `id`. Owner fields and the key policy stay as they are.
    pub async fn update_asset(&self, caller: &Caller, id: &str, value: i64) -> Result<(), Error> {
        observe(AssetOp::Update, id, async {
            let mut asset = self.fetch(AssetOp::Update, id).await?;
            asset.value = value;

            let mut write_set = WriteSet::new(caller.org());
            write_set.put(id, asset.to_bytes()?);
            self.commit(&write_set).await?;

            info!(tx_id = %write_set.tx_id(), id, value, "asset updated");
            Ok(())
        })
        .await
    }

    pub async fn delete_asset(&self, caller: &Caller, id: &str) -> Result<(), Error> {
        observe(AssetOp::Delete, id, async {
            if !self.is_present(id).await? {
                return Err(Error::NotFound {
                    op: AssetOp::Delete,
                    id: id.to_string(),
                });
            }

            let mut write_set = WriteSet::new(caller.org());
            write_set.delete(id);
            self.commit(&write_set).await?;

            info!(tx_id = %write_set.tx_id(), id, "asset deleted");
            Ok(())
        })
        .await
    }

    /// Hand `id` to `new_owner`. The key policy is replaced so that only
    /// `new_owner_org` can endorse the next write.
    pub async fn transfer_asset(
        &self,
        caller: &Caller,
        id: &str,
        new_owner: &str,
        new_owner_org: &str,
    ) -> Result<(), Error> {
        observe(AssetOp::Transfer, id, async {
            let mut asset = self.fetch(AssetOp::Transfer, id).await?;
            let previous_org = asset.owner_org.clone();
            asset.reassign(new_owner, new_owner_org);

            let policy = build_org_policy([new_owner_org], self.config.endorsement_role)?;

            let mut write_set = WriteSet::new(caller.org());
            write_set
                .put(id, asset.to_bytes()?)
                .set_key_policy(id, policy);
            self.commit(&write_set).await?;

            info!(
                tx_id = %write_set.tx_id(),
                id,
                from_org = %previous_org,
                to_org = new_owner_org,
                new_owner,
                "asset transferred"
            );
            Ok(())
        })
        .await
    }

    pub async fn asset_exists(&self, id: &str) -> Result<bool, Error> {
        observe(AssetOp::Exists, id, self.is_present(id)).await
    }

    /// Every asset on the ledger, ordered by id.
    pub async fn get_all_assets(&self) -> Result<Vec<Asset>, Error> {
        observe(AssetOp::GetAll, "", async {
            let entries = self.adapter.get_state_by_range("", "").await?;
            entries
                .into_iter()
                .filter(|(_, bytes)| !bytes.is_empty())
                .map(|(_, bytes)| Asset::from_bytes(&bytes))
                .collect()
        })
        .await
    }

    /// Decoded endorsement policy currently installed on `id`.
    pub async fn read_asset_policy(&self, id: &str) -> Result<KeyEndorsementPolicy, Error> {
        observe(AssetOp::ReadPolicy, id, async {
            if !self.is_present(id).await? {
                return Err(Error::NotFound {
                    op: AssetOp::ReadPolicy,
                    id: id.to_string(),
                });
            }

            match self.adapter.get_key_policy(id).await? {
                Some(bytes) => KeyEndorsementPolicy::from_bytes(&bytes),
                None => Err(Error::InvalidPolicy(format!("no policy installed on {}", id))),
            }
        })
        .await
    }

    // ==================== Internals ====================

    async fn is_present(&self, id: &str) -> Result<bool, Error> {
        let state = self.adapter.get_state(id).await?;
        Ok(state.is_some_and(|bytes| !bytes.is_empty()))
    }

    async fn fetch(&self, op: AssetOp, id: &str) -> Result<Asset, Error> {
        match self.adapter.get_state(id).await? {
            Some(bytes) if !bytes.is_empty() => {
                debug!(%op, id, "asset loaded");
                Asset::from_bytes(&bytes)
            }
            _ => Err(Error::NotFound {
                op,
                id: id.to_string(),
            }),
        }
    }

    async fn commit(&self, write_set: &WriteSet) -> Result<(), Error> {
        let result = self.adapter.commit(write_set).await;

        counter!("assets.commits.total",
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);

        result
    }
}

/// Count and log the outcome of `op` on `id`, tagging failures with both.
async fn observe<T, Fut>(op: AssetOp, id: &str, fut: Fut) -> Result<T, Error>
where
    Fut: Future<Output = Result<T, Error>>,
{
    let result = fut.await.map_err(|e| e.during(op, id));

    counter!("assets.operations.total",
        "op" => op.name(),
        "status" => if result.is_ok() { "success" } else { "failed" }
    )
    .increment(1);

    if let Err(e) = &result {
        warn!(%op, error = %e, "operation failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAdapter;
    use crate::policy::Role;

    fn setup() -> (AssetService, Caller) {
        let service = AssetService::new(Box::new(MemoryAdapter::new()));
        (service, Caller::new("Org1MSP"))
    }

    #[test]
    fn test_op_names_round_trip() {
        for op in [
            AssetOp::Create,
            AssetOp::Read,
            AssetOp::Update,
            AssetOp::Delete,
            AssetOp::Transfer,
            AssetOp::Exists,
            AssetOp::GetAll,
            AssetOp::ReadPolicy,
        ] {
            assert_eq!(op.name().parse::<AssetOp>().unwrap(), op);
        }
        assert!("MintAsset".parse::<AssetOp>().is_err());
    }

    #[tokio::test]
    async fn test_create_installs_caller_policy() {
        let (service, org1) = setup();
        service
            .create_asset(&org1, "asset1", 100, "Alice")
            .await
            .unwrap();

        let asset = service.read_asset("asset1").await.unwrap();
        assert_eq!(asset, Asset::new("asset1", 100, "Alice", "Org1MSP"));

        let policy = service.read_asset_policy("asset1").await.unwrap();
        assert_eq!(policy.list_orgs(), vec!["Org1MSP".to_string()]);
    }

    #[tokio::test]
    async fn test_not_found_names_operation_and_key() {
        let (service, org1) = setup();

        let err = service.update_asset(&org1, "ghost", 1).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { op: AssetOp::Update, ref id } if id == "ghost"));
        assert_eq!(err.to_string(), "UpdateAsset: the asset ghost does not exist");
    }

    #[tokio::test]
    async fn test_empty_value_counts_as_absent() {
        let (service, org1) = setup();
        let mut write_set = WriteSet::new(org1.org());
        write_set.put("blank", Vec::new());
        service.adapter().commit(&write_set).await.unwrap();

        assert!(!service.asset_exists("blank").await.unwrap());
        assert!(service.read_asset("blank").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_record_error_names_operation_and_key() {
        let (service, org1) = setup();
        let mut write_set = WriteSet::new(org1.org());
        write_set.put("bad", b"not json".to_vec());
        service.adapter().commit(&write_set).await.unwrap();

        let err = service.read_asset("bad").await.unwrap_err();
        assert!(matches!(err.root(), Error::Deserialize(_)));
        assert!(err.to_string().starts_with("ReadAsset bad: Deserialization error"));

        let err = service.update_asset(&org1, "bad", 1).await.unwrap_err();
        assert!(err.to_string().starts_with("UpdateAsset bad: "));

        let err = service.get_all_assets().await.unwrap_err();
        assert!(err.to_string().starts_with("GetAllAssets: Deserialization error"));
    }

    #[tokio::test]
    async fn test_configured_role_is_used() {
        let config = ServiceConfig {
            endorsement_role: Role::Peer,
        };
        let service = AssetService::with_config(Box::new(MemoryAdapter::new()), config);
        let org1 = Caller::new("Org1MSP");

        service
            .create_asset(&org1, "asset1", 1, "Alice")
            .await
            .unwrap();

        let policy = service.read_asset_policy("asset1").await.unwrap();
        assert_eq!(policy.principals()[0].role, Role::Peer);
    }
}
