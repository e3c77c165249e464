// src/asset.rs
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A valued item stored as one ledger record under its `ID`.
///
/// `owner_org` is the organization whose endorsement the key's policy
/// requires; it changes only through a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Value")]
    pub value: i64,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "OwnerOrg")]
    pub owner_org: String,
}

impl Asset {
    pub fn new(id: &str, value: i64, owner: &str, owner_org: &str) -> Self {
        Self {
            id: id.to_string(),
            value,
            owner: owner.to_string(),
            owner_org: owner_org.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::Serialize(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialize(e.to_string()))
    }

    pub(crate) fn reassign(&mut self, owner: &str, owner_org: &str) {
        self.owner = owner.to_string();
        self.owner_org = owner_org.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_round_trip() {
        let asset = Asset::new("asset1", -42, "Alice", "Org1MSP");
        let bytes = asset.to_bytes().unwrap();
        assert_eq!(Asset::from_bytes(&bytes).unwrap(), asset);
    }

    #[test]
    fn test_asset_wire_field_names() {
        let asset = Asset::new("asset1", 100, "Alice", "Org1MSP");
        let json: serde_json::Value = serde_json::from_slice(&asset.to_bytes().unwrap()).unwrap();

        assert_eq!(json["ID"], "asset1");
        assert_eq!(json["Value"], 100);
        assert_eq!(json["Owner"], "Alice");
        assert_eq!(json["OwnerOrg"], "Org1MSP");
    }

    #[test]
    fn test_asset_from_garbage_fails() {
        let err = Asset::from_bytes(b"not an asset").unwrap_err();
        assert!(matches!(err, Error::Deserialize(_)));
    }

    #[test]
    fn test_reassign_keeps_id_and_value() {
        let mut asset = Asset::new("asset1", 100, "Alice", "Org1MSP");
        asset.reassign("Bob", "Org2MSP");

        assert_eq!(asset.id, "asset1");
        assert_eq!(asset.value, 100);
        assert_eq!(asset.owner, "Bob");
        assert_eq!(asset.owner_org, "Org2MSP");
    }
}
