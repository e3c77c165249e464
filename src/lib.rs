// src/lib.rs
//! # asset-ledger
//!
//! Ownership of discrete assets on a shared key-value ledger where every key
//! carries its own endorsement policy.
//!
//! An asset is one record under its id. The policy on that key names the
//! organization whose approval the next write needs, and it always mirrors the
//! asset's `OwnerOrg`. Creating an asset installs the creator's organization;
//! transferring it replaces the policy with the new owner's organization in
//! the same write set.
//!
//! ```rust,ignore
//! use asset_ledger::{AssetService, Caller, adapters::MemoryAdapter};
//!
//! let service = AssetService::new(Box::new(MemoryAdapter::new()));
//! let org1 = Caller::new("Org1MSP");
//!
//! service.create_asset(&org1, "asset1", 100, "Alice").await?;
//! service.transfer_asset(&org1, "asset1", "Bob", "Org2MSP").await?;
//!
//! // From here on only Org2MSP can endorse writes to asset1.
//! service.update_asset(&Caller::new("Org2MSP"), "asset1", 200).await?;
//! ```
//!
//! ## Layers
//!
//! | Module       | Role                                                      |
//! |--------------|-----------------------------------------------------------|
//! | `asset`      | the record and its JSON encoding                          |
//! | `policy`     | per-key endorsement policies                              |
//! | `write_set`  | staged writes committed as one unit                       |
//! | `adapters`   | the ledger contract and an in-memory ledger               |
//! | `service`    | create / read / update / delete / transfer / exists       |
//! | `dispatch`   | string-argument invocations routed to the service         |
//!
//! The service never checks who is calling. It stages writes endorsed by the
//! caller's organization and the ledger decides at commit time whether the
//! installed policy is satisfied.

pub mod adapters;
pub mod asset;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod policy;
pub mod service;
pub mod write_set;

pub use adapters::LedgerAdapter;
pub use asset::Asset;
pub use config::ServiceConfig;
pub use context::Caller;
pub use dispatch::{Dispatcher, Invocation};
pub use error::Error;
pub use policy::{KeyEndorsementPolicy, Principal, Role, build_org_policy};
pub use service::{AssetOp, AssetService};
pub use write_set::{Write, WriteSet};
