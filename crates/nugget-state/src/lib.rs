pub mod db;
pub mod engine;
pub mod ledger;
pub mod pricing;
pub mod query;
pub mod sale;
pub mod staged;
pub mod staking;

#[cfg(test)]
mod testutil;

pub use db::{StateBatch, StateDb};
pub use engine::StateEngine;
pub use ledger::AssetLedger;
pub use query::{SaleQuery, StakingQuery};
pub use staged::StagedState;
