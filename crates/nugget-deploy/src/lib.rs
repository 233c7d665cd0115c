//! nugget-deploy
//!
//! Builds the initial state from `DeployParams` through one staged
//! execution, so a bad parameter file leaves the database empty:
//!
//! 1. Initial native balances
//! 2. The collection, with its reserved range minted to the deployer
//! 3. The staking contract and its reward token
//! 4. Minter role for staking on the reward token
//! 5. Optional staking registration of the collection

pub mod params;

pub use params::{Allocation, CollectionParams, DeployParams, RewardTokenParams};

use nugget_core::collection::{Collection, WhitelistRegistry};
use nugget_core::error::NuggetError;
use nugget_core::staking::{RewardToken, StakingContract};
use nugget_core::transaction::Receipt;
use nugget_core::types::{Address, Timestamp};
use nugget_crypto::contract_address;
use nugget_state::ledger::grant_minter_role;
use nugget_state::{sale, staking, StateEngine};
use tracing::info;

/// Addresses of the deployed contracts. Derived deterministically from the
/// deployer and salt, so a restarted node recomputes them from its params.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub deployer: Address,
    pub collection: Address,
    pub staking: Address,
    pub reward_token: Address,
}

impl Deployment {
    pub fn derive(params: &DeployParams) -> Result<Self, NuggetError> {
        let deployer = params.deployer()?;
        Ok(Self {
            deployer,
            collection: contract_address("collection", &deployer, &params.salt),
            staking: contract_address("staking", &deployer, &params.salt),
            reward_token: contract_address("reward_token", &deployer, &params.salt),
        })
    }
}

/// Whether the database already holds a deployment.
pub fn is_deployed(engine: &StateEngine) -> Result<bool, NuggetError> {
    Ok(engine.db.get_staking()?.is_some())
}

/// Apply a fresh deployment. Fails without side effects if any part of it
/// is invalid or a deployment already exists.
pub fn apply_deployment(
    engine: &StateEngine,
    params: &DeployParams,
    now: Timestamp,
) -> Result<(Deployment, Receipt), NuggetError> {
    info!("applying deployment");

    let deployment = Deployment::derive(params)?;
    let c = &params.collection;
    let config = c.sale_config(now);
    let collection = Collection {
        address: deployment.collection,
        name: c.name.clone(),
        symbol: c.symbol.clone(),
        owner: deployment.deployer,
        config,
        whitelist: WhitelistRegistry {
            root: c.whitelist_root()?,
            pointer: c.whitelist_pointer.clone(),
        },
        funding_wallet: c.funding_wallet()?,
        circulating_supply: 0,
    };
    let staking_contract = StakingContract {
        address: deployment.staking,
        owner: deployment.deployer,
        reward_token: deployment.reward_token,
    };
    let token = RewardToken {
        address: deployment.reward_token,
        name: params.reward_token.name.clone(),
        symbol: params.reward_token.symbol.clone(),
        admin: deployment.deployer,
        minters: vec![],
        total_supply: 0,
    };
    let balances = params
        .balances
        .iter()
        .map(|a| a.address().map(|address| (address, a.amount)))
        .collect::<Result<Vec<_>, NuggetError>>()?;

    let receipt = engine.execute(deployment.deployer, now, |s| {
        for (account, amount) in &balances {
            s.set_balance(account, *amount);
        }
        sale::deploy_collection(s, collection)?;
        staking::deploy_staking(s, staking_contract, token)?;
        grant_minter_role(s, &deployment.deployer, &deployment.staking)?;
        if let Some(threshold) = params.staking_threshold {
            staking::add_nft(s, &deployment.deployer, &deployment.collection, threshold)?;
        }
        Ok(())
    })?;
    engine.db.flush()?;

    info!(
        collection = %deployment.collection,
        staking = %deployment.staking,
        reward_token = %deployment.reward_token,
        events = receipt.events.len(),
        "deployment committed"
    );
    Ok((deployment, receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nugget_core::event::Event;
    use nugget_core::staking::NftStatus;
    use nugget_crypto::MerkleTree;
    use nugget_state::StateDb;
    use std::sync::Arc;

    const NOW: Timestamp = 1_700_000_000;

    const PARAMS: &str = r#"{
        "deployer": "0x1111111111111111111111111111111111111111",
        "salt": "test",
        "collection": {
            "name": "My NFT",
            "symbol": "MN",
            "base_uri": "ipfs://meta/",
            "whitelist_pointer": "ipfs://list",
            "whitelist_addresses": [
                "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"
            ],
            "funding_wallet": "0xf0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0"
        },
        "balances": [
            { "address": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "amount": 1000000000000000000 }
        ]
    }"#;

    fn members() -> Vec<Address> {
        vec![
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap(),
            "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC".parse().unwrap(),
        ]
    }

    fn temp_engine(name: &str) -> StateEngine {
        let dir = std::env::temp_dir().join(format!("nugget_deploy_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        StateEngine::new(Arc::new(StateDb::open(&dir).unwrap()))
    }

    #[test]
    fn deployment_builds_all_contracts() {
        let engine = temp_engine("full");
        let params = DeployParams::from_json(PARAMS).unwrap();
        let (d, receipt) = apply_deployment(&engine, &params, NOW).unwrap();

        let c = engine.db.get_collection(&d.collection).unwrap().unwrap();
        assert_eq!(c.circulating_supply, 5);
        assert_eq!(c.config.deadline, NOW + 86_400);
        assert_eq!(c.owner, d.deployer);
        let members = members();
        assert_eq!(c.whitelist.root, MerkleTree::from_addresses(&members).root());

        let token = engine.db.get_reward_token().unwrap().unwrap();
        assert_eq!(token.symbol, "GN");
        assert!(token.is_minter(&d.staking));
        assert_eq!(engine.db.get_balance(&members[0]).unwrap(), 1_000_000_000_000_000_000);

        assert!(receipt.events.contains(&Event::MinterRoleGranted { account: d.staking }));
        assert!(is_deployed(&engine).unwrap());
        assert_eq!(Deployment::derive(&params).unwrap(), d);
    }

    #[test]
    fn second_deployment_is_rejected() {
        let engine = temp_engine("twice");
        let params = DeployParams::from_json(PARAMS).unwrap();
        apply_deployment(&engine, &params, NOW).unwrap();
        assert!(matches!(
            apply_deployment(&engine, &params, NOW),
            Err(NuggetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn bad_params_leave_db_empty() {
        let engine = temp_engine("bad");
        let mut params = DeployParams::from_json(PARAMS).unwrap();
        params.collection.max_supply = Some(100);
        assert!(matches!(
            apply_deployment(&engine, &params, NOW),
            Err(NuggetError::InvalidConfig(_))
        ));
        assert!(!is_deployed(&engine).unwrap());
        assert_eq!(engine.db.next_seq().unwrap(), 0);
    }

    #[test]
    fn optional_staking_registration() {
        let engine = temp_engine("register");
        let mut params = DeployParams::from_json(PARAMS).unwrap();
        params.staking_threshold = Some(0);
        let (d, _) = apply_deployment(&engine, &params, NOW).unwrap();
        let info = engine.db.get_nft_info(&d.collection).unwrap().unwrap();
        assert_eq!(info.status, NftStatus::Active);
    }
}
