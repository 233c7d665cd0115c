use nugget_core::event::Event;
use nugget_core::staking::{NftInfo, StakeInfo};
use nugget_core::transaction::Receipt;
use nugget_core::types::{Address, Wei};
use nugget_deploy::Deployment;
use serde::{Deserialize, Serialize};

/// Receipt of an applied transaction as returned by `nugget_sendTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcReceipt {
    pub seq: u64,
    pub caller: String,
    pub applied_at: i64,
    pub events: Vec<RpcEvent>,
}

impl From<&Receipt> for RpcReceipt {
    fn from(r: &Receipt) -> Self {
        Self {
            seq: r.seq,
            caller: r.caller.to_hex(),
            applied_at: r.applied_at,
            events: r.events.iter().map(RpcEvent::from).collect(),
        }
    }
}

/// JSON form of an event. Addresses and hashes are `0x` hex; amounts are
/// decimal strings (u128 does not survive a JSON number round trip).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RpcEvent {
    Bought { token_id: u64, buyer: String, price: String },
    PermanentUri { uri: String, token_id: u64 },
    MerkleRootSet { root: String, pointer: String },
    FundingWalletSet { wallet: String },
    NftTransfer { collection: String, from: String, to: String, token_id: u64 },
    NftAdded { collection: String },
    NftReceived { token_id: u64, collection: String, depositor: String },
    RewardTransfer { from: String, to: String, amount: String },
    Claim { depositor: String, amount: String },
    Withdraw { token_id: u64, collection: String, depositor: String },
    MinterRoleGranted { account: String },
}

impl From<&Event> for RpcEvent {
    fn from(e: &Event) -> Self {
        match e {
            Event::Bought { token_id, buyer, price } => RpcEvent::Bought {
                token_id: *token_id,
                buyer: buyer.to_hex(),
                price: price.to_string(),
            },
            Event::PermanentUri { uri, token_id } => RpcEvent::PermanentUri {
                uri: uri.clone(),
                token_id: *token_id,
            },
            Event::MerkleRootSet { root, pointer } => RpcEvent::MerkleRootSet {
                root: root.to_hex(),
                pointer: pointer.clone(),
            },
            Event::FundingWalletSet { wallet } => RpcEvent::FundingWalletSet { wallet: wallet.to_hex() },
            Event::NftTransfer { collection, from, to, token_id } => RpcEvent::NftTransfer {
                collection: collection.to_hex(),
                from: from.to_hex(),
                to: to.to_hex(),
                token_id: *token_id,
            },
            Event::NftAdded { collection } => RpcEvent::NftAdded { collection: collection.to_hex() },
            Event::NftReceived { token_id, collection, depositor } => RpcEvent::NftReceived {
                token_id: *token_id,
                collection: collection.to_hex(),
                depositor: depositor.to_hex(),
            },
            Event::RewardTransfer { from, to, amount } => RpcEvent::RewardTransfer {
                from: from.to_hex(),
                to: to.to_hex(),
                amount: amount.to_string(),
            },
            Event::Claim { depositor, amount } => RpcEvent::Claim {
                depositor: depositor.to_hex(),
                amount: amount.to_string(),
            },
            Event::Withdraw { token_id, collection, depositor } => RpcEvent::Withdraw {
                token_id: *token_id,
                collection: collection.to_hex(),
                depositor: depositor.to_hex(),
            },
            Event::MinterRoleGranted { account } => RpcEvent::MinterRoleGranted { account: account.to_hex() },
        }
    }
}

/// `(receiver, royaltyAmount)` for a secondary sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcRoyalty {
    pub receiver: String,
    pub amount: String,
}

impl RpcRoyalty {
    pub fn new(receiver: Address, amount: Wei) -> Self {
        Self { receiver: receiver.to_hex(), amount: amount.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcNftInfo {
    pub percentage_threshold: u8,
    /// 0 = not added, 1 = active, 2 = pending threshold.
    pub status: u8,
}

impl From<NftInfo> for RpcNftInfo {
    fn from(info: NftInfo) -> Self {
        Self {
            percentage_threshold: info.percentage_threshold,
            status: info.status as u8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcStakeInfo {
    pub token_count: u64,
    pub start_date: i64,
    /// Reward a claim would mint right now (decimal string).
    pub pending_reward: String,
}

impl RpcStakeInfo {
    pub fn new(stake: StakeInfo, pending: Wei) -> Self {
        Self {
            token_count: stake.token_count,
            start_date: stake.start_date,
            pending_reward: pending.to_string(),
        }
    }
}

/// Contract addresses of this node's deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcDeployment {
    pub deployer: String,
    pub collection: String,
    pub staking: String,
    pub reward_token: String,
}

impl From<&Deployment> for RpcDeployment {
    fn from(d: &Deployment) -> Self {
        Self {
            deployer: d.deployer.to_hex(),
            collection: d.collection.to_hex(),
            staking: d.staking.to_hex(),
            reward_token: d.reward_token.to_hex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nugget_core::staking::NftStatus;

    #[test]
    fn events_serialize_with_tag_and_string_amounts() {
        let e = Event::Claim { depositor: Address::from_bytes([0xAB; 20]), amount: u128::MAX };
        let json = serde_json::to_value(RpcEvent::from(&e)).unwrap();
        assert_eq!(json["event"], "Claim");
        assert_eq!(json["depositor"], format!("0x{}", "ab".repeat(20)));
        assert_eq!(json["amount"], u128::MAX.to_string());
    }

    #[test]
    fn nft_status_discriminants() {
        let info = NftInfo { percentage_threshold: 7, status: NftStatus::PendingThreshold };
        let rpc = RpcNftInfo::from(info);
        assert_eq!(rpc.status, 2);
        assert_eq!(RpcNftInfo::from(NftInfo::default()).status, 0);
    }
}
