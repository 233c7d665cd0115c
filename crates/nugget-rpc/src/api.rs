use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{RpcDeployment, RpcNftInfo, RpcReceipt, RpcRoyalty, RpcStakeInfo};

/// Nugget JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "nugget_" via `namespace = "nugget"`.
/// Addresses and hashes are `0x` hex strings; amounts are decimal strings.
#[rpc(server, namespace = "nugget")]
pub trait NuggetApi {
    /// Submit a transaction. `tx_hex` is hex-encoded bincode(Transaction).
    /// Waits until it has been applied and returns its receipt.
    #[method(name = "sendTransaction")]
    async fn send_transaction(&self, tx_hex: String) -> RpcResult<RpcReceipt>;

    #[method(name = "getReceipt")]
    async fn get_receipt(&self, seq: u64) -> RpcResult<Option<RpcReceipt>>;

    /// Newest receipts first, at most `limit` (capped by the server).
    #[method(name = "recentReceipts")]
    async fn recent_receipts(&self, limit: usize) -> RpcResult<Vec<RpcReceipt>>;

    #[method(name = "deployment")]
    async fn deployment(&self) -> RpcResult<RpcDeployment>;

    // ── Sale ──────────────────────────────────────────────────────────────────

    /// Unit price for `claimant` given its allow-list proof.
    #[method(name = "priceFor")]
    async fn price_for(&self, proof: Vec<String>, claimant: String) -> RpcResult<String>;

    #[method(name = "isWhitelisted")]
    async fn is_whitelisted(&self, proof: Vec<String>, claimant: String) -> RpcResult<bool>;

    #[method(name = "tokenURI")]
    async fn token_uri(&self, token_id: u64) -> RpcResult<String>;

    #[method(name = "exists")]
    async fn exists(&self, token_id: u64) -> RpcResult<bool>;

    #[method(name = "ownerOf")]
    async fn owner_of(&self, token_id: u64) -> RpcResult<Option<String>>;

    #[method(name = "maxSupply")]
    async fn max_supply(&self) -> RpcResult<u64>;

    #[method(name = "circulatingSupply")]
    async fn circulating_supply(&self) -> RpcResult<u64>;

    #[method(name = "merkleRoot")]
    async fn merkle_root(&self) -> RpcResult<String>;

    #[method(name = "whitelistPointer")]
    async fn whitelist_pointer(&self) -> RpcResult<String>;

    #[method(name = "fundingWallet")]
    async fn funding_wallet(&self) -> RpcResult<String>;

    /// `sale_price` is a decimal string.
    #[method(name = "royaltyInfo")]
    async fn royalty_info(&self, token_id: u64, sale_price: String) -> RpcResult<RpcRoyalty>;

    // ── Staking ───────────────────────────────────────────────────────────────

    #[method(name = "isActive")]
    async fn is_active(&self, collection: String) -> RpcResult<bool>;

    #[method(name = "nftInfo")]
    async fn nft_info(&self, collection: String) -> RpcResult<RpcNftInfo>;

    #[method(name = "stakeInfo")]
    async fn stake_info(&self, address: String) -> RpcResult<RpcStakeInfo>;

    /// Depositor of a token held in staking custody, or the null address.
    #[method(name = "tokenOwner")]
    async fn token_owner(&self, collection: String, token_id: u64) -> RpcResult<String>;

    #[method(name = "rewardBalance")]
    async fn reward_balance(&self, address: String) -> RpcResult<String>;

    /// Native balance.
    #[method(name = "balance")]
    async fn balance(&self, address: String) -> RpcResult<String>;
}
