use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use nugget_core::error::NuggetError;
use nugget_core::transaction::{Receipt, Transaction};
use nugget_core::types::{Address, Hash32, Wei};
use nugget_deploy::Deployment;
use nugget_state::{SaleQuery, StakingQuery, StateDb};

use crate::api::NuggetApiServer;
use crate::types::{RpcDeployment, RpcNftInfo, RpcReceipt, RpcRoyalty, RpcStakeInfo};

/// Malformed hex, addresses or transaction bytes.
pub const INVALID_PARAMS: i32 = -32602;
/// The transaction or query was rejected by the state machine.
pub const EXECUTION_REVERTED: i32 = -32000;
pub const INTERNAL_ERROR: i32 = -32603;

const MAX_RECENT_RECEIPTS: usize = 100;

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

/// Map a state error onto a JSON-RPC error object.
pub fn state_err(e: NuggetError) -> ErrorObject<'static> {
    match e {
        NuggetError::InvalidHex(_) => rpc_err(INVALID_PARAMS, e.to_string()),
        NuggetError::Storage(_) | NuggetError::Serialization(_) => rpc_err(INTERNAL_ERROR, e.to_string()),
        _ => rpc_err(EXECUTION_REVERTED, e.to_string()),
    }
}

fn parse_address(s: &str) -> Result<Address, ErrorObject<'static>> {
    s.parse().map_err(|e| rpc_err(INVALID_PARAMS, format!("invalid address: {e}")))
}

fn parse_proof(proof: &[String]) -> Result<Vec<Hash32>, ErrorObject<'static>> {
    proof
        .iter()
        .map(|p| p.parse().map_err(|e| rpc_err(INVALID_PARAMS, format!("invalid proof element: {e}"))))
        .collect()
}

/// A decoded transaction waiting for the node's apply loop, with the
/// channel its outcome is reported on.
pub struct TxRequest {
    pub tx: Transaction,
    pub reply: oneshot::Sender<Result<Receipt, NuggetError>>,
}

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    pub db: Arc<StateDb>,
    pub deployment: Deployment,
    /// Feeds the node's single apply loop.
    pub tx_sender: mpsc::Sender<TxRequest>,
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr`. Returns the bound address and a
    /// handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<(SocketAddr, ServerHandle)> {
        let server = Server::builder().build(addr).await?;
        let bound = server.local_addr()?;
        let module = self.into_rpc();
        let handle = server.start(module);
        info!(addr = %bound, "RPC server started");
        Ok((bound, handle))
    }

    fn sale(&self) -> Result<SaleQuery<'_>, ErrorObject<'static>> {
        SaleQuery::new(&self.state.db, &self.state.deployment.collection).map_err(state_err)
    }

    fn staking(&self) -> StakingQuery<'_> {
        StakingQuery::new(&self.state.db)
    }
}

#[async_trait]
impl NuggetApiServer for RpcServer {
    async fn send_transaction(&self, tx_hex: String) -> RpcResult<RpcReceipt> {
        let bytes = hex::decode(tx_hex.trim_start_matches("0x"))
            .map_err(|e| rpc_err(INVALID_PARAMS, format!("invalid hex: {e}")))?;
        let tx = Transaction::from_bytes(&bytes)
            .map_err(|e| rpc_err(INVALID_PARAMS, format!("invalid transaction encoding: {e}")))?;

        let (reply, outcome) = oneshot::channel();
        self.state
            .tx_sender
            .send(TxRequest { tx, reply })
            .await
            .map_err(|_| rpc_err(INTERNAL_ERROR, "transaction queue closed"))?;
        let receipt = outcome
            .await
            .map_err(|_| rpc_err(INTERNAL_ERROR, "apply loop dropped the transaction"))?
            .map_err(state_err)?;
        Ok(RpcReceipt::from(&receipt))
    }

    async fn get_receipt(&self, seq: u64) -> RpcResult<Option<RpcReceipt>> {
        let receipt = self.state.db.get_receipt(seq).map_err(state_err)?;
        Ok(receipt.as_ref().map(RpcReceipt::from))
    }

    async fn recent_receipts(&self, limit: usize) -> RpcResult<Vec<RpcReceipt>> {
        let receipts = self
            .state
            .db
            .recent_receipts(limit.min(MAX_RECENT_RECEIPTS))
            .map_err(state_err)?;
        Ok(receipts.iter().map(RpcReceipt::from).collect())
    }

    async fn deployment(&self) -> RpcResult<RpcDeployment> {
        Ok(RpcDeployment::from(&self.state.deployment))
    }

    // ── Sale ──────────────────────────────────────────────────────────────────

    async fn price_for(&self, proof: Vec<String>, claimant: String) -> RpcResult<String> {
        let proof = parse_proof(&proof)?;
        let claimant = parse_address(&claimant)?;
        Ok(self.sale()?.price_for(&proof, &claimant).to_string())
    }

    async fn is_whitelisted(&self, proof: Vec<String>, claimant: String) -> RpcResult<bool> {
        let proof = parse_proof(&proof)?;
        let claimant = parse_address(&claimant)?;
        Ok(self.sale()?.is_whitelisted(&proof, &claimant))
    }

    async fn token_uri(&self, token_id: u64) -> RpcResult<String> {
        Ok(self.sale()?.token_uri(token_id).map_err(state_err)?)
    }

    async fn exists(&self, token_id: u64) -> RpcResult<bool> {
        Ok(self.sale()?.exists(token_id).map_err(state_err)?)
    }

    async fn owner_of(&self, token_id: u64) -> RpcResult<Option<String>> {
        let owner = self.sale()?.owner_of(token_id).map_err(state_err)?;
        Ok(owner.map(|a| a.to_hex()))
    }

    async fn max_supply(&self) -> RpcResult<u64> {
        Ok(self.sale()?.max_supply())
    }

    async fn circulating_supply(&self) -> RpcResult<u64> {
        Ok(self.sale()?.circulating_supply())
    }

    async fn merkle_root(&self) -> RpcResult<String> {
        Ok(self.sale()?.merkle_root().to_hex())
    }

    async fn whitelist_pointer(&self) -> RpcResult<String> {
        Ok(self.sale()?.whitelist_pointer().to_string())
    }

    async fn funding_wallet(&self) -> RpcResult<String> {
        Ok(self.sale()?.funding_wallet().to_hex())
    }

    async fn royalty_info(&self, token_id: u64, sale_price: String) -> RpcResult<RpcRoyalty> {
        let price: Wei = sale_price
            .parse()
            .map_err(|e| rpc_err(INVALID_PARAMS, format!("invalid sale price: {e}")))?;
        let (receiver, amount) = self.sale()?.royalty_info(token_id, price);
        Ok(RpcRoyalty::new(receiver, amount))
    }

    // ── Staking ───────────────────────────────────────────────────────────────

    async fn is_active(&self, collection: String) -> RpcResult<bool> {
        let collection = parse_address(&collection)?;
        Ok(self.staking().is_active(&collection).map_err(state_err)?)
    }

    async fn nft_info(&self, collection: String) -> RpcResult<RpcNftInfo> {
        let collection = parse_address(&collection)?;
        let info = self.staking().nft_info(&collection).map_err(state_err)?;
        Ok(RpcNftInfo::from(info))
    }

    async fn stake_info(&self, address: String) -> RpcResult<RpcStakeInfo> {
        let address = parse_address(&address)?;
        let staking = self.staking();
        let stake = staking.stake_info(&address).map_err(state_err)?;
        let now = chrono::Utc::now().timestamp();
        let pending = staking.pending_reward(&address, now).map_err(state_err)?;
        Ok(RpcStakeInfo::new(stake, pending))
    }

    async fn token_owner(&self, collection: String, token_id: u64) -> RpcResult<String> {
        let collection = parse_address(&collection)?;
        let owner = self.staking().token_owner(&collection, token_id).map_err(state_err)?;
        Ok(owner.to_hex())
    }

    async fn reward_balance(&self, address: String) -> RpcResult<String> {
        let address = parse_address(&address)?;
        Ok(self.staking().reward_balance(&address).map_err(state_err)?.to_string())
    }

    async fn balance(&self, address: String) -> RpcResult<String> {
        let address = parse_address(&address)?;
        Ok(self.staking().balance(&address).map_err(state_err)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(state_err(NuggetError::InvalidToken(0)).code(), EXECUTION_REVERTED);
        assert_eq!(state_err(NuggetError::NotOwner).code(), EXECUTION_REVERTED);
        assert_eq!(state_err(NuggetError::InvalidHex("zz".into())).code(), INVALID_PARAMS);
        assert_eq!(state_err(NuggetError::Storage("disk".into())).code(), INTERNAL_ERROR);
    }

    #[test]
    fn revert_message_names_the_failure() {
        let e = state_err(NuggetError::InvalidPayment { expected: 60, got: 200 });
        assert!(e.message().contains("60"));
        assert!(e.message().contains("200"));
    }

    #[test]
    fn proof_parsing() {
        let ok = parse_proof(&[format!("0x{}", "11".repeat(32))]).unwrap();
        assert_eq!(ok, vec![Hash32::from_bytes([0x11; 32])]);
        assert_eq!(parse_proof(&["0x1234".into()]).unwrap_err().code(), INVALID_PARAMS);
        assert_eq!(parse_address("nope").unwrap_err().code(), INVALID_PARAMS);
    }
}
