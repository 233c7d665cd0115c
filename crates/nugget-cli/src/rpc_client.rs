use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use nugget_core::transaction::Transaction;
use nugget_core::types::{Address, Hash32};

/// Minimal JSON-RPC 2.0 client for a running nugget-node.
pub struct NuggetRpcClient {
    url: String,
    client: reqwest::Client,
}

impl NuggetRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    pub async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.url))?;

        let json: Value = resp.json().await.context("parsing RPC response")?;

        if let Some(err) = json.get("error") {
            let code = err["code"].as_i64().unwrap_or_default();
            let message = err["message"].as_str().unwrap_or("unknown error");
            bail!("RPC error {code}: {message}");
        }

        Ok(json["result"].clone())
    }

    async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> anyhow::Result<T> {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).with_context(|| format!("decoding {method} result"))
    }

    /// Submit a transaction and wait for its receipt.
    pub async fn send_transaction(&self, tx: &Transaction) -> anyhow::Result<Value> {
        let bytes = tx.to_bytes()?;
        self.call("nugget_sendTransaction", json!([hex::encode(bytes)])).await
    }

    pub async fn recent_receipts(&self, limit: usize) -> anyhow::Result<Value> {
        self.call("nugget_recentReceipts", json!([limit])).await
    }

    pub async fn deployment(&self) -> anyhow::Result<Value> {
        self.call("nugget_deployment", json!([])).await
    }

    /// Collection address of the node's deployment.
    pub async fn collection(&self) -> anyhow::Result<Address> {
        self.deployment_address("collection").await
    }

    pub async fn staking(&self) -> anyhow::Result<Address> {
        self.deployment_address("staking").await
    }

    async fn deployment_address(&self, field: &str) -> anyhow::Result<Address> {
        let deployment = self.deployment().await?;
        let encoded = deployment[field]
            .as_str()
            .with_context(|| format!("missing {field} in deployment response"))?;
        Ok(encoded.parse()?)
    }

    pub async fn price_for(&self, proof: &[Hash32], claimant: &Address) -> anyhow::Result<u128> {
        let price: String = self
            .call_as("nugget_priceFor", json!([hex_proof(proof), claimant.to_hex()]))
            .await?;
        price.parse().context("price is not a decimal amount")
    }

    pub async fn owner_of(&self, token_id: u64) -> anyhow::Result<Option<String>> {
        self.call_as("nugget_ownerOf", json!([token_id])).await
    }

    pub async fn token_uri(&self, token_id: u64) -> anyhow::Result<String> {
        self.call_as("nugget_tokenURI", json!([token_id])).await
    }

    pub async fn circulating_supply(&self) -> anyhow::Result<u64> {
        self.call_as("nugget_circulatingSupply", json!([])).await
    }

    pub async fn max_supply(&self) -> anyhow::Result<u64> {
        self.call_as("nugget_maxSupply", json!([])).await
    }

    pub async fn is_active(&self, collection: &Address) -> anyhow::Result<bool> {
        self.call_as("nugget_isActive", json!([collection.to_hex()])).await
    }

    pub async fn nft_info(&self, collection: &Address) -> anyhow::Result<Value> {
        self.call("nugget_nftInfo", json!([collection.to_hex()])).await
    }

    pub async fn stake_info(&self, address: &Address) -> anyhow::Result<Value> {
        self.call("nugget_stakeInfo", json!([address.to_hex()])).await
    }

    pub async fn token_owner(&self, collection: &Address, token_id: u64) -> anyhow::Result<String> {
        self.call_as("nugget_tokenOwner", json!([collection.to_hex(), token_id])).await
    }

    pub async fn reward_balance(&self, address: &Address) -> anyhow::Result<String> {
        self.call_as("nugget_rewardBalance", json!([address.to_hex()])).await
    }

    pub async fn balance(&self, address: &Address) -> anyhow::Result<String> {
        self.call_as("nugget_balance", json!([address.to_hex()])).await
    }
}

pub fn hex_proof(proof: &[Hash32]) -> Vec<String> {
    proof.iter().map(Hash32::to_hex).collect()
}
