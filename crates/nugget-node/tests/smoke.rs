//! End-to-end smoke test for nugget-node.
//!
//! Starts a real node process with a fresh deployment, submits transactions
//! via JSON-RPC, and asserts the resulting state through the query methods.
//!
//! Run with:
//!   cargo test -p nugget-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use nugget_core::constants::WHITELIST_PRICE_WEI;
use nugget_core::transaction::{Call, Transaction};
use nugget_core::types::{Address, Hash32};
use nugget_crypto::MerkleTree;

// ── Node lifecycle ────────────────────────────────────────────────────────────

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

/// Find a free TCP port on loopback.
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

// ── RPC helpers ───────────────────────────────────────────────────────────────

async fn rpc_raw(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });
    let resp = client
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("RPC call {method} failed: {e}"));
    resp.json().await.expect("parse RPC JSON")
}

async fn rpc_call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let json = rpc_raw(client, url, method, params).await;
    if let Some(err) = json.get("error") {
        panic!("RPC error from {method}: {err}");
    }
    json["result"].clone()
}

/// Poll until the RPC server responds or the timeout elapses.
async fn wait_for_rpc(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": "nugget_deployment",
        "params": [],
        "id": 1
    });
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.post(url).json(&body).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    false
}

fn tx_hex(caller: Address, value: u128, call: Call) -> String {
    let tx = Transaction::new(caller, call).with_value(value);
    hex::encode(tx.to_bytes().expect("encode tx"))
}

fn addr(b: u8) -> Address {
    Address::from_bytes([b; 20])
}

fn hex_proof(proof: &[Hash32]) -> Vec<String> {
    proof.iter().map(Hash32::to_hex).collect()
}

// ── Smoke test ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn smoke_buy_stake_withdraw() {
    // ── 1. Prepare temp dir and deploy params ─────────────────────────────────
    let data_dir = std::env::temp_dir().join(format!("nugget_e2e_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&data_dir);
    std::fs::create_dir_all(&data_dir).unwrap();

    let deployer = addr(0x01);
    let buyer = addr(0xA1);
    let members = [buyer, addr(0xA2), addr(0xA3)];
    let tree = MerkleTree::from_addresses(&members);

    let params = serde_json::json!({
        "deployer": deployer.to_hex(),
        "salt": "smoke",
        "collection": {
            "name": "My NFT",
            "symbol": "MN",
            "base_uri": "ipfs://meta/",
            "whitelist_pointer": "ipfs://list",
            "whitelist_addresses": members.iter().map(Address::to_hex).collect::<Vec<_>>(),
            "funding_wallet": addr(0xF0).to_hex()
        },
        "balances": [ { "address": buyer.to_hex(), "amount": 1_000_000_000_000_000_000u64 } ]
    });
    let params_path = data_dir.join("params.json");
    std::fs::write(&params_path, params.to_string()).unwrap();

    // ── 2. Start node ─────────────────────────────────────────────────────────
    let rpc_port = free_port();
    let rpc_url = format!("http://127.0.0.1:{}", rpc_port);

    let node_bin = env!("CARGO_BIN_EXE_nugget-node");
    let child = Command::new(node_bin)
        .args([
            "--data-dir",      data_dir.join("node").to_str().unwrap(),
            "--rpc-addr",      &format!("127.0.0.1:{}", rpc_port),
            "--deploy-params", params_path.to_str().unwrap(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn nugget-node");

    let _guard = NodeGuard { child, data_dir };

    // ── 3. Wait for RPC ready ─────────────────────────────────────────────────
    let http = reqwest::Client::new();
    assert!(
        wait_for_rpc(&http, &rpc_url, Duration::from_secs(20)).await,
        "nugget-node did not become ready within 20 seconds"
    );

    let deployment = rpc_call(&http, &rpc_url, "nugget_deployment", serde_json::json!([])).await;
    let collection: Address = deployment["collection"].as_str().unwrap().parse().unwrap();
    let staking: Address = deployment["staking"].as_str().unwrap().parse().unwrap();

    // ── 4. Reserved range was pre-minted ──────────────────────────────────────
    let supply = rpc_call(&http, &rpc_url, "nugget_circulatingSupply", serde_json::json!([])).await;
    assert_eq!(supply.as_u64(), Some(5));
    let owner = rpc_call(&http, &rpc_url, "nugget_ownerOf", serde_json::json!([10_001])).await;
    assert_eq!(owner.as_str(), Some(deployer.to_hex().as_str()));

    // ── 5. Wrong payment reverts ──────────────────────────────────────────────
    let proof = tree.proof_for(&buyer).unwrap();
    let buy = Call::Buy { collection, proof: proof.clone(), token_id: 1 };
    let bad = rpc_raw(
        &http,
        &rpc_url,
        "nugget_sendTransaction",
        serde_json::json!([tx_hex(buyer, 2 * WHITELIST_PRICE_WEI, buy.clone())]),
    )
    .await;
    assert_eq!(bad["error"]["code"].as_i64(), Some(-32000));

    // ── 6. Allow-listed purchase ──────────────────────────────────────────────
    let price = rpc_call(
        &http,
        &rpc_url,
        "nugget_priceFor",
        serde_json::json!([hex_proof(&proof), buyer.to_hex()]),
    )
    .await;
    assert_eq!(price.as_str(), Some(WHITELIST_PRICE_WEI.to_string().as_str()));

    let receipt = rpc_call(
        &http,
        &rpc_url,
        "nugget_sendTransaction",
        serde_json::json!([tx_hex(buyer, WHITELIST_PRICE_WEI, buy)]),
    )
    .await;
    assert_eq!(receipt["events"][0]["event"], "Bought");
    assert_eq!(receipt["events"][1]["uri"], "ipfs://meta/1.json");

    let uri = rpc_call(&http, &rpc_url, "nugget_tokenURI", serde_json::json!([1])).await;
    assert_eq!(uri, "ipfs://meta/1.json");

    // ── 7. Register, stake and withdraw ───────────────────────────────────────
    let add = Call::AddNft { collection, percentage_threshold: 0 };
    rpc_call(&http, &rpc_url, "nugget_sendTransaction", serde_json::json!([tx_hex(deployer, 0, add)])).await;
    let active = rpc_call(&http, &rpc_url, "nugget_isActive", serde_json::json!([collection.to_hex()])).await;
    assert_eq!(active.as_bool(), Some(true));

    let deposit = Call::TransferNft { collection, to: staking, token_id: 1 };
    rpc_call(&http, &rpc_url, "nugget_sendTransaction", serde_json::json!([tx_hex(buyer, 0, deposit)])).await;
    let custodian = rpc_call(
        &http,
        &rpc_url,
        "nugget_tokenOwner",
        serde_json::json!([collection.to_hex(), 1]),
    )
    .await;
    assert_eq!(custodian.as_str(), Some(buyer.to_hex().as_str()));
    let stake = rpc_call(&http, &rpc_url, "nugget_stakeInfo", serde_json::json!([buyer.to_hex()])).await;
    assert_eq!(stake["token_count"].as_u64(), Some(1));

    let withdraw = Call::WithdrawNft { collection, token_id: 1 };
    rpc_call(&http, &rpc_url, "nugget_sendTransaction", serde_json::json!([tx_hex(buyer, 0, withdraw)])).await;
    let custodian = rpc_call(
        &http,
        &rpc_url,
        "nugget_tokenOwner",
        serde_json::json!([collection.to_hex(), 1]),
    )
    .await;
    assert_eq!(custodian.as_str(), Some(Address::ZERO.to_hex().as_str()));
    let owner = rpc_call(&http, &rpc_url, "nugget_ownerOf", serde_json::json!([1])).await;
    assert_eq!(owner.as_str(), Some(buyer.to_hex().as_str()));

    // ── 8. Receipt history ────────────────────────────────────────────────────
    let recent = rpc_call(&http, &rpc_url, "nugget_recentReceipts", serde_json::json!([2])).await;
    let recent = recent.as_array().expect("receipt list");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["events"][0]["event"], "Withdraw");
    assert_eq!(recent[0]["seq"].as_u64(), recent[1]["seq"].as_u64().map(|s| s + 1));
}
