//! nugget-node: serves one Nugget deployment over JSON-RPC.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Deploy from `--deploy-params` if the DB is fresh
//!   3. Start the JSON-RPC 2.0 server
//!   4. Run the main loop: apply queued transactions one at a time

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::RngCore;
use tokio::sync::mpsc;
use tracing::{info, warn};

use nugget_core::types::Address;
use nugget_deploy::{apply_deployment, is_deployed, CollectionParams, DeployParams, Deployment};
use nugget_rpc::{RpcServer, RpcServerState, TxRequest};
use nugget_state::{StateDb, StateEngine};

/// Copy of the params a data directory was deployed with.
const DEPLOYED_PARAMS_FILE: &str = "deploy-params.json";

#[derive(Parser, Debug)]
#[command(
    name = "nugget-node",
    version,
    about = "Nugget node: allow-listed collectible sale with reward staking"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.nugget/data")]
    data_dir: PathBuf,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8645")]
    rpc_addr: SocketAddr,

    /// Path to deployment params JSON (only read on first run).
    #[arg(long)]
    deploy_params: Option<PathBuf>,

    /// Capacity of the pending-transaction queue.
    #[arg(long, default_value_t = 512)]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,nugget=debug")),
        )
        .init();

    let args = Args::parse();
    info!("Nugget node starting");

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db = Arc::new(StateDb::open(data_dir.join("state")).context("opening state database")?);
    let engine = Arc::new(StateEngine::new(Arc::clone(&db)));

    // ── Deployment if fresh ───────────────────────────────────────────────────
    let stored_params = data_dir.join(DEPLOYED_PARAMS_FILE);
    let params = if is_deployed(&engine).context("reading deployment state")? {
        info!("existing deployment found, skipping deploy");
        DeployParams::load(&stored_params).context("reading stored deploy params")?
    } else {
        info!("fresh database, deploying");
        let params = load_or_generate_deploy_params(args.deploy_params.as_deref())?;
        let now = chrono::Utc::now().timestamp();
        apply_deployment(&engine, &params, now).context("applying deployment")?;
        let json = serde_json::to_string_pretty(&params).context("encoding deploy params")?;
        std::fs::write(&stored_params, json)
            .with_context(|| format!("writing {}", stored_params.display()))?;
        params
    };
    let deployment = Deployment::derive(&params).context("deriving contract addresses")?;
    info!(
        collection = %deployment.collection,
        staking = %deployment.staking,
        reward_token = %deployment.reward_token,
        "deployment loaded"
    );

    // ── Inbound transaction queue ─────────────────────────────────────────────
    let (tx_sender, mut tx_receiver) = mpsc::channel::<TxRequest>(args.queue_capacity);

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState {
        db: Arc::clone(&db),
        deployment,
        tx_sender,
    });
    let (_rpc_addr, _rpc_handle) = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    // ── Main loop: apply one at a time ────────────────────────────────────────
    info!("node ready");
    while let Some(TxRequest { tx, reply }) = tx_receiver.recv().await {
        let now = chrono::Utc::now().timestamp();
        let outcome = engine.apply(&tx, now);
        if reply.send(outcome).is_err() {
            warn!(call = tx.call.name(), "caller went away before the receipt was ready");
        }
    }

    db.flush().context("flushing state database")?;
    Ok(())
}

/// Load deployment params from a JSON file, or build throwaway ones with a
/// random deployer if no path is given.
///
/// # Warning
/// Generated params carry an empty allow-list and an unknown deployer key.
/// Only use this for local development.
fn load_or_generate_deploy_params(path: Option<&Path>) -> anyhow::Result<DeployParams> {
    if let Some(p) = path {
        return DeployParams::load(p).with_context(|| format!("reading deploy params from {}", p.display()));
    }
    warn!("No --deploy-params provided. Generating a throwaway deployer. DO NOT USE IN PRODUCTION.");
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let deployer = Address::from_bytes(bytes).to_hex();
    Ok(DeployParams {
        deployer: deployer.clone(),
        salt: String::new(),
        collection: CollectionParams {
            name: "Nugget".into(),
            symbol: "NUG".into(),
            base_uri: "ipfs://metadata/".into(),
            whitelist_pointer: String::new(),
            whitelist_root: None,
            whitelist_addresses: vec![],
            funding_wallet: deployer,
            deadline: None,
            max_supply: None,
            reserved: None,
            whitelist_price: None,
            standard_price: None,
        },
        reward_token: Default::default(),
        staking_threshold: None,
        balances: vec![],
    })
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
