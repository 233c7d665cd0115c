//! nugget
//!
//! Command-line client for a Nugget node. Builds allow-list roots and proofs
//! off-chain, and submits transactions or queries over JSON-RPC.
//!
//! Usage:
//!   nugget root      --whitelist <file>
//!   nugget proof     --whitelist <file> --address <hex>
//!   nugget buy       --from <hex> --token-id <id> [--whitelist <file>] [--rpc <url>]
//!   nugget buy-bulk  --from <hex> --token-ids <id,id,..> [--whitelist <file>]
//!   nugget deposit   --from <hex> --token-id <id>
//!   nugget claim     --from <hex>
//!   nugget stake-info --address <hex>

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use nugget_core::transaction::{Call, Transaction};
use nugget_core::types::{Address, Hash32, Wei};
use nugget_crypto::WhitelistFile;

mod rpc_client;
use rpc_client::{hex_proof, NuggetRpcClient};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "nugget",
    version,
    about = "Nugget client: allow-list tooling and node RPC"
)]
struct Args {
    /// Node RPC endpoint.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8645")]
    rpc: String,

    /// Caller address for transactions (0x hex).
    #[arg(long, global = true)]
    from: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    // ── Off-chain ─────────────────────────────────────────────────────────────

    /// Print the Merkle root of a whitelist file.
    Root {
        #[arg(long)]
        whitelist: PathBuf,
    },

    /// Print the proof for one address of a whitelist file.
    Proof {
        #[arg(long)]
        whitelist: PathBuf,
        #[arg(long)]
        address: String,
    },

    // ── Transactions ──────────────────────────────────────────────────────────

    /// Buy one token at the caller's current price.
    Buy {
        #[arg(long)]
        token_id: u64,
        /// Whitelist file used to build the caller's proof.
        #[arg(long)]
        whitelist: Option<PathBuf>,
        /// Attach this value instead of the quoted price.
        #[arg(long)]
        value: Option<Wei>,
    },

    /// Buy several tokens at one price snapshot.
    BuyBulk {
        #[arg(long, value_delimiter = ',', required = true)]
        token_ids: Vec<u64>,
        #[arg(long)]
        whitelist: Option<PathBuf>,
        #[arg(long)]
        value: Option<Wei>,
    },

    /// Replace the allow-list root and pointer (collection owner).
    SetRoot {
        /// New root as 0x hex. Computed from `--whitelist` when omitted.
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        whitelist: Option<PathBuf>,
        #[arg(long)]
        pointer: String,
    },

    /// Change the address purchase proceeds are forwarded to (collection owner).
    SetWallet {
        #[arg(long)]
        wallet: String,
    },

    /// Transfer a held token.
    Transfer {
        #[arg(long)]
        to: String,
        #[arg(long)]
        token_id: u64,
    },

    /// Deposit a held token into staking.
    Deposit {
        #[arg(long)]
        token_id: u64,
    },

    /// Register the collection with staking (staking owner).
    AddNft {
        #[arg(long)]
        threshold: u8,
        /// Defaults to the node's collection.
        #[arg(long)]
        collection: Option<String>,
    },

    /// Mint accrued rewards to the caller.
    Claim,

    /// Withdraw a deposited token.
    Withdraw {
        #[arg(long)]
        token_id: u64,
    },

    /// Grant the reward-token minter role (reward-token admin).
    GrantMinter {
        #[arg(long)]
        account: String,
    },

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Print the node's contract addresses.
    Deployment,

    /// Print the most recent receipts, newest first.
    Receipts {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Quote the unit price for an address.
    Price {
        #[arg(long)]
        address: String,
        #[arg(long)]
        whitelist: Option<PathBuf>,
    },

    Owner {
        #[arg(long)]
        token_id: u64,
    },

    TokenUri {
        #[arg(long)]
        token_id: u64,
    },

    /// Circulating and maximum supply.
    Supply,

    IsActive {
        #[arg(long)]
        collection: Option<String>,
    },

    StakeInfo {
        #[arg(long)]
        address: String,
    },

    /// Depositor of a token held by staking.
    TokenOwner {
        #[arg(long)]
        token_id: u64,
    },

    RewardBalance {
        #[arg(long)]
        address: String,
    },

    Balance {
        #[arg(long)]
        address: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,nugget=info")),
        )
        .init();

    let args = Args::parse();
    let rpc = NuggetRpcClient::new(&args.rpc);

    match args.command {
        Command::Root { whitelist } => {
            let tree = load_whitelist(&whitelist)?.tree()?;
            println!("Leaves: {}", tree.leaf_count());
            println!("Root:   {}", tree.root());
        }

        Command::Proof { whitelist, address } => {
            let address: Address = address.parse()?;
            let proof = proof_from_file(&whitelist, &address)?
                .with_context(|| format!("{address} is not on the whitelist"))?;
            println!("{}", serde_json::to_string_pretty(&hex_proof(&proof))?);
        }

        Command::Buy { token_id, whitelist, value } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let proof = caller_proof(whitelist.as_deref(), &from)?;
            let value = match value {
                Some(v) => v,
                None => rpc.price_for(&proof, &from).await?,
            };
            let call = Call::Buy { collection, proof, token_id };
            submit(&rpc, Transaction::new(from, call).with_value(value)).await?;
        }

        Command::BuyBulk { token_ids, whitelist, value } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let proof = caller_proof(whitelist.as_deref(), &from)?;
            let value = match value {
                Some(v) => v,
                None => bulk_total(rpc.price_for(&proof, &from).await?, token_ids.len())?,
            };
            let call = Call::BuyBulk { collection, proof, token_ids };
            submit(&rpc, Transaction::new(from, call).with_value(value)).await?;
        }

        Command::SetRoot { root, whitelist, pointer } => {
            let from = caller(&args.from)?;
            let root = resolve_root(root.as_deref(), whitelist.as_deref())?;
            let collection = rpc.collection().await?;
            let call = Call::SetMerkleRoot { collection, root, pointer };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::SetWallet { wallet } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let call = Call::SetFundingWallet { collection, wallet: wallet.parse()? };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::Transfer { to, token_id } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let call = Call::TransferNft { collection, to: to.parse()?, token_id };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::Deposit { token_id } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let to = rpc.staking().await?;
            let call = Call::TransferNft { collection, to, token_id };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::AddNft { threshold, collection } => {
            let from = caller(&args.from)?;
            let collection = match collection {
                Some(c) => c.parse()?,
                None => rpc.collection().await?,
            };
            let call = Call::AddNft { collection, percentage_threshold: threshold };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::Claim => {
            let from = caller(&args.from)?;
            submit(&rpc, Transaction::new(from, Call::Claim)).await?;
        }

        Command::Withdraw { token_id } => {
            let from = caller(&args.from)?;
            let collection = rpc.collection().await?;
            let call = Call::WithdrawNft { collection, token_id };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::GrantMinter { account } => {
            let from = caller(&args.from)?;
            let call = Call::GrantMinterRole { account: account.parse()? };
            submit(&rpc, Transaction::new(from, call)).await?;
        }

        Command::Deployment => {
            println!("{}", serde_json::to_string_pretty(&rpc.deployment().await?)?);
        }

        Command::Receipts { limit } => {
            println!("{}", serde_json::to_string_pretty(&rpc.recent_receipts(limit).await?)?);
        }

        Command::Price { address, whitelist } => {
            let address: Address = address.parse()?;
            let proof = caller_proof(whitelist.as_deref(), &address)?;
            println!("{}", rpc.price_for(&proof, &address).await?);
        }

        Command::Owner { token_id } => match rpc.owner_of(token_id).await? {
            Some(owner) => println!("{owner}"),
            None => println!("token {token_id} has not been minted"),
        },

        Command::TokenUri { token_id } => {
            println!("{}", rpc.token_uri(token_id).await?);
        }

        Command::Supply => {
            println!("Circulating: {}", rpc.circulating_supply().await?);
            println!("Max:         {}", rpc.max_supply().await?);
        }

        Command::IsActive { collection } => {
            let collection = match collection {
                Some(c) => c.parse()?,
                None => rpc.collection().await?,
            };
            println!("{}", rpc.is_active(&collection).await?);
            println!("{}", serde_json::to_string_pretty(&rpc.nft_info(&collection).await?)?);
        }

        Command::StakeInfo { address } => {
            let info = rpc.stake_info(&address.parse()?).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Command::TokenOwner { token_id } => {
            let collection = rpc.collection().await?;
            println!("{}", rpc.token_owner(&collection, token_id).await?);
        }

        Command::RewardBalance { address } => {
            println!("{}", rpc.reward_balance(&address.parse()?).await?);
        }

        Command::Balance { address } => {
            println!("{}", rpc.balance(&address.parse()?).await?);
        }
    }

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn submit(rpc: &NuggetRpcClient, tx: Transaction) -> anyhow::Result<()> {
    let name = tx.call.name();
    info!(call = name, caller = %tx.caller, value = %tx.value, "submitting transaction");
    let receipt = rpc.send_transaction(&tx).await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

fn caller(from: &Option<String>) -> anyhow::Result<Address> {
    match from {
        Some(s) => Ok(s.parse()?),
        None => bail!("--from <address> is required for transactions"),
    }
}

fn load_whitelist(path: &Path) -> anyhow::Result<WhitelistFile> {
    WhitelistFile::load(path).with_context(|| format!("reading whitelist {}", path.display()))
}

fn proof_from_file(path: &Path, address: &Address) -> anyhow::Result<Option<Vec<Hash32>>> {
    let tree = load_whitelist(path)?.tree()?;
    Ok(tree.proof_for(address))
}

/// Proof for `address`, or an empty one (public price) when no whitelist is
/// given or the address is not on it.
fn caller_proof(whitelist: Option<&Path>, address: &Address) -> anyhow::Result<Vec<Hash32>> {
    match whitelist {
        Some(path) => Ok(proof_from_file(path, address)?.unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}

fn resolve_root(root: Option<&str>, whitelist: Option<&Path>) -> anyhow::Result<Hash32> {
    match (root, whitelist) {
        (Some(r), _) => Ok(r.parse()?),
        (None, Some(path)) => Ok(load_whitelist(path)?.tree()?.root()),
        (None, None) => bail!("either --root or --whitelist is required"),
    }
}

fn bulk_total(unit_price: Wei, count: usize) -> anyhow::Result<Wei> {
    let count = Wei::try_from(count).context("too many token ids")?;
    unit_price.checked_mul(count).context("bulk payment overflows")
}
