//! nugget-rpc
//!
//! JSON-RPC 2.0 server for Nugget nodes.
//!
//! Namespace: "nugget"
//! Methods:
//!   nugget_sendTransaction    — submit a transaction (hex-encoded bincode), returns its receipt
//!   nugget_getReceipt         — receipt by sequence number
//!   nugget_recentReceipts     — newest receipts first
//!   nugget_deployment         — contract addresses
//!   nugget_priceFor / isWhitelisted / tokenURI / exists / ownerOf
//!   nugget_maxSupply / circulatingSupply / merkleRoot / whitelistPointer
//!   nugget_fundingWallet / royaltyInfo
//!   nugget_isActive / nftInfo / stakeInfo / tokenOwner / rewardBalance / balance

pub mod api;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerState, TxRequest};
pub use types::{RpcDeployment, RpcEvent, RpcNftInfo, RpcReceipt, RpcRoyalty, RpcStakeInfo};
