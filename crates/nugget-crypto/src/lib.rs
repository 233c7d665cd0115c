pub mod hash;
pub mod merkle;
pub mod whitelist;

pub use hash::{contract_address, keccak256, leaf_for};
pub use merkle::{hash_pair, verify, verify_address, MerkleTree};
pub use whitelist::WhitelistFile;
