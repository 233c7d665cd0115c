use nugget_core::types::{Address, Hash32};
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash32 {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash32::from_bytes(out)
}

/// Allow-list leaf for an address: Keccak-256 of its 20 raw bytes.
pub fn leaf_for(address: &Address) -> Hash32 {
    keccak256(address.as_bytes())
}

/// Deterministic contract address: the low 20 bytes of
/// Keccak-256(kind || deployer || salt).
pub fn contract_address(kind: &str, deployer: &Address, salt: &str) -> Address {
    let mut preimage = Vec::with_capacity(kind.len() + 20 + salt.len());
    preimage.extend_from_slice(kind.as_bytes());
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    let h = keccak256(&preimage);
    let mut out = [0u8; 20];
    out.copy_from_slice(&h.as_bytes()[12..]);
    Address::from_bytes(out)
}
