use std::path::Path;

use nugget_core::error::NuggetError;
use nugget_core::types::Address;
use serde::{Deserialize, Serialize};

use crate::merkle::MerkleTree;

/// Whitelist document as published at the registry pointer:
/// `{"addresses": ["0x…", …]}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhitelistFile {
    pub addresses: Vec<String>,
}

impl WhitelistFile {
    pub fn from_json(json: &str) -> Result<Self, NuggetError> {
        serde_json::from_str(json).map_err(|e| NuggetError::Serialization(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NuggetError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NuggetError::Storage(format!("reading {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&json)
    }

    /// Parsed addresses in file order. Fails on the first malformed entry.
    pub fn parse_addresses(&self) -> Result<Vec<Address>, NuggetError> {
        self.addresses.iter().map(|s| Address::from_hex(s.trim())).collect()
    }

    pub fn tree(&self) -> Result<MerkleTree, NuggetError> {
        Ok(MerkleTree::from_addresses(&self.parse_addresses()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::verify_address;

    const DOC: &str = r#"{"addresses": [
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
        "0x90F79bf6EB2c4f870365E785982E1f101E93b906"
    ]}"#;

    #[test]
    fn parses_and_builds_tree() {
        let file = WhitelistFile::from_json(DOC).unwrap();
        let addrs = file.parse_addresses().unwrap();
        assert_eq!(addrs.len(), 3);
        let tree = file.tree().unwrap();
        for a in &addrs {
            let proof = tree.proof_for(a).unwrap();
            assert!(verify_address(&proof, a, tree.root()));
        }
    }

    #[test]
    fn malformed_address_rejected() {
        let file = WhitelistFile { addresses: vec!["0x1234".into()] };
        assert!(matches!(file.parse_addresses(), Err(NuggetError::InvalidHex(_))));
    }

    #[test]
    fn missing_field_rejected() {
        assert!(matches!(
            WhitelistFile::from_json(r#"{"users": []}"#),
            Err(NuggetError::Serialization(_))
        ));
    }
}
