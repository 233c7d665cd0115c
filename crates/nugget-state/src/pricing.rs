use nugget_core::collection::Collection;
use nugget_core::error::NuggetError;
use nugget_core::types::{Address, Hash32, Timestamp, Wei};
use nugget_crypto::verify_address;

/// Whether `proof` places `claimant` in the collection's current allow-list.
pub fn is_whitelisted(collection: &Collection, proof: &[Hash32], claimant: &Address) -> bool {
    verify_address(proof, claimant, collection.whitelist.root)
}

/// Unit price for `claimant`. Depends on allow-list membership only, never on
/// the clock.
pub fn price_for(collection: &Collection, proof: &[Hash32], claimant: &Address) -> Wei {
    Quote::for_buyer(collection, proof, claimant).price
}

/// Price snapshot taken once per purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub whitelisted: bool,
    pub price: Wei,
}

impl Quote {
    pub fn for_buyer(collection: &Collection, proof: &[Hash32], claimant: &Address) -> Self {
        let whitelisted = is_whitelisted(collection, proof, claimant);
        let price = if whitelisted {
            collection.config.whitelist_price
        } else {
            collection.config.standard_price
        };
        Self { whitelisted, price }
    }

    /// Up to and including the deadline only allow-listed buyers may purchase.
    pub fn ensure_eligible(&self, collection: &Collection, now: Timestamp) -> Result<(), NuggetError> {
        let deadline = collection.config.deadline;
        if !self.whitelisted && now <= deadline {
            return Err(NuggetError::PublicSaleNotOpen { opens_after: deadline });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nugget_core::collection::{SaleConfig, WhitelistRegistry};
    use nugget_core::constants::{STANDARD_PRICE_WEI, WHITELIST_PRICE_WEI};
    use nugget_crypto::MerkleTree;

    const DEADLINE: Timestamp = 1_700_086_400;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn collection(root: Hash32) -> Collection {
        Collection {
            address: addr(0xC0),
            name: "Nugget".into(),
            symbol: "NUG".into(),
            owner: addr(0x01),
            config: SaleConfig::new("ipfs://meta/", DEADLINE),
            whitelist: WhitelistRegistry { root, pointer: "ipfs://list".into() },
            funding_wallet: addr(0xF0),
            circulating_supply: 0,
        }
    }

    #[test]
    fn price_is_deadline_invariant() {
        let members = [addr(0xA1), addr(0xA2), addr(0xA3)];
        let tree = MerkleTree::from_addresses(&members);
        let c = collection(tree.root());
        let proof = tree.proof_for(&members[1]).unwrap();

        let member = Quote::for_buyer(&c, &proof, &members[1]);
        assert!(member.whitelisted);
        assert_eq!(member.price, WHITELIST_PRICE_WEI);
        assert!(member.ensure_eligible(&c, DEADLINE - 1).is_ok());
        assert!(member.ensure_eligible(&c, DEADLINE + 1).is_ok());

        let outsider = Quote::for_buyer(&c, &proof, &addr(0xB0));
        assert!(!outsider.whitelisted);
        assert_eq!(outsider.price, STANDARD_PRICE_WEI);
        assert_eq!(price_for(&c, &[], &addr(0xB0)), STANDARD_PRICE_WEI);
    }

    #[test]
    fn outsider_waits_for_deadline() {
        let tree = MerkleTree::from_addresses(&[addr(0xA1), addr(0xA2)]);
        let c = collection(tree.root());
        let q = Quote::for_buyer(&c, &[], &addr(0xB0));
        assert!(matches!(
            q.ensure_eligible(&c, DEADLINE),
            Err(NuggetError::PublicSaleNotOpen { opens_after: DEADLINE })
        ));
        assert!(q.ensure_eligible(&c, DEADLINE + 1).is_ok());
    }

    #[test]
    fn foreign_proof_is_not_membership() {
        let tree = MerkleTree::from_addresses(&[addr(0xA1), addr(0xA2)]);
        let c = collection(tree.root());
        let proof = tree.proof_for(&addr(0xA1)).unwrap();
        assert!(is_whitelisted(&c, &proof, &addr(0xA1)));
        assert!(!is_whitelisted(&c, &proof, &addr(0xA2)));
    }
}
