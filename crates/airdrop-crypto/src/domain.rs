use alloy_primitives::{keccak256, Address, Keccak256, B256, U256};
use serde::{Deserialize, Serialize};

/// Canonical type string of the EIP-712 domain this ledger signs under.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Protocol name bound into every voucher signature.
pub const PROTOCOL_NAME: &str = "Airdrop";

/// Protocol version bound into every voucher signature.
pub const PROTOCOL_VERSION: &str = "1";

/// Context tag binding protocol name, version, chain, and deployment.
///
/// Computed once at construction and never mutated, so a signature made for
/// one deployment (or one chain, or one protocol revision) never verifies on
/// another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSeparator {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: Address,
    hash: B256,
}

impl DomainSeparator {
    /// Derive the separator for an arbitrary name/version pair.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        let name = name.into();
        let version = version.into();

        let mut hasher = Keccak256::new();
        hasher.update(Self::type_hash());
        hasher.update(keccak256(name.as_bytes()));
        hasher.update(keccak256(version.as_bytes()));
        hasher.update(U256::from(chain_id).to_be_bytes::<32>());
        hasher.update(verifying_contract.into_word());
        let hash = hasher.finalize();

        Self {
            name,
            version,
            chain_id,
            verifying_contract,
            hash,
        }
    }

    /// Separator for the Airdrop protocol (`"Airdrop"`, version `"1"`).
    pub fn airdrop(chain_id: u64, verifying_contract: Address) -> Self {
        Self::new(PROTOCOL_NAME, PROTOCOL_VERSION, chain_id, verifying_contract)
    }

    /// Hash of [`DOMAIN_TYPE`].
    pub fn type_hash() -> B256 {
        keccak256(DOMAIN_TYPE.as_bytes())
    }

    /// The 32-byte separator.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    #[test]
    fn domain_type_hash_matches_eip712() {
        assert_eq!(
            DomainSeparator::type_hash(),
            b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f")
        );
    }

    #[test]
    fn separator_is_deterministic() {
        let a = DomainSeparator::airdrop(1, contract());
        let b = DomainSeparator::airdrop(1, contract());
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.name(), "Airdrop");
        assert_eq!(a.version(), "1");
    }

    #[test]
    fn every_field_is_bound() {
        let base = DomainSeparator::airdrop(1, contract()).hash();
        assert_ne!(base, DomainSeparator::airdrop(5, contract()).hash());
        assert_ne!(
            base,
            DomainSeparator::airdrop(1, Address::repeat_byte(0xc1)).hash()
        );
        assert_ne!(
            base,
            DomainSeparator::new("Airdrop", "2", 1, contract()).hash()
        );
        assert_ne!(
            base,
            DomainSeparator::new("Faucet", "1", 1, contract()).hash()
        );
    }

    #[test]
    fn accessors_echo_inputs() {
        let domain = DomainSeparator::airdrop(137, contract());
        assert_eq!(domain.chain_id(), 137);
        assert_eq!(domain.verifying_contract(), contract());
    }
}
