use airdrop_types::Voucher;
use alloy_primitives::{keccak256, Keccak256, B256};

use crate::domain::DomainSeparator;

/// Canonical type string of a voucher. Field order here fixes the encoding
/// order of [`VoucherHasher::struct_hash`].
pub const VOUCHER_TYPE: &str =
    "Airdrop(address recipient,uint256 amount,uint256 deadline,address token)";

/// Typed-data hasher for vouchers under a fixed domain.
///
/// Produces `keccak256(0x19 ∥ 0x01 ∥ domainSeparator ∥ structHash)` where the
/// struct hash covers the four authenticated voucher fields. Signature
/// components are never part of the hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoucherHasher {
    domain: B256,
}

impl VoucherHasher {
    pub fn new(domain: &DomainSeparator) -> Self {
        Self {
            domain: domain.hash(),
        }
    }

    /// Build from a raw separator value.
    pub fn from_separator(domain: B256) -> Self {
        Self { domain }
    }

    /// Hash of [`VOUCHER_TYPE`].
    pub fn type_hash() -> B256 {
        keccak256(VOUCHER_TYPE.as_bytes())
    }

    /// Struct hash over the canonically encoded voucher fields.
    pub fn struct_hash(voucher: &Voucher) -> B256 {
        let mut hasher = Keccak256::new();
        hasher.update(Self::type_hash());
        hasher.update(voucher.recipient.into_word());
        hasher.update(voucher.amount.to_be_bytes::<32>());
        hasher.update(voucher.deadline.to_be_bytes::<32>());
        hasher.update(voucher.reward_kind.to_address().into_word());
        hasher.finalize()
    }

    /// Final digest the issuer signs.
    pub fn digest(&self, voucher: &Voucher) -> B256 {
        let mut hasher = Keccak256::new();
        hasher.update([0x19u8, 0x01]);
        hasher.update(self.domain);
        hasher.update(Self::struct_hash(voucher));
        hasher.finalize()
    }

    /// The domain separator this hasher binds into every digest.
    pub fn domain(&self) -> B256 {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_types::{Address, RewardKind, U256};
    use proptest::prelude::*;

    fn hasher() -> VoucherHasher {
        VoucherHasher::new(&DomainSeparator::airdrop(1, Address::repeat_byte(0xc0)))
    }

    fn voucher() -> Voucher {
        Voucher::new(
            Address::repeat_byte(0x01),
            U256::from(100_000u64),
            U256::from(1_700_000_000u64),
            RewardKind::Token(Address::repeat_byte(0x7a)),
        )
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(hasher().digest(&voucher()), hasher().digest(&voucher()));
    }

    #[test]
    fn struct_hash_differs_from_digest() {
        let v = voucher();
        assert_ne!(VoucherHasher::struct_hash(&v), hasher().digest(&v));
    }

    #[test]
    fn different_domains_produce_different_digests() {
        let other = VoucherHasher::new(&DomainSeparator::airdrop(2, Address::repeat_byte(0xc0)));
        assert_ne!(hasher().digest(&voucher()), other.digest(&voucher()));
    }

    #[test]
    fn reward_kind_is_bound() {
        let token = voucher();
        let mut currency = token;
        currency.reward_kind = RewardKind::Currency;
        assert_ne!(hasher().digest(&token), hasher().digest(&currency));
    }

    #[test]
    fn digest_matches_manual_encoding() {
        let v = voucher();
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(VoucherHasher::type_hash().as_slice());
        encoded.extend_from_slice(v.recipient.into_word().as_slice());
        encoded.extend_from_slice(&v.amount.to_be_bytes::<32>());
        encoded.extend_from_slice(&v.deadline.to_be_bytes::<32>());
        encoded.extend_from_slice(v.reward_kind.to_address().into_word().as_slice());
        let struct_hash = keccak256(&encoded);
        assert_eq!(struct_hash, VoucherHasher::struct_hash(&v));

        let h = hasher();
        let mut message = vec![0x19, 0x01];
        message.extend_from_slice(h.domain().as_slice());
        message.extend_from_slice(struct_hash.as_slice());
        assert_eq!(keccak256(&message), h.digest(&v));
    }

    proptest! {
        #[test]
        fn any_single_bit_flip_changes_the_digest(field in 0usize..4, bit in 0usize..160) {
            let original = voucher();
            let mut mutated = original;
            match field {
                0 => {
                    let mut bytes = mutated.recipient.0 .0;
                    bytes[bit / 8] ^= 1 << (bit % 8);
                    mutated.recipient = Address::from(bytes);
                }
                1 => mutated.amount ^= U256::from(1u8) << bit,
                2 => mutated.deadline ^= U256::from(1u8) << bit,
                _ => {
                    let mut bytes = mutated.reward_kind.to_address().0 .0;
                    bytes[bit / 8] ^= 1 << (bit % 8);
                    mutated.reward_kind = RewardKind::from_address(Address::from(bytes));
                }
            }
            prop_assert_ne!(hasher().digest(&original), hasher().digest(&mutated));
        }
    }
}
