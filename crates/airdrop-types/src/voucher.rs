use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::reward::RewardKind;

/// The four fields an issuer authenticates.
///
/// A voucher grants `amount` units of `reward_kind` to `recipient`, and is
/// only accepted while the current time is strictly before `deadline`.
/// A zero `amount` is a valid voucher that credits nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub recipient: Address,
    pub amount: U256,
    pub deadline: U256,
    pub reward_kind: RewardKind,
}

impl Voucher {
    pub fn new(recipient: Address, amount: U256, deadline: U256, reward_kind: RewardKind) -> Self {
        Self {
            recipient,
            amount,
            deadline,
            reward_kind,
        }
    }

    /// Returns `true` once `now` has reached the deadline.
    pub fn is_expired(&self, now: u64) -> bool {
        self.deadline <= U256::from(now)
    }
}

/// Recoverable ECDSA signature split into its wire components.
///
/// `v` is the recovery discriminant; both the raw form (`0`/`1`) and the
/// legacy offset form (`27`/`28`) are accepted by verifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoucherSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl VoucherSignature {
    pub const LEN: usize = 65;

    pub fn new(r: B256, s: B256, v: u8) -> Self {
        Self { r, s, v }
    }

    /// Recovery id normalized to `0..=3`, or `None` for an unknown `v`.
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            0..=3 => Some(self.v),
            27 | 28 => Some(self.v - 27),
            _ => None,
        }
    }

    /// `r ∥ s ∥ v` packed into 65 bytes.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != Self::LEN {
            return Err(TypeError::SignatureLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::SignatureHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for VoucherSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VoucherSignature(r={}..., v={})",
            hex::encode(&self.r[..4]),
            self.v
        )
    }
}

/// Voucher plus its signature, in the flat wire layout
/// `{recipient, amount, deadline, rewardKind, r, s, v}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedVoucher {
    #[serde(flatten)]
    pub voucher: Voucher,
    #[serde(flatten)]
    pub signature: VoucherSignature,
}

impl SignedVoucher {
    pub fn new(voucher: Voucher, signature: VoucherSignature) -> Self {
        Self { voucher, signature }
    }

    pub fn recipient(&self) -> Address {
        self.voucher.recipient
    }

    pub fn amount(&self) -> U256 {
        self.voucher.amount
    }

    pub fn reward_kind(&self) -> RewardKind {
        self.voucher.reward_kind
    }

    pub fn from_json(json: &str) -> Result<Self, TypeError> {
        serde_json::from_str(json).map_err(|e| TypeError::VoucherJson(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string_pretty(self).map_err(|e| TypeError::VoucherJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(deadline: u64) -> Voucher {
        Voucher::new(
            Address::repeat_byte(0x01),
            U256::from(100_000u64),
            U256::from(deadline),
            RewardKind::Token(Address::repeat_byte(0x7a)),
        )
    }

    fn signature() -> VoucherSignature {
        VoucherSignature::new(B256::repeat_byte(0x0a), B256::repeat_byte(0x0b), 27)
    }

    #[test]
    fn deadline_is_strict() {
        let v = voucher(1_000);
        assert!(!v.is_expired(999));
        assert!(v.is_expired(1_000));
        assert!(v.is_expired(1_001));
    }

    #[test]
    fn far_future_deadline_beyond_u64() {
        let mut v = voucher(0);
        v.deadline = U256::MAX;
        assert!(!v.is_expired(u64::MAX));
    }

    #[test]
    fn recovery_id_normalizes_legacy_v() {
        let mut sig = signature();
        assert_eq!(sig.recovery_id(), Some(0));
        sig.v = 28;
        assert_eq!(sig.recovery_id(), Some(1));
        sig.v = 1;
        assert_eq!(sig.recovery_id(), Some(1));
        sig.v = 29;
        assert_eq!(sig.recovery_id(), None);
    }

    #[test]
    fn signature_bytes_layout() {
        let bytes = signature().to_bytes();
        assert_eq!(bytes[0], 0x0a);
        assert_eq!(bytes[32], 0x0b);
        assert_eq!(bytes[64], 27);
        assert_eq!(VoucherSignature::from_bytes(&bytes).unwrap(), signature());
    }

    #[test]
    fn signature_rejects_wrong_length() {
        let err = VoucherSignature::from_bytes(&[0u8; 64]).unwrap_err();
        assert_eq!(
            err,
            TypeError::SignatureLength {
                expected: 65,
                actual: 64
            }
        );
        assert!(matches!(
            VoucherSignature::from_hex("0xzz"),
            Err(TypeError::SignatureHex(_))
        ));
    }

    #[test]
    fn wire_format_is_flat() {
        let signed = SignedVoucher::new(voucher(5), signature());
        let value: serde_json::Value = serde_json::to_value(signed).unwrap();
        let object = value.as_object().unwrap();
        for key in ["recipient", "amount", "deadline", "rewardKind", "r", "s", "v"] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 7);

        let parsed = SignedVoucher::from_json(&signed.to_json().unwrap()).unwrap();
        assert_eq!(parsed, signed);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            SignedVoucher::from_json("{\"recipient\": 3}"),
            Err(TypeError::VoucherJson(_))
        ));
    }
}
