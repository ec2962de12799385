use airdrop_types::{Address, RewardKind, U256};

/// Why a voucher was refused.
///
/// Variants are listed in the order the gate checks them; a voucher failing
/// several checks always reports the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The voucher's deadline has passed (`deadline <= now`).
    #[error("expired: deadline {deadline} is not after {now}")]
    Expired { deadline: U256, now: u64 },

    /// The kind is neither the configured token nor currency.
    #[error("unknown reward kind: {kind}")]
    UnknownRewardKind { kind: RewardKind },

    /// The kind is valid but not the one this operation pays out.
    #[error("reward-kind mismatch: expected {expected}, got {actual}")]
    RewardKindMismatch {
        expected: RewardKind,
        actual: RewardKind,
    },

    /// The recovered signer is not the issuer.
    #[error("unauthorized signature: recovered {recovered}")]
    UnauthorizedSignature { recovered: Address },
}

impl Rejection {
    /// Stable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "expired",
            Self::UnknownRewardKind { .. } => "unknown reward kind",
            Self::RewardKindMismatch { .. } => "reward-kind mismatch",
            Self::UnauthorizedSignature { .. } => "unauthorized signature",
        }
    }
}
