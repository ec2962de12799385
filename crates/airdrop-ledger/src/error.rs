use airdrop_gate::Rejection;
use airdrop_types::{Address, U256};

use crate::traits::TransferError;

/// Errors produced by ledger operations.
///
/// Every error is a synchronous, non-retryable refusal: the operation that
/// returned it has left the ledger and the event log exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("voucher {index} rejected: {rejection}")]
    Rejected { index: usize, rejection: Rejection },

    #[error("caller {caller} is not the issuer")]
    NotIssuer { caller: Address },

    #[error("nothing to claim for {recipient}")]
    NothingToClaim { recipient: Address },

    #[error("insufficient custody: required {required}, available {available}")]
    InsufficientCustody { required: U256, available: U256 },

    #[error("balance overflow")]
    BalanceOverflow,

    #[error("invalid reward source: the zero address cannot be a token")]
    InvalidRewardSource,

    #[error("invalid issuer: the zero address cannot sign vouchers")]
    InvalidIssuer,

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Stable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Rejected { rejection, .. } => rejection.reason(),
            Self::NotIssuer { .. } => "caller is not the issuer",
            Self::NothingToClaim { .. } => "nothing to claim",
            Self::InsufficientCustody { .. } => "insufficient custody",
            Self::BalanceOverflow => "balance overflow",
            Self::InvalidRewardSource => "invalid reward source",
            Self::InvalidIssuer => "invalid issuer",
            Self::Transfer(_) => "transfer failed",
            Self::Config(_) => "configuration error",
        }
    }
}
