use airdrop_types::{Address, RewardKind, U256};

/// Boundary to the world outside the ledger: moves real funds.
///
/// The ledger only ever calls the agent after its own bookkeeping for the
/// call is committed, and rolls that bookkeeping back if the agent fails.
/// The agent is owned by the ledger and reached through `&mut`, so it cannot
/// re-enter a ledger operation while one is in progress.
pub trait TransferAgent {
    /// Move `amount` of `asset` from `from` into the ledger's custody.
    fn pull(&mut self, asset: RewardKind, from: Address, amount: U256) -> Result<(), TransferError>;

    /// Move `amount` of `asset` out of the ledger's custody to `to`.
    fn push(&mut self, asset: RewardKind, to: Address, amount: U256) -> Result<(), TransferError>;

    /// What the ledger actually holds of `asset` right now.
    fn holdings(&self, asset: RewardKind) -> U256;
}

/// Errors reported by a [`TransferAgent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("{holder} holds {available} of {asset}, needs {required}")]
    InsufficientFunds {
        asset: RewardKind,
        holder: Address,
        required: U256,
        available: U256,
    },

    #[error("recipient {0} refused the transfer")]
    Refused(Address),

    #[error("transfer agent error: {0}")]
    Other(String),
}
