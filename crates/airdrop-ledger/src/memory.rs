use std::collections::{BTreeMap, BTreeSet};

use airdrop_types::{Address, RewardKind, U256};
use tracing::debug;

use crate::traits::{TransferAgent, TransferError};

/// In-memory account book for tests, local simulation, and embedding.
///
/// Tracks a balance per `(asset, holder)`. The ledger's own holdings live
/// under the `custodian` address passed at construction.
#[derive(Clone, Debug)]
pub struct InMemoryTransferAgent {
    custodian: Address,
    accounts: BTreeMap<(RewardKind, Address), U256>,
    refusing: BTreeSet<Address>,
    transfers: u64,
}

impl InMemoryTransferAgent {
    pub fn new(custodian: Address) -> Self {
        Self {
            custodian,
            accounts: BTreeMap::new(),
            refusing: BTreeSet::new(),
            transfers: 0,
        }
    }

    /// Mint `amount` of `asset` to `holder` out of thin air.
    pub fn fund(&mut self, asset: RewardKind, holder: Address, amount: U256) {
        let entry = self.accounts.entry((asset, holder)).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn balance_of(&self, asset: RewardKind, holder: &Address) -> U256 {
        self.accounts
            .get(&(asset, *holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Raw holdings of the custodian, independent of ledger accounting.
    pub fn custodian_holdings(&self, asset: RewardKind) -> U256 {
        self.balance_of(asset, &self.custodian)
    }

    /// Make every push to `recipient` fail, like a contract that reverts on receive.
    pub fn refuse_transfers_to(&mut self, recipient: Address) {
        self.refusing.insert(recipient);
    }

    pub fn accept_transfers_to(&mut self, recipient: &Address) {
        self.refusing.remove(recipient);
    }

    /// Number of successful transfers performed.
    pub fn transfer_count(&self) -> u64 {
        self.transfers
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    fn move_funds(
        &mut self,
        asset: RewardKind,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(asset, &from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientFunds {
                asset,
                holder: from,
                required: amount,
                available,
            })?;
        let incoming = self
            .balance_of(asset, &to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Other("recipient balance overflow".into()))?;

        self.accounts.insert((asset, from), remaining);
        self.accounts.insert((asset, to), incoming);
        self.transfers += 1;
        debug!(asset = %asset, from = %from, to = %to, amount = %amount, "funds moved");
        Ok(())
    }
}

impl TransferAgent for InMemoryTransferAgent {
    fn pull(&mut self, asset: RewardKind, from: Address, amount: U256) -> Result<(), TransferError> {
        let custodian = self.custodian;
        self.move_funds(asset, from, custodian, amount)
    }

    fn push(&mut self, asset: RewardKind, to: Address, amount: U256) -> Result<(), TransferError> {
        if self.refusing.contains(&to) {
            return Err(TransferError::Refused(to));
        }
        let custodian = self.custodian;
        self.move_funds(asset, custodian, to, amount)
    }

    fn holdings(&self, asset: RewardKind) -> U256 {
        self.custodian_holdings(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custodian() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn token() -> RewardKind {
        RewardKind::Token(Address::repeat_byte(0x7a))
    }

    #[test]
    fn pull_then_push_moves_funds_through_custody() {
        let owner = Address::repeat_byte(0x15);
        let bob = Address::repeat_byte(0xb0);
        let mut agent = InMemoryTransferAgent::new(custodian());
        agent.fund(token(), owner, U256::from(100u8));

        agent.pull(token(), owner, U256::from(60u8)).unwrap();
        assert_eq!(agent.custodian_holdings(token()), U256::from(60u8));
        assert_eq!(agent.balance_of(token(), &owner), U256::from(40u8));

        agent.push(token(), bob, U256::from(25u8)).unwrap();
        assert_eq!(agent.balance_of(token(), &bob), U256::from(25u8));
        assert_eq!(agent.custodian_holdings(token()), U256::from(35u8));
        assert_eq!(agent.transfer_count(), 2);
    }

    #[test]
    fn holdings_count_funds_sent_straight_to_custodian() {
        let mut agent = InMemoryTransferAgent::new(custodian());
        agent.fund(RewardKind::Currency, custodian(), U256::from(70u8));
        assert_eq!(agent.holdings(RewardKind::Currency), U256::from(70u8));
        assert_eq!(agent.holdings(token()), U256::ZERO);
        assert_eq!(agent.transfer_count(), 0);
    }

    #[test]
    fn insufficient_funds_leave_accounts_untouched() {
        let mut agent = InMemoryTransferAgent::new(custodian());
        let err = agent
            .push(RewardKind::Currency, Address::repeat_byte(0xb0), U256::from(1u8))
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert_eq!(agent.transfer_count(), 0);
    }

    #[test]
    fn refusing_recipient_rejects_push() {
        let bob = Address::repeat_byte(0xb0);
        let mut agent = InMemoryTransferAgent::new(custodian());
        agent.fund(RewardKind::Currency, custodian(), U256::from(10u8));
        agent.refuse_transfers_to(bob);
        assert_eq!(
            agent
                .push(RewardKind::Currency, bob, U256::from(1u8))
                .unwrap_err(),
            TransferError::Refused(bob)
        );
        agent.accept_transfers_to(&bob);
        agent.push(RewardKind::Currency, bob, U256::from(1u8)).unwrap();
    }
}
