use std::collections::BTreeMap;

use airdrop_types::{Address, RewardKind, U256};

use crate::error::LedgerError;

/// One reversible change, recorded as the value it replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Undo {
    Balance {
        currency: bool,
        recipient: Address,
        previous: Option<U256>,
    },
    TokenCustody(U256),
}

/// Balances and the token custody total owned by the ledger.
///
/// Recipient entries appear on first credit and disappear when claimed, so
/// an absent entry and a zero balance mean the same thing. Currency custody
/// is not tracked here; it is whatever the transfer agent actually holds.
///
/// Every mutation is journaled until [`RewardLedger::commit`], so an
/// operation can be undone with [`RewardLedger::rollback_to`] at a cost
/// proportional to what it touched.
#[derive(Clone, Debug, Default)]
pub struct RewardLedger {
    token_balances: BTreeMap<Address, U256>,
    currency_balances: BTreeMap<Address, U256>,
    custody_token_total: U256,
    journal: Vec<Undo>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accrued, unclaimed balance of `kind` for `recipient`.
    pub fn balance_of(&self, kind: RewardKind, recipient: &Address) -> U256 {
        self.balances(kind.is_currency())
            .get(recipient)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Add `amount` to a recipient's balance, failing instead of wrapping.
    pub fn credit(
        &mut self,
        kind: RewardKind,
        recipient: Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        let currency = kind.is_currency();
        let previous = self.balances(currency).get(&recipient).copied();
        let updated = previous
            .unwrap_or(U256::ZERO)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.journal.push(Undo::Balance {
            currency,
            recipient,
            previous,
        });
        self.balances_mut(currency).insert(recipient, updated);
        Ok(updated)
    }

    /// Remove and return a recipient's whole balance.
    pub fn take(&mut self, kind: RewardKind, recipient: &Address) -> U256 {
        let currency = kind.is_currency();
        match self.balances_mut(currency).remove(recipient) {
            Some(amount) => {
                self.journal.push(Undo::Balance {
                    currency,
                    recipient: *recipient,
                    previous: Some(amount),
                });
                amount
            }
            None => U256::ZERO,
        }
    }

    pub fn custody_token_total(&self) -> U256 {
        self.custody_token_total
    }

    pub fn add_token_custody(&mut self, amount: U256) -> Result<U256, LedgerError> {
        let total = self
            .custody_token_total
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.set_token_custody(total);
        Ok(total)
    }

    /// Debit the token total, refusing to go below zero.
    pub fn sub_token_custody(&mut self, amount: U256) -> Result<U256, LedgerError> {
        let available = self.custody_token_total;
        let total = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCustody {
                required: amount,
                available,
            })?;
        self.set_token_custody(total);
        Ok(total)
    }

    /// Zero the token total, returning what it held.
    pub fn drain_token_custody(&mut self) -> U256 {
        let total = self.custody_token_total;
        self.set_token_custody(U256::ZERO);
        total
    }

    /// Sum of every outstanding balance of `kind`, saturating at `U256::MAX`.
    pub fn total_liabilities(&self, kind: RewardKind) -> U256 {
        self.balances(kind.is_currency())
            .values()
            .fold(U256::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    /// Recipients with a nonzero balance of `kind`, in address order.
    pub fn recipients(&self, kind: RewardKind) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances(kind.is_currency()).iter()
    }

    // ---- Journal ----

    /// Position to roll back to.
    pub fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    /// Undo every change made since `mark`, newest first.
    pub fn rollback_to(&mut self, mark: usize) {
        while self.journal.len() > mark {
            let Some(undo) = self.journal.pop() else {
                break;
            };
            match undo {
                Undo::Balance {
                    currency,
                    recipient,
                    previous: Some(amount),
                } => {
                    self.balances_mut(currency).insert(recipient, amount);
                }
                Undo::Balance {
                    currency,
                    recipient,
                    previous: None,
                } => {
                    self.balances_mut(currency).remove(&recipient);
                }
                Undo::TokenCustody(total) => self.custody_token_total = total,
            }
        }
    }

    /// Forget the journal; the changes made so far become permanent.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    fn set_token_custody(&mut self, total: U256) {
        self.journal
            .push(Undo::TokenCustody(self.custody_token_total));
        self.custody_token_total = total;
    }

    fn balances(&self, currency: bool) -> &BTreeMap<Address, U256> {
        if currency {
            &self.currency_balances
        } else {
            &self.token_balances
        }
    }

    fn balances_mut(&mut self, currency: bool) -> &mut BTreeMap<Address, U256> {
        if currency {
            &mut self.currency_balances
        } else {
            &mut self.token_balances
        }
    }
}
