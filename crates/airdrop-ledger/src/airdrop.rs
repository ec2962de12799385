use airdrop_crypto::{DomainSeparator, VoucherHasher};
use airdrop_gate::{DropOperation, GateContext, Verdict, VoucherGate};
use airdrop_types::{Address, RewardKind, SignedVoucher, Voucher, B256, U256};
use tracing::{debug, info, warn};

use crate::config::AirdropConfig;
use crate::error::LedgerError;
use crate::events::{AirdropEvent, EventLog, EventRecord};
use crate::state::RewardLedger;
use crate::traits::TransferAgent;

/// Who is calling, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Current time, in the unit voucher deadlines are expressed in.
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }
}

/// What a successful drop credited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropSummary {
    pub vouchers: usize,
    pub token_amount: U256,
    pub currency_amount: U256,
}

/// State captured before an operation so a failure can be undone.
struct Checkpoint {
    ledger_mark: usize,
    events: usize,
    issuer: Address,
    reward_token: Address,
}

/// The signed-voucher redemption ledger.
///
/// Owns the reward balances, the token custody total, the issuer identity,
/// the event log, and the [`TransferAgent`] used to move funds. Currency
/// custody is read live from the agent. Every public
/// mutating operation is atomic: it either commits all of its ledger changes
/// and events or returns an error with the state unchanged.
pub struct Airdrop<A: TransferAgent> {
    config: AirdropConfig,
    domain: DomainSeparator,
    hasher: VoucherHasher,
    gate: VoucherGate,
    issuer: Address,
    reward_token: Address,
    ledger: RewardLedger,
    events: EventLog,
    agent: A,
}

impl<A: TransferAgent> Airdrop<A> {
    /// Deploy a ledger. The domain separator is fixed here for the lifetime
    /// of the value.
    pub fn new(config: AirdropConfig, agent: A) -> Result<Self, LedgerError> {
        config.validate()?;
        let domain = config.domain_separator();
        let hasher = VoucherHasher::new(&domain);
        info!(
            chain_id = config.chain_id,
            contract = %config.contract,
            issuer = %config.issuer,
            reward_token = %config.reward_token,
            "airdrop ledger deployed"
        );

        Ok(Self {
            issuer: config.issuer,
            reward_token: config.reward_token,
            config,
            domain,
            hasher,
            gate: VoucherGate::with_default_stages(),
            ledger: RewardLedger::new(),
            events: EventLog::new(),
            agent,
        })
    }

    // ---- Views ----

    pub fn config(&self) -> &AirdropConfig {
        &self.config
    }

    pub fn domain_separator(&self) -> &DomainSeparator {
        &self.domain
    }

    pub fn issuer(&self) -> Address {
        self.issuer
    }

    pub fn reward_token(&self) -> Address {
        self.reward_token
    }

    /// The reward kind token vouchers must currently carry.
    pub fn token_kind(&self) -> RewardKind {
        RewardKind::token(self.reward_token)
    }

    pub fn token_balance_of(&self, recipient: &Address) -> U256 {
        self.ledger.balance_of(self.token_kind(), recipient)
    }

    pub fn currency_balance_of(&self, recipient: &Address) -> U256 {
        self.ledger.balance_of(RewardKind::Currency, recipient)
    }

    pub fn custody_token_total(&self) -> U256 {
        self.ledger.custody_token_total()
    }

    /// Currency the agent holds for this ledger, however it arrived.
    pub fn held_currency(&self) -> U256 {
        self.agent.holdings(RewardKind::Currency)
    }

    /// Sum of all unclaimed token balances.
    pub fn total_token_liabilities(&self) -> U256 {
        self.ledger.total_liabilities(self.token_kind())
    }

    /// Sum of all unclaimed currency balances.
    pub fn total_currency_liabilities(&self) -> U256 {
        self.ledger.total_liabilities(RewardKind::Currency)
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.events.since(seq)
    }

    /// Digest the issuer must sign for `voucher` on this deployment.
    pub fn digest_of(&self, voucher: &Voucher) -> B256 {
        self.hasher.digest(voucher)
    }

    pub fn hasher(&self) -> &VoucherHasher {
        &self.hasher
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    // ---- Crediting ----

    /// Credit a batch of token vouchers. All-or-nothing.
    pub fn drop_token(
        &mut self,
        ctx: &CallContext,
        vouchers: &[SignedVoucher],
    ) -> Result<DropSummary, LedgerError> {
        self.drop_vouchers(ctx, DropOperation::Token, vouchers)
    }

    /// Credit a batch of currency vouchers. All-or-nothing.
    pub fn drop_currency(
        &mut self,
        ctx: &CallContext,
        vouchers: &[SignedVoucher],
    ) -> Result<DropSummary, LedgerError> {
        self.drop_vouchers(ctx, DropOperation::Currency, vouchers)
    }

    /// Credit a mixed batch, dispatching each voucher by its own reward
    /// kind. All-or-nothing.
    pub fn drop(
        &mut self,
        ctx: &CallContext,
        vouchers: &[SignedVoucher],
    ) -> Result<DropSummary, LedgerError> {
        self.drop_vouchers(ctx, DropOperation::Batch, vouchers)
    }

    fn drop_vouchers(
        &mut self,
        ctx: &CallContext,
        operation: DropOperation,
        vouchers: &[SignedVoucher],
    ) -> Result<DropSummary, LedgerError> {
        self.transact(operation.as_str(), |this| {
            this.only_issuer(ctx)?;

            let mut summary = DropSummary::default();
            for (index, voucher) in vouchers.iter().enumerate() {
                let gate_ctx = GateContext::new(
                    ctx.now,
                    operation,
                    this.reward_token,
                    this.issuer,
                    &this.hasher,
                );
                let result = this.gate.evaluate(voucher, &gate_ctx);
                let stage = result.failed_stage().unwrap_or("unknown");
                if let Verdict::Rejected(rejection) = result.verdict {
                    warn!(
                        index,
                        stage,
                        reason = rejection.reason(),
                        recipient = %voucher.recipient(),
                        "voucher rejected"
                    );
                    return Err(LedgerError::Rejected { index, rejection });
                }

                // The gate guarantees the kind is currency or the configured token.
                let kind = RewardKind::from_address(voucher.reward_kind().to_address());
                let recipient = voucher.recipient();
                let amount = voucher.amount();
                let balance = this.ledger.credit(kind, recipient, amount)?;
                this.events.push(AirdropEvent::Credited {
                    kind,
                    to: recipient,
                    amount,
                });

                summary.vouchers += 1;
                if kind.is_currency() {
                    summary.currency_amount = summary.currency_amount.saturating_add(amount);
                } else {
                    summary.token_amount = summary.token_amount.saturating_add(amount);
                }
                debug!(index, kind = kind.label(), recipient = %recipient, amount = %amount, balance = %balance, "voucher credited");
            }

            info!(
                operation = %operation,
                vouchers = summary.vouchers,
                token_amount = %summary.token_amount,
                currency_amount = %summary.currency_amount,
                "drop committed"
            );
            Ok(summary)
        })
    }

    // ---- Redemption ----

    /// Redeem the caller's whole token balance.
    pub fn claim_token(&mut self, ctx: &CallContext) -> Result<U256, LedgerError> {
        let kind = self.token_kind();
        self.claim(ctx, kind, "claimToken")
    }

    /// Redeem the caller's whole currency balance.
    pub fn claim_currency(&mut self, ctx: &CallContext) -> Result<U256, LedgerError> {
        self.claim(ctx, RewardKind::Currency, "claimCurrency")
    }

    fn claim(
        &mut self,
        ctx: &CallContext,
        kind: RewardKind,
        name: &'static str,
    ) -> Result<U256, LedgerError> {
        self.transact(name, |this| {
            let recipient = ctx.caller;
            let amount = this.ledger.balance_of(kind, &recipient);
            if amount.is_zero() {
                return Err(LedgerError::NothingToClaim { recipient });
            }

            let available = if kind.is_currency() {
                this.agent.holdings(kind)
            } else {
                this.ledger.custody_token_total()
            };
            if available < amount {
                return Err(LedgerError::InsufficientCustody {
                    required: amount,
                    available,
                });
            }

            // Balance and custody are committed before funds move.
            this.ledger.take(kind, &recipient);
            if !kind.is_currency() {
                this.ledger.sub_token_custody(amount)?;
            }
            this.agent.push(kind, recipient, amount)?;

            this.events.push(AirdropEvent::Claimed {
                kind,
                to: recipient,
                amount,
            });
            info!(kind = kind.label(), recipient = %recipient, amount = %amount, "claim committed");
            Ok(amount)
        })
    }

    // ---- Custody ----

    /// Move `amount` tokens from the issuer into custody.
    pub fn deposit_token(&mut self, ctx: &CallContext, amount: U256) -> Result<U256, LedgerError> {
        let kind = self.token_kind();
        self.deposit(ctx, kind, amount, "depositToken")
    }

    /// Move `amount` currency from the issuer into custody.
    pub fn deposit_currency(
        &mut self,
        ctx: &CallContext,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        self.deposit(ctx, RewardKind::Currency, amount, "depositCurrency")
    }

    /// Return the whole tracked token total to the issuer.
    pub fn withdraw_token(&mut self, ctx: &CallContext) -> Result<U256, LedgerError> {
        let kind = self.token_kind();
        self.withdraw(ctx, kind, "withdrawToken")
    }

    /// Return all held currency to the issuer.
    pub fn withdraw_currency(&mut self, ctx: &CallContext) -> Result<U256, LedgerError> {
        self.withdraw(ctx, RewardKind::Currency, "withdrawCurrency")
    }

    fn deposit(
        &mut self,
        ctx: &CallContext,
        kind: RewardKind,
        amount: U256,
        name: &'static str,
    ) -> Result<U256, LedgerError> {
        self.transact(name, |this| {
            this.only_issuer(ctx)?;
            if !kind.is_currency() {
                this.ledger.add_token_custody(amount)?;
            }
            this.agent.pull(kind, ctx.caller, amount)?;
            let total = if kind.is_currency() {
                this.agent.holdings(kind)
            } else {
                this.ledger.custody_token_total()
            };
            this.events.push(AirdropEvent::Deposited {
                kind,
                from: ctx.caller,
                amount,
            });
            info!(kind = kind.label(), amount = %amount, total = %total, "deposit committed");
            Ok(total)
        })
    }

    fn withdraw(
        &mut self,
        ctx: &CallContext,
        kind: RewardKind,
        name: &'static str,
    ) -> Result<U256, LedgerError> {
        self.transact(name, |this| {
            this.only_issuer(ctx)?;
            let amount = if kind.is_currency() {
                this.agent.holdings(kind)
            } else {
                this.ledger.drain_token_custody()
            };
            this.agent.push(kind, ctx.caller, amount)?;
            this.events.push(AirdropEvent::Withdrawn {
                kind,
                to: ctx.caller,
                amount,
            });
            info!(kind = kind.label(), amount = %amount, "withdraw committed");
            Ok(amount)
        })
    }

    // ---- Administration ----

    /// Point token vouchers and token custody at a different token.
    ///
    /// The tracked custody total carries over unchanged; it is an accounting
    /// figure, not a mirror of the new token's holdings.
    pub fn update_reward_source(
        &mut self,
        ctx: &CallContext,
        token: Address,
    ) -> Result<(), LedgerError> {
        self.transact("updateRewardSource", |this| {
            this.only_issuer(ctx)?;
            if token.is_zero() {
                return Err(LedgerError::InvalidRewardSource);
            }
            this.reward_token = token;
            this.events.push(AirdropEvent::UpdateRewardSource { token });
            info!(token = %token, "reward source updated");
            Ok(())
        })
    }

    /// Hand the issuer role to `new_issuer`.
    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        new_issuer: Address,
    ) -> Result<(), LedgerError> {
        self.transact("transferOwnership", |this| {
            this.only_issuer(ctx)?;
            if new_issuer.is_zero() {
                return Err(LedgerError::InvalidIssuer);
            }
            let previous = std::mem::replace(&mut this.issuer, new_issuer);
            this.events.push(AirdropEvent::OwnershipTransferred {
                previous,
                new: new_issuer,
            });
            info!(previous = %previous, new = %new_issuer, "ownership transferred");
            Ok(())
        })
    }

    // ---- Internals ----

    fn only_issuer(&self, ctx: &CallContext) -> Result<(), LedgerError> {
        if ctx.caller != self.issuer {
            return Err(LedgerError::NotIssuer { caller: ctx.caller });
        }
        Ok(())
    }

    /// Run `op`, restoring the pre-call state if it fails.
    fn transact<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Self) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let checkpoint = self.checkpoint();
        match op(self) {
            Ok(value) => {
                self.ledger.commit();
                Ok(value)
            }
            Err(error) => {
                self.restore(checkpoint);
                warn!(operation = name, reason = error.reason(), %error, "operation reverted");
                Err(error)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            ledger_mark: self.ledger.checkpoint(),
            events: self.events.len(),
            issuer: self.issuer,
            reward_token: self.reward_token,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.ledger.rollback_to(checkpoint.ledger_mark);
        self.events.truncate(checkpoint.events);
        self.issuer = checkpoint.issuer;
        self.reward_token = checkpoint.reward_token;
    }
}
