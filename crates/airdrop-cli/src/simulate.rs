use airdrop_crypto::IssuerKey;
use airdrop_ledger::{
    Airdrop, AirdropConfig, CallContext, EventRecord, InMemoryTransferAgent, LedgerError,
};
use airdrop_types::{Address, RewardKind, SignedVoucher, Voucher, U256};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A scenario replayed against a fresh in-memory ledger.
///
/// Quantities are JSON strings in `0x` hex. The issuer address is derived
/// from `issuerKey` and overrides any `issuer` in `config`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default)]
    pub config: AirdropConfig,
    pub issuer_key: String,
    pub now: u64,
    #[serde(default)]
    pub funding: Vec<Funding>,
    pub steps: Vec<Step>,
}

/// Opening balance minted by the in-memory agent. A missing `holder`
/// funds the issuer; the zero `asset` is currency.
#[derive(Debug, Deserialize)]
pub struct Funding {
    #[serde(default)]
    pub holder: Option<Address>,
    pub asset: RewardKind,
    pub amount: U256,
}

/// Either a ready-made signed voucher or bare fields for the current
/// issuer to sign.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScriptVoucher {
    Signed(SignedVoucher),
    Unsigned(Voucher),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    DepositToken { amount: U256 },
    DepositCurrency { amount: U256 },
    WithdrawToken,
    WithdrawCurrency,
    DropToken { vouchers: Vec<ScriptVoucher> },
    DropCurrency { vouchers: Vec<ScriptVoucher> },
    Drop { vouchers: Vec<ScriptVoucher> },
    ClaimToken { caller: Address },
    ClaimCurrency { caller: Address },
    UpdateRewardSource { token: Address },
    TransferOwnership { new_issuer_key: String },
    /// Move the clock forward.
    Advance { seconds: u64 },
    /// Make the in-memory agent refuse payouts to `recipient`.
    RefuseTransfers { recipient: Address },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DepositToken { .. } => "depositToken",
            Self::DepositCurrency { .. } => "depositCurrency",
            Self::WithdrawToken => "withdrawToken",
            Self::WithdrawCurrency => "withdrawCurrency",
            Self::DropToken { .. } => "dropToken",
            Self::DropCurrency { .. } => "dropCurrency",
            Self::Drop { .. } => "drop",
            Self::ClaimToken { .. } => "claimToken",
            Self::ClaimCurrency { .. } => "claimCurrency",
            Self::UpdateRewardSource { .. } => "updateRewardSource",
            Self::TransferOwnership { .. } => "transferOwnership",
            Self::Advance { .. } => "advance",
            Self::RefuseTransfers { .. } => "refuseTransfers",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub detail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub steps: Vec<StepOutcome>,
    pub events: Vec<EventRecord>,
    pub issuer: Address,
    pub reward_token: Address,
    pub custody_token_total: U256,
    pub held_currency: U256,
    pub token_liabilities: U256,
    pub currency_liabilities: U256,
}

/// Parse a script from JSON text.
pub fn parse(json: &str) -> anyhow::Result<Script> {
    serde_json::from_str(json).context("malformed simulation script")
}

/// Run every step in order. Ledger refusals are recorded and the run goes
/// on; malformed steps abort it.
pub fn run(script: &Script) -> anyhow::Result<SimulationReport> {
    let mut sim = Simulation::new(script)?;
    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let outcome = sim
            .apply(step)
            .with_context(|| format!("step {index} ({})", step.name()))?;
        steps.push(match outcome {
            Ok(detail) => StepOutcome {
                index,
                op: step.name(),
                ok: true,
                reason: None,
                detail,
            },
            Err(error) => StepOutcome {
                index,
                op: step.name(),
                ok: false,
                reason: Some(error.reason()),
                detail: error.to_string(),
            },
        });
    }
    Ok(sim.report(steps))
}

struct Simulation {
    airdrop: Airdrop<InMemoryTransferAgent>,
    signer: IssuerKey,
    now: u64,
}

impl Simulation {
    fn new(script: &Script) -> anyhow::Result<Self> {
        let signer = IssuerKey::from_hex(&script.issuer_key).context("invalid issuer key")?;
        let mut config = script.config.clone();
        config.issuer = signer.address();

        let mut agent = InMemoryTransferAgent::new(config.contract);
        for funding in &script.funding {
            let holder = funding.holder.unwrap_or(config.issuer);
            agent.fund(funding.asset, holder, funding.amount);
        }

        let airdrop = Airdrop::new(config, agent)?;
        Ok(Self {
            airdrop,
            signer,
            now: script.now,
        })
    }

    fn issuer_ctx(&self) -> CallContext {
        CallContext::new(self.airdrop.issuer(), self.now)
    }

    fn sign_all(&self, vouchers: &[ScriptVoucher]) -> anyhow::Result<Vec<SignedVoucher>> {
        vouchers
            .iter()
            .map(|v| -> anyhow::Result<SignedVoucher> {
                match v {
                    ScriptVoucher::Signed(signed) => Ok(*signed),
                    ScriptVoucher::Unsigned(voucher) => Ok(self
                        .signer
                        .sign_voucher(self.airdrop.hasher(), *voucher)?),
                }
            })
            .collect()
    }

    fn apply(&mut self, step: &Step) -> anyhow::Result<Result<String, LedgerError>> {
        let ctx = self.issuer_ctx();
        let outcome = match step {
            Step::DepositToken { amount } => self
                .airdrop
                .deposit_token(&ctx, *amount)
                .map(|total| format!("token custody {total}")),
            Step::DepositCurrency { amount } => self
                .airdrop
                .deposit_currency(&ctx, *amount)
                .map(|total| format!("currency held {total}")),
            Step::WithdrawToken => self
                .airdrop
                .withdraw_token(&ctx)
                .map(|amount| format!("returned {amount} token")),
            Step::WithdrawCurrency => self
                .airdrop
                .withdraw_currency(&ctx)
                .map(|amount| format!("returned {amount} currency")),
            Step::DropToken { vouchers } => {
                let signed = self.sign_all(vouchers)?;
                self.airdrop.drop_token(&ctx, &signed).map(describe_drop)
            }
            Step::DropCurrency { vouchers } => {
                let signed = self.sign_all(vouchers)?;
                self.airdrop.drop_currency(&ctx, &signed).map(describe_drop)
            }
            Step::Drop { vouchers } => {
                let signed = self.sign_all(vouchers)?;
                self.airdrop.drop(&ctx, &signed).map(describe_drop)
            }
            Step::ClaimToken { caller } => self
                .airdrop
                .claim_token(&CallContext::new(*caller, self.now))
                .map(|amount| format!("{caller} claimed {amount} token")),
            Step::ClaimCurrency { caller } => self
                .airdrop
                .claim_currency(&CallContext::new(*caller, self.now))
                .map(|amount| format!("{caller} claimed {amount} currency")),
            Step::UpdateRewardSource { token } => self
                .airdrop
                .update_reward_source(&ctx, *token)
                .map(|()| format!("reward token {token}")),
            Step::TransferOwnership { new_issuer_key } => {
                let successor =
                    IssuerKey::from_hex(new_issuer_key).context("invalid new issuer key")?;
                let address = successor.address();
                let result = self.airdrop.transfer_ownership(&ctx, address);
                if result.is_ok() {
                    self.signer = successor;
                }
                result.map(|()| format!("issuer {address}"))
            }
            Step::Advance { seconds } => {
                self.now = self.now.saturating_add(*seconds);
                Ok(format!("now {}", self.now))
            }
            Step::RefuseTransfers { recipient } => {
                self.airdrop.agent_mut().refuse_transfers_to(*recipient);
                Ok(format!("{recipient} refuses transfers"))
            }
        };
        Ok(outcome)
    }

    fn report(self, steps: Vec<StepOutcome>) -> SimulationReport {
        SimulationReport {
            steps,
            events: self.airdrop.events().to_vec(),
            issuer: self.airdrop.issuer(),
            reward_token: self.airdrop.reward_token(),
            custody_token_total: self.airdrop.custody_token_total(),
            held_currency: self.airdrop.held_currency(),
            token_liabilities: self.airdrop.total_token_liabilities(),
            currency_liabilities: self.airdrop.total_currency_liabilities(),
        }
    }
}

fn describe_drop(summary: airdrop_ledger::DropSummary) -> String {
    format!(
        "{} vouchers, {} token, {} currency",
        summary.vouchers, summary.token_amount, summary.currency_amount
    )
}
