use std::fmt;

use airdrop_crypto::VoucherHasher;
use airdrop_types::{Address, RewardKind, SignedVoucher};
use serde::{Deserialize, Serialize};

use crate::error::Rejection;

// ---------------------------------------------------------------------------
// DropOperation
// ---------------------------------------------------------------------------

/// The entry point a voucher was submitted through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropOperation {
    /// Token-only drop: every voucher must be of the configured token.
    Token,
    /// Currency-only drop: every voucher must be of currency kind.
    Currency,
    /// Mixed batch: each voucher is dispatched by its own kind.
    Batch,
}

impl DropOperation {
    /// The only kind this operation accepts, or `None` for a mixed batch.
    pub fn expected_kind(&self, reward_token: Address) -> Option<RewardKind> {
        match self {
            Self::Token => Some(RewardKind::token(reward_token)),
            Self::Currency => Some(RewardKind::Currency),
            Self::Batch => None,
        }
    }

    /// Name of the ledger operation, as it appears in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "dropToken",
            Self::Currency => "dropCurrency",
            Self::Batch => "drop",
        }
    }
}

impl fmt::Display for DropOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the voucher is rejected.
    Fail(Rejection),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: &'static str,
    /// Whether the stage passed.
    pub passed: bool,
    /// Stable reason tag, populated on failure.
    pub reason: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Everything a stage needs besides the voucher itself.
pub struct GateContext<'a> {
    /// Current time, in the same unit as voucher deadlines.
    pub now: u64,
    /// Entry point the voucher arrived through.
    pub operation: DropOperation,
    /// Currently configured reward token.
    pub reward_token: Address,
    /// Identity whose signature authorizes credits.
    pub issuer: Address,
    /// Digest builder bound to the deployment's domain.
    pub hasher: &'a VoucherHasher,
}

impl<'a> GateContext<'a> {
    pub fn new(
        now: u64,
        operation: DropOperation,
        reward_token: Address,
        issuer: Address,
        hasher: &'a VoucherHasher,
    ) -> Self {
        Self {
            now,
            operation,
            reward_token,
            issuer,
            hasher,
        }
    }
}

// ---------------------------------------------------------------------------
// VoucherStage trait
// ---------------------------------------------------------------------------

/// A single check in the voucher pipeline.
///
/// Stages are evaluated in order and the first failure wins. The trait is
/// object-safe so stages can be stored in a `Vec<Box<dyn VoucherStage>>`.
pub trait VoucherStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "deadline", "signature").
    fn name(&self) -> &'static str;

    /// Evaluate the voucher and return a decision.
    fn evaluate(&self, voucher: &SignedVoucher, context: &GateContext<'_>) -> StageDecision;
}
