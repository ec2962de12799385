use airdrop_types::SignedVoucher;

use crate::error::Rejection;
use crate::stage::{GateContext, StageDecision, StageResult, VoucherStage};
use crate::stages::{DeadlineStage, RewardKindStage, SignatureStage};

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// Final verdict for one voucher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

/// The outcome of running a voucher through the full pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub verdict: Verdict,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
}

impl GateResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted)
    }

    /// Name of the stage that rejected the voucher, if any.
    pub fn failed_stage(&self) -> Option<&'static str> {
        self.stage_results
            .iter()
            .find(|r| !r.passed)
            .map(|r| r.stage_name)
    }

    /// Collapse into `Ok(())` or the first rejection.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self.verdict {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(rejection) => Err(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// VoucherGate
// ---------------------------------------------------------------------------

/// Ordered pipeline every voucher passes before the ledger is credited.
///
/// The default order is deadline, reward kind, signature. The signature is
/// checked last so that cheap structural refusals never pay for a curve
/// recovery.
pub struct VoucherGate {
    stages: Vec<Box<dyn VoucherStage>>,
}

impl VoucherGate {
    /// Create a gate with an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create a gate with the default stage pipeline:
    /// Deadline -> RewardKind -> Signature
    pub fn with_default_stages() -> Self {
        let mut gate = Self::new();
        gate.add_stage(Box::new(DeadlineStage));
        gate.add_stage(Box::new(RewardKindStage));
        gate.add_stage(Box::new(SignatureStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn VoucherStage>) {
        self.stages.push(stage);
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a voucher through the full pipeline.
    ///
    /// The pipeline is **fail-fast**: the first stage that fails stops
    /// evaluation and produces a `Rejected` verdict.
    pub fn evaluate(&self, voucher: &SignedVoucher, context: &GateContext<'_>) -> GateResult {
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let decision = stage.evaluate(voucher, context);
            stage_results.push(StageResult {
                stage_name: stage.name(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail(rejection) => Some(rejection.reason()),
                },
            });

            if let StageDecision::Fail(rejection) = decision {
                return GateResult {
                    verdict: Verdict::Rejected(rejection),
                    stage_results,
                };
            }
        }

        GateResult {
            verdict: Verdict::Accepted,
            stage_results,
        }
    }
}

impl Default for VoucherGate {
    fn default() -> Self {
        Self::with_default_stages()
    }
}
