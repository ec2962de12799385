use airdrop_types::{RewardKind, SignedVoucher};

use crate::error::Rejection;
use crate::stage::{GateContext, StageDecision, VoucherStage};

/// Checks the voucher's reward kind against the entry point.
///
/// A mixed batch only refuses kinds it cannot dispatch (neither the
/// configured token nor currency). A typed drop refuses any kind other than
/// its own.
pub struct RewardKindStage;

impl VoucherStage for RewardKindStage {
    fn name(&self) -> &'static str {
        "reward-kind"
    }

    fn evaluate(&self, voucher: &SignedVoucher, context: &GateContext<'_>) -> StageDecision {
        // Re-derive from the wire form so a hand-built `Token(0x0)` counts as currency.
        let actual = RewardKind::from_address(voucher.reward_kind().to_address());
        let configured = RewardKind::token(context.reward_token);

        match context.operation.expected_kind(context.reward_token) {
            None => {
                if actual.is_currency() || actual == configured {
                    StageDecision::Pass
                } else {
                    StageDecision::Fail(Rejection::UnknownRewardKind { kind: actual })
                }
            }
            Some(expected) if expected == actual => StageDecision::Pass,
            Some(expected) => StageDecision::Fail(Rejection::RewardKindMismatch { expected, actual }),
        }
    }
}
