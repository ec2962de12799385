use airdrop_types::SignedVoucher;

use crate::error::Rejection;
use crate::stage::{GateContext, StageDecision, VoucherStage};

/// Refuses vouchers whose deadline is not strictly after `now`.
pub struct DeadlineStage;

impl VoucherStage for DeadlineStage {
    fn name(&self) -> &'static str {
        "deadline"
    }

    fn evaluate(&self, voucher: &SignedVoucher, context: &GateContext<'_>) -> StageDecision {
        if voucher.voucher.is_expired(context.now) {
            return StageDecision::Fail(Rejection::Expired {
                deadline: voucher.voucher.deadline,
                now: context.now,
            });
        }
        StageDecision::Pass
    }
}
