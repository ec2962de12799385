use airdrop_crypto::recover_signer;
use airdrop_types::SignedVoucher;
use tracing::debug;

use crate::error::Rejection;
use crate::stage::{GateContext, StageDecision, VoucherStage};

/// Recomputes the voucher digest and requires it to recover to the issuer.
pub struct SignatureStage;

impl VoucherStage for SignatureStage {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn evaluate(&self, voucher: &SignedVoucher, context: &GateContext<'_>) -> StageDecision {
        let digest = context.hasher.digest(&voucher.voucher);
        let recovered = recover_signer(&digest, &voucher.signature);
        debug!(digest = %digest, recovered = %recovered, "voucher signer recovered");

        // A failed recovery yields the zero address, which is never an issuer.
        if recovered.is_zero() || recovered != context.issuer {
            return StageDecision::Fail(Rejection::UnauthorizedSignature { recovered });
        }
        StageDecision::Pass
    }
}
