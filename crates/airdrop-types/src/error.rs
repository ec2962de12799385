use thiserror::Error;

/// Errors raised by the voucher and signature codecs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("signature is not valid hex: {0}")]
    SignatureHex(String),

    #[error("signature must be {expected} bytes of r, s and v, got {actual}")]
    SignatureLength { expected: usize, actual: usize },

    #[error("voucher JSON: {0}")]
    VoucherJson(String),
}
