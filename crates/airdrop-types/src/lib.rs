//! Foundation types for the Airdrop ledger.
//!
//! This crate provides the identity, reward, and voucher types shared by
//! every other Airdrop crate.
//!
//! # Key Types
//!
//! - [`Address`]: 20-byte account identity (recipients, issuer, tokens)
//! - [`U256`]: 256-bit unsigned quantity used for amounts and deadlines
//! - [`RewardKind`]: whether a voucher pays out in the token or in currency
//! - [`Voucher`]: the four authenticated fields an issuer signs
//! - [`VoucherSignature`]: recoverable `(r, s, v)` signature triple
//! - [`SignedVoucher`]: the flat wire record submitted for crediting

pub mod error;
pub mod reward;
pub mod voucher;

pub use alloy_primitives::{Address, B256, U256};
pub use error::TypeError;
pub use reward::RewardKind;
pub use voucher::{SignedVoucher, Voucher, VoucherSignature};
