//! Voucher validation pipeline for the Airdrop ledger.
//!
//! Every voucher must pass through the gate before the ledger credits its
//! recipient. The gate runs an ordered pipeline of stages (deadline, reward
//! kind, signature) and stops at the first failure, so the reported
//! [`Rejection`] is deterministic for a voucher that is wrong in several ways.
//!
//! # Quick Start
//!
//! ```rust
//! use airdrop_crypto::{DomainSeparator, IssuerKey, VoucherHasher};
//! use airdrop_gate::{DropOperation, GateContext, VoucherGate};
//! use airdrop_types::{Address, RewardKind, Voucher, U256};
//!
//! let issuer = IssuerKey::generate();
//! let token = Address::repeat_byte(0x7a);
//! let hasher = VoucherHasher::new(&DomainSeparator::airdrop(1, Address::repeat_byte(0xc0)));
//! let voucher = Voucher::new(
//!     Address::repeat_byte(0x01),
//!     U256::from(100u64),
//!     U256::from(2_000u64),
//!     RewardKind::Token(token),
//! );
//! let signed = issuer.sign_voucher(&hasher, voucher).unwrap();
//!
//! let gate = VoucherGate::with_default_stages();
//! let context = GateContext::new(1_000, DropOperation::Token, token, issuer.address(), &hasher);
//! assert!(gate.evaluate(&signed, &context).is_accepted());
//! ```

pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;

// Re-exports for convenience.
pub use error::Rejection;
pub use gate::{GateResult, Verdict, VoucherGate};
pub use stage::{DropOperation, GateContext, StageDecision, StageResult, VoucherStage};
pub use stages::{DeadlineStage, RewardKindStage, SignatureStage};
