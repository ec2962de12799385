//! Cryptographic primitives for the Airdrop ledger.
//!
//! Provides the typed-data domain separator, the voucher digest, and
//! recoverable secp256k1 signing/recovery used to authenticate issuer
//! vouchers.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod domain;
pub mod hasher;
pub mod signer;

pub use domain::{DomainSeparator, DOMAIN_TYPE, PROTOCOL_NAME, PROTOCOL_VERSION};
pub use hasher::{VoucherHasher, VOUCHER_TYPE};
pub use signer::{address_of, recover_signer, try_recover, IssuerKey, SignerError};
