//! Reward ledger for the Airdrop protocol.
//!
//! This crate turns issuer-signed vouchers into claimable balances. It provides:
//! - [`Airdrop`], the ledger: batch crediting, claims, custody, administration
//! - [`RewardLedger`], the balance and custody bookkeeping it owns
//! - [`TransferAgent`], the boundary that moves real funds, with
//!   [`InMemoryTransferAgent`] for tests and embedding
//! - [`EventLog`], the ordered record of committed effects
//! - [`AirdropConfig`], TOML-backed deployment parameters
//!
//! Every mutating operation is all-or-nothing: on error the balances, custody
//! figures, issuer, reward token, and event log are left as they were.

pub mod airdrop;
pub mod config;
pub mod error;
pub mod events;
pub mod memory;
pub mod state;
pub mod traits;

pub use airdrop::{Airdrop, CallContext, DropSummary};
pub use config::AirdropConfig;
pub use error::LedgerError;
pub use events::{AirdropEvent, EventLog, EventRecord};
pub use memory::InMemoryTransferAgent;
pub use state::RewardLedger;
pub use traits::{TransferAgent, TransferError};
