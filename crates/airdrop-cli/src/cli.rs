use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "airdrop",
    about = "Airdrop ledger: issue, verify, and simulate signed reward vouchers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a fresh issuer key
    Keygen,
    /// Show the address of an issuer key
    Address(AddressArgs),
    /// Sign a voucher with an issuer key
    Sign(SignArgs),
    /// Recover the signer of a signed voucher
    Recover(VoucherFileArgs),
    /// Show the digest an issuer signs for a voucher
    Digest(VoucherFileArgs),
    /// Show the domain separator of a deployment
    Domain(DomainArgs),
    /// Replay a scripted scenario against an in-memory ledger
    Simulate(SimulateArgs),
}

/// Where the domain separator comes from.
#[derive(Args, Clone)]
pub struct DomainArgs {
    /// Deployment config (TOML); takes precedence over the flags below
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    pub chain_id: u64,
    /// Address of the ledger (verifying contract)
    #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
    pub contract: String,
}

#[derive(Args)]
pub struct AddressArgs {
    /// Hex-encoded secret key
    #[arg(long)]
    pub key: String,
}

#[derive(Args)]
pub struct SignArgs {
    /// Hex-encoded secret key
    #[arg(long)]
    pub key: String,
    #[arg(long)]
    pub recipient: String,
    /// Decimal or 0x-prefixed amount
    #[arg(long)]
    pub amount: String,
    /// Decimal or 0x-prefixed deadline; the voucher expires once now reaches it
    #[arg(long)]
    pub deadline: String,
    /// `currency`, or the reward token address
    #[arg(long, default_value = "currency")]
    pub kind: String,
    #[command(flatten)]
    pub domain: DomainArgs,
}

#[derive(Args)]
pub struct VoucherFileArgs {
    /// JSON file holding a voucher
    pub voucher: PathBuf,
    #[command(flatten)]
    pub domain: DomainArgs,
}

#[derive(Args)]
pub struct SimulateArgs {
    /// JSON scenario script
    pub script: PathBuf,
}
