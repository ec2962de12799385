use std::path::Path;

use airdrop_crypto::{recover_signer, DomainSeparator, IssuerKey, VoucherHasher};
use airdrop_ledger::AirdropConfig;
use airdrop_types::{Address, RewardKind, SignedVoucher, Voucher, B256, U256};
use anyhow::Context;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::cli::*;
use crate::simulate;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Keygen => cmd_keygen(&format),
        Command::Address(args) => cmd_address(args, &format),
        Command::Sign(args) => cmd_sign(args),
        Command::Recover(args) => cmd_recover(args, &format),
        Command::Digest(args) => cmd_digest(args, &format),
        Command::Domain(args) => cmd_domain(args, &format),
        Command::Simulate(args) => cmd_simulate(args, &format),
    }
}

fn cmd_keygen(format: &OutputFormat) -> anyhow::Result<()> {
    let key = IssuerKey::generate();
    let secret = B256::from(key.to_bytes());
    match format {
        OutputFormat::Json => print_json(&json!({ "secret": secret, "address": key.address() })),
        OutputFormat::Text => {
            println!("{} Generated issuer key", "✓".green().bold());
            println!("  Secret:  {}", secret.to_string().red());
            println!("  Address: {}", key.address().to_string().cyan());
            Ok(())
        }
    }
}

fn cmd_address(args: AddressArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let key = IssuerKey::from_hex(&args.key).context("invalid issuer key")?;
    match format {
        OutputFormat::Json => print_json(&json!({ "address": key.address() })),
        OutputFormat::Text => {
            println!("{}", key.address().to_string().cyan());
            Ok(())
        }
    }
}

fn cmd_sign(args: SignArgs) -> anyhow::Result<()> {
    let key = IssuerKey::from_hex(&args.key).context("invalid issuer key")?;
    let voucher = Voucher::new(
        parse_address(&args.recipient)?,
        parse_quantity(&args.amount)?,
        parse_quantity(&args.deadline)?,
        parse_kind(&args.kind)?,
    );
    let hasher = VoucherHasher::new(&resolve_domain(&args.domain)?);
    let signed = key.sign_voucher(&hasher, voucher)?;
    println!("{}", signed.to_json()?);
    Ok(())
}

fn cmd_recover(args: VoucherFileArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let signed: SignedVoucher = read_json(&args.voucher)?;
    let hasher = VoucherHasher::new(&resolve_domain(&args.domain)?);
    let digest = hasher.digest(&signed.voucher);
    let signer = recover_signer(&digest, &signed.signature);

    match format {
        OutputFormat::Json => print_json(&json!({ "digest": digest, "signer": signer })),
        OutputFormat::Text => {
            println!("Digest: {}", digest.to_string().dimmed());
            if signer.is_zero() {
                println!("{} No signer recovered", "✗".red().bold());
            } else {
                println!("{} Signed by {}", "✓".green().bold(), signer.to_string().cyan());
            }
            Ok(())
        }
    }
}

fn cmd_digest(args: VoucherFileArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let voucher: Voucher = read_json(&args.voucher)?;
    let hasher = VoucherHasher::new(&resolve_domain(&args.domain)?);
    let struct_hash = VoucherHasher::struct_hash(&voucher);
    let digest = hasher.digest(&voucher);

    match format {
        OutputFormat::Json => print_json(&json!({
            "domainSeparator": hasher.domain(),
            "structHash": struct_hash,
            "digest": digest,
        })),
        OutputFormat::Text => {
            println!("Voucher: {} {} to {}", voucher.amount, voucher.reward_kind, voucher.recipient);
            println!("  Deadline:    {}", voucher.deadline);
            println!("  Domain:      {}", hasher.domain().to_string().dimmed());
            println!("  Struct hash: {}", struct_hash.to_string().dimmed());
            println!("  Digest:      {}", digest.to_string().yellow().bold());
            Ok(())
        }
    }
}

fn cmd_domain(args: DomainArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let domain = resolve_domain(&args)?;
    match format {
        OutputFormat::Json => print_json(&domain),
        OutputFormat::Text => {
            println!("{} v{}", domain.name().bold(), domain.version());
            println!("  Chain:     {}", domain.chain_id());
            println!("  Contract:  {}", domain.verifying_contract().to_string().cyan());
            println!("  Type hash: {}", DomainSeparator::type_hash().to_string().dimmed());
            println!("  Separator: {}", domain.hash().to_string().yellow().bold());
            Ok(())
        }
    }
}

fn cmd_simulate(args: SimulateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let script = simulate::parse(&text)?;
    let report = simulate::run(&script)?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            for step in &report.steps {
                if step.ok {
                    println!("{} {} {}", "✓".green(), step.op.bold(), step.detail);
                } else {
                    let reason = step.reason.unwrap_or("failed");
                    println!("{} {} {}", "✗".red(), step.op.bold(), reason.red());
                }
            }
            println!("\nEvents:");
            for record in &report.events {
                println!("  {} {}", format!("#{}", record.seq).yellow(), record.event);
            }
            println!("\nIssuer:       {}", report.issuer.to_string().cyan());
            println!("Reward token: {}", report.reward_token.to_string().cyan());
            println!(
                "Token custody {} / owed {}",
                report.custody_token_total.to_string().bold(),
                report.token_liabilities
            );
            println!(
                "Currency held {} / owed {}",
                report.held_currency.to_string().bold(),
                report.currency_liabilities
            );
            Ok(())
        }
    }
}

fn resolve_domain(args: &DomainArgs) -> anyhow::Result<DomainSeparator> {
    if let Some(path) = &args.config {
        let config = AirdropConfig::from_path(path)?;
        return Ok(config.domain_separator());
    }
    Ok(DomainSeparator::airdrop(
        args.chain_id,
        parse_address(&args.contract)?,
    ))
}

fn parse_address(s: &str) -> anyhow::Result<Address> {
    s.parse()
        .map_err(|e| anyhow::anyhow!("invalid address {s:?}: {e}"))
}

fn parse_quantity(s: &str) -> anyhow::Result<U256> {
    s.parse()
        .map_err(|e| anyhow::anyhow!("invalid quantity {s:?}: {e}"))
}

fn parse_kind(s: &str) -> anyhow::Result<RewardKind> {
    if s.eq_ignore_ascii_case("currency") {
        return Ok(RewardKind::Currency);
    }
    Ok(RewardKind::from_address(parse_address(s)?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn kind_parses_currency_and_token() {
        assert_eq!(parse_kind("currency").unwrap(), RewardKind::Currency);
        assert_eq!(
            parse_kind("0x7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a").unwrap(),
            RewardKind::Token(Address::repeat_byte(0x7a))
        );
        assert_eq!(
            parse_kind("0x0000000000000000000000000000000000000000").unwrap(),
            RewardKind::Currency
        );
        assert!(parse_kind("gold").is_err());
    }

    #[test]
    fn quantity_accepts_decimal_and_hex() {
        assert_eq!(parse_quantity("100000").unwrap(), U256::from(100_000u64));
        assert_eq!(parse_quantity("0x186a0").unwrap(), U256::from(100_000u64));
        assert!(parse_quantity("-1").is_err());
    }

    #[test]
    fn domain_from_flags_and_config_agree() {
        let contract = Address::repeat_byte(0xc0);
        let flags = DomainArgs {
            config: None,
            chain_id: 5,
            contract: contract.to_string(),
        };

        let config = AirdropConfig {
            chain_id: 5,
            contract,
            reward_token: Address::repeat_byte(0x7a),
            issuer: Address::repeat_byte(0x15),
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();
        let from_file = DomainArgs {
            config: Some(file.path().to_path_buf()),
            chain_id: 1,
            contract: String::new(),
        };

        assert_eq!(
            resolve_domain(&flags).unwrap().hash(),
            resolve_domain(&from_file).unwrap().hash()
        );
    }

    #[test]
    fn signed_voucher_file_recovers_issuer() {
        let key = IssuerKey::from_bytes([7u8; 32]).unwrap();
        let domain = DomainArgs {
            config: None,
            chain_id: 1,
            contract: Address::repeat_byte(0xc0).to_string(),
        };
        let hasher = VoucherHasher::new(&resolve_domain(&domain).unwrap());
        let voucher = Voucher::new(
            Address::repeat_byte(0xa1),
            U256::from(100_000u64),
            U256::from(1_700_003_600u64),
            RewardKind::Currency,
        );
        let signed = key.sign_voucher(&hasher, voucher).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(signed.to_json().unwrap().as_bytes()).unwrap();
        let loaded: SignedVoucher = read_json(file.path()).unwrap();
        let digest = hasher.digest(&loaded.voucher);
        assert_eq!(recover_signer(&digest, &loaded.signature), key.address());

        let bare: Voucher = read_json(file.path()).unwrap();
        assert_eq!(bare, voucher);
    }
}
