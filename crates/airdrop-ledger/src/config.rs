use std::path::Path;

use airdrop_crypto::{DomainSeparator, PROTOCOL_NAME, PROTOCOL_VERSION};
use airdrop_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Deployment configuration of an [`crate::Airdrop`] ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    /// Protocol name bound into the domain separator.
    pub name: String,
    /// Protocol version bound into the domain separator.
    pub version: String,
    /// Execution-context (chain) identifier.
    pub chain_id: u64,
    /// The ledger's own address; the verifying contract of the domain.
    pub contract: Address,
    /// Token paid out by token vouchers.
    pub reward_token: Address,
    /// Initial issuer identity.
    pub issuer: Address,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            name: PROTOCOL_NAME.into(),
            version: PROTOCOL_VERSION.into(),
            chain_id: 1,
            contract: Address::ZERO,
            reward_token: Address::ZERO,
            issuer: Address::ZERO,
        }
    }
}

impl AirdropConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, LedgerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Reject configurations that would collapse reward kinds or let the
    /// zero-address recovery sentinel authenticate.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.issuer.is_zero() {
            return Err(LedgerError::InvalidIssuer);
        }
        if self.reward_token.is_zero() {
            return Err(LedgerError::InvalidRewardSource);
        }
        Ok(())
    }

    /// Domain separator for this deployment.
    pub fn domain_separator(&self) -> DomainSeparator {
        DomainSeparator::new(
            self.name.clone(),
            self.version.clone(),
            self.chain_id,
            self.contract,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config() -> AirdropConfig {
        AirdropConfig {
            contract: Address::repeat_byte(0xc0),
            reward_token: Address::repeat_byte(0x7a),
            issuer: Address::repeat_byte(0x15),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_name_the_protocol() {
        let c = AirdropConfig::default();
        assert_eq!(c.name, "Airdrop");
        assert_eq!(c.version, "1");
        assert_eq!(c.chain_id, 1);
    }

    #[test]
    fn default_config_is_invalid() {
        assert_eq!(
            AirdropConfig::default().validate().unwrap_err(),
            LedgerError::InvalidIssuer
        );
        let mut c = config();
        c.reward_token = Address::ZERO;
        assert_eq!(c.validate().unwrap_err(), LedgerError::InvalidRewardSource);
        assert!(config().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = format!(
            "chain_id = 5\nissuer = \"{}\"\nreward_token = \"{}\"\n",
            Address::repeat_byte(0x15),
            Address::repeat_byte(0x7a)
        );
        let c = AirdropConfig::from_toml_str(&text).unwrap();
        assert_eq!(c.chain_id, 5);
        assert_eq!(c.name, "Airdrop");
        assert_eq!(c.issuer, Address::repeat_byte(0x15));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = AirdropConfig::from_toml_str("chain_id = \"five\"").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config().to_toml_string().unwrap().as_bytes())
            .unwrap();
        let loaded = AirdropConfig::from_path(file.path()).unwrap();
        assert_eq!(loaded, config());
    }

    #[test]
    fn domain_separator_follows_config() {
        let a = config().domain_separator();
        let mut other = config();
        other.chain_id = 10;
        assert_ne!(a.hash(), other.domain_separator().hash());
        assert_eq!(a, DomainSeparator::airdrop(1, Address::repeat_byte(0xc0)));
    }
}
