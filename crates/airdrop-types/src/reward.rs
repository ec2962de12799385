use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// What a voucher pays out in.
///
/// On the wire and inside the signed digest the kind is a single address:
/// the zero address stands for native currency, any other address names the
/// token contract. Inside the ledger the two cases are always kept apart by
/// this enum, so the zero-address sentinel never leaks past the boundary.
///
/// Equality, ordering and hashing go through the wire address, so a
/// hand-built `Token(Address::ZERO)` is indistinguishable from `Currency`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "Address", into = "Address")]
pub enum RewardKind {
    /// Native currency of the execution environment.
    Currency,
    /// A fungible token identified by its contract address.
    Token(Address),
}

impl RewardKind {
    /// Build a token kind. The zero address collapses to [`RewardKind::Currency`].
    pub fn token(address: Address) -> Self {
        Self::from_address(address)
    }

    /// Decode the wire representation.
    pub fn from_address(address: Address) -> Self {
        if address.is_zero() {
            Self::Currency
        } else {
            Self::Token(address)
        }
    }

    /// Encode to the wire representation.
    pub fn to_address(self) -> Address {
        match self {
            Self::Currency => Address::ZERO,
            Self::Token(address) => address,
        }
    }

    /// The token contract, if this is a token kind.
    pub fn token_address(&self) -> Option<Address> {
        match self {
            Self::Currency => None,
            Self::Token(address) => Some(*address).filter(|a| !a.is_zero()),
        }
    }

    pub fn is_currency(&self) -> bool {
        self.token_address().is_none()
    }

    /// Short label used in events and log fields.
    pub fn label(&self) -> &'static str {
        if self.is_currency() {
            "currency"
        } else {
            "token"
        }
    }
}

impl PartialEq for RewardKind {
    fn eq(&self, other: &Self) -> bool {
        self.to_address() == other.to_address()
    }
}

impl Eq for RewardKind {}

impl Hash for RewardKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_address().hash(state);
    }
}

impl PartialOrd for RewardKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RewardKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_address().cmp(&other.to_address())
    }
}

impl From<Address> for RewardKind {
    fn from(address: Address) -> Self {
        Self::from_address(address)
    }
}

impl From<RewardKind> for Address {
    fn from(kind: RewardKind) -> Self {
        kind.to_address()
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_address() {
            None => write!(f, "currency"),
            Some(address) => write!(f, "token({address})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_currency() {
        assert_eq!(RewardKind::from_address(Address::ZERO), RewardKind::Currency);
        assert_eq!(RewardKind::token(Address::ZERO), RewardKind::Currency);
        assert!(RewardKind::Currency.is_currency());
    }

    #[test]
    fn nonzero_address_is_token() {
        let token = Address::repeat_byte(0x42);
        let kind = RewardKind::from_address(token);
        assert_eq!(kind, RewardKind::Token(token));
        assert_eq!(kind.token_address(), Some(token));
        assert_eq!(kind.to_address(), token);
        assert_eq!(kind.label(), "token");
    }

    #[test]
    fn handmade_zero_token_behaves_like_currency() {
        let kind = RewardKind::Token(Address::ZERO);
        assert!(kind.is_currency());
        assert_eq!(kind.to_address(), Address::ZERO);
        assert_eq!(kind.label(), "currency");
    }

    #[test]
    fn zero_token_equals_currency_everywhere() {
        use std::collections::{BTreeSet, HashSet};

        let handmade = RewardKind::Token(Address::ZERO);
        assert_eq!(handmade, RewardKind::Currency);
        assert_eq!(handmade.cmp(&RewardKind::Currency), Ordering::Equal);

        let hashed: HashSet<_> = [handmade, RewardKind::Currency].into_iter().collect();
        assert_eq!(hashed.len(), 1);
        let ordered: BTreeSet<_> = [handmade, RewardKind::Currency].into_iter().collect();
        assert_eq!(ordered.len(), 1);

        let token = RewardKind::Token(Address::repeat_byte(0x42));
        assert_ne!(token, RewardKind::Currency);
        assert!(RewardKind::Currency < token);
    }

    #[test]
    fn serializes_as_plain_address() {
        let token = Address::repeat_byte(0x11);
        let json = serde_json::to_string(&RewardKind::Token(token)).unwrap();
        assert_eq!(json, serde_json::to_string(&token).unwrap());

        let currency: RewardKind =
            serde_json::from_str(&serde_json::to_string(&Address::ZERO).unwrap()).unwrap();
        assert_eq!(currency, RewardKind::Currency);
    }

    #[test]
    fn display_names_the_token() {
        assert_eq!(RewardKind::Currency.to_string(), "currency");
        let shown = RewardKind::Token(Address::repeat_byte(0xab)).to_string();
        assert!(shown.starts_with("token(0x"));
    }
}
