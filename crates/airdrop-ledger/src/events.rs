use std::fmt;

use airdrop_types::{Address, RewardKind, U256};
use serde::{Deserialize, Serialize};

/// Observable effect of a committed ledger operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum AirdropEvent {
    /// The configured reward token changed.
    UpdateRewardSource { token: Address },
    /// Funds entered custody.
    Deposited {
        kind: RewardKind,
        from: Address,
        amount: U256,
    },
    /// Funds left custody back to the issuer.
    Withdrawn {
        kind: RewardKind,
        to: Address,
        amount: U256,
    },
    /// A voucher credited a recipient's ledger balance.
    Credited {
        kind: RewardKind,
        to: Address,
        amount: U256,
    },
    /// A recipient redeemed its whole balance.
    Claimed {
        kind: RewardKind,
        to: Address,
        amount: U256,
    },
    /// The issuer identity changed.
    OwnershipTransferred { previous: Address, new: Address },
}

impl AirdropEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateRewardSource { .. } => "UpdateRewardSource",
            Self::Deposited { .. } => "Deposited",
            Self::Withdrawn { .. } => "Withdrawn",
            Self::Credited { .. } => "Credited",
            Self::Claimed { .. } => "Claimed",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

impl fmt::Display for AirdropEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateRewardSource { token } => write!(f, "UpdateRewardSource({token})"),
            Self::Deposited { kind, from, amount } => {
                write!(f, "Deposited({}, {from}, {amount})", kind.label())
            }
            Self::Withdrawn { kind, to, amount } => {
                write!(f, "Withdrawn({}, {to}, {amount})", kind.label())
            }
            Self::Credited { kind, to, amount } => {
                write!(f, "Credited({}, {to}, {amount})", kind.label())
            }
            Self::Claimed { kind, to, amount } => {
                write!(f, "Claimed({}, {to}, {amount})", kind.label())
            }
            Self::OwnershipTransferred { previous, new } => {
                write!(f, "OwnershipTransferred({previous}, {new})")
            }
        }
    }
}

/// An event with its position in the log (1-based).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: AirdropEvent,
}

/// Append-only, ordered event log.
///
/// Only the ledger itself may shrink the log, and only to undo the events of
/// an operation that did not commit.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number.
    pub fn push(&mut self, event: AirdropEvent) -> u64 {
        let seq = self.records.len() as u64 + 1;
        self.records.push(EventRecord { seq, event });
        seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records strictly after `seq`.
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = (seq as usize).min(self.records.len());
        &self.records[start..]
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credited(amount: u64) -> AirdropEvent {
        AirdropEvent::Credited {
            kind: RewardKind::Currency,
            to: Address::repeat_byte(0x01),
            amount: U256::from(amount),
        }
    }

    #[test]
    fn sequence_numbers_start_at_one() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.push(credited(1)), 1);
        assert_eq!(log.push(credited(2)), 2);
        assert_eq!(log.last().unwrap().seq, 2);
    }

    #[test]
    fn since_returns_the_tail() {
        let mut log = EventLog::new();
        for amount in 1..=4 {
            log.push(credited(amount));
        }
        assert_eq!(log.since(0).len(), 4);
        assert_eq!(log.since(2)[0].seq, 3);
        assert!(log.since(4).is_empty());
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn truncate_undoes_uncommitted_events() {
        let mut log = EventLog::new();
        log.push(credited(1));
        let mark = log.len();
        log.push(credited(2));
        log.truncate(mark);
        assert_eq!(log.len(), 1);
        assert_eq!(log.push(credited(3)), 2);
    }

    #[test]
    fn json_names_the_event() {
        let mut log = EventLog::new();
        log.push(credited(7));
        let value = serde_json::to_value(&log.records()[0]).unwrap();
        assert_eq!(value["event"], "Credited");
        assert_eq!(value["seq"], 1);
    }

    #[test]
    fn display_uses_kind_label() {
        let shown = credited(5).to_string();
        assert!(shown.starts_with("Credited(currency, 0x"));
        assert!(shown.ends_with(", 5)"));
    }
}
