//! Append-only registry event log.

use ikf_types::{Address, ContentHash, TokenAmount};
use serde::{Deserialize, Serialize};

/// Notification emitted by a successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    FileUploaded {
        filename: String,
        owner: Address,
        category: String,
    },
    FileUpdated {
        filename: String,
        content_hash: ContentHash,
        size: u64,
    },
    FileApproved {
        filename: String,
        #[serde(with = "decimal_amount")]
        reward: TokenAmount,
    },
    FileRejected {
        filename: String,
        reason: String,
    },
    AdminChanged {
        previous: Address,
        new_admin: Address,
    },
}

/// Token amounts as decimal strings. Tagged enums buffer their fields and
/// the buffer has no room for `u128`.
mod decimal_amount {
    use ikf_types::TokenAmount;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TokenAmount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = TokenAmount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a token amount as a decimal string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<TokenAmount, E> {
            value.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<TokenAmount, E> {
            Ok(value.into())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0
    pub seq: u64,
    pub timestamp: u64,
    pub event: RegistryEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(records: Vec<EventRecord>) -> Option<Self> {
        let ordered = records
            .iter()
            .enumerate()
            .all(|(i, record)| record.seq == i as u64);
        ordered.then_some(Self { records })
    }

    pub fn append(&mut self, event: RegistryEvent, timestamp: u64) -> u64 {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord {
            seq,
            timestamp,
            event,
        });
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

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(name: &str) -> RegistryEvent {
        RegistryEvent::FileRejected {
            filename: name.into(),
            reason: "bad format".into(),
        }
    }

    #[test]
    fn sequence_numbers_are_dense() {
        let mut log = EventLog::new();
        assert_eq!(log.append(rejected("a"), 1), 0);
        assert_eq!(log.append(rejected("b"), 2), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.since(1)[0].event, rejected("b"));
        assert!(log.since(5).is_empty());
    }

    #[test]
    fn from_records_rejects_gaps() {
        let mut log = EventLog::new();
        log.append(rejected("a"), 1);
        log.append(rejected("b"), 1);
        let mut records = log.records().to_vec();
        assert!(EventLog::from_records(records.clone()).is_some());
        records.remove(0);
        assert!(EventLog::from_records(records).is_none());
    }

    #[test]
    fn approval_rewards_survive_json() {
        let event = RegistryEvent::FileApproved {
            filename: "a.txt".into(),
            reward: u128::from(u64::MAX) * 1_000,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""reward":"18446744073709551615000""#));
        let back: RegistryEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);

        let plain: RegistryEvent =
            serde_json::from_str(r#"{"type":"FileApproved","filename":"a.txt","reward":10}"#)
                .unwrap();
        assert_eq!(
            plain,
            RegistryEvent::FileApproved {
                filename: "a.txt".into(),
                reward: 10,
            }
        );
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(rejected("a.txt")).unwrap();
        assert_eq!(json["type"], "FileRejected");
        assert_eq!(json["reason"], "bad format");
    }
}
