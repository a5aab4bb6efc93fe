//! Append-only per-batch history arena.
//!
//! Entries live in the shared sled tree under `hist:<id>:<seq>` with the
//! sequence number encoded big-endian, so a prefix scan yields entries in
//! append order. Entries are only ever inserted at the next sequence number
//! and never rewritten, removed or reordered.
use chrono::Utc;

use crate::batch::{BatchId, TimeStamp};
use crate::registry::Role;

/// One immutable, attributed record of a single committed transition.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct HistoryEntry {
    #[n(0)]
    pub updater: String,
    /// Role the updater held at call time.
    #[n(1)]
    pub role: Role,
    #[n(2)]
    pub timestamp: TimeStamp<Utc>,
    /// Caller-supplied metadata, stored and returned verbatim. Commonly a
    /// serialized key/value payload, but opaque to the ledger.
    #[n(3)]
    pub note: String,
}

impl HistoryEntry {
    pub fn new(updater: &str, role: Role, timestamp: TimeStamp<Utc>, note: &str) -> Self {
        Self {
            updater: updater.to_string(),
            role,
            timestamp,
            note: note.to_string(),
        }
    }
}

/// Key of the history entry `seq` for `id`.
pub(crate) fn entry_key(id: &BatchId, seq: u64) -> Vec<u8> {
    let mut key = entry_prefix(id);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Prefix covering every history entry of `id`, in append order.
pub(crate) fn entry_prefix(id: &BatchId) -> Vec<u8> {
    let mut key = Vec::with_capacity(5 + 32 + 1 + 8);
    key.extend_from_slice(b"hist:");
    key.extend_from_slice(id.as_bytes());
    key.push(b':');
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_encoding() {
        let original = HistoryEntry::new(
            "user_abc",
            Role::Transporter,
            TimeStamp::new(),
            r#"{"vehicleId":"TR-001"}"#,
        );

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: HistoryEntry = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn entry_keys_sort_in_append_order() {
        let id = BatchId::from_number("BATCH-9");

        let keys: Vec<Vec<u8>> = (0..300).map(|seq| entry_key(&id, seq)).collect();
        let mut sorted = keys.clone();
        sorted.sort();

        assert_eq!(keys, sorted);
    }
}
