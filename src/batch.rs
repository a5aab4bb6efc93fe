//! Core batch record, stage/status enumerations and identifier derivation
use chrono::{DateTime, TimeZone, Utc};

/// 256-bit batch identifier, the SHA-256 digest of a human-readable batch
/// number. The same batch number always resolves to the same identifier, so
/// independent callers can address one batch without a shared lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId([u8; 32]);

impl BatchId {
    /// Derive the identifier from a caller-supplied batch number string.
    pub fn from_number(batch_number: &str) -> Self {
        let digest = sha256::digest(batch_number);
        let bytes = hex::decode(&digest).expect("sha256 digest is valid hex");

        let mut id = [0u8; 32];
        id.copy_from_slice(&bytes);
        Self(id)
    }
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl<C> minicbor::Encode<C> for BatchId {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.0.encode(e, ctx)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for BatchId {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let digest: [u8; 32] = d.decode()?;

        Ok(BatchId(digest))
    }
}

/// Position of a batch in the supply-chain pipeline. The ordinal only ever
/// advances over a batch's lifetime; no transition moves it backwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, minicbor::Encode, minicbor::Decode,
)]
pub enum Stage {
    #[n(0)]
    Created,
    #[n(1)]
    Manufactured,
    #[n(2)]
    WithDistributor,
    #[n(3)]
    InTransport,
    #[n(4)]
    WithWholesaler,
    #[n(5)]
    WithRetailer,
    #[n(6)]
    Sold,
}

impl Stage {
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
    /// The role currently holding custody at this stage.
    pub fn party(&self) -> &'static str {
        match self {
            Stage::Created => "Supplier",
            Stage::Manufactured => "Manufacturer",
            Stage::WithDistributor => "Distributor",
            Stage::InTransport => "Transporter",
            Stage::WithWholesaler => "Wholesaler",
            Stage::WithRetailer | Stage::Sold => "Retailer",
        }
    }
    /// The role expected to take formal receipt next. The wholesaler leg is
    /// optional, so from the distributor the next receiver is the retailer.
    pub fn next_party(&self) -> &'static str {
        match self {
            Stage::Created => "Manufacturer",
            Stage::Manufactured => "Distributor",
            Stage::WithDistributor | Stage::WithWholesaler => "Retailer",
            Stage::InTransport => "next facility",
            Stage::WithRetailer | Stage::Sold => "consumer",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Created => "Created",
            Stage::Manufactured => "Manufactured",
            Stage::WithDistributor => "WithDistributor",
            Stage::InTransport => "InTransport",
            Stage::WithWholesaler => "WithWholesaler",
            Stage::WithRetailer => "WithRetailer",
            Stage::Sold => "Sold",
        };
        f.write_str(name)
    }
}

/// Transporter-scoped overlay, orthogonal to [`Stage`]. Pending means the
/// batch is at rest awaiting its next transfer, InProgress means a transporter
/// holds it in transit, Completed means it was released at its destination
/// and awaits formal receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum Status {
    #[n(0)]
    Pending,
    #[n(1)]
    InProgress,
    #[n(2)]
    Completed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Pending => "Pending",
            Status::InProgress => "InProgress",
            Status::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// One batch record. Created exactly once, never deleted; `updates_count`
/// always equals the number of history entries for the batch.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Batch {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub holder: String,
    #[n(2)]
    pub stage: Stage,
    #[n(3)]
    pub status: Status,
    #[n(4)]
    pub location: String,
    #[n(5)]
    pub updates_count: u64,
}

/// Human-readable progress line derived purely from Stage and Status. Used
/// by observers; the ledger itself never stores or caches it.
pub fn progress_message(stage: Stage, status: Status) -> String {
    if stage == Stage::Sold {
        return "sold at retail".to_string();
    }
    match status {
        Status::Pending => format!("awaiting pickup from {}", stage.party()),
        Status::InProgress => "in transit".to_string(),
        Status::Completed => format!("delivered to {}", stage.next_party()),
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn batch_id_encoding() {
        let original = BatchId::from_number("BATCH-7");

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: BatchId = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn stage_ordering_follows_pipeline() {
        assert!(Stage::Created < Stage::Manufactured);
        assert!(Stage::Manufactured < Stage::WithDistributor);
        assert!(Stage::WithRetailer < Stage::Sold);
        assert_eq!(Stage::Sold.ordinal(), 6);
    }
}
