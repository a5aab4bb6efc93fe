//! Identity helpers.
//!
//! Caller identities are opaque strings to the ledger; the surrounding system
//! authenticates them. These helpers mint fresh bech32m-encoded uuid7
//! identities for deployments and tests that need them.

use bech32::Bech32m;
use uuid7::uuid7;

/// Construct a unique identity then encode it using bech32m with the given
/// human-readable prefix.
pub fn new_identity(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
