//! xxHash-based submission ids
//!
//! A submission is identified by the hash of its form data, so sending the
//! same answers twice lands on the same record instead of creating a
//! duplicate.

use crate::wizard::FormData;
use std::collections::BTreeMap;
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the content hash of form data
///
/// Top-level keys are sorted before hashing so insertion order never
/// changes the id.
pub fn compute_data_hash(data: &FormData) -> serde_json::Result<u64> {
    let sorted: BTreeMap<&String, &serde_json::Value> = data.iter().collect();
    let bytes = serde_json::to_vec(&sorted)?;
    let hash = xxh3_64(&bytes);
    trace!(fields = data.len(), hash, "Computed form data hash");
    Ok(hash)
}

/// Submission id: fixed-width lowercase hex of the content hash
pub fn submission_id(data: &FormData) -> serde_json::Result<String> {
    Ok(format!("{:016x}", compute_data_hash(data)?))
}
