//! Hashing - SHA-256 fingerprints for plans and jobs
//!
//! Identical plans always hash identically, independent of field order.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::plan::CompositePlan;

pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    to_string(&sort_value(v))
}

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_value(v))).collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_value).collect()),
        other => other,
    }
}

pub fn compute_plan_hash(plan: &CompositePlan) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(plan)?.as_bytes()))
}

/// job_hash = sha256(canonical_images + ":" + plan_hash + ":" + engine_version)
pub fn compute_job_hash(
    images: &[PathBuf],
    plan_hash: &str,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!("{}:{}:{}", canonical_json(&images)?, plan_hash, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}
