//! Canonical request signing.
//!
//! The signature is computed over the sorted parameter set: every signable
//! parameter is rendered as `key=value`, pairs are joined with `&`, the
//! shared API secret is appended, and the result is hashed and hex-encoded.
//! Parameters with empty values and transport-level parameters (`file`,
//! `api_key`, `signature`, ...) never enter the signed string, so two option
//! sets that normalize to the same wire map always sign identically.

use crate::config::SignatureAlgorithm;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Parameters that authenticate or address the request rather than describe
/// it. They are excluded from the signed string.
const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "signature", "cloud_name", "resource_type"];

/// Compute the signature for a normalized parameter map.
pub fn sign_parameters(
    params: &BTreeMap<String, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let mut to_sign = params
        .iter()
        .filter(|(key, value)| !value.is_empty() && !UNSIGNED_PARAMS.contains(&key.as_str()))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    to_sign.push_str(api_secret);
    digest(&to_sign, algorithm)
}

/// Verify the signature the service attaches to upload responses, computed
/// over the resource's `public_id` and `version`.
pub fn verify_response_signature(
    public_id: &str,
    version: u64,
    signature: &str,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> bool {
    let mut params = BTreeMap::new();
    params.insert("public_id".to_string(), public_id.to_string());
    params.insert("version".to_string(), version.to_string());
    sign_parameters(&params, api_secret, algorithm) == signature
}

fn digest(input: &str, algorithm: SignatureAlgorithm) -> String {
    match algorithm {
        SignatureAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(input.as_bytes());
            hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
        }
    }
}
