//! sra-config
//!
//! Layered YAML configuration for swap sessions.
//!
//! - Docs merge in order: earlier docs are base, later docs override.
//! - The merged document is canonicalized and hashed (SHA-256, hex).
//! - Secret-looking literals (private keys, seed phrases, API tokens) abort
//!   the load with `CONFIG_SECRET_DETECTED`. Config stores env var names only.
//! - `report_unused_keys` flags leaves no consumer reads.

mod swap;

pub use swap::{
    SwapConfig, DEFAULT_LOG_FILTER, DEFAULT_PRICE_EXPIRY_SECS, MAX_PRICE_EXPIRY_SECS,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

/// Secret-like prefixes. Any leaf string starting with one aborts the load.
const SECRET_PREFIXES: &[&str] = &[
    "xprv",       // BIP32 extended private key
    "tprv",       // BIP32 testnet extended private key
    "yprv",       // BIP49
    "zprv",       // BIP84
    "-----BEGIN", // PEM private keys
    "sk-",        // OpenAI style
    "sk_live",    // Stripe live
    "AKIA",       // AWS access key ID
    "ghp_",       // GitHub PAT
    "xoxb-",      // Slack bot token
];

/// Seed phrase lengths accepted by BIP39.
const MNEMONIC_WORD_COUNTS: &[usize] = &[12, 15, 18, 21, 24];

/// JSON-pointer prefixes read by code today. Only list what is actually read.
const CONSUMED_POINTERS: &[&str] = &[
    // SwapConfig::from_config_json
    "/swap/dex/provider",
    "/swap/dex/blockchain",
    "/swap/revoke_required_codes",
    "/fiat/base_currency",
    "/fiat/price_expiry_secs",
    "/runtime/log_filter",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

pub fn consumed_pointers() -> &'static [&'static str] {
    CONSUMED_POINTERS
}

/// Produce an unused-key report.
/// `Fail` errors when unused keys exist; `Warn` always returns the report.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED_POINTERS
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    // serde_json::Map is BTreeMap-backed: key order is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
        || looks_like_raw_private_key(t)
        || looks_like_mnemonic(t)
}

/// 32 bytes of hex, with or without `0x`. Addresses (20 bytes) pass.
fn looks_like_raw_private_key(t: &str) -> bool {
    let body = t.strip_prefix("0x").unwrap_or(t);
    body.len() == 64 && body.chars().all(|c| c.is_ascii_hexdigit())
}

fn looks_like_mnemonic(t: &str) -> bool {
    let words: Vec<&str> = t.split_whitespace().collect();
    MNEMONIC_WORD_COUNTS.contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_pointer_respects_segment_boundary() {
        assert!(is_prefix_pointer("/swap/dex", "/swap/dex/provider"));
        assert!(is_prefix_pointer("/swap/dex", "/swap/dex"));
        assert!(!is_prefix_pointer("/swap/dex", "/swap/dexes"));
        assert!(is_prefix_pointer("/", "/anything"));
    }

    #[test]
    fn addresses_are_not_private_keys() {
        assert!(!looks_like_secret("0xdac17f958d2ee523a2206206994597c13d831ec7"));
        assert!(looks_like_secret(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
        ));
    }

    #[test]
    fn seed_phrase_is_detected() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(looks_like_secret(phrase));
        assert!(!looks_like_secret("uniswap curve balancer"));
    }
}
