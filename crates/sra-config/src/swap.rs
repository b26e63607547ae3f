use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use sra_domain::{BlockchainType, Dex, DexProvider, RevokePolicy};

pub const DEFAULT_PRICE_EXPIRY_SECS: i64 = 600;
pub const DEFAULT_LOG_FILTER: &str = "info";
/// One year. Prices older than that are never useful.
pub const MAX_PRICE_EXPIRY_SECS: i64 = 365 * 24 * 60 * 60;

/// Typed view over the canonical config JSON.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapConfig {
    pub dex: Dex,
    pub revoke_policy: RevokePolicy,
    pub base_currency: String,
    pub price_expiry_secs: i64,
    pub log_filter: String,
}

impl SwapConfig {
    /// Build from canonical config JSON (produced by `load_layered_yaml*`).
    ///
    /// Required:
    /// - swap.dex.provider
    /// - swap.dex.blockchain
    ///
    /// Optional:
    /// - swap.revoke_required_codes (list of coin codes); default [USDT]
    /// - fiat.base_currency; default USD
    /// - fiat.price_expiry_secs (1..=MAX_PRICE_EXPIRY_SECS); default 600
    /// - runtime.log_filter; default info
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let provider_raw = cfg
            .pointer("/swap/dex/provider")
            .and_then(Value::as_str)
            .context("config missing swap.dex.provider")?;
        let provider = DexProvider::parse(provider_raw)
            .ok_or_else(|| anyhow!("unknown swap.dex.provider '{provider_raw}'"))?;

        let chain_raw = cfg
            .pointer("/swap/dex/blockchain")
            .and_then(Value::as_str)
            .context("config missing swap.dex.blockchain")?;
        let blockchain = BlockchainType::from_uid(chain_raw)
            .ok_or_else(|| anyhow!("unknown swap.dex.blockchain '{chain_raw}'"))?;

        let revoke_policy = match cfg.pointer("/swap/revoke_required_codes") {
            None | Some(Value::Null) => RevokePolicy::default(),
            Some(Value::Array(items)) => {
                let codes = items
                    .iter()
                    .map(|v| {
                        v.as_str().ok_or_else(|| {
                            anyhow!("swap.revoke_required_codes must contain strings only")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                RevokePolicy::from_codes(codes)
            }
            Some(other) => {
                return Err(anyhow!(
                    "swap.revoke_required_codes must be a list (got {other})"
                ))
            }
        };

        let base_currency = cfg
            .pointer("/fiat/base_currency")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_ascii_uppercase())
            .unwrap_or_else(|| "USD".to_string());

        let price_expiry_secs = match cfg.pointer("/fiat/price_expiry_secs") {
            None | Some(Value::Null) => DEFAULT_PRICE_EXPIRY_SECS,
            Some(v) => v
                .as_i64()
                .filter(|n| (1..=MAX_PRICE_EXPIRY_SECS).contains(n))
                .ok_or_else(|| {
                    anyhow!(
                        "fiat.price_expiry_secs must be an integer in 1..={MAX_PRICE_EXPIRY_SECS} (got {v})"
                    )
                })?,
        };

        let log_filter = cfg
            .pointer("/runtime/log_filter")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOG_FILTER)
            .to_string();

        Ok(Self {
            dex: Dex::new(provider, blockchain),
            revoke_policy,
            base_currency,
            price_expiry_secs,
            log_filter,
        })
    }
}
