//! Typed swap config
//!
//! GREEN when:
//! - Required dex fields are enforced.
//! - Optional fields take their defaults.
//! - Out-of-range expiry windows are rejected at load time.
//! - Revoke codes from config drive the revoke policy.

use sra_config::{
    load_layered_yaml_from_strings, SwapConfig, DEFAULT_PRICE_EXPIRY_SECS, MAX_PRICE_EXPIRY_SECS,
};
use sra_domain::{BlockchainType, DexProvider, RevokePolicy, Token, TokenType};

fn knc() -> Token {
    Token::new(
        BlockchainType::Polygon,
        TokenType::Eip20 {
            address: "0x1c954e8fe737f99f68fa1ccda3e51ebdb291948c".to_string(),
        },
        "KNC",
        18,
    )
}

#[test]
fn minimal_config_uses_defaults() {
    let yaml = r#"
swap:
  dex:
    provider: "1inch"
    blockchain: "ethereum"
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let cfg = SwapConfig::from_config_json(&loaded.config_json).unwrap();

    assert_eq!(cfg.dex.provider, DexProvider::OneInch);
    assert_eq!(cfg.dex.blockchain, BlockchainType::Ethereum);
    assert_eq!(cfg.revoke_policy, RevokePolicy::default());
    assert_eq!(cfg.base_currency, "USD");
    assert_eq!(cfg.price_expiry_secs, DEFAULT_PRICE_EXPIRY_SECS);
    assert_eq!(cfg.log_filter, "info");
}

#[test]
fn revoke_codes_from_config_replace_default() {
    let yaml = r#"
swap:
  dex:
    provider: "quickswap"
    blockchain: "polygon-pos"
  revoke_required_codes: ["knc"]
fiat:
  base_currency: "eur"
  price_expiry_secs: 120
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let cfg = SwapConfig::from_config_json(&loaded.config_json).unwrap();

    assert!(cfg.revoke_policy.must_be_revoked(Some(&knc())));
    assert_eq!(cfg.revoke_policy.codes().collect::<Vec<_>>(), vec!["KNC"]);
    assert_eq!(cfg.base_currency, "EUR");
    assert_eq!(cfg.price_expiry_secs, 120);
}

#[test]
fn missing_dex_is_an_error() {
    let loaded = load_layered_yaml_from_strings(&["fiat: {base_currency: USD}"]).unwrap();
    let err = SwapConfig::from_config_json(&loaded.config_json).unwrap_err();
    assert!(err.to_string().contains("swap.dex.provider"));
}

#[test]
fn unknown_blockchain_and_bad_expiry_are_errors() {
    let bad_chain = r#"
swap:
  dex:
    provider: "uniswap"
    blockchain: "dogechain"
"#;
    let loaded = load_layered_yaml_from_strings(&[bad_chain]).unwrap();
    assert!(SwapConfig::from_config_json(&loaded.config_json).is_err());

    let bad_expiry = r#"
swap:
  dex:
    provider: "uniswap"
    blockchain: "ethereum"
fiat:
  price_expiry_secs: 0
"#;
    let loaded = load_layered_yaml_from_strings(&[bad_expiry]).unwrap();
    let err = SwapConfig::from_config_json(&loaded.config_json).unwrap_err();
    assert!(err.to_string().contains("price_expiry_secs"));
}

#[test]
fn expiry_beyond_one_year_is_rejected() {
    let doc = |secs: i64| {
        format!(
            "swap:\n  dex:\n    provider: uniswap\n    blockchain: ethereum\nfiat:\n  price_expiry_secs: {secs}\n"
        )
    };

    for secs in [i64::MAX, MAX_PRICE_EXPIRY_SECS + 1] {
        let raw = doc(secs);
        let loaded = load_layered_yaml_from_strings(&[raw.as_str()]).unwrap();
        let err = SwapConfig::from_config_json(&loaded.config_json).unwrap_err();
        assert!(
            err.to_string().contains("fiat.price_expiry_secs"),
            "secs={secs}: {err}"
        );
    }

    let raw = doc(MAX_PRICE_EXPIRY_SECS);
    let loaded = load_layered_yaml_from_strings(&[raw.as_str()]).unwrap();
    let cfg = SwapConfig::from_config_json(&loaded.config_json).unwrap();
    assert_eq!(cfg.price_expiry_secs, MAX_PRICE_EXPIRY_SECS);
}
