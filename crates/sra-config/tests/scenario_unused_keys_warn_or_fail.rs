use sra_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

/// scenario_unused_keys_warn_or_fail
///
/// Validates:
/// 1) Unused keys are detected in WARN mode but do not error.
/// 2) Unused keys cause failure in FAIL mode.
/// 3) Keys under consumed prefixes are not flagged.

const CONSUMED_ONLY: &str = r#"
swap:
  dex:
    provider: "uniswap_v3"
    blockchain: "polygon-pos"
  revoke_required_codes: ["USDT", "KNC"]
fiat:
  price_expiry_secs: 300
runtime:
  log_filter: "sra_engine=debug,info"
"#;

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let yaml = r#"
swap:
  dex:
    provider: "one_inch"
    blockchain: "ethereum"
analytics:
  enabled: true
  sample_rate: 5
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert!(!report.is_clean());
    assert_eq!(
        report.unused_leaf_pointers,
        vec![
            "/analytics/enabled".to_string(),
            "/analytics/sample_rate".to_string()
        ]
    );
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = r#"
swap:
  dex:
    provider: "one_inch"
    blockchain: "ethereum"
  slippage_default: 50
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();

    let result = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail);
    assert!(result.is_err());
    let msg = format!("{:?}", result.err().unwrap());
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/swap/slippage_default"));
}

#[test]
fn consumed_prefix_covers_nested_keys_and_array_items() {
    let loaded = load_layered_yaml_from_strings(&[CONSUMED_ONLY]).unwrap();

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail)
        .expect("fully consumed config must pass in FAIL mode");
    assert!(report.is_clean());
    assert!(report
        .consumed_prefixes
        .contains(&"/swap/revoke_required_codes".to_string()));
}
