use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn base_yaml() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("base.yaml")
}

/// `sra config-hash` prints the hash and canonical JSON; an overlay changes
/// the hash; a literal secret aborts without echoing it.
#[test]
fn config_hash_prints_hash_and_canonical_json() -> anyhow::Result<()> {
    Command::cargo_bin("sra")?
        .arg("config-hash")
        .arg(base_yaml())
        .assert()
        .success()
        .stdout(predicate::str::is_match("^config_hash=[0-9a-f]{64}\n")?)
        .stdout(predicate::str::contains(r#""provider":"one_inch""#));
    Ok(())
}

#[test]
fn overlay_changes_hash() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let overlay = dir.path().join("bsc.yaml");
    std::fs::write(&overlay, "swap:\n  dex:\n    blockchain: binance-smart-chain\n")?;

    let base = Command::cargo_bin("sra")?
        .arg("config-hash")
        .arg(base_yaml())
        .output()?;
    let layered = Command::cargo_bin("sra")?
        .arg("config-hash")
        .arg(base_yaml())
        .arg(&overlay)
        .output()?;

    let first_line = |out: &[u8]| {
        String::from_utf8_lossy(out)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    };
    assert_ne!(first_line(&base.stdout), first_line(&layered.stdout));
    Ok(())
}

#[test]
fn literal_secret_aborts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let overlay = dir.path().join("leak.yaml");
    std::fs::write(
        &overlay,
        "wallet:\n  key: \"0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\"\n",
    )?;

    Command::cargo_bin("sra")?
        .arg("config-hash")
        .arg(base_yaml())
        .arg(&overlay)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("4c0883a6").not());
    Ok(())
}
