//! `mtc issue` then `mtc certify` then `mtc verify` round-trips
//! through the on-disk publication layout; corrupting one byte of the
//! written `.mtc` file makes `mtc verify` exit non-zero.

use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

const ISSUER_ID_HEX: &str = "746573742e6973737565722e31";

fn batch_json() -> &'static str {
    r#"{
        "assertions": [
            {"subject_type": "tls", "subject_info": "", "claims": [{"type": "dns", "values": ["a.example.com"]}]},
            {"subject_type": "tls", "subject_info": "", "claims": [{"type": "dns", "values": ["b.example.com"]}]},
            {"subject_type": "tls", "subject_info": "", "claims": [{"type": "dns", "values": ["c.example.com"]}]},
            {"subject_type": "tls", "subject_info": "", "claims": [{"type": "dns", "values": ["d.example.com"]}]},
            {"subject_type": "tls", "subject_info": "", "claims": [{"type": "dns", "values": ["e.example.com"]}]}
        ]
    }"#
}

#[test]
fn full_round_trip_then_corruption_fails() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    Command::cargo_bin("mtc")
        .unwrap()
        .args(["keygen", "--out-dir"])
        .arg(root)
        .assert()
        .success();

    let config_path = root.join("issuer.toml");
    fs::write(
        &config_path,
        format!(
            r#"
            issuer_id = "{ISSUER_ID_HEX}"
            window_size = 14
            batches_root = "{batches}"
            private_key_path = "{key}"
            public_key_path = "{pubkey}"
            "#,
            batches = root.join("batches").display(),
            key = root.join("issuer.key").display(),
            pubkey = root.join("issuer.pub").display(),
        ),
    )
    .unwrap();

    let batch_path = root.join("batch.json");
    fs::write(&batch_path, batch_json()).unwrap();

    Command::cargo_bin("mtc")
        .unwrap()
        .args(["issue", "--batch"])
        .arg(&batch_path)
        .args(["--issuer-id", ISSUER_ID_HEX, "--config"])
        .arg(&config_path)
        .assert()
        .success();

    let cert_path = root.join("cert.mtc");
    Command::cargo_bin("mtc")
        .unwrap()
        .args(["certify", "--batch-number", "0", "--index", "2", "--root"])
        .arg(root.join("batches"))
        .args(["--issuer-id", ISSUER_ID_HEX, "--out"])
        .arg(&cert_path)
        .assert()
        .success();

    let window_path = root.join("batches").join("0").join("signed-validity-window");

    Command::cargo_bin("mtc")
        .unwrap()
        .args(["verify", "--cert"])
        .arg(&cert_path)
        .arg("--window")
        .arg(&window_path)
        .args(["--issuer-id", ISSUER_ID_HEX, "--pubkey"])
        .arg(root.join("issuer.pub"))
        .assert()
        .success();

    // Corrupt one byte of the certificate file.
    let mut bytes = fs::read(&cert_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&cert_path, bytes).unwrap();

    Command::cargo_bin("mtc")
        .unwrap()
        .args(["verify", "--cert"])
        .arg(&cert_path)
        .arg("--window")
        .arg(&window_path)
        .args(["--issuer-id", ISSUER_ID_HEX, "--pubkey"])
        .arg(root.join("issuer.pub"))
        .assert()
        .failure();
}
