//! `mtc verify` — verify a `.mtc` certificate against a signed
//! validity window and issuer public key.

use std::path::PathBuf;

use clap::Args;
use mtc_core::codec::Codec;
use mtc_core::proof::{verify_certificate, BikeshedCertificate};
use mtc_core::window::SignedValidityWindow;
use serde::Serialize;

use crate::{keys, output};

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Path to the `.mtc` certificate file.
    #[arg(long)]
    pub cert: PathBuf,
    /// Path to the `serialize(SignedValidityWindow)` file.
    #[arg(long)]
    pub window: PathBuf,
    /// Hex-encoded issuer id the certificate is expected to name.
    #[arg(long)]
    pub issuer_id: String,
    /// Path to the issuer's PEM-framed public key.
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Emit a JSON result instead of human-readable output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonOutput {
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the verify command.
pub fn run(args: VerifyArgs) -> i32 {
    match run_inner(&args) {
        Ok(()) => {
            if args.json {
                let out = JsonOutput {
                    verified: true,
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&out).unwrap());
            } else {
                output::success("Certificate verified");
            }
            0
        }
        Err(e) => {
            if args.json {
                let out = JsonOutput {
                    verified: false,
                    error: Some(e.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&out).unwrap());
            } else {
                output::error(&format!("Verification failed: {e}"));
            }
            1
        }
    }
}

fn run_inner(args: &VerifyArgs) -> anyhow::Result<()> {
    let issuer_id = hex::decode(args.issuer_id.trim_start_matches("0x"))?;
    let cert_bytes = std::fs::read(&args.cert)?;
    let (cert, _) = BikeshedCertificate::parse(&cert_bytes)?;

    let window_bytes = std::fs::read(&args.window)?;
    let (signed_window, _) = SignedValidityWindow::parse(&window_bytes)?;

    let verifying_key = keys::read_public_key(&args.pubkey)?;

    match verify_certificate(&cert, &signed_window, &verifying_key, &issuer_id) {
        Ok(()) => {
            tracing::info!(cert = %args.cert.display(), "certificate verified");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(cert = %args.cert.display(), error = %e, "certificate verification failed");
            Err(e.into())
        }
    }
}
