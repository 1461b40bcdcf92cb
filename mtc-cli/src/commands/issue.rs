//! `mtc issue` — ingest a JSON batch, build its tree, rotate the
//! validity window, sign, and publish.

use std::path::PathBuf;

use clap::Args;
use mtc_core::assertion::Assertions;
use mtc_core::codec::{set_validation_enabled, ValidationMode};
use mtc_core::tree::MerkleTree;
use mtc_core::window::{SignedValidityWindow, ValidityWindow};

use crate::{config::IssuerConfig, ingest, keys, output, publication};

/// Arguments for the issue command.
#[derive(Args)]
pub struct IssueArgs {
    /// Path to the JSON batch document.
    #[arg(long)]
    pub batch: PathBuf,
    /// Hex-encoded issuer id for this run (must match the config's
    /// `issuer_id` once decoded).
    #[arg(long)]
    pub issuer_id: String,
    /// Path to the issuer's TOML config.
    #[arg(long)]
    pub config: PathBuf,
}

/// Run the issue command.
pub fn run(args: IssueArgs) -> i32 {
    match run_inner(args) {
        Ok(batch_number) => {
            output::success(&format!("Issued batch {batch_number}"));
            0
        }
        Err(e) => {
            output::error(&format!("Issuance failed: {e}"));
            1
        }
    }
}

fn run_inner(args: IssueArgs) -> anyhow::Result<u32> {
    let config = IssuerConfig::load(&args.config)?;
    let issuer_id = hex::decode(args.issuer_id.trim_start_matches("0x"))?;
    if issuer_id != config.issuer_id_bytes()? {
        anyhow::bail!("--issuer-id does not match the config's issuer_id");
    }

    if config.no_validation {
        set_validation_enabled(false);
    }

    let batch_text = std::fs::read_to_string(&args.batch)?;
    let raw_batch = ingest::parse_batch(&batch_text)?;
    let assertion_list = ingest::translate_batch(raw_batch)?;
    let mode = if config.no_validation {
        ValidationMode::Disabled
    } else {
        ValidationMode::Enabled
    };
    let assertions = Assertions::new(assertion_list, mode)?;

    let previous_batch = publication::read_latest(&config.batches_root)?;
    let (batch_number, previous_window) = match previous_batch {
        Some(b) => (b + 1, Some(publication::read_signed_window(&config.batches_root, b)?.window)),
        None => (0, None),
    };

    let tree = MerkleTree::build_validated(&issuer_id, batch_number, &assertions, mode)?;
    tracing::info!(batch_number, assertions = assertions.len(), root = %hex::encode(tree.root()), "built batch tree");

    let window = ValidityWindow::rotate(previous_window.as_ref(), batch_number, tree.root(), config.window_size)?;

    let signing_key = keys::read_private_key(&config.private_key_path)?;
    let signed_window = SignedValidityWindow::sign(issuer_id, window, &signing_key);

    publication::write_batch(&config.batches_root, batch_number, &signed_window, &assertions)?;
    tracing::info!(batch_number, "published batch");

    Ok(batch_number)
}
