//! `mtc certify` — extract one inclusion certificate from a
//! previously-issued batch.

use std::path::PathBuf;

use clap::Args;
use mtc_core::codec::Codec;
use mtc_core::proof::create_bikeshed_certificate;
use mtc_core::tree::MerkleTree;

use crate::{output, publication};

/// Arguments for the certify command.
#[derive(Args)]
pub struct CertifyArgs {
    /// Batch number the assertion was issued under.
    #[arg(long)]
    pub batch_number: u32,
    /// Leaf index of the assertion within the batch.
    #[arg(long)]
    pub index: usize,
    /// Publication root the batch was issued under.
    #[arg(long)]
    pub root: PathBuf,
    /// Hex-encoded issuer id the batch was issued under.
    #[arg(long)]
    pub issuer_id: String,
    /// Path to write the `.mtc` certificate file to.
    #[arg(long)]
    pub out: PathBuf,
}

/// Run the certify command.
pub fn run(args: CertifyArgs) -> i32 {
    match run_inner(args) {
        Ok(()) => {
            output::success("Wrote certificate");
            0
        }
        Err(e) => {
            output::error(&format!("Certification failed: {e}"));
            1
        }
    }
}

fn run_inner(args: CertifyArgs) -> anyhow::Result<()> {
    let issuer_id = hex::decode(args.issuer_id.trim_start_matches("0x"))?;
    let assertions = publication::read_assertions(&args.root, args.batch_number)?;
    if args.index >= assertions.len() {
        anyhow::bail!(
            "index {} out of range for batch {} with {} assertions",
            args.index,
            args.batch_number,
            assertions.len()
        );
    }

    let tree = MerkleTree::build(&issuer_id, args.batch_number, &assertions.0);
    let assertion = assertions.0[args.index].clone();
    let cert = create_bikeshed_certificate(&tree, args.index, assertion);

    std::fs::write(&args.out, cert.to_bytes())?;
    Ok(())
}
