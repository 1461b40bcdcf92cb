//! `mtc keygen` — generate an Ed25519 issuer keypair.

use std::path::PathBuf;

use clap::Args;

use crate::{keys, output};

/// Arguments for the keygen command.
#[derive(Args)]
pub struct KeygenArgs {
    /// Directory to write `issuer.key` and `issuer.pub` into.
    #[arg(long)]
    pub out_dir: PathBuf,
}

/// Run the keygen command.
pub fn run(args: KeygenArgs) -> i32 {
    if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
        output::error(&format!("Failed to create {}: {e}", args.out_dir.display()));
        return 1;
    }

    let signing_key = keys::generate();
    let verifying_key = signing_key.verifying_key();

    let key_path = args.out_dir.join("issuer.key");
    let pub_path = args.out_dir.join("issuer.pub");

    if let Err(e) = keys::write_private_key(&key_path, &signing_key) {
        output::error(&format!("Failed to write private key: {e}"));
        return 1;
    }
    if let Err(e) = keys::write_public_key(&pub_path, &verifying_key) {
        output::error(&format!("Failed to write public key: {e}"));
        return 1;
    }

    output::success("Generated issuer keypair");
    output::kv("Private key", &key_path.display().to_string());
    output::kv("Public key", &pub_path.display().to_string());
    0
}
