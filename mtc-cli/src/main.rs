//! MTC issuance CLI
//!
//! Batch ingestion, Merkle tree publication, certificate issuance and
//! verification for the Merkle Tree Certificate scheme.

mod commands;
mod config;
mod ingest;
mod keys;
mod output;
mod publication;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mtc")]
#[command(author = "MTC Reference")]
#[command(version = "0.1.0")]
#[command(about = "MTC - Merkle Tree Certificate issuance", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an Ed25519 issuer keypair
    Keygen(commands::keygen::KeygenArgs),
    /// Ingest a batch, build its tree, rotate the validity window, sign and publish
    Issue(commands::issue::IssueArgs),
    /// Extract one inclusion certificate from a previously-issued batch
    Certify(commands::certify::CertifyArgs),
    /// Verify a certificate against a signed validity window
    Verify(commands::verify::VerifyArgs),
    /// Run an in-process bulk issuance/verification harness
    Stress(commands::stress::StressArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Issue(args) => commands::issue::run(args),
        Commands::Certify(args) => commands::certify::run(args),
        Commands::Verify(args) => commands::verify::run(args),
        Commands::Stress(args) => commands::stress::run(args),
    };

    std::process::exit(exit_code);
}
