//! Subcommand implementations, one module per `mtc` subcommand.

pub mod certify;
pub mod issue;
pub mod keygen;
pub mod stress;
pub mod verify;
