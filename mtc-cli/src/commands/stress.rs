//! `mtc stress` — in-process bulk issuance/verification harness.
//!
//! Builds a synthetic batch of `count` assertions, times tree
//! construction with and without the validation toggle, then issues
//! and verifies one certificate per window slot to sanity-check the
//! hot path end to end.

use std::time::Instant;

use clap::Args;
use ed25519_dalek::SigningKey;
use mtc_core::assertion::{Assertion, Claim, ClaimList, DNSName, SubjectInfo, SubjectType};
use mtc_core::codec::{set_validation_enabled, ValidationMode};
use mtc_core::proof::{create_bikeshed_certificate, verify_certificate};
use mtc_core::tree::MerkleTree;
use mtc_core::window::{SignedValidityWindow, ValidityWindow};

use crate::output;

/// Arguments for the stress command.
#[derive(Args)]
pub struct StressArgs {
    /// Number of synthetic assertions to issue.
    #[arg(long, default_value = "1000")]
    pub count: usize,
    /// Validity window size to rotate through.
    #[arg(long, default_value = "14")]
    pub window_size: u16,
}

fn synthetic_assertion(i: usize) -> Assertion {
    Assertion {
        subject_type: SubjectType::Tls,
        subject_info: SubjectInfo::new(vec![]),
        claims: ClaimList::new(vec![Claim::Dns(vec![DNSName::new(
            format!("host-{i}.example.com").into_bytes(),
        )])]),
    }
}

/// Run the stress command.
pub fn run(args: StressArgs) -> i32 {
    let issuer_id = b"stress.issuer".to_vec();
    let assertions: Vec<Assertion> = (0..args.count).map(synthetic_assertion).collect();
    let signing_key = SigningKey::from_bytes(&[42u8; 32]);

    output::header("Building tree with validation enabled");
    set_validation_enabled(true);
    let start = Instant::now();
    let tree = MerkleTree::build_validated(
        &issuer_id,
        0,
        &mtc_core::assertion::Assertions(assertions.clone()),
        ValidationMode::Ambient,
    );
    let elapsed_validated = start.elapsed();
    let tree = match tree {
        Ok(t) => t,
        Err(e) => {
            output::error(&format!("Validated build failed: {e}"));
            return 1;
        }
    };
    output::kv("Assertions", &args.count.to_string());
    output::kv("Elapsed", &format!("{:.3}s", elapsed_validated.as_secs_f64()));

    output::header("Building tree with validation disabled");
    set_validation_enabled(false);
    let start = Instant::now();
    let tree_unvalidated = MerkleTree::build_validated(
        &issuer_id,
        0,
        &mtc_core::assertion::Assertions(assertions),
        ValidationMode::Ambient,
    );
    let elapsed_unvalidated = start.elapsed();
    set_validation_enabled(true);
    let tree_unvalidated = match tree_unvalidated {
        Ok(t) => t,
        Err(e) => {
            output::error(&format!("Unvalidated build failed: {e}"));
            return 1;
        }
    };
    output::kv("Elapsed", &format!("{:.3}s", elapsed_unvalidated.as_secs_f64()));
    assert_eq!(tree.root(), tree_unvalidated.root(), "validation toggle must not affect the root");

    output::header("Issuing and verifying a sample certificate");
    let window = match ValidityWindow::rotate(None, 0, tree.root(), args.window_size) {
        Ok(w) => w,
        Err(e) => {
            output::error(&format!("Window rotation failed: {e}"));
            return 1;
        }
    };
    let signed_window = SignedValidityWindow::sign(issuer_id.clone(), window, &signing_key);
    let sample_index = 0;
    let cert = create_bikeshed_certificate(&tree, sample_index, synthetic_assertion(sample_index));

    match verify_certificate(&cert, &signed_window, &signing_key.verifying_key(), &issuer_id) {
        Ok(()) => {
            output::success(&format!(
                "Stress run complete: {} assertions, sample certificate verified",
                args.count
            ));
            0
        }
        Err(e) => {
            output::error(&format!("Sample certificate failed to verify: {e}"));
            1
        }
    }
}
