//! # MTC Core
//!
//! Core primitives for the Merkle Tree Certificate (MTC) scheme: a
//! certification-authority-side issuance pipeline that batches subject
//! assertions into a domain-separated Merkle tree, signs a sliding
//! validity window of recent tree heads, and later issues compact
//! per-assertion certificates whose proofs are inclusion paths.
//!
//! ## Features
//!
//! - **Deterministic**: the same `(issuer_id, batch_number, assertions)`
//!   always produces the same tree, byte for byte.
//! - **Minimal**: no network I/O, no async; a synchronous library the
//!   glue binary drives.
//! - **Wire-compatible**: the codec in [`codec`] follows the MTC draft's
//!   TLS-presentation-language byte layout exactly.
//!
//! ## Quick Start
//!
//! ```rust
//! use mtc_core::assertion::{Assertion, Claim, ClaimList, DNSName, SubjectInfo, SubjectType};
//! use mtc_core::tree::MerkleTree;
//! use mtc_core::proof::{create_bikeshed_certificate, verify_certificate};
//! use mtc_core::window::{SignedValidityWindow, ValidityWindow};
//! use ed25519_dalek::SigningKey;
//!
//! let issuer_id = b"example.issuer".to_vec();
//! let assertion = Assertion {
//!     subject_type: SubjectType::Tls,
//!     subject_info: SubjectInfo::new(vec![]),
//!     claims: ClaimList::new(vec![Claim::Dns(vec![DNSName::new(b"example.com".to_vec())])]),
//! };
//!
//! let tree = MerkleTree::build(&issuer_id, 0, std::slice::from_ref(&assertion));
//! let cert = create_bikeshed_certificate(&tree, 0, assertion);
//!
//! let signing_key = SigningKey::from_bytes(&[1u8; 32]);
//! let window = ValidityWindow::rotate(None, 0, tree.root(), 1).unwrap();
//! let signed_window = SignedValidityWindow::sign(issuer_id.clone(), window, &signing_key);
//!
//! verify_certificate(&cert, &signed_window, &signing_key.verifying_key(), &issuer_id).unwrap();
//! ```

pub mod assertion;
pub mod codec;
pub mod error;
pub mod hashing;
pub mod proof;
pub mod tree;
pub mod window;

pub use codec::Codec;
pub use error::{MtcError, ParsingError, Result, ValidationError, VerificationError};
pub use proof::{create_bikeshed_certificate, verify_certificate, BikeshedCertificate};
pub use tree::MerkleTree;
pub use window::{SignedValidityWindow, ValidityWindow};
