//! Error types for the MTC core library.
//!
//! Three kinds are distinguished: malformed wire bytes, well-formed but
//! semantically invalid values, and cryptographic verification failures.

use thiserror::Error;

/// A byte stream could not be parsed into a well-formed value.
///
/// Fatal for the operation; the caller may retry with different input.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParsingError {
    /// Fewer bytes remained than the value requires.
    #[error("unexpected end of input: needed {needed} bytes, had {available}")]
    UnexpectedEof {
        /// Bytes required to complete the value.
        needed: usize,
        /// Bytes actually remaining in the stream.
        available: usize,
    },

    /// A length-prefix marker named a payload longer than `max_length`,
    /// shorter than `min_length`, or longer than the remaining stream.
    #[error("length marker {length} out of bounds [{min}, {max}] for {context}")]
    LengthOutOfRange {
        /// The name of the vector type being parsed.
        context: &'static str,
        /// The decoded length.
        length: usize,
        /// Declared minimum.
        min: usize,
        /// Declared maximum.
        max: usize,
    },

    /// An enum's wire value was not one of its declared members.
    #[error("unknown {name} tag: {value}")]
    UnknownEnumTag {
        /// The enum's name.
        name: &'static str,
        /// The offending wire value.
        value: u32,
    },

    /// A variant's tag had no corresponding entry in the body-type mapping.
    #[error("unknown variant tag for {name}: {value}")]
    UnknownVariantTag {
        /// The variant's name.
        name: &'static str,
        /// The offending tag value.
        value: u32,
    },

    /// A `TreeHeads` payload was not a positive multiple of 32 bytes.
    #[error("tree heads length {0} is not a positive multiple of 32")]
    InvalidTreeHeadsLength(usize),
}

/// A structurally well-formed value failed a semantic invariant.
///
/// Fatal for the operation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    /// A vector's element or byte count fell outside its declared bounds.
    #[error("{context} length {length} out of bounds [{min}, {max}]")]
    LengthOutOfRange {
        /// The name of the value being validated.
        context: &'static str,
        /// The actual length.
        length: usize,
        /// Declared minimum.
        min: usize,
        /// Declared maximum.
        max: usize,
    },

    /// An `Assertion`'s `ClaimList` named the same `ClaimType` twice.
    #[error("duplicate claim type {0:?} in claim list")]
    DuplicateClaimType(crate::assertion::ClaimType),

    /// An `Assertions` batch was required to be non-empty.
    #[error("assertions batch must contain at least one assertion")]
    EmptyAssertions,

    /// A `TreeHeads` value had zero entries.
    #[error("tree heads must contain at least one entry")]
    EmptyTreeHeads,
}

/// A cryptographic or structural mismatch surfaced during verification.
///
/// No retries: the certificate, window, or key material disagree.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum VerificationError {
    /// The certificate's trust anchor did not name a supported proof type.
    #[error("unsupported proof type")]
    UnsupportedProofType,

    /// The certificate's issuer id did not match the expected issuer.
    #[error("issuer mismatch: certificate names a different issuer")]
    IssuerMismatch,

    /// The certificate's batch number is not covered by the signed window.
    #[error("batch {batch} not covered by window [{window_start}, {window_end}]")]
    OutOfWindow {
        /// The batch the certificate claims.
        batch: u32,
        /// First batch covered by the window.
        window_start: u32,
        /// Last batch covered by the window.
        window_end: u32,
    },

    /// The recomputed Merkle root did not match the window's entry.
    #[error("recomputed root does not match the validity window")]
    RootMismatch,

    /// The Ed25519 signature over the labeled validity window did not verify.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Rotating the validity window would skip or repeat a batch number.
    #[error("non-contiguous batch rotation: previous batch {previous}, new batch {new}")]
    NonContiguousBatch {
        /// The batch number of the previous signed window.
        previous: u32,
        /// The batch number being issued.
        new: u32,
    },

    /// An Ed25519 key or signature did not have the expected byte length.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// The union of all MTC core error kinds.
#[derive(Debug, Error, Clone)]
pub enum MtcError {
    /// See [`ParsingError`].
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    /// See [`ValidationError`].
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// See [`VerificationError`].
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// Result type alias for MTC core operations.
pub type Result<T, E = MtcError> = std::result::Result<T, E>;
