//! Domain-separated hash inputs used by the Merkle tree builder.
//!
//! Every hash fed into SHA-256 starts with a [`HashHead`] naming which
//! kind of input it is, which issuer produced it, and which batch it
//! belongs to — two issuers, or two batches, never produce the same
//! hash input bytes for what looks like "the same" leaf or node.

use sha2::{Digest, Sha256};

use crate::assertion::Assertion;
use crate::codec::Codec;
use crate::error::ParsingError;

/// 32-byte SHA-256 digest, used throughout as node and leaf hashes.
pub type SHA256Hash = [u8; 32];

/// Tags which hash input shape follows the [`HashHead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Distinguisher {
    /// An unpopulated (level, index) slot.
    HashEmptyInput = 0,
    /// An internal node with two known children.
    HashNodeInput = 1,
    /// A leaf derived from a batch assertion.
    HashAssertionInput = 2,
}

impl Codec for Distinguisher {
    fn serialize(&self, out: &mut Vec<u8>) {
        (*self as u8).serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, consumed) = u8::parse(bytes)?;
        let value = Self::try_from(tag).map_err(|_| ParsingError::UnknownEnumTag {
            name: "Distinguisher",
            value: tag as u32,
        })?;
        Ok((value, consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        u8::skip(bytes)
    }
}

impl TryFrom<u8> for Distinguisher {
    type Error = ();
    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::HashEmptyInput),
            1 => Ok(Self::HashNodeInput),
            2 => Ok(Self::HashAssertionInput),
            _ => Err(()),
        }
    }
}

/// `Struct(Distinguisher, IssuerID, UInt32 batch_number)`, prepended to
/// every hash input below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashHead {
    /// Which hash input shape follows.
    pub distinguisher: Distinguisher,
    /// Raw issuer id bytes (not re-validated here; the caller's issuer
    /// id is assumed already well-formed).
    pub issuer_id: Vec<u8>,
    /// The batch this hash belongs to.
    pub batch_number: u32,
}

impl HashHead {
    fn new(distinguisher: Distinguisher, issuer_id: &[u8], batch_number: u32) -> Self {
        Self {
            distinguisher,
            issuer_id: issuer_id.to_vec(),
            batch_number,
        }
    }

    fn serialize_into(&self, out: &mut Vec<u8>) {
        self.distinguisher.serialize(out);
        crate::codec::serialize_opaque_vector(&self.issuer_id, 1, out);
        self.batch_number.serialize(out);
    }
}

fn digest(bytes: &[u8]) -> SHA256Hash {
    Sha256::digest(bytes).into()
}

/// `H(HashEmptyInput{ head, index, level })` for an unpopulated slot.
pub fn hash_empty(issuer_id: &[u8], batch_number: u32, index: u64, level: u8) -> SHA256Hash {
    let head = HashHead::new(Distinguisher::HashEmptyInput, issuer_id, batch_number);
    let mut bytes = Vec::new();
    head.serialize_into(&mut bytes);
    index.serialize(&mut bytes);
    level.serialize(&mut bytes);
    digest(&bytes)
}

/// `H(HashNodeInput{ head, index, level, left, right })` for an internal
/// node with both children known.
pub fn hash_node(
    issuer_id: &[u8],
    batch_number: u32,
    index: u64,
    level: u8,
    left: &SHA256Hash,
    right: &SHA256Hash,
) -> SHA256Hash {
    let head = HashHead::new(Distinguisher::HashNodeInput, issuer_id, batch_number);
    let mut bytes = Vec::new();
    head.serialize_into(&mut bytes);
    index.serialize(&mut bytes);
    level.serialize(&mut bytes);
    left.serialize(&mut bytes);
    right.serialize(&mut bytes);
    digest(&bytes)
}

/// `H(HashAssertionInput{ head, index, assertion })` for a batch leaf.
pub fn hash_assertion(
    issuer_id: &[u8],
    batch_number: u32,
    index: u64,
    assertion: &Assertion,
) -> SHA256Hash {
    let head = HashHead::new(Distinguisher::HashAssertionInput, issuer_id, batch_number);
    let mut bytes = Vec::new();
    head.serialize_into(&mut bytes);
    index.serialize(&mut bytes);
    assertion.serialize(&mut bytes);
    digest(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{ClaimList, SubjectInfo, SubjectType};

    fn sample_assertion() -> Assertion {
        Assertion {
            subject_type: SubjectType::Tls,
            subject_info: SubjectInfo::new(vec![]),
            claims: ClaimList::new(vec![]),
        }
    }

    #[test]
    fn distinguisher_round_trip() {
        for d in [
            Distinguisher::HashEmptyInput,
            Distinguisher::HashNodeInput,
            Distinguisher::HashAssertionInput,
        ] {
            let bytes = d.to_bytes();
            let (parsed, consumed) = Distinguisher::parse(&bytes).unwrap();
            assert_eq!(parsed, d);
            assert_eq!(consumed, 1);
        }
    }

    #[test]
    fn hash_is_domain_separated_by_issuer() {
        let a = hash_empty(b"issuer-a", 0, 0, 0);
        let b = hash_empty(b"issuer-b", 0, 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_domain_separated_by_batch() {
        let a = hash_empty(b"issuer", 0, 0, 0);
        let b = hash_empty(b"issuer", 1, 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_deterministic() {
        let assertion = sample_assertion();
        let a = hash_assertion(b"issuer", 7, 3, &assertion);
        let b = hash_assertion(b"issuer", 7, 3, &assertion);
        assert_eq!(a, b);
    }

    #[test]
    fn distinguisher_separates_empty_from_node_inputs_of_same_shape() {
        let empty = hash_empty(b"issuer", 0, 0, 0);
        let leaf = hash_assertion(b"issuer", 0, 0, &sample_assertion());
        assert_ne!(empty, leaf);
    }
}
