//! Inclusion proofs and certificates: extraction from a built
//! [`MerkleTree`] and the verification algorithm run against a signed
//! validity window.

use crate::assertion::{Assertion, IssuerID};
use crate::codec::{parse_vector, serialize_vector, skip_vector, Codec};
use crate::error::{ParsingError, VerificationError};
use crate::hashing::{hash_assertion, hash_node, SHA256Hash};
use crate::tree::MerkleTree;
use crate::window::SignedValidityWindow;

/// `ProofType`: 2-byte enum naming which `TrustAnchor`/body shape a
/// [`Proof`] carries. Only one member is defined today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ProofType {
    /// SHA-256 Merkle tree inclusion proof.
    MerkleTreeSha256 = 0,
}

impl Codec for ProofType {
    fn serialize(&self, out: &mut Vec<u8>) {
        (*self as u16).serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, consumed) = u16::parse(bytes)?;
        let value = Self::try_from(tag).map_err(|_| ParsingError::UnknownEnumTag {
            name: "ProofType",
            value: tag as u32,
        })?;
        Ok((value, consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        u16::skip(bytes)
    }
}

impl TryFrom<u16> for ProofType {
    type Error = ();
    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::MerkleTreeSha256),
            _ => Err(()),
        }
    }
}

/// `MerkleTreeTrustAnchor`: `Struct(IssuerID, UInt32 batch_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTreeTrustAnchor {
    /// The issuer that built the tree.
    pub issuer_id: IssuerID,
    /// The batch the tree commits to.
    pub batch_number: u32,
}

impl Codec for MerkleTreeTrustAnchor {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.issuer_id.serialize(out);
        self.batch_number.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (issuer_id, n1) = IssuerID::parse(bytes)?;
        let (batch_number, n2) = u32::parse(&bytes[n1..])?;
        Ok((
            Self {
                issuer_id,
                batch_number,
            },
            n1 + n2,
        ))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = IssuerID::skip(bytes)?;
        let n2 = u32::skip(&bytes[n1..])?;
        Ok(n1 + n2)
    }
}

/// `TrustAnchor`: `Variant on ProofType -> MerkleTreeTrustAnchor`. The
/// match in `parse`/`skip` is the dispatch table; a second proof type
/// is one new arm, not a new function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustAnchor {
    /// `merkle_tree_sha256` trust anchor.
    MerkleTreeSha256(MerkleTreeTrustAnchor),
}

impl TrustAnchor {
    /// The [`ProofType`] tag this trust anchor carries.
    pub fn proof_type(&self) -> ProofType {
        match self {
            TrustAnchor::MerkleTreeSha256(_) => ProofType::MerkleTreeSha256,
        }
    }
}

impl Codec for TrustAnchor {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.proof_type().serialize(out);
        match self {
            TrustAnchor::MerkleTreeSha256(anchor) => anchor.serialize(out),
        }
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, tag_len) = ProofType::parse(bytes)?;
        let rest = &bytes[tag_len..];
        let (anchor, body_len) = match tag {
            ProofType::MerkleTreeSha256 => {
                let (anchor, len) = MerkleTreeTrustAnchor::parse(rest)?;
                (TrustAnchor::MerkleTreeSha256(anchor), len)
            }
        };
        Ok((anchor, tag_len + body_len))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let (tag, tag_len) = ProofType::parse(bytes)?;
        let rest = &bytes[tag_len..];
        let body_len = match tag {
            ProofType::MerkleTreeSha256 => MerkleTreeTrustAnchor::skip(rest)?,
        };
        Ok(tag_len + body_len)
    }
}

/// `SHA256Vector`: `Vector<SHA256Hash>`, 2-byte marker. Used as an
/// inclusion path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SHA256Vector(pub Vec<SHA256Hash>);

impl SHA256Vector {
    const MAX_LEN: usize = u16::MAX as usize;
}

impl Codec for SHA256Vector {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_vector(&self.0, 2, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (hashes, consumed) =
            parse_vector::<SHA256Hash>(bytes, "SHA256Vector", 2, 0, Self::MAX_LEN)?;
        Ok((Self(hashes), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_vector::<SHA256Hash>(bytes, 2)
    }
}

/// `MerkleTreeProofSHA256`: `Struct(UInt64 index, SHA256Vector path)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTreeProofSHA256 {
    /// Leaf index the proof covers.
    pub index: u64,
    /// Sibling hashes, bottom-up.
    pub path: SHA256Vector,
}

impl Codec for MerkleTreeProofSHA256 {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.index.serialize(out);
        self.path.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (index, n1) = u64::parse(bytes)?;
        let (path, n2) = SHA256Vector::parse(&bytes[n1..])?;
        Ok((Self { index, path }, n1 + n2))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = u64::skip(bytes)?;
        let n2 = SHA256Vector::skip(&bytes[n1..])?;
        Ok(n1 + n2)
    }
}

/// `Proof`: `Struct(TrustAnchor, body determined by TrustAnchor's proof type)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Names the issuer/batch and the proof shape.
    pub trust_anchor: TrustAnchor,
    /// The inclusion proof itself, keyed by the trust anchor's proof type.
    pub body: MerkleTreeProofSHA256,
}

impl Codec for Proof {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.trust_anchor.serialize(out);
        self.body.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (trust_anchor, n1) = TrustAnchor::parse(bytes)?;
        let (body, n2) = match trust_anchor.proof_type() {
            ProofType::MerkleTreeSha256 => MerkleTreeProofSHA256::parse(&bytes[n1..])?,
        };
        Ok((
            Self {
                trust_anchor,
                body,
            },
            n1 + n2,
        ))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let (trust_anchor, n1) = TrustAnchor::parse(bytes)?;
        let n2 = match trust_anchor.proof_type() {
            ProofType::MerkleTreeSha256 => MerkleTreeProofSHA256::skip(&bytes[n1..])?,
        };
        Ok(n1 + n2)
    }
}

/// `BikeshedCertificate`: `Struct(Assertion, Proof)`. Self-contained —
/// the assertion fully determines the leaf hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BikeshedCertificate {
    /// The subject assertion this certificate attests.
    pub assertion: Assertion,
    /// The inclusion proof tying the assertion to a signed batch.
    pub proof: Proof,
}

impl Codec for BikeshedCertificate {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.assertion.serialize(out);
        self.proof.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (assertion, n1) = Assertion::parse(bytes)?;
        let (proof, n2) = Proof::parse(&bytes[n1..])?;
        Ok((Self { assertion, proof }, n1 + n2))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = Assertion::skip(bytes)?;
        let n2 = Proof::skip(&bytes[n1..])?;
        Ok(n1 + n2)
    }
}

/// Build a certificate for leaf `index` out of an already-built tree.
pub fn create_bikeshed_certificate(
    tree: &MerkleTree,
    index: usize,
    assertion: Assertion,
) -> BikeshedCertificate {
    let path = tree.inclusion_path(index);
    BikeshedCertificate {
        assertion,
        proof: Proof {
            trust_anchor: TrustAnchor::MerkleTreeSha256(MerkleTreeTrustAnchor {
                issuer_id: IssuerID::new(tree.issuer_id().to_vec()),
                batch_number: tree.batch_number(),
            }),
            body: MerkleTreeProofSHA256 {
                index: index as u64,
                path: SHA256Vector(path),
            },
        },
    }
}

/// Recompute the root a certificate's assertion and path imply, walking
/// the path bottom-up with the sibling/parent swap determined by the
/// leaf index's parity at each level.
fn recompute_root(issuer_id: &[u8], batch_number: u32, index: u64, assertion: &Assertion, path: &[SHA256Hash]) -> SHA256Hash {
    let mut current = hash_assertion(issuer_id, batch_number, index, assertion);
    for (level, sibling) in path.iter().enumerate() {
        let level = level as u8;
        let idx_at_level = index >> level;
        let parent_index = (idx_at_level >> 1) as u64;
        current = if idx_at_level % 2 == 0 {
            hash_node(issuer_id, batch_number, parent_index, level + 1, &current, sibling)
        } else {
            hash_node(issuer_id, batch_number, parent_index, level + 1, sibling, &current)
        };
    }
    current
}

/// Verify `cert` against `signed_window` and `issuer_public_key`,
/// confirming it names `expected_issuer_id`.
///
/// Runs the six checks in a fixed order and returns the first failure:
/// trust-anchor shape and issuer match, window coverage, recomputed
/// root against the window's entry, then the window's own signature.
pub fn verify_certificate(
    cert: &BikeshedCertificate,
    signed_window: &SignedValidityWindow,
    issuer_public_key: &ed25519_dalek::VerifyingKey,
    expected_issuer_id: &[u8],
) -> Result<(), VerificationError> {
    let anchor = match &cert.proof.trust_anchor {
        TrustAnchor::MerkleTreeSha256(anchor) => anchor,
        #[allow(unreachable_patterns)]
        _ => return Err(VerificationError::UnsupportedProofType),
    };
    if anchor.issuer_id.0 != expected_issuer_id {
        return Err(VerificationError::IssuerMismatch);
    }

    let batch = anchor.batch_number;
    let index = cert.proof.body.index;
    let window = &signed_window.window;
    let current = window.batch_number;
    let window_size = window.tree_heads.0.len() as u32;
    let window_start = match current.checked_add(1).and_then(|n| n.checked_sub(window_size)) {
        Some(start) => start,
        None => {
            return Err(VerificationError::OutOfWindow {
                batch,
                window_start: 0,
                window_end: current,
            })
        }
    };
    if batch < window_start || batch > current {
        return Err(VerificationError::OutOfWindow {
            batch,
            window_start,
            window_end: current,
        });
    }

    let recomputed = recompute_root(
        expected_issuer_id,
        batch,
        index,
        &cert.assertion,
        &cert.proof.body.path.0,
    );
    let offset = (batch - window_start) as usize;
    if recomputed != window.tree_heads.0[offset] {
        return Err(VerificationError::RootMismatch);
    }

    window.verify_signature(&signed_window.signature, expected_issuer_id, issuer_public_key)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{ClaimList, SubjectInfo, SubjectType};
    use crate::window::{LabeledValidityWindow, ValidityWindow};
    use ed25519_dalek::{SigningKey, VerifyingKey};

    fn assertion_with_name(name: &str) -> Assertion {
        use crate::assertion::{Claim, DNSName};
        Assertion {
            subject_type: SubjectType::Tls,
            subject_info: SubjectInfo::new(vec![]),
            claims: ClaimList::new(vec![Claim::Dns(vec![DNSName::new(name.as_bytes().to_vec())])]),
        }
    }

    fn signed_window_for(issuer_id: &[u8], tree: &MerkleTree, signing_key: &SigningKey) -> SignedValidityWindow {
        let window = ValidityWindow {
            batch_number: tree.batch_number(),
            tree_heads: crate::window::TreeHeads(vec![tree.root()]),
        };
        let labeled = LabeledValidityWindow::new(issuer_id.to_vec(), window.clone());
        let signature = labeled.sign(signing_key);
        SignedValidityWindow { window, signature }
    }

    #[test]
    fn single_leaf_certificate_round_trips_and_verifies() {
        let issuer_id = b"test.issuer".to_vec();
        let a = assertion_with_name("example.com");
        let tree = MerkleTree::build(&issuer_id, 0, std::slice::from_ref(&a));
        let cert = create_bikeshed_certificate(&tree, 0, a);

        let bytes = cert.to_bytes();
        let (parsed, consumed) = BikeshedCertificate::parse(&bytes).unwrap();
        assert_eq!(parsed, cert);
        assert_eq!(consumed, bytes.len());
        assert!(cert.proof.body.path.0.is_empty());

        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let verifying_key: VerifyingKey = signing_key.verifying_key();
        let signed_window = signed_window_for(&issuer_id, &tree, &signing_key);

        verify_certificate(&cert, &signed_window, &verifying_key, &issuer_id).unwrap();
    }

    #[test]
    fn tampered_path_fails_verification() {
        let issuer_id = b"test.issuer".to_vec();
        let a0 = assertion_with_name("a.example.com");
        let a1 = assertion_with_name("b.example.com");
        let tree = MerkleTree::build(&issuer_id, 0, &[a0.clone(), a1.clone()]);
        let mut cert = create_bikeshed_certificate(&tree, 1, a1);
        cert.proof.body.path.0[0][0] ^= 0xff;

        let signing_key = SigningKey::from_bytes(&[9u8; 32]);
        let verifying_key = signing_key.verifying_key();
        let signed_window = signed_window_for(&issuer_id, &tree, &signing_key);

        let err = verify_certificate(&cert, &signed_window, &verifying_key, &issuer_id).unwrap_err();
        assert_eq!(err, VerificationError::RootMismatch);
    }

    #[test]
    fn cross_issuer_rejected_immediately() {
        let issuer_id = b"issuer-a".to_vec();
        let a = assertion_with_name("example.com");
        let tree = MerkleTree::build(&issuer_id, 0, std::slice::from_ref(&a));
        let cert = create_bikeshed_certificate(&tree, 0, a);

        let signing_key = SigningKey::from_bytes(&[1u8; 32]);
        let verifying_key = signing_key.verifying_key();
        let signed_window = signed_window_for(&issuer_id, &tree, &signing_key);

        let err = verify_certificate(&cert, &signed_window, &verifying_key, b"issuer-b").unwrap_err();
        assert_eq!(err, VerificationError::IssuerMismatch);
    }
}
