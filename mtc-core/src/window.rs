//! Validity-window rotation: the sliding set of recent tree heads,
//! signed by the issuer and checked by relying parties during
//! certificate verification.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::codec::{parse_vector, serialize_vector, skip_vector, Codec, Validate};
use crate::error::{ParsingError, ValidationError, VerificationError};
use crate::hashing::SHA256Hash;

/// `TreeHeads`: `Vector<SHA256Hash>`, 3-byte marker; payload length must
/// be a positive multiple of 32. Newest head last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeHeads(pub Vec<SHA256Hash>);

impl Codec for TreeHeads {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_vector(&self.0, 3, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let length = crate::codec::read_marker(bytes, 3)?;
        if length == 0 || length % 32 != 0 {
            return Err(ParsingError::InvalidTreeHeadsLength(length));
        }
        let (hashes, consumed) =
            parse_vector::<SHA256Hash>(bytes, "TreeHeads", 3, length, length)?;
        Ok((Self(hashes), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let length = crate::codec::read_marker(bytes, 3)?;
        if length == 0 || length % 32 != 0 {
            return Err(ParsingError::InvalidTreeHeadsLength(length));
        }
        skip_vector::<SHA256Hash>(bytes, 3)
    }
}

impl Validate for TreeHeads {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyTreeHeads);
        }
        Ok(())
    }
}

/// `ValidityWindow`: `Struct(UInt32 batch_number, TreeHeads)`. Heads
/// cover batches `(batch_number - window_size + 1 ..= batch_number)`,
/// where `window_size = len(tree_heads)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityWindow {
    /// The newest batch this window covers.
    pub batch_number: u32,
    /// Recent tree heads, newest last.
    pub tree_heads: TreeHeads,
}

impl Codec for ValidityWindow {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.batch_number.serialize(out);
        self.tree_heads.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (batch_number, n1) = u32::parse(bytes)?;
        let (tree_heads, n2) = TreeHeads::parse(&bytes[n1..])?;
        Ok((
            Self {
                batch_number,
                tree_heads,
            },
            n1 + n2,
        ))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = u32::skip(bytes)?;
        let n2 = TreeHeads::skip(&bytes[n1..])?;
        Ok(n1 + n2)
    }
}

impl ValidityWindow {
    /// Roll the window forward to cover newly-issued batch `batch_number`
    /// with root `root`, given the previous signed window (`None` if
    /// this is the first batch ever issued).
    ///
    /// Fails if `batch_number` does not immediately follow the previous
    /// window's batch number.
    pub fn rotate(
        previous: Option<&ValidityWindow>,
        batch_number: u32,
        root: SHA256Hash,
        window_size: u16,
    ) -> Result<Self, VerificationError> {
        let mut heads = match previous {
            None => Vec::new(),
            Some(prev) => {
                if prev.batch_number + 1 != batch_number {
                    return Err(VerificationError::NonContiguousBatch {
                        previous: prev.batch_number,
                        new: batch_number,
                    });
                }
                prev.tree_heads.0.clone()
            }
        };
        heads.push(root);
        while heads.len() > window_size as usize {
            heads.remove(0);
        }
        Ok(Self {
            batch_number,
            tree_heads: TreeHeads(heads),
        })
    }
}

/// `ValidityWindowLabel`: the fixed 32-byte domain label
/// `"Merkle Tree Crts ValidityWindow\0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityWindowLabel;

impl ValidityWindowLabel {
    const BYTES: [u8; 32] = *b"Merkle Tree Crts ValidityWindow\0";
}

impl Codec for ValidityWindowLabel {
    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&Self::BYTES);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (_, consumed) = <[u8; 32]>::parse(bytes)?;
        Ok((Self, consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        <[u8; 32]>::skip(bytes)
    }
}

/// `LabeledValidityWindow`: `Struct(ValidityWindowLabel, IssuerID, ValidityWindow)`,
/// the message signed by the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledValidityWindow {
    label: ValidityWindowLabel,
    /// The issuer whose key must sign this window.
    pub issuer_id: Vec<u8>,
    /// The window being signed.
    pub window: ValidityWindow,
}

impl LabeledValidityWindow {
    /// Wrap `issuer_id` and `window` with the fixed domain label.
    pub fn new(issuer_id: Vec<u8>, window: ValidityWindow) -> Self {
        Self {
            label: ValidityWindowLabel,
            issuer_id,
            window,
        }
    }

    /// Sign the serialized labeled window with `signing_key`.
    pub fn sign(&self, signing_key: &SigningKey) -> Signature {
        let message = self.to_bytes();
        Signature(signing_key.sign(&message).to_bytes().to_vec())
    }

    /// Verify `signature` over the serialized labeled window.
    pub fn verify(&self, signature: &Signature, verifying_key: &VerifyingKey) -> Result<(), VerificationError> {
        let sig = ed25519_dalek::Signature::from_slice(&signature.0)
            .map_err(|e| VerificationError::InvalidKeyMaterial(e.to_string()))?;
        verifying_key
            .verify(&self.to_bytes(), &sig)
            .map_err(|_| VerificationError::InvalidSignature)
    }
}

impl Codec for LabeledValidityWindow {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.label.serialize(out);
        crate::codec::serialize_opaque_vector(&self.issuer_id, 1, out);
        self.window.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (label, n1) = ValidityWindowLabel::parse(bytes)?;
        let (issuer_id, n2) = crate::codec::parse_opaque_vector(&bytes[n1..], "LabeledValidityWindow.issuer_id", 1, 0, 32)?;
        let (window, n3) = ValidityWindow::parse(&bytes[n1 + n2..])?;
        Ok((
            Self {
                label,
                issuer_id,
                window,
            },
            n1 + n2 + n3,
        ))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = ValidityWindowLabel::skip(bytes)?;
        let n2 = crate::codec::skip_opaque_vector(&bytes[n1..], 1)?;
        let n3 = ValidityWindow::skip(&bytes[n1 + n2..])?;
        Ok(n1 + n2 + n3)
    }
}

/// `Signature`: `OpaqueVector, [64,64]` — a raw Ed25519 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Codec for Signature {
    fn serialize(&self, out: &mut Vec<u8>) {
        crate::codec::serialize_opaque_vector(&self.0, 1, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (payload, consumed) = crate::codec::parse_opaque_vector(bytes, "Signature", 1, 64, 64)?;
        Ok((Self(payload), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        crate::codec::skip_opaque_vector(bytes, 1)
    }
}

/// `SignedValidityWindow`: `Struct(ValidityWindow, Signature)`, the
/// artifact an issuer publishes after rotating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedValidityWindow {
    /// The rotated window.
    pub window: ValidityWindow,
    /// The issuer's signature over `LabeledValidityWindow(label, issuer_id, window)`.
    pub signature: Signature,
}

impl SignedValidityWindow {
    /// Sign `window` under `issuer_id` with `signing_key`.
    pub fn sign(issuer_id: Vec<u8>, window: ValidityWindow, signing_key: &SigningKey) -> Self {
        let labeled = LabeledValidityWindow::new(issuer_id, window.clone());
        let signature = labeled.sign(signing_key);
        Self { window, signature }
    }
}

impl ValidityWindow {
    /// Verify `signature` was produced by `verifying_key` over this
    /// window labeled for `issuer_id`.
    pub fn verify_signature(
        &self,
        signature: &Signature,
        issuer_id: &[u8],
        verifying_key: &VerifyingKey,
    ) -> Result<(), VerificationError> {
        let labeled = LabeledValidityWindow::new(issuer_id.to_vec(), self.clone());
        labeled.verify(signature, verifying_key)
    }
}

impl Codec for SignedValidityWindow {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.window.serialize(out);
        self.signature.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (window, n1) = ValidityWindow::parse(bytes)?;
        let (signature, n2) = Signature::parse(&bytes[n1..])?;
        Ok((Self { window, signature }, n1 + n2))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = ValidityWindow::skip(bytes)?;
        let n2 = Signature::skip(&bytes[n1..])?;
        Ok(n1 + n2)
    }
}
