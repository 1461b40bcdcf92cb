//! Codec round-trip and skip-consistency across the wire types, plus
//! the ClaimList uniqueness and empty-subtree equality invariants.

use mtc_core::assertion::{
    Assertion, Assertions, Claim, ClaimList, ClaimType, DNSName, IssuerID, SubjectInfo, SubjectType,
};
use mtc_core::codec::{marker_width_for, Codec, Validate};
use mtc_core::error::ValidationError;
use mtc_core::hashing::hash_empty;
use mtc_core::proof::{MerkleTreeProofSHA256, MerkleTreeTrustAnchor, ProofType, SHA256Vector, TrustAnchor};
use mtc_core::window::{Signature, TreeHeads, ValidityWindow};

fn round_trips<T: Codec + PartialEq + std::fmt::Debug>(value: &T) {
    let bytes = value.to_bytes();
    let (parsed, consumed) = T::parse(&bytes).expect("parse should succeed");
    assert_eq!(&parsed, value);
    assert_eq!(consumed, bytes.len());
    assert_eq!(T::skip(&bytes).expect("skip should succeed"), bytes.len());
}

#[test]
fn issuer_id_round_trips() {
    round_trips(&IssuerID::new(b"some.issuer".to_vec()));
}

#[test]
fn dns_name_round_trips() {
    round_trips(&DNSName::new(b"example.com".to_vec()));
}

#[test]
fn subject_info_round_trips() {
    round_trips(&SubjectInfo::new(vec![1, 2, 3, 4, 5]));
}

#[test]
fn claim_round_trips_each_variant() {
    round_trips(&Claim::Dns(vec![DNSName::new(b"a.com".to_vec())]));
    round_trips(&Claim::DnsWildcard(vec![DNSName::new(b"*.a.com".to_vec())]));
    round_trips(&Claim::Ipv4(vec![[10, 0, 0, 1]]));
    round_trips(&Claim::Ipv6(vec![[0u8; 16]]));
}

#[test]
fn assertion_and_assertions_round_trip() {
    let a = Assertion {
        subject_type: SubjectType::Tls,
        subject_info: SubjectInfo::new(vec![9, 9]),
        claims: ClaimList::new(vec![Claim::Ipv4(vec![[127, 0, 0, 1]])]),
    };
    round_trips(&a.clone());
    round_trips(&Assertions(vec![a.clone(), a]));
}

#[test]
fn trust_anchor_and_proof_round_trip() {
    let anchor = TrustAnchor::MerkleTreeSha256(MerkleTreeTrustAnchor {
        issuer_id: IssuerID::new(b"issuer".to_vec()),
        batch_number: 7,
    });
    round_trips(&anchor);

    let path = SHA256Vector(vec![[1u8; 32], [2u8; 32]]);
    round_trips(&path);

    let proof_body = MerkleTreeProofSHA256 { index: 3, path };
    round_trips(&proof_body);
}

#[test]
fn tree_heads_and_validity_window_round_trip() {
    let heads = TreeHeads(vec![[1u8; 32], [2u8; 32], [3u8; 32]]);
    round_trips(&heads.clone());

    let window = ValidityWindow {
        batch_number: 4,
        tree_heads: heads,
    };
    round_trips(&window);
}

#[test]
fn signature_round_trips() {
    round_trips(&Signature(vec![7u8; 64]));
}

#[test]
fn signature_rejects_wrong_length() {
    let bytes = {
        let mut out = Vec::new();
        mtc_core::codec::write_marker(&mut out, 1, 10);
        out.extend_from_slice(&[0u8; 10]);
        out
    };
    assert!(Signature::parse(&bytes).is_err());
}

#[test]
fn marker_width_matches_declared_bounds() {
    assert_eq!(marker_width_for(DNSName::MAX_LEN), 1);
    assert_eq!(marker_width_for(SubjectInfo::MAX_LEN), 2);
    assert_eq!(marker_width_for(ClaimList::MAX_LEN), 2);
    assert_eq!(marker_width_for(Assertions::MAX_LEN), 4);
}

#[test]
fn claim_list_uniqueness_invariant() {
    let dup = ClaimList::new(vec![
        Claim::Ipv4(vec![[1, 1, 1, 1]]),
        Claim::Ipv4(vec![[2, 2, 2, 2]]),
    ]);
    assert_eq!(
        dup.validate().unwrap_err(),
        ValidationError::DuplicateClaimType(ClaimType::Ipv4)
    );
}

#[test]
fn empty_subtree_equality_invariant() {
    let a = hash_empty(b"issuer", 3, 5, 2);
    let b = hash_empty(b"issuer", 3, 5, 2);
    assert_eq!(a, b);
}

#[test]
fn unknown_proof_type_tag_is_parsing_error() {
    let mut bytes = Vec::new();
    99u16.serialize(&mut bytes);
    let err = ProofType::parse(&bytes).unwrap_err();
    assert!(matches!(err, mtc_core::ParsingError::UnknownEnumTag { .. }));
}
