//! Assertion wire shapes: the subject, its claims, and the batch vector.
//!
//! These compose the codec primitives in [`crate::codec`] into the
//! concrete MTC record types. Marker widths and bounds are fixed per
//! field here, matching the data model table rather than being derived
//! generically — each type is a plain record, not a reflected shape.

use crate::codec::{
    self, parse_opaque_vector, parse_vector, serialize_opaque_vector, serialize_vector,
    skip_opaque_vector, skip_vector, Codec, Validate,
};
use crate::error::{ParsingError, ValidationError};

/// `IssuerID`: `OpaqueVector`, `[0, 32]`, 1-byte marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IssuerID(pub Vec<u8>);

impl IssuerID {
    /// Maximum byte length of an issuer id.
    pub const MAX_LEN: usize = 32;

    /// Build an issuer id from raw bytes, without validating.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl Codec for IssuerID {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_opaque_vector(&self.0, 1, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (payload, consumed) = parse_opaque_vector(bytes, "IssuerID", 1, 0, Self::MAX_LEN)?;
        Ok((Self(payload), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_opaque_vector(bytes, 1)
    }
}

impl Validate for IssuerID {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.len() > Self::MAX_LEN {
            return Err(ValidationError::LengthOutOfRange {
                context: "IssuerID",
                length: self.0.len(),
                min: 0,
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }
}

/// `DNSName`: `OpaqueVector`, `[1, 255]`, 1-byte marker. Treated as
/// opaque ASCII bytes; no lowercasing or IDNA normalization is applied
/// anywhere in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DNSName(pub Vec<u8>);

impl DNSName {
    /// Minimum byte length of a DNS name.
    pub const MIN_LEN: usize = 1;
    /// Maximum byte length of a DNS name.
    pub const MAX_LEN: usize = 255;

    /// Build a DNS name from raw bytes, without validating.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl Codec for DNSName {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_opaque_vector(&self.0, 1, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (payload, consumed) =
            parse_opaque_vector(bytes, "DNSName", 1, Self::MIN_LEN, Self::MAX_LEN)?;
        Ok((Self(payload), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_opaque_vector(bytes, 1)
    }
}

impl Validate for DNSName {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.len() < Self::MIN_LEN || self.0.len() > Self::MAX_LEN {
            return Err(ValidationError::LengthOutOfRange {
                context: "DNSName",
                length: self.0.len(),
                min: Self::MIN_LEN,
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }
}

/// `IPv4Address`: `Array<4>`.
pub type IPv4Address = [u8; 4];
/// `IPv6Address`: `Array<16>`.
pub type IPv6Address = [u8; 16];

/// `SubjectInfo`: `OpaqueVector`, `[0, 2^16-1]`, 2-byte marker. Opaque
/// for hashing purposes; its `subject_type`-specific meaning is outside
/// the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SubjectInfo(pub Vec<u8>);

impl SubjectInfo {
    /// Maximum byte length of subject info.
    pub const MAX_LEN: usize = u16::MAX as usize;

    /// Build subject info from raw bytes, without validating.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl Codec for SubjectInfo {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_opaque_vector(&self.0, 2, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (payload, consumed) = parse_opaque_vector(bytes, "SubjectInfo", 2, 0, Self::MAX_LEN)?;
        Ok((Self(payload), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_opaque_vector(bytes, 2)
    }
}

impl Validate for SubjectInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.len() > Self::MAX_LEN {
            return Err(ValidationError::LengthOutOfRange {
                context: "SubjectInfo",
                length: self.0.len(),
                min: 0,
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }
}

/// `SubjectType`: 2-byte enum. Only `tls` is defined today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SubjectType {
    /// TLS server certificate subject.
    Tls = 0,
}

impl Codec for SubjectType {
    fn serialize(&self, out: &mut Vec<u8>) {
        (*self as u16).serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, consumed) = u16::parse(bytes)?;
        let value = Self::try_from(tag).map_err(|_| ParsingError::UnknownEnumTag {
            name: "SubjectType",
            value: tag as u32,
        })?;
        Ok((value, consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        u16::skip(bytes)
    }
}

impl TryFrom<u16> for SubjectType {
    type Error = ();
    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::Tls),
            _ => Err(()),
        }
    }
}

/// `ClaimType`: 2-byte enum naming the variant carried by a [`Claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ClaimType {
    /// Authorized exact DNS names.
    Dns = 0,
    /// Authorized wildcard DNS names.
    DnsWildcard = 1,
    /// Authorized IPv4 addresses.
    Ipv4 = 2,
    /// Authorized IPv6 addresses.
    Ipv6 = 3,
}

impl Codec for ClaimType {
    fn serialize(&self, out: &mut Vec<u8>) {
        (*self as u16).serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, consumed) = u16::parse(bytes)?;
        let value = Self::try_from(tag).map_err(|_| ParsingError::UnknownEnumTag {
            name: "ClaimType",
            value: tag as u32,
        })?;
        Ok((value, consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        u16::skip(bytes)
    }
}

impl TryFrom<u16> for ClaimType {
    type Error = ();
    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            0 => Ok(Self::Dns),
            1 => Ok(Self::DnsWildcard),
            2 => Ok(Self::Ipv4),
            3 => Ok(Self::Ipv6),
            _ => Err(()),
        }
    }
}

const NAME_LIST_MARKER_WIDTH: usize = 2;
const NAME_LIST_MAX_LEN: usize = u16::MAX as usize;

/// A single typed claim about a subject: authorized DNS names (exact or
/// wildcard), or authorized IP addresses.
///
/// A `Variant` on [`ClaimType`]: serializes as the tag followed by the
/// list body the tag names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// Exact DNS names.
    Dns(Vec<DNSName>),
    /// Wildcard DNS names (e.g. `*.example.com`).
    DnsWildcard(Vec<DNSName>),
    /// IPv4 addresses.
    Ipv4(Vec<IPv4Address>),
    /// IPv6 addresses.
    Ipv6(Vec<IPv6Address>),
}

impl Claim {
    /// The [`ClaimType`] tag this claim carries.
    pub fn claim_type(&self) -> ClaimType {
        match self {
            Claim::Dns(_) => ClaimType::Dns,
            Claim::DnsWildcard(_) => ClaimType::DnsWildcard,
            Claim::Ipv4(_) => ClaimType::Ipv4,
            Claim::Ipv6(_) => ClaimType::Ipv6,
        }
    }
}

impl Codec for Claim {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.claim_type().serialize(out);
        match self {
            Claim::Dns(names) | Claim::DnsWildcard(names) => {
                serialize_vector(names, NAME_LIST_MARKER_WIDTH, out)
            }
            Claim::Ipv4(addrs) => serialize_vector(addrs, NAME_LIST_MARKER_WIDTH, out),
            Claim::Ipv6(addrs) => serialize_vector(addrs, NAME_LIST_MARKER_WIDTH, out),
        }
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (tag, tag_len) = ClaimType::parse(bytes)?;
        let rest = &bytes[tag_len..];
        let (claim, body_len) = match tag {
            ClaimType::Dns => {
                let (names, len) =
                    parse_vector::<DNSName>(rest, "DNSNameList", NAME_LIST_MARKER_WIDTH, 0, NAME_LIST_MAX_LEN)?;
                (Claim::Dns(names), len)
            }
            ClaimType::DnsWildcard => {
                let (names, len) =
                    parse_vector::<DNSName>(rest, "DNSNameList", NAME_LIST_MARKER_WIDTH, 0, NAME_LIST_MAX_LEN)?;
                (Claim::DnsWildcard(names), len)
            }
            ClaimType::Ipv4 => {
                let (addrs, len) = parse_vector::<IPv4Address>(
                    rest,
                    "IPv4AddressList",
                    NAME_LIST_MARKER_WIDTH,
                    0,
                    NAME_LIST_MAX_LEN,
                )?;
                (Claim::Ipv4(addrs), len)
            }
            ClaimType::Ipv6 => {
                let (addrs, len) = parse_vector::<IPv6Address>(
                    rest,
                    "IPv6AddressList",
                    NAME_LIST_MARKER_WIDTH,
                    0,
                    NAME_LIST_MAX_LEN,
                )?;
                (Claim::Ipv6(addrs), len)
            }
        };
        Ok((claim, tag_len + body_len))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let (tag, tag_len) = ClaimType::parse(bytes)?;
        let rest = &bytes[tag_len..];
        let body_len = match tag {
            ClaimType::Dns | ClaimType::DnsWildcard => {
                skip_vector::<DNSName>(rest, NAME_LIST_MARKER_WIDTH)?
            }
            ClaimType::Ipv4 => skip_vector::<IPv4Address>(rest, NAME_LIST_MARKER_WIDTH)?,
            ClaimType::Ipv6 => skip_vector::<IPv6Address>(rest, NAME_LIST_MARKER_WIDTH)?,
        };
        Ok(tag_len + body_len)
    }
}

/// `ClaimList`: `Vector<Claim>`, 2-byte marker. Within one assertion, at
/// most one claim per [`ClaimType`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimList(pub Vec<Claim>);

impl ClaimList {
    /// Maximum encoded payload length.
    pub const MAX_LEN: usize = u16::MAX as usize;

    /// Wrap a list of claims, without validating.
    pub fn new(claims: Vec<Claim>) -> Self {
        Self(claims)
    }
}

impl Codec for ClaimList {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_vector(&self.0, 2, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (claims, consumed) = parse_vector::<Claim>(bytes, "ClaimList", 2, 0, Self::MAX_LEN)?;
        Ok((Self(claims), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_vector::<Claim>(bytes, 2)
    }
}

impl Validate for ClaimList {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = [false; 4];
        for claim in &self.0 {
            let idx = claim.claim_type() as usize;
            if seen[idx] {
                return Err(ValidationError::DuplicateClaimType(claim.claim_type()));
            }
            seen[idx] = true;
        }
        Ok(())
    }
}

/// `Assertion`: `Struct(SubjectType, SubjectInfo, ClaimList)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// The kind of subject this assertion describes.
    pub subject_type: SubjectType,
    /// Opaque bytes identifying the subject.
    pub subject_info: SubjectInfo,
    /// The subject's authorized claims.
    pub claims: ClaimList,
}

impl Assertion {
    /// Build an assertion, optionally validating per `mode`.
    pub fn new(
        subject_type: SubjectType,
        subject_info: SubjectInfo,
        claims: ClaimList,
        mode: codec::ValidationMode,
    ) -> Result<Self, ValidationError> {
        let assertion = Self {
            subject_type,
            subject_info,
            claims,
        };
        if mode.resolve() {
            assertion.validate()?;
        }
        Ok(assertion)
    }
}

impl Codec for Assertion {
    fn serialize(&self, out: &mut Vec<u8>) {
        self.subject_type.serialize(out);
        self.subject_info.serialize(out);
        self.claims.serialize(out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (subject_type, n1) = SubjectType::parse(bytes)?;
        let (subject_info, n2) = SubjectInfo::parse(&bytes[n1..])?;
        let (claims, n3) = ClaimList::parse(&bytes[n1 + n2..])?;
        Ok((
            Self {
                subject_type,
                subject_info,
                claims,
            },
            n1 + n2 + n3,
        ))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        let n1 = SubjectType::skip(bytes)?;
        let n2 = SubjectInfo::skip(&bytes[n1..])?;
        let n3 = ClaimList::skip(&bytes[n1 + n2..])?;
        Ok(n1 + n2 + n3)
    }
}

impl Validate for Assertion {
    fn validate(&self) -> Result<(), ValidationError> {
        self.subject_info.validate()?;
        self.claims.validate()
    }
}

/// `Assertions`: `Vector<Assertion>`, 4-byte marker. Order defines leaf
/// index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assertions(pub Vec<Assertion>);

impl Assertions {
    /// Maximum encoded payload length.
    pub const MAX_LEN: usize = u32::MAX as usize;

    /// Build a batch of assertions, optionally validating per `mode`.
    pub fn new(
        assertions: Vec<Assertion>,
        mode: codec::ValidationMode,
    ) -> Result<Self, ValidationError> {
        let batch = Self(assertions);
        if mode.resolve() {
            batch.validate()?;
        }
        Ok(batch)
    }

    /// Number of assertions in the batch.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the batch has no assertions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Codec for Assertions {
    fn serialize(&self, out: &mut Vec<u8>) {
        serialize_vector(&self.0, 4, out);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        let (assertions, consumed) = parse_vector::<Assertion>(bytes, "Assertions", 4, 0, Self::MAX_LEN)?;
        Ok((Self(assertions), consumed))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        skip_vector::<Assertion>(bytes, 4)
    }
}

impl Validate for Assertions {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyAssertions);
        }
        for assertion in &self.0 {
            assertion.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assertion() -> Assertion {
        Assertion {
            subject_type: SubjectType::Tls,
            subject_info: SubjectInfo::new(vec![]),
            claims: ClaimList::new(vec![Claim::Dns(vec![DNSName::new(b"example.com".to_vec())])]),
        }
    }

    #[test]
    fn assertion_round_trip() {
        let a = sample_assertion();
        let bytes = a.to_bytes();
        let (parsed, consumed) = Assertion::parse(&bytes).unwrap();
        assert_eq!(parsed, a);
        assert_eq!(consumed, bytes.len());
        assert_eq!(Assertion::skip(&bytes).unwrap(), bytes.len());
    }

    #[test]
    fn claim_list_rejects_duplicate_claim_type() {
        let claims = ClaimList::new(vec![
            Claim::Dns(vec![DNSName::new(b"a.com".to_vec())]),
            Claim::Dns(vec![DNSName::new(b"b.com".to_vec())]),
        ]);
        assert_eq!(
            claims.validate().unwrap_err(),
            ValidationError::DuplicateClaimType(ClaimType::Dns)
        );
    }

    #[test]
    fn claim_list_accepts_one_per_type() {
        let claims = ClaimList::new(vec![
            Claim::Dns(vec![DNSName::new(b"a.com".to_vec())]),
            Claim::Ipv4(vec![[127, 0, 0, 1]]),
        ]);
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn assertions_reject_empty_batch() {
        let err = Assertions::new(vec![], codec::ValidationMode::Enabled).unwrap_err();
        assert_eq!(err, ValidationError::EmptyAssertions);
    }

    #[test]
    fn assertions_round_trip() {
        let batch = Assertions(vec![sample_assertion(), sample_assertion()]);
        let bytes = batch.to_bytes();
        let (parsed, consumed) = Assertions::parse(&bytes).unwrap();
        assert_eq!(parsed, batch);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn dns_name_rejects_out_of_range_length() {
        let empty = DNSName::new(vec![]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn unknown_subject_type_tag_is_parsing_error() {
        let bytes = 99u16.to_bytes();
        let err = SubjectType::parse(&bytes).unwrap_err();
        assert!(matches!(err, ParsingError::UnknownEnumTag { .. }));
    }
}
