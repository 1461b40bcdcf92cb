//! JSON batch ingestion: translate the on-disk batch document into
//! core [`Assertion`] values.
//!
//! `subject_info` and DNS/IP claim values travel as hex strings in the
//! JSON; DNS names are passed through byte-for-byte (no lowercasing or
//! IDNA normalization), and IPv4/IPv6 literals are parsed with
//! `std::net::Ipv4Addr`/`Ipv6Addr`.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use mtc_core::assertion::{Assertion, Claim, ClaimList, DNSName, SubjectInfo, SubjectType};
use serde::Deserialize;

/// One claim entry in the JSON batch document.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawClaim {
    /// Exact DNS names.
    Dns { values: Vec<String> },
    /// Wildcard DNS names.
    DnsWildcard { values: Vec<String> },
    /// IPv4 literal addresses.
    Ipv4 { values: Vec<String> },
    /// IPv6 literal addresses.
    Ipv6 { values: Vec<String> },
}

/// One assertion entry in the JSON batch document.
#[derive(Debug, Deserialize)]
pub struct RawAssertion {
    /// Only `"tls"` is supported today.
    pub subject_type: String,
    /// Hex-encoded opaque subject info.
    #[serde(default)]
    pub subject_info: String,
    /// This subject's claims.
    pub claims: Vec<RawClaim>,
}

/// The JSON batch document: an ordered list of raw assertions. Order
/// defines leaf index once translated.
#[derive(Debug, Deserialize)]
pub struct RawBatch {
    /// The batch's assertions, in leaf order.
    pub assertions: Vec<RawAssertion>,
}

/// Parse `text` as a [`RawBatch`] JSON document.
pub fn parse_batch(text: &str) -> anyhow::Result<RawBatch> {
    Ok(serde_json::from_str(text)?)
}

fn translate_claim(raw: RawClaim) -> anyhow::Result<Claim> {
    Ok(match raw {
        RawClaim::Dns { values } => {
            Claim::Dns(values.into_iter().map(|s| DNSName::new(s.into_bytes())).collect())
        }
        RawClaim::DnsWildcard { values } => Claim::DnsWildcard(
            values.into_iter().map(|s| DNSName::new(s.into_bytes())).collect(),
        ),
        RawClaim::Ipv4 { values } => {
            let mut addrs = Vec::with_capacity(values.len());
            for v in values {
                addrs.push(Ipv4Addr::from_str(&v)?.octets());
            }
            Claim::Ipv4(addrs)
        }
        RawClaim::Ipv6 { values } => {
            let mut addrs = Vec::with_capacity(values.len());
            for v in values {
                addrs.push(Ipv6Addr::from_str(&v)?.octets());
            }
            Claim::Ipv6(addrs)
        }
    })
}

/// Translate one [`RawAssertion`] into a core [`Assertion`].
pub fn translate(raw: RawAssertion) -> anyhow::Result<Assertion> {
    let subject_type = match raw.subject_type.as_str() {
        "tls" => SubjectType::Tls,
        other => anyhow::bail!("unsupported subject_type: {other}"),
    };
    let subject_info = SubjectInfo::new(hex::decode(&raw.subject_info)?);
    let claims: Vec<Claim> = raw
        .claims
        .into_iter()
        .map(translate_claim)
        .collect::<anyhow::Result<_>>()?;

    Ok(Assertion {
        subject_type,
        subject_info,
        claims: ClaimList::new(claims),
    })
}

/// Translate an entire [`RawBatch`] into an ordered list of assertions.
pub fn translate_batch(raw: RawBatch) -> anyhow::Result<Vec<Assertion>> {
    raw.assertions.into_iter().map(translate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_dns_and_ip_claims() {
        let json = r#"{
            "assertions": [
                {
                    "subject_type": "tls",
                    "subject_info": "",
                    "claims": [
                        {"type": "dns", "values": ["example.com"]},
                        {"type": "ipv4", "values": ["127.0.0.1"]}
                    ]
                }
            ]
        }"#;
        let batch = parse_batch(json).unwrap();
        let assertions = translate_batch(batch).unwrap();
        assert_eq!(assertions.len(), 1);
        assert_eq!(assertions[0].claims.0.len(), 2);
    }

    #[test]
    fn rejects_unsupported_subject_type() {
        let raw = RawAssertion {
            subject_type: "dtls".to_string(),
            subject_info: String::new(),
            claims: vec![],
        };
        assert!(translate(raw).is_err());
    }

    #[test]
    fn dns_names_pass_through_without_normalization() {
        let raw = RawClaim::Dns {
            values: vec!["EXAMPLE.com".to_string()],
        };
        if let Claim::Dns(names) = translate_claim(raw).unwrap() {
            assert_eq!(names[0].0, b"EXAMPLE.com");
        } else {
            panic!("expected Dns claim");
        }
    }
}
