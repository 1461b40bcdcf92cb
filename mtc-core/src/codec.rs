//! TLS-presentation-language style binary codec.
//!
//! Every wire value implements [`Codec`]: it can serialize to bytes,
//! parse from a byte stream (returning the value and the number of
//! bytes consumed), and skip itself in a stream without being
//! materialized. Composite values additionally implement [`Validate`]
//! for semantic checks beyond what `parse` already enforces.
//!
//! `parse` always enforces length and tag bounds regardless of the
//! validation toggle below — only constructors that build values
//! programmatically (not from a byte stream) consult the toggle before
//! calling [`Validate::validate`].

use crate::error::ParsingError;
use std::sync::atomic::{AtomicBool, Ordering};

/// A value that can be serialized to and parsed from the MTC wire format.
pub trait Codec: Sized {
    /// Append this value's serialization to `out`.
    fn serialize(&self, out: &mut Vec<u8>);

    /// Parse a value from the front of `bytes`, returning it and the
    /// number of bytes consumed.
    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError>;

    /// Return the number of bytes `parse` would consume, without
    /// materializing the value. Must agree with `parse`.
    fn skip(bytes: &[u8]) -> Result<usize, ParsingError>;

    /// Convenience: serialize into a fresh `Vec<u8>`.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize(&mut out);
        out
    }
}

/// A value that can check its own semantic invariants.
///
/// Distinct from the truncation/range checks `Codec::parse` always
/// performs: `validate` additionally covers rules that only apply to
/// fully-assembled values (e.g. "at most one claim per type").
pub trait Validate {
    /// Check all invariants, returning the first violation found.
    fn validate(&self) -> Result<(), crate::error::ValidationError>;
}

static VALIDATION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Disable (or re-enable) the process-wide default for whether newly
/// constructed values run [`Validate::validate`] at construction time.
///
/// Used by bulk issuance to skip redundant validation once a batch's
/// assertions are already known-good. Parse-time bounds checks are
/// unaffected. Intended to be set once at process start; mutating it
/// mid-batch is undefined per the core's concurrency model.
pub fn set_validation_enabled(enabled: bool) {
    VALIDATION_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Read the current process-wide validation default.
pub fn validation_enabled() -> bool {
    VALIDATION_ENABLED.load(Ordering::SeqCst)
}

/// Explicit validation mode, for call sites that prefer to thread the
/// choice through arguments rather than rely on the ambient flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Always run `validate()`.
    Enabled,
    /// Never run `validate()`.
    Disabled,
    /// Defer to [`validation_enabled`] at the call site.
    Ambient,
}

impl ValidationMode {
    /// Resolve to a concrete enabled/disabled boolean.
    pub fn resolve(self) -> bool {
        match self {
            ValidationMode::Enabled => true,
            ValidationMode::Disabled => false,
            ValidationMode::Ambient => validation_enabled(),
        }
    }
}

fn require_len(bytes: &[u8], needed: usize) -> Result<(), ParsingError> {
    if bytes.len() < needed {
        Err(ParsingError::UnexpectedEof {
            needed,
            available: bytes.len(),
        })
    } else {
        Ok(())
    }
}

macro_rules! impl_codec_uint {
    ($ty:ty, $width:expr) => {
        impl Codec for $ty {
            fn serialize(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }

            fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
                require_len(bytes, $width)?;
                let mut buf = [0u8; $width];
                buf.copy_from_slice(&bytes[..$width]);
                Ok((<$ty>::from_be_bytes(buf), $width))
            }

            fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
                require_len(bytes, $width)?;
                Ok($width)
            }
        }
    };
}

impl_codec_uint!(u8, 1);
impl_codec_uint!(u16, 2);
impl_codec_uint!(u32, 4);
impl_codec_uint!(u64, 8);

/// `Array<N>`: exactly `N` raw bytes, no length marker.
impl<const N: usize> Codec for [u8; N] {
    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }

    fn parse(bytes: &[u8]) -> Result<(Self, usize), ParsingError> {
        require_len(bytes, N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&bytes[..N]);
        Ok((buf, N))
    }

    fn skip(bytes: &[u8]) -> Result<usize, ParsingError> {
        require_len(bytes, N)?;
        Ok(N)
    }
}

/// Width in bytes of a length-prefix marker able to encode `max_length`.
///
/// The reference uses 1, 2, 3, or 4 byte markers — the smallest power-of-
/// two-byte width, except that 3-byte markers are permitted in
/// `[2^16, 2^24)` instead of jumping straight to 4.
pub const fn marker_width_for(max_length: usize) -> usize {
    if max_length < (1 << 8) {
        1
    } else if max_length < (1 << 16) {
        2
    } else if max_length < (1 << 24) {
        3
    } else {
        4
    }
}

/// Read a big-endian unsigned integer of `width` bytes (1..=4) from the
/// front of `bytes`.
pub fn read_marker(bytes: &[u8], width: usize) -> Result<usize, ParsingError> {
    require_len(bytes, width)?;
    let mut value: usize = 0;
    for &b in &bytes[..width] {
        value = (value << 8) | b as usize;
    }
    Ok(value)
}

/// Write `value` as a big-endian unsigned integer of `width` bytes.
pub fn write_marker(out: &mut Vec<u8>, width: usize, value: usize) {
    for shift in (0..width).rev() {
        out.push(((value >> (shift * 8)) & 0xff) as u8);
    }
}

/// Parse an opaque (raw-byte) vector: a `width`-byte marker naming the
/// payload length, followed by that many raw bytes. The marker must not
/// exceed the remaining stream, and the payload length must lie in
/// `[min_length, max_length]`.
pub fn parse_opaque_vector(
    bytes: &[u8],
    context: &'static str,
    width: usize,
    min_length: usize,
    max_length: usize,
) -> Result<(Vec<u8>, usize), ParsingError> {
    let length = read_marker(bytes, width)?;
    if length < min_length || length > max_length {
        return Err(ParsingError::LengthOutOfRange {
            context,
            length,
            min: min_length,
            max: max_length,
        });
    }
    require_len(&bytes[width..], length)?;
    let payload = bytes[width..width + length].to_vec();
    Ok((payload, width + length))
}

/// Serialize an opaque vector: `width`-byte marker then raw payload.
pub fn serialize_opaque_vector(payload: &[u8], width: usize, out: &mut Vec<u8>) {
    write_marker(out, width, payload.len());
    out.extend_from_slice(payload);
}

/// Skip an opaque vector without materializing its payload.
pub fn skip_opaque_vector(bytes: &[u8], width: usize) -> Result<usize, ParsingError> {
    let length = read_marker(bytes, width)?;
    require_len(&bytes[width..], length)?;
    Ok(width + length)
}

/// Parse a `Vector<T>`: a `width`-byte marker naming the total payload
/// byte length, followed by back-to-back `T::parse` elements that must
/// exactly fill the declared payload.
pub fn parse_vector<T: Codec>(
    bytes: &[u8],
    context: &'static str,
    width: usize,
    min_length: usize,
    max_length: usize,
) -> Result<(Vec<T>, usize), ParsingError> {
    let length = read_marker(bytes, width)?;
    if length < min_length || length > max_length {
        return Err(ParsingError::LengthOutOfRange {
            context,
            length,
            min: min_length,
            max: max_length,
        });
    }
    require_len(&bytes[width..], length)?;
    let payload = &bytes[width..width + length];

    let mut items = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let (item, consumed) = T::parse(&payload[offset..])?;
        items.push(item);
        offset += consumed;
    }
    if offset != payload.len() {
        return Err(ParsingError::LengthOutOfRange {
            context,
            length: offset,
            min: min_length,
            max: max_length,
        });
    }

    Ok((items, width + length))
}

/// Serialize a `Vector<T>`: `width`-byte marker over the encoded element
/// bytes, then the elements themselves.
pub fn serialize_vector<T: Codec>(items: &[T], width: usize, out: &mut Vec<u8>) {
    let mut payload = Vec::new();
    for item in items {
        item.serialize(&mut payload);
    }
    write_marker(out, width, payload.len());
    out.extend_from_slice(&payload);
}

/// Skip a `Vector<T>` without materializing its elements.
pub fn skip_vector<T: Codec>(bytes: &[u8], width: usize) -> Result<usize, ParsingError> {
    let length = read_marker(bytes, width)?;
    require_len(&bytes[width..], length)?;
    let payload = &bytes[width..width + length];
    let mut offset = 0;
    while offset < payload.len() {
        offset += T::skip(&payload[offset..])?;
    }
    Ok(width + length)
}
