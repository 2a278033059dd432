//! The [`Envelope`] model and its canonical binary encoding.
//!
//! An envelope bundles a per-resource data-encryption key, its IV, and the
//! list of users allowed to recover them. The canonical byte form defined
//! here is the **only** payload ever handed to or received from the KMS
//! boundary; it never crosses the external request boundary, which speaks
//! JSON instead (see [`crate::protocol`]).
//!
//! # Canonical byte format
//!
//! Tag-length-value fields, concatenated in fixed order on encode:
//!
//! ```text
//! field 1 (0x0A): dek bytes            — omitted when empty
//! field 2 (0x12): iv bytes             — omitted when empty
//! field 3 (0x1A): authorized user      — repeated, one per list entry
//! ```
//!
//! Tags and lengths are LEB128 varints; every field is length-delimited.
//! The decoder accepts fields in any order, accumulates repeated fields in
//! arrival order, skips unknown fields, and rejects truncated input.

use bytes::Buf;
use thiserror::Error;

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

const FIELD_DEK: u64 = 1;
const FIELD_IV: u64 = 2;
const FIELD_USER: u64 = 3;

/// Errors produced while decoding canonical envelope bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended in the middle of a tag, length, or value.
    #[error("truncated input")]
    Truncated,

    /// A varint ran past its maximum width.
    #[error("varint overflow")]
    VarintOverflow,

    /// A declared length does not fit in memory on this platform.
    #[error("length overflow")]
    LengthOverflow,

    /// An authorized-user entry is not valid UTF-8.
    #[error("field {0} is not valid UTF-8")]
    InvalidUtf8(u64),

    /// A field used a wire type this format never emits.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),
}

/// Plaintext bundle protecting one resource: DEK, IV, and the identities
/// allowed to recover them.
///
/// Both byte fields are opaque, arbitrary-length, and never interpreted
/// here. User identifiers keep their order and duplicates across a
/// round-trip. An envelope lives only for the duration of a seal or open
/// call; it is never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Data-encryption key bytes.
    pub dek: Vec<u8>,
    /// Initialization vector for the downstream cipher that will use the DEK.
    pub iv: Vec<u8>,
    /// Identities permitted to open this envelope, in caller-supplied order.
    pub authorized_users: Vec<String>,
}

impl Envelope {
    /// Encode this envelope into its canonical byte form.
    ///
    /// Empty `dek`/`iv` fields and an empty user list are omitted entirely,
    /// so `Envelope::default()` encodes to zero bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        if !self.dek.is_empty() {
            put_field(&mut buf, FIELD_DEK, &self.dek);
        }
        if !self.iv.is_empty() {
            put_field(&mut buf, FIELD_IV, &self.iv);
        }
        for user in &self.authorized_users {
            put_field(&mut buf, FIELD_USER, user.as_bytes());
        }
        buf
    }

    /// Decode canonical bytes back into an [`Envelope`].
    ///
    /// Fields may arrive in any order; the last occurrence of `dek`/`iv`
    /// wins and every `authorized_users` occurrence is appended. Unknown
    /// fields are skipped so that input carrying trailing additions still
    /// decodes.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] on truncated or length-inconsistent input
    /// rather than reading out of bounds.
    pub fn decode(mut buf: &[u8]) -> Result<Self, CodecError> {
        let mut envelope = Envelope::default();
        while buf.has_remaining() {
            let key = get_varint(&mut buf)?;
            let field = key >> 3;
            let wire_type = (key & 0x07) as u8;
            match (field, wire_type) {
                (FIELD_DEK, WIRE_LEN) => envelope.dek = get_bytes(&mut buf)?,
                (FIELD_IV, WIRE_LEN) => envelope.iv = get_bytes(&mut buf)?,
                (FIELD_USER, WIRE_LEN) => {
                    let raw = get_bytes(&mut buf)?;
                    let user =
                        String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8(FIELD_USER))?;
                    envelope.authorized_users.push(user);
                }
                (_, wire_type) => skip_field(&mut buf, wire_type)?,
            }
        }
        Ok(envelope)
    }

    fn encoded_len(&self) -> usize {
        // Two-byte tag+length headers cover every field under 128 bytes;
        // longer values just grow the Vec once more.
        self.dek.len()
            + self.iv.len()
            + self.authorized_users.iter().map(|u| u.len()).sum::<usize>()
            + 2 * (2 + self.authorized_users.len())
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.debug_struct("Envelope")
            .field("dek", &"[REDACTED]")
            .field("iv", &format_args!("{} bytes", self.iv.len()))
            .field("authorized_users", &self.authorized_users)
            .finish()
    }
}

/// Result of a successful open: the recovered key material.
///
/// `authorized_users` is consumed by the access check and never re-exposed.
#[derive(Clone, PartialEq, Eq)]
pub struct Dek {
    /// Recovered data-encryption key bytes.
    pub dek: Vec<u8>,
    /// Recovered initialization vector.
    pub iv: Vec<u8>,
}

impl std::fmt::Debug for Dek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dek")
            .field("dek", &"[REDACTED]")
            .field("iv", &format_args!("{} bytes", self.iv.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire primitives
// ---------------------------------------------------------------------------

fn put_field(buf: &mut Vec<u8>, field: u64, value: &[u8]) {
    put_varint(buf, field << 3 | u64::from(WIRE_LEN));
    put_varint(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push(value as u8 | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn get_varint(buf: &mut &[u8]) -> Result<u64, CodecError> {
    let mut value = 0u64;
    for shift in (0..64).step_by(7) {
        if !buf.has_remaining() {
            return Err(CodecError::Truncated);
        }
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(CodecError::VarintOverflow)
}

fn get_bytes(buf: &mut &[u8]) -> Result<Vec<u8>, CodecError> {
    let len = get_varint(buf)?;
    let len = usize::try_from(len).map_err(|_| CodecError::LengthOverflow)?;
    if buf.remaining() < len {
        return Err(CodecError::Truncated);
    }
    let mut value = vec![0u8; len];
    buf.copy_to_slice(&mut value);
    Ok(value)
}

fn skip_field(buf: &mut &[u8], wire_type: u8) -> Result<(), CodecError> {
    match wire_type {
        WIRE_VARINT => {
            get_varint(buf)?;
        }
        WIRE_FIXED64 => advance(buf, 8)?,
        WIRE_LEN => {
            let len = get_varint(buf)?;
            let len = usize::try_from(len).map_err(|_| CodecError::LengthOverflow)?;
            advance(buf, len)?;
        }
        WIRE_FIXED32 => advance(buf, 4)?,
        other => return Err(CodecError::UnsupportedWireType(other)),
    }
    Ok(())
}

fn advance(buf: &mut &[u8], len: usize) -> Result<(), CodecError> {
    if buf.remaining() < len {
        return Err(CodecError::Truncated);
    }
    buf.advance(len);
    Ok(())
}
