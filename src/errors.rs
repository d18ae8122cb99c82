//! Error handling.
//!
//! Everything in this crate that can fail returns a `PduResult`. Some of the variants here
//! (`MalformedAddress` and `UnsupportedEncoding`) are raised by the sub-codecs, but the decoder
//! catches them and records them as informational fields instead of aborting; see the `decode`
//! module for details.

/// An error encountered while decoding or encoding a PDU.
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum PduError {
    /// The input was not a valid hex string.
    #[fail(display = "Malformed input at character {}: {}", position, reason)]
    MalformedInput {
        position: usize,
        reason: &'static str
    },
    /// A field's declared length runs past the end of the available data.
    #[fail(display = "PDU truncated while reading {} at offset {}: needed {} byte(s), {} remaining",
           field, offset, needed, remaining)]
    TruncatedField {
        field: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize
    },
    /// An address decoded into something that is mostly non-printable.
    #[fail(display = "Malformed address: {:?}", _0)]
    MalformedAddress(String),
    /// A Data Coding Scheme octet outside the supported set.
    #[fail(display = "Unsupported data coding scheme: {:02X}", _0)]
    UnsupportedEncoding(u8),
    /// Strict decoding was requested, and TP-MTI disagrees with the declared PDU type.
    #[fail(display = "TP-MTI {} does not match declared PDU type {}", mti, declared)]
    MtiMismatch {
        declared: &'static str,
        mti: u8
    },
    /// The encoder needs a value the caller didn't supply.
    #[fail(display = "Missing parameter: {}", _0)]
    MissingParameter(&'static str),
    /// A textual timestamp couldn't be parsed.
    #[fail(display = "Invalid timestamp: {}", _0)]
    InvalidTimestamp(String),
    /// A PDU type name other than `sms-deliver` or `sms-submit`.
    #[fail(display = "Unknown PDU type: {}", _0)]
    UnknownPduType(String),
    /// An encoding name other than `7bit`, `8bit` or `ucs2`.
    #[fail(display = "Unknown encoding: {}", _0)]
    UnknownEncoding(String),
    /// An address given to the encoder has more digits than its length field allows.
    #[fail(display = "{} address too long: {} semi-octets (limit {})", field, length, limit)]
    AddressTooLong {
        field: &'static str,
        length: usize,
        limit: usize
    },
    /// The message doesn't fit into a single PDU.
    #[fail(display = "Message too long: {} units (limit {})", units, limit)]
    MessageTooLong {
        units: usize,
        limit: usize
    },
}
pub type PduResult<T> = Result<T, PduError>;
