use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding or encoding BSER messages.
///
/// The framing diagnostics are a wire-level contract: producers match on
/// them to tell truncation apart from corruption, so the strings are
/// stable identifiers rather than free-form prose. `Invalid BSER header`
/// is deliberately reused for body truncation for continuity with
/// existing consumers.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended inside the three-byte magic/length-type prefix,
    /// or inside the message body.
    #[error("Invalid BSER header (expected {expected} bytes, got {got} bytes)")]
    TruncatedHeader { expected: usize, got: usize },

    /// The first two bytes were not the `00 01` magic.
    #[error("Invalid BSER header")]
    InvalidMagic,

    /// The envelope's length-type tag is not an integer tag. Carries the
    /// tag's low nibble.
    #[error("Unrecognized BSER header length type {0}")]
    UnrecognizedLengthType(u8),

    /// The stream ended inside the envelope's length field.
    #[error("Invalid BSER header length (expected {expected} bytes, got {got} bytes)")]
    TruncatedLength { expected: usize, got: usize },

    /// A declared length (envelope or in-body) was negative.
    #[error("BSER length out of range ({0} < 0)")]
    NegativeLength(i64),

    /// The envelope declared a body longer than the 2 GiB buffer cap.
    #[error("BSER length out of range ({0} > 2147483647)")]
    LengthOverMax(i64),

    /// A value's type tag is not defined by the protocol.
    #[error("Unrecognized BSER value type {0}")]
    UnrecognizedValueType(u8),

    /// A length prefix was introduced by a non-integer tag.
    #[error("Unrecognized BSER int type {0}")]
    UnrecognizedIntType(u8),

    /// An object key was not a string.
    #[error("Unrecognized BSER object key type {0}, expected string")]
    UnrecognizedKeyType(u8),

    /// A fixed-width or counted read ran past the end of the body.
    #[error("Unexpected end of BSER body (need {need} bytes, remaining {remaining})")]
    UnexpectedEof { need: u64, remaining: u64 },

    /// The top-level value ended before the body did.
    #[error("BSER body contains {0} unconsumed bytes")]
    TrailingBody(usize),

    /// A slice handed to [`from_slice`](crate::from_slice) held more than
    /// one message's worth of bytes.
    #[error("{0} trailing bytes after BSER message")]
    TrailingBytes(usize),

    /// Value nesting exceeded the decoder's fixed recursion ceiling.
    #[error("BSER value nesting exceeds depth limit ({0})")]
    DepthLimitExceeded(usize),

    /// A string payload was not well-formed UTF-8.
    #[error("Invalid UTF-8 in BSER string: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// The underlying stream failed; propagated unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Coarse error category, per the protocol's error taxonomy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Structural failure: truncation, bad magic, unknown tags, lengths
    /// out of range, wrong key types.
    Framing,
    /// A declared string payload was not valid UTF-8.
    CharacterCoding,
    /// The underlying stream failed.
    Io,
}

impl Error {
    /// The category this error belongs to.
    ///
    /// Callers log character-coding problems separately from protocol
    /// problems; everything that is not UTF-8 or I/O is framing.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Utf8(_) => ErrorKind::CharacterCoding,
            Error::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Framing,
        }
    }
}
