//! Codec for the BSER binary protocol supported by Watchman.
//!
//! BSER frames every message in an envelope: the two magic bytes `00 01`,
//! a one-byte integer tag selecting the width of the length field, the
//! length itself, and then a single value tree occupying exactly that many
//! bytes. [`Decoder`] reads one envelope from a stream and materializes
//! the tree as a [`Value`]; [`Encoder`] does the reverse.
//!
//! Multi-byte integers on the wire are in the producer's native byte
//! order. Both halves of the codec default to [`byteorder::NativeEndian`]
//! and accept any [`byteorder::ByteOrder`] for mixed-endian peers.
//!
//! ```no_run
//! use bser::{Decoder, KeyOrdering};
//!
//! # fn main() -> bser::Result<()> {
//! let sock = std::net::TcpStream::connect("127.0.0.1:12345")?;
//! let decoder = Decoder::new(KeyOrdering::Unsorted);
//! let reply = decoder.decode(&sock)?;
//! # Ok(())
//! # }
//! ```

pub mod de;
pub mod error;
pub mod ser;
pub mod value;

pub use crate::de::{from_reader, from_slice, Decoder};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::ser::{to_vec, to_writer, Encoder};
pub use crate::value::{Object, Value};

/// How a decoded object orders its keys.
///
/// Chosen once at [`Decoder`] construction and applied to every object in
/// the message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyOrdering {
    /// Keys iterate in the order they appear on the wire.
    Unsorted,
    /// Keys iterate in ascending order of their UTF-8 code units.
    Sorted,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) enum Tag {
    Array = 0x00,
    Object = 0x01,
    String = 0x02,
    Int8 = 0x03,
    Int16 = 0x04,
    Int32 = 0x05,
    Int64 = 0x06,
    Real = 0x07,
    True = 0x08,
    False = 0x09,
    Null = 0x0a,
}

impl Tag {
    pub(crate) fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0x00 => Some(Tag::Array),
            0x01 => Some(Tag::Object),
            0x02 => Some(Tag::String),
            0x03 => Some(Tag::Int8),
            0x04 => Some(Tag::Int16),
            0x05 => Some(Tag::Int32),
            0x06 => Some(Tag::Int64),
            0x07 => Some(Tag::Real),
            0x08 => Some(Tag::True),
            0x09 => Some(Tag::False),
            0x0a => Some(Tag::Null),
            _ => None,
        }
    }
}
