//! Decoding BSER messages into [`Value`] trees.
//!
//! A message is one envelope: the `00 01` magic, a length-type tag, the
//! body length at the width that tag selects, and then the body. The
//! decoder validates the envelope, buffers the body whole, and parses the
//! single value inside it. Every byte of the body must be consumed by
//! exactly one value.

use std::io;
use std::marker::PhantomData;

use byteorder::{ByteOrder, NativeEndian};

use crate::error::{Error, Result};
use crate::value::{Object, Value};
use crate::{KeyOrdering, Tag};

/// The body buffer is addressed by 32-bit offsets; longer bodies are
/// rejected.
const MAX_BODY_LEN: i64 = i32::MAX as i64;

/// Nesting ceiling for the recursive descent.
const MAX_DEPTH: usize = 128;

/// Reads framed BSER messages from octet streams.
///
/// The decoder is stateless between calls: each [`decode`](Decoder::decode)
/// consumes one envelope from the stream and leaves it positioned
/// immediately after. The only configuration is the key-ordering policy.
///
/// The second type parameter is the wire byte order, native by default.
/// BSER integers are written in the producer's native order, so peers on
/// unlike architectures must agree on an explicit [`ByteOrder`] via
/// [`with_byte_order`](Decoder::with_byte_order).
pub struct Decoder<B = NativeEndian> {
    key_ordering: KeyOrdering,
    _marker: PhantomData<B>,
}

impl Decoder<NativeEndian> {
    /// Construct a decoder reading in the host's native byte order.
    #[inline]
    pub fn new(key_ordering: KeyOrdering) -> Self {
        Decoder::with_byte_order(key_ordering)
    }
}

impl<B> Decoder<B>
where
    B: ByteOrder,
{
    /// Construct a decoder reading multi-byte integers in the order `B`.
    #[inline]
    pub fn with_byte_order(key_ordering: KeyOrdering) -> Self {
        Decoder {
            key_ordering,
            _marker: PhantomData,
        }
    }

    /// Read one framed message from `reader` and decode its value tree.
    ///
    /// On success the reader is positioned immediately after the envelope;
    /// on error its position is unspecified. The reader is never closed.
    pub fn decode<R>(&self, mut reader: R) -> Result<Value>
    where
        R: io::Read,
    {
        let body = self.read_envelope(&mut reader)?;
        let mut cursor = Cursor::<B>::new(&body);
        let value = self.read_value(&mut cursor, 0)?;
        let leftover = cursor.remaining();
        if leftover != 0 {
            return Err(Error::TrailingBody(leftover));
        }
        Ok(value)
    }

    /// Validate the envelope and buffer the body it declares.
    ///
    /// The body buffer is not allocated until the declared length has
    /// passed the range check.
    fn read_envelope<R>(&self, reader: &mut R) -> Result<Vec<u8>>
    where
        R: io::Read,
    {
        let mut sniff = [0u8; 3];
        let got = read_full(reader, &mut sniff)?;
        if got < sniff.len() {
            return Err(Error::TruncatedHeader {
                expected: sniff.len(),
                got,
            });
        }
        if sniff[0] != 0x00 || sniff[1] != 0x01 {
            return Err(Error::InvalidMagic);
        }

        let width = match sniff[2] {
            0x03 => 1,
            0x04 => 2,
            0x05 => 4,
            0x06 => 8,
            tag => return Err(Error::UnrecognizedLengthType(tag & 0x0f)),
        };

        let mut raw = [0u8; 8];
        let got = read_full(reader, &mut raw[..width])?;
        if got < width {
            return Err(Error::TruncatedLength {
                expected: width,
                got,
            });
        }
        let len = match width {
            1 => i64::from(raw[0] as i8),
            2 => i64::from(B::read_i16(&raw[..2])),
            4 => i64::from(B::read_i32(&raw[..4])),
            _ => B::read_i64(&raw[..8]),
        };

        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        if len > MAX_BODY_LEN {
            return Err(Error::LengthOverMax(len));
        }

        let len = len as usize;
        let mut body = vec![0u8; len];
        let got = read_full(reader, &mut body)?;
        if got < len {
            // Body truncation reuses the header diagnostic; see error.rs.
            return Err(Error::TruncatedHeader { expected: len, got });
        }
        Ok(body)
    }

    fn read_value(&self, cursor: &mut Cursor<'_, B>, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(Error::DepthLimitExceeded(MAX_DEPTH));
        }

        let byte = cursor.read_u8()?;
        let tag = Tag::from_byte(byte).ok_or(Error::UnrecognizedValueType(byte))?;
        match tag {
            Tag::Array => {
                let count = self.read_length(cursor)?;
                // An element is at least one tag byte, so a real count
                // never exceeds the bytes left.
                let mut items = Vec::with_capacity(clamped(count, cursor.remaining()));
                for _ in 0..count {
                    items.push(self.read_value(cursor, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            Tag::Object => {
                let count = self.read_length(cursor)?;
                let mut object = Object::with_capacity(clamped(count, cursor.remaining()));
                for _ in 0..count {
                    let key_tag = cursor.read_u8()?;
                    if key_tag != Tag::String as u8 {
                        return Err(Error::UnrecognizedKeyType(key_tag));
                    }
                    let key = self.read_string(cursor)?;
                    let value = self.read_value(cursor, depth + 1)?;
                    object.insert(key, value);
                }
                if self.key_ordering == KeyOrdering::Sorted {
                    object.sort_keys();
                }
                Ok(Value::Object(object))
            }
            Tag::String => Ok(Value::String(self.read_string(cursor)?)),
            Tag::Int8 => Ok(Value::Int8(cursor.read_i8()?)),
            Tag::Int16 => Ok(Value::Int16(cursor.read_i16()?)),
            Tag::Int32 => Ok(Value::Int32(cursor.read_i32()?)),
            Tag::Int64 => Ok(Value::Int64(cursor.read_i64()?)),
            Tag::Real => Ok(Value::Real(cursor.read_f64()?)),
            Tag::True => Ok(Value::Bool(true)),
            Tag::False => Ok(Value::Bool(false)),
            Tag::Null => Ok(Value::Null),
        }
    }

    /// Read a length prefix: an integer-tagged integer, non-negative.
    fn read_length(&self, cursor: &mut Cursor<'_, B>) -> Result<u64> {
        let byte = cursor.read_u8()?;
        let len = match Tag::from_byte(byte) {
            Some(Tag::Int8) => i64::from(cursor.read_i8()?),
            Some(Tag::Int16) => i64::from(cursor.read_i16()?),
            Some(Tag::Int32) => i64::from(cursor.read_i32()?),
            Some(Tag::Int64) => cursor.read_i64()?,
            _ => return Err(Error::UnrecognizedIntType(byte)),
        };
        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        Ok(len as u64)
    }

    /// Read a length-prefixed, UTF-8 validated string payload.
    fn read_string(&self, cursor: &mut Cursor<'_, B>) -> Result<String> {
        let len = self.read_length(cursor)?;
        let bytes = cursor.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Clamp a wire-declared element count to a sane preallocation.
fn clamped(count: u64, remaining: usize) -> usize {
    count.min(remaining as u64) as usize
}

/// Read until `buf` is full or the stream ends, returning the byte count.
///
/// The envelope diagnostics need the exact shortfall, which
/// `read_exact` does not report.
fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: io::Read,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Position-bounded view over the buffered body.
///
/// Every read checks the bytes remaining before advancing, so a parse can
/// never run past `body_length`.
struct Cursor<'a, B> {
    body: &'a [u8],
    pos: usize,
    _marker: PhantomData<B>,
}

impl<'a, B> Cursor<'a, B>
where
    B: ByteOrder,
{
    fn new(body: &'a [u8]) -> Self {
        Cursor {
            body,
            pos: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.body.len() - self.pos
    }

    fn take(&mut self, n: u64) -> Result<&'a [u8]> {
        if n > self.remaining() as u64 {
            return Err(Error::UnexpectedEof {
                need: n,
                remaining: self.remaining() as u64,
            });
        }
        let n = n as usize;
        let bytes = &self.body[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    fn read_i16(&mut self) -> Result<i16> {
        Ok(B::read_i16(self.take(2)?))
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        Ok(B::read_i32(self.take(4)?))
    }

    #[inline]
    fn read_i64(&mut self) -> Result<i64> {
        Ok(B::read_i64(self.take(8)?))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64> {
        Ok(B::read_f64(self.take(8)?))
    }
}

/// Decode one message from an `io::Read`, preserving wire key order.
///
/// Build a [`Decoder`] directly for sorted keys or an explicit byte order.
pub fn from_reader<R>(reader: R) -> Result<Value>
where
    R: io::Read,
{
    Decoder::new(KeyOrdering::Unsorted).decode(reader)
}

/// Decode a byte slice holding exactly one message, preserving wire key
/// order. Bytes past the envelope are an error.
pub fn from_slice(bytes: &[u8]) -> Result<Value> {
    let mut rest = bytes;
    let value = Decoder::new(KeyOrdering::Unsorted).decode(&mut rest)?;
    if !rest.is_empty() {
        return Err(Error::TrailingBytes(rest.len()));
    }
    Ok(value)
}
