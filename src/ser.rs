//! Encoding [`Value`] trees as framed BSER messages.

use std::io;
use std::marker::PhantomData;

use byteorder::{ByteOrder, NativeEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::value::Value;
use crate::Tag;

/// Body lengths past this cannot be decoded by the peers this codec talks
/// to, so the encoder refuses to frame them.
const MAX_BODY_LEN: usize = i32::MAX as usize;

/// Writes [`Value`] trees as framed BSER messages.
///
/// Integers, including every length prefix, are written at the smallest
/// width that represents them. Object entries are written in the object's
/// iteration order; apply [`Object::sort_keys`](crate::Object::sort_keys)
/// first for a canonical byte stream.
pub struct Encoder<W, B = NativeEndian> {
    writer: W,
    _marker: PhantomData<B>,
}

impl<W> Encoder<W, NativeEndian>
where
    W: io::Write,
{
    /// Construct an encoder writing in the host's native byte order.
    #[inline]
    pub fn native(writer: W) -> Self {
        Encoder::new(writer)
    }
}

impl<W, B> Encoder<W, B>
where
    W: io::Write,
    B: ByteOrder,
{
    /// Construct an encoder writing multi-byte integers in the order `B`.
    #[inline]
    pub fn new(writer: W) -> Self {
        Encoder {
            writer,
            _marker: PhantomData,
        }
    }

    /// Write `value` as one complete message: magic, length, body.
    ///
    /// The body is staged in memory first; the envelope's length field
    /// cannot be emitted until the body's size is known.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        let mut body = Vec::with_capacity(128);
        Encoder::<_, B>::new(&mut body).write_value(value)?;
        if body.len() > MAX_BODY_LEN {
            return Err(Error::LengthOverMax(body.len() as i64));
        }

        self.writer.write_all(&[0x00, 0x01])?;
        self.write_int(body.len() as i64)?;
        self.writer.write_all(&body)?;
        Ok(())
    }

    #[inline]
    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.writer.write_u8(tag as u8)?;
        Ok(())
    }

    /// Write an integer at the smallest width that represents it.
    fn write_int(&mut self, v: i64) -> Result<()> {
        if i64::from(i8::MIN) <= v && v <= i64::from(i8::MAX) {
            self.write_tag(Tag::Int8)?;
            self.writer.write_i8(v as i8)?;
        } else if i64::from(i16::MIN) <= v && v <= i64::from(i16::MAX) {
            self.write_tag(Tag::Int16)?;
            self.writer.write_i16::<B>(v as i16)?;
        } else if i64::from(i32::MIN) <= v && v <= i64::from(i32::MAX) {
            self.write_tag(Tag::Int32)?;
            self.writer.write_i32::<B>(v as i32)?;
        } else {
            self.write_tag(Tag::Int64)?;
            self.writer.write_i64::<B>(v)?;
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_tag(Tag::String)?;
        self.write_int(s.len() as i64)?;
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.write_tag(Tag::Null),
            Value::Bool(true) => self.write_tag(Tag::True),
            Value::Bool(false) => self.write_tag(Tag::False),
            Value::Int8(v) => self.write_int(i64::from(*v)),
            Value::Int16(v) => self.write_int(i64::from(*v)),
            Value::Int32(v) => self.write_int(i64::from(*v)),
            Value::Int64(v) => self.write_int(*v),
            Value::Real(v) => {
                self.write_tag(Tag::Real)?;
                self.writer.write_f64::<B>(*v)?;
                Ok(())
            }
            Value::String(s) => self.write_str(s),
            Value::Array(items) => {
                self.write_tag(Tag::Array)?;
                self.write_int(items.len() as i64)?;
                for item in items {
                    self.write_value(item)?;
                }
                Ok(())
            }
            Value::Object(object) => {
                self.write_tag(Tag::Object)?;
                self.write_int(object.len() as i64)?;
                for (key, entry) in object {
                    self.write_str(key)?;
                    self.write_value(entry)?;
                }
                Ok(())
            }
        }
    }
}

/// Encode `value` as one framed message into the IO stream, in native
/// byte order.
pub fn to_writer<W>(writer: W, value: &Value) -> Result<()>
where
    W: io::Write,
{
    Encoder::native(writer).encode(value)
}

/// Encode `value` as one framed message in a byte vector, in native byte
/// order.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    to_writer(&mut out, value)?;
    Ok(out)
}
