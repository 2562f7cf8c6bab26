//! Binary writer for tag trees.
//!
//! Numbers are written big-endian at the width of their type. Strings and
//! names are an unsigned 16-bit byte length followed by the encoded text.
//! Compounds write each child as a full record (type, name, payload) in
//! order and finish with a single End byte. Lists write the element type, a
//! signed 32-bit count, then only the payload of each element.
//!
//! ```
//! use nbtcodec::Tag;
//! # fn main() -> nbtcodec::error::Result<()> {
//! let tag = Tag::new_short(258)?.with_name("a");
//!
//! assert_eq!(tag.encode(false)?, [2, 0, 1, b'a', 1, 2]);
//! assert_eq!(tag.encode(true)?, [1, 2]);
//! # Ok(())
//! # }
//! ```
mod write_nbt;

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::Result;
use crate::{Compound, Encoding, List, Tag, TagType, Value};

use self::write_nbt::{encoded_str, WriteNbt};

/// Options for the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOpts {
    encoding: Encoding,
}

impl EncodeOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding of names and strings in the output.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Write `tag` to `writer`. With `noprefix` only the payload is written.
pub fn to_writer<W: Write>(tag: &Tag, writer: W, noprefix: bool, opts: &EncodeOpts) -> Result<()> {
    let mut encoder = Encoder {
        writer,
        encoding: opts.encoding,
    };
    if noprefix {
        encoder.write_value(tag.value())
    } else {
        encoder.write_tag(tag)
    }
}

impl Tag {
    /// The wire form of this tag and everything below it.
    ///
    /// With `noprefix` the type byte and name are left out and only the
    /// payload is written, which is how list elements appear on the wire.
    /// Without it the full record is written; this crate will decode any
    /// tag type at the root, but many other readers expect a compound there.
    pub fn encode(&self, noprefix: bool) -> Result<Vec<u8>> {
        self.encode_with(noprefix, &EncodeOpts::default())
    }

    pub fn encode_with(&self, noprefix: bool, opts: &EncodeOpts) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len(noprefix, opts));
        to_writer(self, &mut out, noprefix, opts)?;
        Ok(out)
    }

    /// Stream the wire form of this tag to `writer`.
    pub fn write_to<W: Write>(&self, writer: W, noprefix: bool) -> Result<()> {
        to_writer(self, writer, noprefix, &EncodeOpts::default())
    }

    /// Number of bytes [`Tag::encode_with`] produces for this tag when it
    /// succeeds.
    pub fn encoded_len(&self, noprefix: bool, opts: &EncodeOpts) -> usize {
        let payload = value_size(self.value(), opts.encoding);
        if noprefix {
            payload
        } else {
            1 + string_size(self.name(), opts.encoding) + payload
        }
    }
}

fn value_size(value: &Value, encoding: Encoding) -> usize {
    match value {
        Value::Byte(_) => 1,
        Value::Short(_) => 2,
        Value::Int(_) => 4,
        Value::Long(_) => 8,
        Value::Float(_) => 4,
        Value::Double(_) => 8,
        Value::ByteArray(v) => 4 + v.len(),
        Value::String(v) => string_size(v, encoding),
        Value::List(l) => {
            1 + 4
                + l.iter()
                    .map(|n| value_size(n.read().value(), encoding))
                    .sum::<usize>()
        }
        Value::Compound(c) => {
            c.iter()
                .map(|n| {
                    let child = n.read();
                    1 + string_size(child.name(), encoding) + value_size(child.value(), encoding)
                })
                .sum::<usize>()
                + 1
        }
        Value::IntArray(v) => 4 + v.len() * 4,
        Value::LongArray(v) => 4 + v.len() * 8,
    }
}

fn string_size(s: &str, encoding: Encoding) -> usize {
    2 + encoded_str(s, encoding).len()
}

struct Encoder<W> {
    writer: W,
    encoding: Encoding,
}

impl<W: Write> Encoder<W> {
    /// Full record: type, name, payload.
    fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        self.writer.write_tag_type(tag.type_id())?;
        self.writer.write_size_prefixed_str(tag.name(), self.encoding)?;
        self.write_value(tag.value())
    }

    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => self.writer.write_i8(*v)?,
            Value::Short(v) => self.writer.write_i16::<BigEndian>(*v)?,
            Value::Int(v) => self.writer.write_i32::<BigEndian>(*v)?,
            Value::Long(v) => self.writer.write_i64::<BigEndian>(*v)?,
            Value::Float(v) => self.writer.write_f32::<BigEndian>(*v)?,
            Value::Double(v) => self.writer.write_f64::<BigEndian>(*v)?,
            Value::String(v) => self.writer.write_size_prefixed_str(v, self.encoding)?,
            Value::ByteArray(v) => {
                self.writer.write_len(v.len(), TagType::ByteArray)?;
                let bytes: Vec<u8> = v.iter().map(|b| *b as u8).collect();
                self.writer.write_all(&bytes)?;
            }
            Value::IntArray(v) => {
                self.writer.write_len(v.len(), TagType::IntArray)?;
                for i in v {
                    self.writer.write_i32::<BigEndian>(*i)?;
                }
            }
            Value::LongArray(v) => {
                self.writer.write_len(v.len(), TagType::LongArray)?;
                for l in v {
                    self.writer.write_i64::<BigEndian>(*l)?;
                }
            }
            Value::List(l) => self.write_list(l)?,
            Value::Compound(c) => self.write_compound(c)?,
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List) -> Result<()> {
        self.writer.write_tag_type(list.element_type())?;
        self.writer.write_len(list.len(), TagType::List)?;
        for node in list {
            self.write_value(node.read().value())?;
        }
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound) -> Result<()> {
        for node in compound {
            self.write_tag(&node.read())?;
        }
        self.writer.write_tag_type(TagType::End)
    }
}
