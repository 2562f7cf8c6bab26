//! Recursive descent decoder for binary NBT.
//!
//! The decoder reads one root tag: a type byte, a length-prefixed name, then
//! the payload for that type. Any type is accepted as the root. Compounds
//! and lists are read by recursing into their children, one stack frame per
//! level of nesting.
//!
//! The [`PreserveMode`] only decides the shape of the result. Both modes
//! parse the wire data the same way; [`PreserveMode::Plain`] then converts the
//! finished [`Tag`] tree into [`Plain`] values.
//!
//! Decoding is all or nothing: any structural error aborts the decode and
//! nothing partial is returned.
//!
//! ```
//! use nbtcodec::de::Decoder;
//! use nbtcodec::{DecodeOpts, Tag};
//! # fn main() -> nbtcodec::error::Result<()> {
//! // Two roots back to back, as found in some network protocols.
//! let mut bytes = Tag::new_string("a").encode(false)?;
//! bytes.extend(Tag::new_byte(1)?.encode(false)?);
//!
//! let mut decoder = Decoder::from_slice(&bytes, DecodeOpts::default());
//! assert_eq!(decoder.next_tag()?.unwrap().get_string()?, "a");
//! assert_eq!(decoder.next_tag()?.unwrap().get_integer()?, 1);
//! # Ok(())
//! # }
//! ```
use std::borrow::Cow;
use std::convert::TryFrom;
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::input::{try_size, Input, Pull, Pulled, Slice};
use crate::{Compound, Encoding, List, Node, Plain, Tag, TagType, Value};

// Upper bound on capacity reserved up front for a list, whatever its declared
// size. Larger lists grow as elements actually arrive.
const PREALLOC_LIMIT: usize = 4096;

/// Options for the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOpts {
    max_seq_len: usize,
    allow_end_root: bool,
    encoding: Encoding,
}

impl Default for DecodeOpts {
    fn default() -> Self {
        Self {
            max_seq_len: i32::MAX as usize,
            allow_end_root: false,
            encoding: Encoding::Utf8,
        }
    }
}

impl DecodeOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of elements accepted for any list or array. Larger
    /// declared counts fail with [`ErrorKind::InvalidLength`][crate::error::ErrorKind].
    pub fn max_seq_len(mut self, max: usize) -> Self {
        self.max_seq_len = max;
        self
    }

    /// Accept a lone End tag as the root. [`Decoder::next_tag`] then returns
    /// `None`, and [`Decoder::decode`] an empty compound.
    pub fn allow_end_root(mut self, allow: bool) -> Self {
        self.allow_end_root = allow;
        self
    }

    /// Encoding of names and strings in the input.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// The shape of a decode result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreserveMode {
    /// Every value is a [`Tag`], with names and types.
    #[default]
    Tag,
    /// Every value is a native [`Plain`] value.
    Plain,
}

/// A preserve mode name that is neither `"tag"` nor `"plain"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl std::fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown preserve mode {:?}, expected tag or plain", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for PreserveMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownMode> {
        match s {
            "tag" => Ok(PreserveMode::Tag),
            "plain" => Ok(PreserveMode::Plain),
            other => Err(UnknownMode(other.to_owned())),
        }
    }
}

/// Result of a decode, in the shape asked for by the [`PreserveMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Tag(Tag),
    Plain(Plain),
}

impl Decoded {
    /// The tag tree, if decoded in [`PreserveMode::Tag`].
    pub fn into_tag(self) -> Option<Tag> {
        match self {
            Decoded::Tag(t) => Some(t),
            Decoded::Plain(_) => None,
        }
    }

    /// The plain value tree, converting a tag tree if needed.
    pub fn into_plain(self) -> Plain {
        match self {
            Decoded::Tag(t) => t.into_plain(),
            Decoded::Plain(p) => p,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Decoded::Tag(t) => Some(t),
            Decoded::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<&Plain> {
        match self {
            Decoded::Tag(_) => None,
            Decoded::Plain(p) => Some(p),
        }
    }
}

/// Decodes tags from an [`Input`].
pub struct Decoder<I: Input> {
    input: I,
    opts: DecodeOpts,
}

impl<'a> Decoder<Slice<'a>> {
    /// Decoder reading from a buffer in memory.
    pub fn from_slice(data: &'a [u8], opts: DecodeOpts) -> Self {
        Self::new(Slice::new(data), opts)
    }
}

impl<P: Pull> Decoder<Pulled<P>> {
    /// Decoder asking `source` for bytes as it needs them.
    pub fn from_pull(source: P, opts: DecodeOpts) -> Self {
        Self::new(Pulled::new(source), opts)
    }
}

impl<I: Input> Decoder<I> {
    pub fn new(input: I, opts: DecodeOpts) -> Self {
        Self { input, opts }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.input.offset()
    }

    pub fn into_inner(self) -> I {
        self.input
    }

    /// Decode the next root tag.
    ///
    /// Returns `None` if the root is an End tag and the options allow that.
    pub fn next_tag(&mut self) -> Result<Option<Tag>> {
        let start = self.input.offset();
        let tag_type = self.consume_tag_type()?;

        if tag_type == TagType::End {
            if self.opts.allow_end_root {
                return Ok(None);
            }
            log::debug!("rejecting TAG_End as root at byte {}", start);
            return Err(Error::malformed("root tag is TAG_End").at(start));
        }

        let name = self.consume_str()?;
        let value = self.read_value(tag_type)?;
        Ok(Some(Tag::from_parts(name, value)))
    }

    /// Decode the next root tag in the shape given by `mode`.
    pub fn decode(&mut self, mode: PreserveMode) -> Result<Decoded> {
        let tag = self.read_root()?;
        Ok(match mode {
            PreserveMode::Tag => Decoded::Tag(tag),
            PreserveMode::Plain => Decoded::Plain(tag.into_plain()),
        })
    }

    pub(crate) fn read_root(&mut self) -> Result<Tag> {
        Ok(self
            .next_tag()?
            .unwrap_or_else(|| Tag::new(Compound::new())))
    }

    fn consume_tag_type(&mut self) -> Result<TagType> {
        let offset = self.input.offset();
        let tag = self.input.consume(1)?[0];
        TagType::try_from(tag).map_err(|_| Error::invalid_tag(tag).at(offset))
    }

    fn consume_str(&mut self) -> Result<String> {
        let offset = self.input.offset();
        let len = BigEndian::read_u16(self.input.consume(2)?) as usize;
        let data = self.input.consume(len)?;

        let s = match self.opts.encoding {
            Encoding::Utf8 => std::str::from_utf8(data).map(Cow::Borrowed).ok(),
            Encoding::JavaCesu8 => cesu8::from_java_cesu8(data).ok(),
        };

        s.map(Cow::into_owned)
            .ok_or_else(|| Error::nonunicode(data).at(offset))
    }

    /// Read a list or array count, checking it against the options and
    /// against the input that could possibly follow.
    fn consume_count(&mut self, min_element_size: usize) -> Result<usize> {
        let offset = self.input.offset();
        let size = BigEndian::read_i32(self.input.consume(4)?);
        let bytes = try_size(size, min_element_size).map_err(|e| e.at(offset))?;

        let count = size as usize;
        if count > self.opts.max_seq_len {
            log::debug!("declared size {} at byte {} over limit", count, offset);
            return Err(Error::invalid_length(format!(
                "size ({}) greater than max sequence length ({})",
                count, self.opts.max_seq_len,
            ))
            .at(offset));
        }

        self.input.check_available(bytes)?;
        Ok(count)
    }

    fn read_value(&mut self, tag_type: TagType) -> Result<Value> {
        Ok(match tag_type {
            TagType::End => {
                return Err(Error::malformed("unexpected TAG_End").at(self.input.offset()))
            }
            TagType::Byte => Value::Byte(self.input.consume(1)?[0] as i8),
            TagType::Short => Value::Short(BigEndian::read_i16(self.input.consume(2)?)),
            TagType::Int => Value::Int(BigEndian::read_i32(self.input.consume(4)?)),
            TagType::Long => Value::Long(BigEndian::read_i64(self.input.consume(8)?)),
            TagType::Float => Value::Float(BigEndian::read_f32(self.input.consume(4)?)),
            TagType::Double => Value::Double(BigEndian::read_f64(self.input.consume(8)?)),
            TagType::String => Value::String(self.consume_str()?),
            TagType::ByteArray => {
                let count = self.consume_count(1)?;
                let data = self.input.consume(count)?;
                Value::ByteArray(data.iter().map(|b| *b as i8).collect())
            }
            TagType::IntArray => {
                let count = self.consume_count(4)?;
                let data = self.input.consume(count * 4)?;
                let mut values = vec![0; count];
                BigEndian::read_i32_into(data, &mut values);
                Value::IntArray(values)
            }
            TagType::LongArray => {
                let count = self.consume_count(8)?;
                let data = self.input.consume(count * 8)?;
                let mut values = vec![0; count];
                BigEndian::read_i64_into(data, &mut values);
                Value::LongArray(values)
            }
            TagType::List => Value::List(self.read_list()?),
            TagType::Compound => Value::Compound(self.read_compound()?),
        })
    }

    fn read_list(&mut self) -> Result<List> {
        let offset = self.input.offset();
        let element = self.consume_tag_type()?;
        let count = self.consume_count(min_payload_size(element))?;

        // End values have no payload, so a long list of them would be a
        // cheap way to ask for a lot of memory. An empty one is fine and
        // common.
        if element == TagType::End && count != 0 {
            return Err(Error::malformed(format!(
                "list of TAG_End with {} elements",
                count
            ))
            .at(offset));
        }

        let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        for _ in 0..count {
            let value = self.read_value(element)?;
            items.push(Node::new(Tag::from_parts(String::new(), value)));
        }

        Ok(List::from_nodes(element, items))
    }

    fn read_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::new();
        loop {
            let tag_type = self.consume_tag_type()?;
            if tag_type == TagType::End {
                break;
            }

            let name = self.consume_str()?;
            let value = self.read_value(tag_type)?;
            compound.push_unchecked(Tag::from_parts(name, value));
        }
        Ok(compound)
    }
}

/// Fewest bytes a payload of this type can take on the wire.
fn min_payload_size(tag_type: TagType) -> usize {
    match tag_type {
        TagType::End => 0,
        TagType::Byte => 1,
        TagType::Short => 2,
        TagType::Int | TagType::Float => 4,
        TagType::Long | TagType::Double => 8,
        TagType::String => 2,
        TagType::ByteArray | TagType::IntArray | TagType::LongArray => 4,
        TagType::List => 5,
        TagType::Compound => 1,
    }
}
