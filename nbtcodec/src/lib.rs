//! nbtcodec encodes and decodes the NBT (Named Binary Tag) binary format: a
//! self-describing tree of typed values used by *Minecraft* and others to
//! store structured data.
//!
//! * For the tag tree and its constructors see [`Tag`].
//! * For decoding see [`decode`], [`decode_pull`] and [`de::Decoder`].
//! * For native values produced by plain mode see [`Plain`].
//!
//! This crate does no decompression. Callers supply already decompressed
//! bytes, or a pull source that yields decompressed bytes.
//!
//! # Quick example
//!
//! ```
//! use nbtcodec::{decode, PreserveMode, Tag};
//!
//! # fn main() -> nbtcodec::error::Result<()> {
//! let root = Tag::new_compound(vec![
//!     Tag::new_string("hi").with_name("greeting"),
//!     Tag::new_int(42)?.with_name("answer"),
//! ])?;
//!
//! let bytes = root.encode(false)?;
//! let back = decode(&bytes, PreserveMode::Tag)?.into_tag();
//! assert_eq!(back.as_ref(), Some(&root));
//!
//! let plain = decode(&bytes, PreserveMode::Plain)?.into_plain();
//! assert_eq!(plain["answer"], 42);
//! # Ok(())
//! # }
//! ```
//!
//! # Streaming input
//!
//! [`decode_pull`] takes anything implementing [`Pull`], including closures
//! of the form `FnMut(usize) -> Result<Vec<u8>, E>`. Each call must return at
//! least the requested number of bytes. [`decode_reader`] wraps an
//! [`std::io::Read`], which makes it easy to decode straight out of a
//! decompressor:
//!
//! ```no_run
//! use flate2::read::GzDecoder;
//! use nbtcodec::{decode_reader, PreserveMode};
//!
//! let file = std::fs::File::open("level.dat").unwrap();
//! let root = decode_reader(GzDecoder::new(file), PreserveMode::Tag).unwrap();
//! println!("{}", root.into_tag().unwrap());
//! ```

use std::convert::TryFrom;
use std::io::Read;

pub mod de;
pub mod error;
pub mod input;
pub mod ser;

mod container;
mod plain;
mod pretty;
mod tag;

pub use container::{Compound, CompoundMut, List, ListMut, Node};
pub use de::{DecodeOpts, Decoded, PreserveMode};
pub use input::{Pull, ReadSource};
pub use plain::Plain;
pub use ser::EncodeOpts;
pub use tag::{Tag, Value};

use de::Decoder;
use error::Result;

#[cfg(test)]
mod test;

/// The kind of an NBT tag. This does not carry the value or the name of the
/// data.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[repr(u8)]
pub enum TagType {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of unnamed values that all share one type.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
    /// Represents as array of Long (i64).
    LongArray = 12,
}

impl TagType {
    /// The conventional `TAG_*` name of this type, as shown in dumps.
    pub const fn name(self) -> &'static str {
        match self {
            TagType::End => "TAG_End",
            TagType::Byte => "TAG_Byte",
            TagType::Short => "TAG_Short",
            TagType::Int => "TAG_Int",
            TagType::Long => "TAG_Long",
            TagType::Float => "TAG_Float",
            TagType::Double => "TAG_Double",
            TagType::ByteArray => "TAG_Byte_Array",
            TagType::String => "TAG_String",
            TagType::List => "TAG_List",
            TagType::Compound => "TAG_Compound",
            TagType::IntArray => "TAG_Int_Array",
            TagType::LongArray => "TAG_Long_Array",
        }
    }

    /// Whether values of this type are numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            TagType::Byte
                | TagType::Short
                | TagType::Int
                | TagType::Long
                | TagType::Float
                | TagType::Double
        )
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Crates exist to generate this code for us, but the tags will very rarely
// change so writing it out is not a burden.
impl TryFrom<u8> for TagType {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, ()> {
        use TagType::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<TagType> for u8 {
    fn from(tag: TagType) -> Self {
        tag as u8
    }
}

/// String encoding used for names and String payloads on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Standard UTF-8.
    #[default]
    Utf8,
    /// Java's modified UTF-8 (CESU-8 with an encoded NUL), as written by
    /// *Minecraft: Java Edition*.
    JavaCesu8,
}

/// Decode a complete tag from a buffer.
///
/// Any tag type is accepted as the root. Bytes after the root are ignored.
pub fn decode(input: &[u8], mode: PreserveMode) -> Result<Decoded> {
    decode_with(input, mode, &DecodeOpts::default())
}

/// Decode a complete tag from a buffer using the given options.
///
/// If the root is an End tag and [`DecodeOpts::allow_end_root`] is set, the
/// result is an empty, unnamed compound.
pub fn decode_with(input: &[u8], mode: PreserveMode, opts: &DecodeOpts) -> Result<Decoded> {
    let mut decoder = Decoder::from_slice(input, opts.clone());
    let decoded = decoder.decode(mode)?;

    let rest = decoder.into_inner().remaining();
    if rest != 0 {
        log::debug!("ignoring {} trailing bytes after root tag", rest);
    }

    Ok(decoded)
}

/// Decode a complete tag, pulling bytes from `source` as they are needed.
pub fn decode_pull<P: Pull>(source: P, mode: PreserveMode) -> Result<Decoded> {
    Decoder::from_pull(source, DecodeOpts::default()).decode(mode)
}

/// Decode a complete tag from any reader. The reader must produce
/// uncompressed data.
pub fn decode_reader<R: Read>(reader: R, mode: PreserveMode) -> Result<Decoded> {
    decode_pull(ReadSource::new(reader), mode)
}

/// Decode a buffer into a [`Tag`] tree.
pub fn from_bytes(input: &[u8]) -> Result<Tag> {
    Decoder::from_slice(input, DecodeOpts::default()).read_root()
}

/// Encode a tag and its subtree. With `noprefix` only the payload is
/// written, without the type byte and name.
pub fn encode(tag: &Tag, noprefix: bool) -> Result<Vec<u8>> {
    tag.encode(noprefix)
}
