use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::{Encoding, TagType};

/// Bytes of `s` as they go on the wire in the given encoding.
pub(crate) fn encoded_str(s: &str, encoding: Encoding) -> Cow<'_, [u8]> {
    match encoding {
        Encoding::Utf8 => Cow::Borrowed(s.as_bytes()),
        Encoding::JavaCesu8 => cesu8::to_java_cesu8(s),
    }
}

pub(crate) trait WriteNbt: Write {
    fn write_tag_type(&mut self, tag: TagType) -> Result<()> {
        self.write_u8(tag as u8)?;
        Ok(())
    }

    fn write_size_prefixed_str(&mut self, s: &str, encoding: Encoding) -> Result<()> {
        let data = encoded_str(s, encoding);
        let len = u16::try_from(data.len()).map_err(|_| {
            Error::encode(format!(
                "string of length {} exceeds maximum of u16::MAX",
                data.len()
            ))
        })?;
        self.write_u16::<BigEndian>(len)?;
        self.write_all(&data)?;
        Ok(())
    }

    /// Write the count of a list or array.
    fn write_len(&mut self, len: usize, what: TagType) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            Error::encode(format!(
                "{} of length {} exceeds maximum of i32::MAX",
                what, len
            ))
        })?;
        self.write_i32::<BigEndian>(len)?;
        Ok(())
    }
}

impl<T> WriteNbt for T where T: Write {}
