//! Byte sources for the decoder.
//!
//! The decoder only ever asks its input for "the next N bytes". [`Slice`]
//! serves those requests from a buffer already in memory. [`Pulled`] serves
//! them from a [`Pull`] source that is asked for more data on demand, keeping
//! any surplus for later requests. Both are forward only.
use std::convert::TryFrom;
use std::io::Read;

use crate::error::{BoxError, Error, Result};

mod private {
    // Only this crate can implement this trait. Other traits can inherit from
    // Sealed in order to prevent other crates from creating implementations.
    pub trait Sealed {}
}

/// A source of uncompressed NBT bytes that is asked for data on demand.
///
/// Each call to [`pull`][Pull::pull] must return **at least** `min` bytes, or
/// fail. Returning more is fine, the surplus is kept for later. Returning
/// fewer is treated as the input ending early. An error is passed on
/// unchanged as the cause of the decode error.
///
/// Closures implement this trait:
///
/// ```
/// use nbtcodec::{decode_pull, PreserveMode, Tag};
/// # fn main() -> nbtcodec::error::Result<()> {
/// let bytes = Tag::new_int(7)?.with_name("n").encode(false)?;
/// let mut pos = 0;
///
/// let tag = decode_pull(
///     |min: usize| -> Result<Vec<u8>, std::io::Error> {
///         let chunk = bytes[pos..pos + min].to_vec();
///         pos += min;
///         Ok(chunk)
///     },
///     PreserveMode::Tag,
/// )?;
/// assert_eq!(tag.into_tag().unwrap().get_integer()?, 7);
/// # Ok(())
/// # }
/// ```
pub trait Pull {
    fn pull(&mut self, min: usize) -> std::result::Result<Vec<u8>, BoxError>;
}

impl<F, E> Pull for F
where
    F: FnMut(usize) -> std::result::Result<Vec<u8>, E>,
    E: Into<BoxError>,
{
    fn pull(&mut self, min: usize) -> std::result::Result<Vec<u8>, BoxError> {
        self(min).map_err(Into::into)
    }
}

const READ_CHUNK: usize = 8 * 1024;

/// Adapts an [`std::io::Read`] into a [`Pull`] source. Reads until at least
/// the requested number of bytes have arrived or the reader runs dry, and may
/// read ahead up to 8 KiB.
pub struct ReadSource<R: Read> {
    reader: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Pull for ReadSource<R> {
    fn pull(&mut self, min: usize) -> std::result::Result<Vec<u8>, BoxError> {
        // A short result at end of stream is reported by the caller as
        // truncation, so only real io errors are returned here.
        if min > READ_CHUNK {
            let mut buf = Vec::new();
            (&mut self.reader).take(min as u64).read_to_end(&mut buf)?;
            return Ok(buf);
        }

        let mut buf = vec![0; READ_CHUNK];
        let mut filled = 0;
        while filled < min {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

/// Where the decoder gets its bytes from.
pub trait Input: private::Sealed {
    /// Consume exactly `n` bytes.
    #[doc(hidden)]
    fn consume(&mut self, n: usize) -> Result<&[u8]>;

    /// Number of bytes consumed so far.
    fn offset(&self) -> u64;

    /// Fail early if `n` more bytes certainly cannot be provided. Used to
    /// avoid allocating for an absurd declared size.
    #[doc(hidden)]
    fn check_available(&self, _n: usize) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn try_size(size: i32, multiplier: usize) -> Result<usize> {
    let size = usize::try_from(size)
        .map_err(|_| Error::invalid_length(format!("size was negative: {}", size)))?;

    size.checked_mul(multiplier)
        .ok_or_else(|| Error::invalid_length(format!("size too large: {}", size)))
}

/// Input backed by a buffer in memory.
pub struct Slice<'a> {
    data: &'a [u8],
    offset: u64,
}

impl<'a> Slice<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl<'a> private::Sealed for Slice<'a> {}

impl<'a> Input for Slice<'a> {
    fn consume(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.data.len() {
            return Err(Error::unexpected_end(n, self.data.len()).at(self.offset));
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        self.offset += n as u64;
        Ok(head)
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn check_available(&self, n: usize) -> Result<()> {
        if n > self.data.len() {
            return Err(Error::unexpected_end(n, self.data.len()).at(self.offset));
        }
        Ok(())
    }
}

/// Input backed by a [`Pull`] source.
pub struct Pulled<P: Pull> {
    source: P,
    buf: Vec<u8>,
    pos: usize,
    offset: u64,
}

impl<P: Pull> Pulled<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            buf: Vec::new(),
            pos: 0,
            offset: 0,
        }
    }

    /// Bytes already pulled but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn into_inner(self) -> P {
        self.source
    }

    fn fill(&mut self, n: usize) -> Result<()> {
        let available = self.buffered();
        if available >= n {
            return Ok(());
        }

        // Consumed bytes are never requested again, drop them.
        self.buf.drain(..self.pos);
        self.pos = 0;

        let wanted = n - available;
        log::trace!("pulling at least {} bytes at offset {}", wanted, self.offset);
        let chunk = self
            .source
            .pull(wanted)
            .map_err(|e| Error::reader(e).at(self.offset))?;
        log::trace!("pulled {} bytes", chunk.len());

        if chunk.len() < wanted {
            return Err(
                Error::unexpected_end(n, available + chunk.len()).at(self.offset)
            );
        }

        self.buf.extend_from_slice(&chunk);
        Ok(())
    }
}

impl<P: Pull> private::Sealed for Pulled<P> {}

impl<P: Pull> Input for Pulled<P> {
    fn consume(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n)?;
        let start = self.pos;
        self.pos += n;
        self.offset += n as u64;
        Ok(&self.buf[start..start + n])
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}
