//! Contains the Error and Result type used throughout the codec.
use std::sync::Arc;

use crate::TagType;

/// Error type produced by a pull source. Carried unchanged as the
/// [`source`][std::error::Error::source] of the decode error it causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building, reading, encoding or decoding tags.
#[derive(Debug, Clone)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
    offset: Option<u64>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An accessor was used on a tag that cannot provide that representation,
    /// or a value of the wrong type was assigned to a tag.
    TypeMismatch,

    /// A constructor was given an element of the wrong type, a value outside
    /// the declared width, or a duplicate compound name.
    Construction,

    /// A value cannot be represented on the wire, eg a string longer than
    /// 65535 bytes.
    Encode,

    /// Input ran out part way through a value.
    UnexpectedEnd,

    /// Byte that does not name a tag type.
    InvalidTag(u8),

    /// Negative or oversized declared length or count.
    InvalidLength,

    /// Expected string data but it was not valid in the configured encoding.
    /// Contained bytes are the invalid data.
    Nonunicode(Vec<u8>),

    /// Structurally invalid data, eg a list of End with elements.
    Malformed,

    /// The pull source reported a failure. The cause is available through
    /// `source()`.
    Reader,

    /// The underlying writer failed.
    Io,
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Byte offset into the input at which a decode error was detected.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Whether this error came from malformed or unavailable input.
    pub fn is_decode(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnexpectedEnd
                | ErrorKind::InvalidTag(_)
                | ErrorKind::InvalidLength
                | ErrorKind::Nonunicode(_)
                | ErrorKind::Malformed
                | ErrorKind::Reader
        )
    }

    /// Whether the input ended before the value was complete.
    pub fn is_truncation(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedEnd)
    }

    pub(crate) fn at(mut self, offset: u64) -> Self {
        self.offset.get_or_insert(offset);
        self
    }

    fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind,
            offset: None,
            source: None,
        }
    }

    pub(crate) fn type_mismatch(wanted: &str, found: TagType) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("cannot get {} of {}", wanted, found),
        )
    }

    pub(crate) fn assign_mismatch(given: TagType, declared: TagType) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("cannot assign {} value to {} tag", given, declared),
        )
    }

    pub(crate) fn construction(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Construction, msg)
    }

    pub(crate) fn out_of_range(value: i64, ty: TagType) -> Self {
        Self::construction(format!("value {} does not fit in {}", value, ty))
    }

    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encode, msg)
    }

    pub(crate) fn unexpected_end(wanted: usize, available: usize) -> Self {
        Self::new(
            ErrorKind::UnexpectedEnd,
            format!(
                "truncated input: needed {} more bytes, only {} available",
                wanted, available
            ),
        )
    }

    pub(crate) fn invalid_tag(tag: u8) -> Self {
        Self::new(
            ErrorKind::InvalidTag(tag),
            format!("invalid nbt tag value: {}", tag),
        )
    }

    pub(crate) fn invalid_length(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidLength, msg)
    }

    pub(crate) fn nonunicode(data: &[u8]) -> Self {
        Self::new(
            ErrorKind::Nonunicode(data.to_vec()),
            format!(
                "invalid nbt string: nonunicode: {}",
                String::from_utf8_lossy(data)
            ),
        )
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, msg)
    }

    pub(crate) fn reader(cause: BoxError) -> Self {
        let mut err = Self::new(ErrorKind::Reader, format!("read source failed: {}", cause));
        err.source = Some(Arc::from(cause));
        err
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)?;
        if let Some(offset) = self.offset {
            write!(f, " (at byte {})", offset)?;
        }
        Ok(())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::UnexpectedEof => ErrorKind::UnexpectedEnd,
            _ => ErrorKind::Io,
        };
        let mut err = Self::new(kind, format!("io error: {}", e));
        err.source = Some(Arc::new(e));
        err
    }
}
