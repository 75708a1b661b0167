
//! Error type definitions.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::io::ErrorKind;

pub use std::io::Error as IoError;
pub use std::io::Result as IoResult;


/// A result that may contain a netpbm error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a netpbm error.
pub type UnitResult = Result<()>;


/// An error that may happen while reading or writing a netpbm stream.
/// Distinguishes between two error cases that belong to the image
/// (the header or a raster row is broken) and the error cases of the byte stream.
#[derive(Debug)]
pub enum Error {

    /// The header of the current image could not be parsed.
    /// The stream cannot be used any further.
    Header(HeaderError),

    /// A raster row could not be decoded or encoded,
    /// or rows were requested in an invalid order or quantity.
    Row(RowError),

    /// The requested operation would need a pixel transformation
    /// that this library does not implement,
    /// for example converting colors to gray.
    NotSupported(Cow<'static, str>),

    /// The arguments of a call do not fit together,
    /// for example a row buffer of a different depth than the image.
    Invalid(Cow<'static, str>),

    /// The underlying byte stream could not be read or written.
    Io(IoError),
}

/// The header of an image is broken. Every variant is fatal for the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {

    /// The first two bytes are not one of `P1` to `P7`.
    BadMagic([u8; 2]),

    /// A header token is not what the grammar expects at this place.
    MalformedToken(Cow<'static, str>),

    /// A mandatory PAM header field was not present before `ENDHDR`.
    MissingField(&'static str),

    /// A PAM header line starts with a keyword that is not known.
    UnrecognizedField(String),

    /// A value was parsed successfully, but lies outside its valid bounds.
    OutOfRange(&'static str, u64),

    /// The stream ended in the middle of the header.
    UnexpectedEof,
}

/// A raster row is broken, or rows were used in the wrong quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {

    /// The stream ended in the middle of the row with the specified index.
    TruncatedRow { row: usize },

    /// A sample in the row was larger than the maximum value of the image.
    SampleOutOfRange { row: usize, sample: u32, maxval: u16 },

    /// A plain row contained a byte that cannot start a sample.
    MalformedSample { row: usize, byte: u8 },

    /// All rows of the current image have already been read or written.
    AllRowsConsumed { height: usize },

    /// The image was closed before all of its rows were written.
    MissingRows { written: usize, height: usize },
}


impl Error {

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }

    /// Create an error of the variant `NotSupported`.
    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Error::NotSupported(message.into())
    }

    /// Create a header error complaining about a malformed token.
    pub(crate) fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Header(HeaderError::MalformedToken(message.into()))
    }

    /// Create a header error complaining about a value outside its bounds.
    pub(crate) fn out_of_range(name: &'static str, value: impl Into<u64>) -> Self {
        Error::Header(HeaderError::OutOfRange(name, value.into()))
    }

    /// Whether the error was caused by the stream ending too early,
    /// either in a header or in a row.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(
            self,
            Error::Header(HeaderError::UnexpectedEof) | Error::Row(RowError::TruncatedRow { .. })
        ) || matches!(self, Error::Io(error) if error.kind() == ErrorKind::UnexpectedEof)
    }

    /// Interpret a premature end of the stream as a truncated row.
    /// Leaves all other errors untouched.
    pub(crate) fn in_row(self, row: usize) -> Self {
        match self {
            Error::Io(error) if error.kind() == ErrorKind::UnexpectedEof =>
                Error::Row(RowError::TruncatedRow { row }),

            Error::Header(HeaderError::UnexpectedEof) =>
                Error::Row(RowError::TruncatedRow { row }),

            other => other,
        }
    }

    /// Interpret a premature end of the stream as a truncated header.
    /// Leaves all other errors untouched.
    pub(crate) fn in_header(self) -> Self {
        match self {
            Error::Io(error) if error.kind() == ErrorKind::UnexpectedEof =>
                Error::Header(HeaderError::UnexpectedEof),

            other => other,
        }
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}

impl From<HeaderError> for Error {
    fn from(error: HeaderError) -> Self {
        Error::Header(error)
    }
}

impl From<RowError> for Error {
    fn from(error: RowError) -> Self {
        Error::Row(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Header(error) => write!(formatter, "invalid header: {}", error),
            Error::Row(error) => write!(formatter, "invalid row: {}", error),
            Error::NotSupported(message) => write!(formatter, "not supported: {}", message),
            Error::Invalid(message) => write!(formatter, "invalid: {}", message),
            Error::Io(error) => error.fmt(formatter),
        }
    }
}

impl fmt::Display for HeaderError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::BadMagic([first, second]) => write!(
                formatter, "expected a magic number from P1 to P7, found {:#04X?} {:#04X?}",
                first, second
            ),

            HeaderError::MalformedToken(message) => write!(formatter, "malformed {}", message),
            HeaderError::MissingField(name) => write!(formatter, "missing {} line", name),
            HeaderError::UnrecognizedField(name) => write!(formatter, "unrecognized header line {:?}", name),
            HeaderError::OutOfRange(name, value) => write!(formatter, "{} {} is out of range", name, value),
            HeaderError::UnexpectedEof => formatter.write_str("stream ended inside the header"),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::TruncatedRow { row } =>
                write!(formatter, "stream ended inside row {}", row),

            RowError::SampleOutOfRange { row, sample, maxval } =>
                write!(formatter, "sample {} in row {} exceeds maxval {}", sample, row, maxval),

            RowError::MalformedSample { row, byte } =>
                write!(formatter, "unexpected byte {:#04X?} in row {}", byte, row),

            RowError::AllRowsConsumed { height } =>
                write!(formatter, "all {} rows have already been processed", height),

            RowError::MissingRows { written, height } =>
                write!(formatter, "image closed after {} of {} rows", written, height),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Header(error) => Some(error),
            Error::Row(error) => Some(error),
            _ => None,
        }
    }
}

impl std::error::Error for HeaderError {}
impl std::error::Error for RowError {}


/// Convert a header dimension to `usize`, returning an error if it does not fit the platform.
#[inline]
pub(crate) fn u32_to_usize(value: u32, name: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::out_of_range(name, value))
}

/// Panics on overflow.
#[inline]
pub(crate) fn usize_to_u64(value: usize) -> u64 {
    u64::try_from(value).expect("usize does not fit into u64")
}

/// Multiply sizes that come from an untrusted header.
#[inline]
pub(crate) fn checked_size(factors: &[usize], name: &'static str) -> Result<usize> {
    factors.iter().try_fold(1_usize, |product, &factor| product.checked_mul(factor))
        .ok_or_else(|| Error::out_of_range(name, u64::MAX))
}
