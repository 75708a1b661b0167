
//! Specialized binary and text input and output.
//! Uses the error handling for this crate.

pub use ::std::io::{Read, Write};
use lebe::prelude::*;
use crate::error::{Error, HeaderError, IoResult, Result};


/// Peek a single byte without consuming it.
/// Distinguishes the end of the stream from a byte,
/// which is how clean image boundaries are detected.
#[derive(Debug)]
pub struct PeekRead<T> {

    /// Cannot be exposed as it will not contain peeked values anymore.
    inner: T,

    /// `Some(None)` remembers that the end of the stream was reached.
    peeked: Option<Option<u8>>,
}

impl<T: Read> PeekRead<T> {

    #[inline]
    pub fn new(inner: T) -> Self {
        Self { inner, peeked: None }
    }

    /// Read a single byte and return that without consuming it.
    /// The next `read` call will include that byte.
    /// Returns `None` at the end of the stream.
    #[inline]
    pub fn peek_u8(&mut self) -> IoResult<Option<u8>> {
        if let Some(peeked) = self.peeked {
            return Ok(peeked);
        }

        let byte = read_optional_u8(&mut self.inner)?;
        self.peeked = Some(byte);
        Ok(byte)
    }

    /// Read a single byte, returning `None` at the end of the stream.
    #[inline]
    pub fn next_u8(&mut self) -> IoResult<Option<u8>> {
        let byte = self.peek_u8()?;
        self.peeked = None;
        Ok(byte)
    }

    /// Skip a single byte if it equals the specified value.
    /// Returns whether the value was found.
    #[inline]
    pub fn skip_if_eq(&mut self, value: u8) -> IoResult<bool> {
        if self.peek_u8()? == Some(value) {
            self.peeked = None;
            Ok(true)
        }
        else {
            Ok(false)
        }
    }

    /// Whether no more bytes can be read from the stream.
    #[inline]
    pub fn is_at_end(&mut self) -> IoResult<bool> {
        Ok(self.peek_u8()?.is_none())
    }

    /// The wrapped reader. A byte that has been peeked but not consumed is lost.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> PeekRead<T> {

    /// The wrapped reader.
    pub fn inner(&self) -> &T { &self.inner }
}

impl<T: Read> Read for PeekRead<T> {
    fn read(&mut self, target_buffer: &mut [u8]) -> IoResult<usize> {
        if target_buffer.is_empty() {
            return Ok(0)
        }

        match self.peeked.take() {
            None => self.inner.read(target_buffer),
            Some(None) => Ok(0),
            Some(Some(peeked)) => {
                target_buffer[0] = peeked;

                // indexing [1..] is safe because an empty buffer already returned ok
                Ok(1 + self.inner.read(&mut target_buffer[1..])?)
            }
        }
    }
}

/// Read one byte, retrying on interruption. Returns `None` at the end of the stream.
fn read_optional_u8(read: &mut impl Read) -> IoResult<Option<u8>> {
    let mut byte = [0_u8];

    loop {
        match read.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}


/// Keep track of what byte we are at.
#[derive(Debug)]
pub struct Tracking<T> {

    /// Do not expose to prevent reading without updating position
    inner: T,

    position: usize,
}

impl<T: Read> Read for Tracking<T> {
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        let count = self.inner.read(buffer)?;
        self.position += count;
        Ok(count)
    }
}

impl<T: Write> Write for Tracking<T> {
    fn write(&mut self, buffer: &[u8]) -> IoResult<usize> {
        let count = self.inner.write(buffer)?;
        self.position += count;
        Ok(count)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.inner.flush()
    }
}

impl<T> Tracking<T> {

    pub fn new(inner: T) -> Self {
        Tracking { inner, position: 0 }
    }

    /// Current number of bytes written or read.
    pub fn byte_position(&self) -> usize {
        self.position
    }

    /// The wrapped stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}


/// Whitespace as understood by the C locale,
/// which includes the vertical tab.
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0B
}

/// Skip whitespace and `#` comments, which extend to the end of the line.
/// Stops before the first byte that belongs to a token, or at the end of the stream.
pub fn skip_whitespace_and_comments(read: &mut PeekRead<impl Read>) -> IoResult<()> {
    while let Some(byte) = read.peek_u8()? {
        if byte == b'#' {
            skip_line(read)?;
        }
        else if is_whitespace(byte) {
            read.next_u8()?;
        }
        else {
            break;
        }
    }

    Ok(())
}

/// Skip whitespace only. Comments are left in the stream.
pub fn skip_whitespace(read: &mut PeekRead<impl Read>) -> IoResult<()> {
    while let Some(byte) = read.peek_u8()? {
        if !is_whitespace(byte) { break; }
        read.next_u8()?;
    }

    Ok(())
}

/// Consume everything up to and including the next line feed.
fn skip_line(read: &mut PeekRead<impl Read>) -> IoResult<()> {
    while let Some(byte) = read.next_u8()? {
        if byte == b'\n' { break; }
    }

    Ok(())
}

/// Longest accepted header line, without the line feed.
pub const MAX_HEADER_LINE_LENGTH: usize = 4096;

/// Read the bytes of one line, without the line feed.
/// A header must never end without a line feed, so the end of the stream is an error.
/// Lines longer than `MAX_HEADER_LINE_LENGTH` are malformed.
pub fn read_header_line(read: &mut PeekRead<impl Read>) -> Result<Vec<u8>> {
    let mut line = Vec::new();

    loop {
        match read.next_u8()? {
            None => return Err(Error::Header(HeaderError::UnexpectedEof)),
            Some(b'\n') => return Ok(line),
            Some(_) if line.len() == MAX_HEADER_LINE_LENGTH => return Err(Error::malformed("header line too long")),
            Some(byte) => line.push(byte),
        }
    }
}

/// Read an unsigned decimal header token, skipping preceding whitespace and comments.
/// The byte that ends the token is not consumed.
pub fn read_header_decimal(read: &mut PeekRead<impl Read>, name: &'static str) -> Result<u32> {
    skip_whitespace_and_comments(read)?;

    match read.peek_u8()? {
        None => return Err(Error::Header(HeaderError::UnexpectedEof)),
        Some(byte) if !byte.is_ascii_digit() => return Err(Error::malformed(name)),
        Some(_) => {}
    }

    let mut value = 0_u64;
    while let Some(digit) = read.peek_u8()?.filter(u8::is_ascii_digit) {
        read.next_u8()?;
        value = value * 10 + u64::from(digit - b'0');

        if value > u64::from(u32::MAX) {
            return Err(Error::out_of_range(name, value));
        }
    }

    // cannot fail, checked in the loop
    Ok(value as u32)
}

/// Parse a complete unsigned decimal number, as found in a PAM header line.
pub fn parse_decimal(token: &[u8], name: &'static str) -> Result<u32> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return Err(Error::malformed(name));
    }

    let mut value = 0_u64;
    for &digit in token {
        value = value * 10 + u64::from(digit - b'0');

        if value > u64::from(u32::MAX) {
            return Err(Error::out_of_range(name, value));
        }
    }

    Ok(value as u32)
}


/// Generic trait that defines common binary operations such as reading and writing for this type.
/// Multi-byte samples are always stored in big endian.
pub trait Data: Sized + Default + Clone {
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Read a value of type `Self`.
    fn read(read: &mut impl Read) -> IoResult<Self>;

    /// Read as many values of type `Self` as fit into the specified slice.
    fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()>;

    /// Write this value to the writer.
    fn write(self, write: &mut impl Write) -> IoResult<()>;

    /// Write all values of that slice to the writer.
    fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()>;
}

macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn read(read: &mut impl Read) -> IoResult<Self> {
                read.read_from_big_endian()
            }

            #[inline]
            fn write(self, write: &mut impl Write) -> IoResult<()> {
                write.write_as_big_endian(&self)
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> IoResult<()> {
                read.read_from_big_endian_into(slice)
            }

            #[inline]
            fn write_slice(write: &mut impl Write, slice: &[Self]) -> IoResult<()> {
                write.write_as_big_endian(slice)
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(u16);
