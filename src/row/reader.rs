
//! Read the rows of one or more images from a byte stream, one row at a time.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use log::{trace, warn};

use crate::error::{Result, RowError, UnitResult};
use crate::io::{PeekRead, Tracking, skip_whitespace};
use crate::meta::{ImageDescriptor, ReadOptions};
use crate::row::Row;
use crate::row::codec::RowCodec;


/// Decode the header from a byte source, keeping the source ready for reading rows.
/// Continue by calling `read_row` exactly `height` times,
/// and then `next_image` to find out whether another image follows.
#[derive(Debug)]
pub struct Reader<R> {
    descriptor: ImageDescriptor,
    remaining_reader: PeekRead<Tracking<R>>,
    options: ReadOptions,
    codec: RowCodec,

    /// Index of the row that the next read returns.
    next_row: usize,

    /// Index of the current image in a multi-image stream.
    image_index: usize,
}

impl Reader<BufReader<File>> {

    /// Open a file and read the header of the first image.
    pub fn open(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        Self::read_from_buffered(BufReader::new(File::open(path)?), options)
    }
}

impl<R: Read> Reader<R> {

    /// Start the reading process.
    /// Immediately decodes the header of the first image.
    /// The source should be buffered, as headers and plain rows are read byte by byte.
    pub fn read_from_buffered(read: R, options: ReadOptions) -> Result<Self> {
        let mut remaining_reader = PeekRead::new(Tracking::new(read));
        let descriptor = ImageDescriptor::read_from_buffered_peekable(&mut remaining_reader, &options)?;

        Ok(Reader {
            descriptor, remaining_reader, options,
            codec: RowCodec::default(),
            next_row: 0,
            image_index: 0,
        })
    }

    /// The header of the current image.
    pub fn descriptor(&self) -> &ImageDescriptor { &self.descriptor }

    /// Zero for the first image of the stream, incremented by each successful `next_image`.
    pub fn image_index(&self) -> usize { self.image_index }

    /// The index of the row that the next call to `read_row` returns.
    pub fn next_row_index(&self) -> usize { self.next_row }

    /// The number of rows of the current image that have not been read yet.
    pub fn remaining_rows(&self) -> usize { self.descriptor.height() - self.next_row }

    /// The number of bytes consumed from the source so far.
    pub fn byte_position(&self) -> usize { self.remaining_reader.inner().byte_position() }

    /// A row buffer that fits the current image.
    pub fn allocate_row(&self) -> Row {
        Row::new(self.descriptor.width(), self.descriptor.depth)
    }

    /// Read the next row of the current image.
    /// Fails with `AllRowsConsumed` after `height` rows.
    pub fn read_row(&mut self) -> Result<Row> {
        let mut row = self.allocate_row();
        self.read_row_into(&mut row)?;
        Ok(row)
    }

    /// Read the next row of the current image into an existing buffer,
    /// which must have the width and depth of the image.
    pub fn read_row_into(&mut self, row: &mut Row) -> UnitResult {
        if self.next_row >= self.descriptor.height() {
            return Err(RowError::AllRowsConsumed { height: self.descriptor.height() }.into());
        }

        self.codec.decode_into(&mut self.remaining_reader, &self.descriptor, self.next_row, row)?;
        self.next_row += 1;
        Ok(())
    }

    /// Read the next row and discard it. The samples are still validated.
    pub fn skip_row(&mut self) -> UnitResult {
        let mut row = self.allocate_row();
        self.read_row_into(&mut row)
    }

    /// Iterate over the rows of the current image that have not been read yet.
    /// Stops after the first error.
    pub fn rows(&mut self) -> Rows<'_, R> {
        Rows { reader: self, failed: false }
    }

    /// Advance to the next image of a multi-image stream.
    /// Rows of the current image that have not been read are skipped first.
    ///
    /// Returns `false` if the stream ends after the current image,
    /// ignoring trailing whitespace, and `true` if another header was parsed.
    /// Fails if the remaining bytes do not start with a valid header.
    /// After returning `false`, further calls keep returning `false`.
    pub fn next_image(&mut self) -> Result<bool> {
        let remaining_rows = self.remaining_rows();

        if remaining_rows != 0 {
            warn!(
                "skipping {} unread rows of image {}",
                remaining_rows, self.image_index
            );

            let mut row = self.allocate_row();
            for _ in 0 .. remaining_rows {
                self.read_row_into(&mut row)?;
            }
        }

        skip_whitespace(&mut self.remaining_reader)?;

        if self.remaining_reader.is_at_end()? {
            trace!("stream ends after image {}", self.image_index);
            return Ok(false);
        }

        self.descriptor = ImageDescriptor::read_from_buffered_peekable(&mut self.remaining_reader, &self.options)?;
        self.next_row = 0;
        self.image_index += 1;

        trace!("image {} starts at byte {}", self.image_index, self.byte_position());
        Ok(true)
    }

    /// Give up reading, returning the byte source.
    /// Reading plain samples looks one byte past the last digit,
    /// so after a plain row the separator following it is lost.
    pub fn into_inner(self) -> R {
        self.remaining_reader.into_inner().into_inner()
    }
}


/// Iterates over the remaining rows of the current image of a `Reader`.
#[derive(Debug)]
pub struct Rows<'r, R> {
    reader: &'r mut Reader<R>,
    failed: bool,
}

impl<R: Read> Iterator for Rows<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.remaining_rows() == 0 {
            return None;
        }

        let row = self.reader.read_row();
        self.failed = row.is_err();
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.failed { 0 } else { self.reader.remaining_rows() };
        (0, Some(remaining))
    }
}
