
//! Write the rows of one or more images to a byte stream, one row at a time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::trace;

use crate::error::{Result, RowError, UnitResult};
use crate::io::Tracking;
use crate::meta::ImageDescriptor;
use crate::row::Row;
use crate::row::codec::{DEFAULT_PLAIN_LINE_WIDTH, RowCodec};


/// Write an image by writing one row after another in a closure.
/// In the closure, you are provided a row writer, which must be used to write all the rows.
/// After the closure, the image is checked for completeness, and the destination is flushed.
/// Assumes that your write destination is buffered.
pub fn write_rows_with<W: Write>(
    buffered_write: W, descriptor: ImageDescriptor, options: WriteOptions,
    write_rows: impl FnOnce(&mut Writer<W>) -> UnitResult
) -> Result<W>
{
    // this closure approach ensures that after writing all rows, the image is always checked and flushed
    let mut writer = Writer::new_for_buffered(buffered_write, descriptor, options)?;
    write_rows(&mut writer)?;
    writer.finish()
}


/// How rows and headers are formatted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WriteOptions {

    /// Plain rows are wrapped before a line exceeds this number of characters.
    pub plain_line_width: usize,

    /// Whether the comments of a descriptor are written to the header.
    pub emit_comments: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { plain_line_width: DEFAULT_PLAIN_LINE_WIDTH, emit_comments: true }
    }
}


/// Writes the header and then the rows of an image to a byte destination.
/// Exactly `height` rows must be written before calling `finish` or `next_image`.
#[derive(Debug)]
#[must_use]
pub struct Writer<W> {
    descriptor: ImageDescriptor,
    byte_writer: Tracking<W>,
    options: WriteOptions,
    codec: RowCodec,
    written_rows: usize,
}

impl Writer<BufWriter<File>> {

    /// Create a file and write the header of the first image.
    /// Call `finish` after all rows are written, which flushes the file.
    pub fn create(path: impl AsRef<Path>, descriptor: ImageDescriptor, options: WriteOptions) -> Result<Self> {
        Self::new_for_buffered(BufWriter::new(File::create(path)?), descriptor, options)
    }
}

impl<W: Write> Writer<W> {

    /// Immediately writes the header of the first image.
    pub fn new_for_buffered(buffered_write: W, descriptor: ImageDescriptor, options: WriteOptions) -> Result<Self> {
        let mut byte_writer = Tracking::new(buffered_write);
        descriptor.write(&mut byte_writer, options.emit_comments)?;

        Ok(Writer {
            codec: RowCodec::new(options.plain_line_width),
            descriptor, byte_writer, options,
            written_rows: 0,
        })
    }

    /// The header of the current image.
    pub fn descriptor(&self) -> &ImageDescriptor { &self.descriptor }

    /// The number of rows that still have to be written for the current image.
    pub fn remaining_rows(&self) -> usize { self.descriptor.height() - self.written_rows }

    /// The number of bytes written so far.
    pub fn byte_position(&self) -> usize { self.byte_writer.byte_position() }

    /// Write the next row of the current image.
    /// Any more calls after `height` rows result in an error and have no effect.
    /// If writing results in an error, the stream may remain in an invalid state
    /// and should not be used further.
    pub fn write_row(&mut self, row: &Row) -> UnitResult {
        if self.written_rows >= self.descriptor.height() {
            return Err(RowError::AllRowsConsumed { height: self.descriptor.height() }.into());
        }

        self.codec.encode(&mut self.byte_writer, &self.descriptor, self.written_rows, row)?;
        self.written_rows += 1;
        Ok(())
    }

    /// Write all rows produced by the iterator.
    pub fn write_all_rows<'r>(&mut self, rows: impl IntoIterator<Item = &'r Row>) -> UnitResult {
        for row in rows {
            self.write_row(row)?;
        }

        Ok(())
    }

    /// Start another image in the same stream, after the current image is complete.
    pub fn next_image(&mut self, descriptor: ImageDescriptor) -> UnitResult {
        self.check_complete()?;

        descriptor.write(&mut self.byte_writer, self.options.emit_comments)?;
        self.descriptor = descriptor;
        self.written_rows = 0;

        trace!("next image starts at byte {}", self.byte_position());
        Ok(())
    }

    /// Check that all rows have been written, flush, and return the byte destination.
    pub fn finish(mut self) -> Result<W> {
        self.check_complete()?;
        self.byte_writer.flush()?;
        Ok(self.byte_writer.into_inner())
    }

    fn check_complete(&self) -> UnitResult {
        if self.written_rows < self.descriptor.height() {
            return Err(RowError::MissingRows {
                written: self.written_rows,
                height: self.descriptor.height()
            }.into());
        }

        Ok(())
    }
}
