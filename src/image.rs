
//! Read and write complete images, keeping all rows in memory.
//! Use the `row` module to process images of any height in bounded memory.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result, UnitResult};
use crate::meta::{ImageDescriptor, ReadOptions};
use crate::row::{Reader, Row, Sample, Writer, WriteOptions, write_rows_with};


/// The header and all rows of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {

    /// Describes the size, depth and maxval of every row.
    pub descriptor: ImageDescriptor,

    /// All rows from top to bottom.
    pub rows: Vec<Row>,
}

impl Image {

    /// An image of zero tuples.
    pub fn new(descriptor: ImageDescriptor) -> Self {
        let row = Row::new(descriptor.width(), descriptor.depth);
        Image { rows: vec![row; descriptor.height()], descriptor }
    }

    /// Use the rows as an image. Fails if the number or the size of the rows
    /// does not match the descriptor.
    pub fn from_rows(descriptor: ImageDescriptor, rows: Vec<Row>) -> Result<Self> {
        if rows.len() != descriptor.height() {
            return Err(Error::invalid("row count does not match the image height"));
        }

        for row in &rows {
            row.validate_for(&descriptor)?;
        }

        Ok(Image { descriptor, rows })
    }

    /// Read the first image of a stream. Following images are ignored.
    pub fn read_from_buffered(read: impl Read, options: ReadOptions) -> Result<Self> {
        let mut reader = Reader::read_from_buffered(read, options)?;
        read_current_image(&mut reader)
    }

    /// Read the first image of a file.
    pub fn read_from_file(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        Self::read_from_buffered(BufReader::new(File::open(path)?), options)
    }

    /// Write the header and all rows.
    pub fn write_to_buffered(&self, write: impl Write, options: WriteOptions) -> UnitResult {
        write_rows_with(write, self.descriptor.clone(), options, |writer| {
            writer.write_all_rows(&self.rows)
        })?;

        Ok(())
    }

    /// Create a file containing this image.
    pub fn write_to_file(&self, path: impl AsRef<Path>, options: WriteOptions) -> UnitResult {
        self.write_to_buffered(BufWriter::new(File::create(path)?), options)
    }

    /// The tuple at the specified position.
    /// Panics if the position is outside of the image.
    pub fn tuple(&self, x: usize, y: usize) -> &[Sample] {
        self.rows[y].tuple(x)
    }

    /// The tuple at the specified position.
    /// Panics if the position is outside of the image.
    pub fn tuple_mut(&mut self, x: usize, y: usize) -> &mut [Sample] {
        self.rows[y].tuple_mut(x)
    }
}


/// Read every image of a multi-image stream.
pub fn read_all_images_from_buffered(read: impl Read, options: ReadOptions) -> Result<Vec<Image>> {
    let mut reader = Reader::read_from_buffered(read, options)?;
    let mut images = vec![ read_current_image(&mut reader)? ];

    while reader.next_image()? {
        images.push(read_current_image(&mut reader)?);
    }

    Ok(images)
}

/// Write all images into one stream, one after another.
pub fn write_all_images_to_buffered(images: &[Image], write: impl Write, options: WriteOptions) -> UnitResult {
    let (first, rest) = images.split_first()
        .ok_or_else(|| Error::invalid("no images to write"))?;

    let mut writer = Writer::new_for_buffered(write, first.descriptor.clone(), options)?;
    writer.write_all_rows(&first.rows)?;

    for image in rest {
        writer.next_image(image.descriptor.clone())?;
        writer.write_all_rows(&image.rows)?;
    }

    writer.finish()?;
    Ok(())
}

/// Read the remaining rows of the current image.
fn read_current_image<R: Read>(reader: &mut Reader<R>) -> Result<Image> {
    let descriptor = reader.descriptor().clone();

    // the height is not trusted for preallocation
    let rows = reader.rows().collect::<Result<Vec<Row>>>()?;

    Ok(Image { descriptor, rows })
}
