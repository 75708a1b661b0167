
//! Describes all meta data possible in a netpbm image.

pub mod attribute;
pub mod header;

use crate::error::*;
use crate::math::*;
use self::attribute::*;


/// The largest maxval any variant can declare.
pub const MAX_MAXVAL: u16 = u16::MAX;

/// Bytes used for each binary sample of an image with this maxval:
/// one up to 255, two above.
#[inline]
pub fn bytes_per_sample(maxval: u16) -> usize {
    if maxval <= 0xFF { 1 } else { 2 }
}


/// Contains the complete meta data of one image in a stream.
/// Created by parsing a header, and required by every row operation.
/// A stream of multiple images has one descriptor for each image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {

    /// The magic number of the image, selecting legacy or PAM,
    /// and plain or raw samples.
    pub format: FormatVariant,

    /// The number of tuples in a row (`width`), and the number of rows (`height`).
    /// Both are positive.
    pub size: Vec2<usize>,

    /// The number of samples in each tuple.
    /// Implied by the legacy formats, explicit in PAM.
    pub depth: usize,

    /// The largest value a sample may have.
    /// Always one for bitmaps.
    pub maxval: u16,

    /// How the samples of a tuple are interpreted.
    /// Only written to PAM headers.
    pub tuple_type: TupleType,

    /// The comment lines in the header.
    /// Only collected when reading PAM headers,
    /// but written for every format.
    pub comments: Comments,
}


/// Limits and strictness applied while reading.
/// Checked before any memory is allocated for an image.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ReadOptions {

    /// Reject headers that are not strictly valid,
    /// for example PAM headers declaring a field twice,
    /// or a standard tuple type with too few samples.
    pub pedantic: bool,

    /// Largest accepted number of tuples in a row.
    pub max_width: usize,

    /// Largest accepted number of rows.
    pub max_height: usize,

    /// Largest accepted number of samples in a tuple.
    pub max_depth: usize,

    /// Largest accepted number of samples in a row, `width * depth`.
    /// Bounds the memory of each row buffer, which is allocated before the raster is read.
    pub max_samples_per_row: usize,
}

impl Default for ReadOptions {
    fn default() -> Self { Self::lenient() }
}

impl ReadOptions {

    /// Accept everything that the reference tools accept.
    pub fn lenient() -> Self {
        ReadOptions {
            pedantic: false,
            max_width: 1 << 24,
            max_height: 1 << 24,
            max_depth: 4096,
            max_samples_per_row: 1 << 26,
        }
    }

    /// Reject anything questionable.
    pub fn pedantic() -> Self {
        ReadOptions { pedantic: true, .. Self::lenient() }
    }

    /// Only check consistency, used before writing a descriptor that is already in memory.
    pub(crate) fn unlimited() -> Self {
        ReadOptions {
            pedantic: false,
            max_width: usize::MAX,
            max_height: usize::MAX,
            max_depth: usize::MAX,
            max_samples_per_row: usize::MAX,
        }
    }
}


impl ImageDescriptor {

    /// A black and white image.
    pub fn bitmap(size: impl Into<Vec2<usize>>, encoding: SampleEncoding) -> Self {
        Self::legacy(FormatVariant::RawBitmap.with_encoding(encoding), size.into(), 1)
    }

    /// A gray image with one sample per pixel.
    pub fn graymap(size: impl Into<Vec2<usize>>, maxval: u16, encoding: SampleEncoding) -> Self {
        Self::legacy(FormatVariant::RawGraymap.with_encoding(encoding), size.into(), maxval)
    }

    /// A color image with red, green and blue samples per pixel.
    pub fn pixmap(size: impl Into<Vec2<usize>>, maxval: u16, encoding: SampleEncoding) -> Self {
        Self::legacy(FormatVariant::RawPixmap.with_encoding(encoding), size.into(), maxval)
    }

    /// A PAM image with any number of samples per pixel.
    pub fn arbitrary(size: impl Into<Vec2<usize>>, depth: usize, maxval: u16, tuple_type: TupleType) -> Self {
        ImageDescriptor {
            format: FormatVariant::ArbitraryMap,
            size: size.into(), depth, maxval, tuple_type,
            comments: Comments::new(),
        }
    }

    fn legacy(format: FormatVariant, size: Vec2<usize>, maxval: u16) -> Self {
        ImageDescriptor {
            format, size, maxval,
            depth: format.implied_depth().unwrap_or(1),
            tuple_type: format.implied_tuple_type(),
            comments: Comments::new(),
        }
    }

    /// Replace the comments of this descriptor.
    pub fn with_comments(self, comments: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        ImageDescriptor { comments: comments.into_iter().map(Into::into).collect(), .. self }
    }

    /// Store the samples as text or binary. Does not affect PAM.
    pub fn with_encoding(self, encoding: SampleEncoding) -> Self {
        ImageDescriptor { format: self.format.with_encoding(encoding), .. self }
    }

    /// The number of tuples in each row.
    pub fn width(&self) -> usize { self.size.width() }

    /// The number of rows.
    pub fn height(&self) -> usize { self.size.height() }

    /// Bytes per binary sample, derived from the maxval.
    /// Bitmaps are packed and do not use this value.
    pub fn bytes_per_sample(&self) -> usize {
        bytes_per_sample(self.maxval)
    }

    /// The number of samples in each row, `width * depth`.
    pub fn samples_per_row(&self) -> Result<usize> {
        checked_size(&[self.width(), self.depth], "row sample count")
    }

    /// The exact number of bytes one raw row occupies in the stream.
    /// Plain rows do not have a fixed size and return `None`.
    pub fn raw_bytes_per_row(&self) -> Result<Option<usize>> {
        Ok(match self.format {
            FormatVariant::RawBitmap => Some(divide_rounding_up(self.width(), 8)),

            format if format.encoding() == SampleEncoding::Raw =>
                Some(checked_size(&[self.width(), self.depth, self.bytes_per_sample()], "row byte count")?),

            _ => None,
        })
    }

    /// The tuple type that applies to the samples, including the one implied by legacy formats.
    pub fn effective_tuple_type(&self) -> TupleType {
        if self.format.is_legacy() { self.format.implied_tuple_type() }
        else { self.tuple_type.clone() }
    }

    /// Check that all values are consistent and within the limits of the options.
    pub fn validate(&self, options: &ReadOptions) -> UnitResult {
        if self.width() == 0 { return Err(Error::out_of_range("width", 0_u32)); }
        if self.height() == 0 { return Err(Error::out_of_range("height", 0_u32)); }
        if self.depth == 0 { return Err(Error::out_of_range("depth", 0_u32)); }
        if self.maxval == 0 { return Err(Error::out_of_range("maxval", 0_u32)); }

        if self.width() > options.max_width { return Err(Error::out_of_range("width", usize_to_u64(self.width()))); }
        if self.height() > options.max_height { return Err(Error::out_of_range("height", usize_to_u64(self.height()))); }
        if self.depth > options.max_depth { return Err(Error::out_of_range("depth", usize_to_u64(self.depth))); }

        if let Some(depth) = self.format.implied_depth() {
            if self.depth != depth {
                return Err(Error::invalid("depth does not match the legacy format"));
            }
        }

        if self.format.is_bitmap() && self.maxval != 1 {
            return Err(Error::out_of_range("bitmap maxval", self.maxval));
        }

        let label_length = self.tuple_type.label().len();
        if label_length > MAX_TUPLE_TYPE_LENGTH {
            return Err(Error::out_of_range("tuple type length", usize_to_u64(label_length)));
        }

        if self.tuple_type.label().contains(|character: char| character == '\n' || character == '\r') {
            return Err(Error::malformed("tuple type containing a line break"));
        }

        if options.pedantic && self.depth < self.tuple_type.minimum_depth() {
            return Err(Error::out_of_range("depth for the tuple type", usize_to_u64(self.depth)));
        }

        // the whole row must be addressable
        let samples_per_row = self.samples_per_row()?;
        if samples_per_row > options.max_samples_per_row {
            return Err(Error::out_of_range("row sample count", usize_to_u64(samples_per_row)));
        }

        self.raw_bytes_per_row()?;
        Ok(())
    }
}
