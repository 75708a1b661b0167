
//! Rows of tuples, and how they are read from and written to a stream, one at a time.
//!
//! Start with `row::Reader::read_from_buffered()`
//! and `row::write_rows_with()`.

pub mod codec;
pub mod reader;
pub mod writer;

use smallvec::SmallVec;
use std::slice::{ChunksExact, ChunksExactMut};
use crate::error::{Error, Result, UnitResult};
use crate::meta::ImageDescriptor;

pub use self::reader::Reader;
pub use self::writer::{Writer, WriteOptions, write_rows_with};


/// A single sample value, in the range `0 ..= maxval`.
pub type Sample = u16;

/// The samples of one pixel. Small tuples do not allocate.
pub type Tuple = SmallVec<[Sample; 4]>;


/// An ordered sequence of `width` tuples, all of the same depth.
/// The samples are stored interleaved in one buffer,
/// and each tuple is a slice view into that buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    samples: Vec<Sample>,
    depth: usize,
}

impl Row {

    /// A row of `width` tuples, all samples zero.
    /// A depth of zero is treated as one.
    /// Panics if `width * depth` samples do not fit into memory,
    /// which cannot happen for a validated descriptor.
    pub fn new(width: usize, depth: usize) -> Self {
        let depth = depth.max(1);

        // an overflowing length still fails as a capacity overflow instead of wrapping
        let length = width.checked_mul(depth).unwrap_or(usize::MAX);
        Row { samples: vec![0; length], depth }
    }

    /// A row of `width` tuples, all samples zero.
    /// Fails instead of panicking if the sample count overflows.
    pub fn try_new(width: usize, depth: usize) -> Result<Self> {
        let depth = depth.max(1);

        let length = width.checked_mul(depth)
            .ok_or_else(|| Error::invalid("row sample count overflows"))?;

        Ok(Row { samples: vec![0; length], depth })
    }

    /// Use interleaved samples as a row. Fails if the samples
    /// cannot be split into tuples of the specified depth.
    pub fn from_samples(samples: Vec<Sample>, depth: usize) -> Result<Self> {
        if depth == 0 || samples.len() % depth != 0 {
            return Err(Error::invalid("sample count is not a multiple of the depth"));
        }

        Ok(Row { samples, depth })
    }

    /// Collect tuples into a row. Fails if the tuples do not all have the specified depth.
    pub fn from_tuples<'t>(tuples: impl IntoIterator<Item = &'t [Sample]>, depth: usize) -> Result<Self> {
        let mut samples = Vec::new();

        for tuple in tuples {
            if tuple.len() != depth {
                return Err(Error::invalid("tuple depth"));
            }

            samples.extend_from_slice(tuple);
        }

        Self::from_samples(samples, depth)
    }

    /// The number of tuples.
    pub fn width(&self) -> usize { self.samples.len() / self.depth }

    /// The number of samples per tuple.
    pub fn depth(&self) -> usize { self.depth }

    /// All samples, interleaved.
    pub fn samples(&self) -> &[Sample] { &self.samples }

    /// All samples, interleaved.
    pub fn samples_mut(&mut self) -> &mut [Sample] { &mut self.samples }

    /// Give up the row, keeping the interleaved samples.
    pub fn into_samples(self) -> Vec<Sample> { self.samples }

    /// The tuple at the specified horizontal position.
    /// Panics if `x` is not smaller than the width.
    pub fn tuple(&self, x: usize) -> &[Sample] {
        &self.samples[x * self.depth .. (x + 1) * self.depth]
    }

    /// The tuple at the specified horizontal position.
    /// Panics if `x` is not smaller than the width.
    pub fn tuple_mut(&mut self, x: usize) -> &mut [Sample] {
        &mut self.samples[x * self.depth .. (x + 1) * self.depth]
    }

    /// An owned copy of the tuple at the specified horizontal position.
    pub fn to_tuple(&self, x: usize) -> Tuple {
        SmallVec::from_slice(self.tuple(x))
    }

    /// Iterate over all tuples from left to right.
    pub fn tuples(&self) -> ChunksExact<'_, Sample> {
        self.samples.chunks_exact(self.depth)
    }

    /// Iterate over all tuples from left to right.
    pub fn tuples_mut(&mut self) -> ChunksExactMut<'_, Sample> {
        self.samples.chunks_exact_mut(self.depth)
    }

    /// A row buffer is only valid for an image of the same width and depth.
    pub(crate) fn validate_for(&self, descriptor: &ImageDescriptor) -> UnitResult {
        if self.depth != descriptor.depth {
            return Err(Error::invalid("row depth does not match the image depth"));
        }

        if self.width() != descriptor.width() {
            return Err(Error::invalid("row width does not match the image width"));
        }

        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tuple_views(){
        let mut row = Row::from_samples(vec![1, 2, 3, 4, 5, 6], 3).unwrap();

        assert_eq!(row.width(), 2);
        assert_eq!(row.tuple(1), &[4, 5, 6]);

        row.tuple_mut(0)[2] = 9;
        assert_eq!(row.samples(), &[1, 2, 9, 4, 5, 6]);
        assert_eq!(row.tuples().collect::<Vec<_>>(), vec![&[1, 2, 9][..], &[4, 5, 6][..]]);
        assert_eq!(row.to_tuple(0).as_slice(), &[1, 2, 9]);
    }

    #[test]
    fn overflowing_row_size(){
        assert!(matches!(Row::try_new(usize::MAX, 2), Err(Error::Invalid(_))));
        assert_eq!(Row::try_new(3, 2).unwrap(), Row::new(3, 2));
        assert!(std::panic::catch_unwind(|| Row::new(usize::MAX, 3)).is_err());
    }

    #[test]
    fn mismatched_samples(){
        assert!(Row::from_samples(vec![1, 2, 3, 4], 3).is_err());
        assert!(Row::from_samples(vec![], 0).is_err());
        assert!(Row::from_tuples(vec![&[1_u16, 2][..], &[3][..]], 2).is_err());
        assert_eq!(Row::from_tuples(vec![&[1_u16, 2][..], &[3, 4][..]], 2).unwrap().width(), 2);
    }
}
