
//! Pure functions on tuples and rows.
//! Used to combine or convert images of different depths and maxvals.

use std::borrow::Cow;
use std::convert::TryFrom;
use smallvec::{SmallVec, smallvec};

use crate::error::{Error, Result, UnitResult};
use crate::math::rescale;
use crate::meta::ImageDescriptor;
use crate::meta::attribute::{FormatVariant, TupleType};
use crate::row::{Row, Sample, Tuple};


/// The samples of a tuple mapped to the range `0.0 ..= 1.0`.
pub type NormalizedTuple = SmallVec<[f32; 4]>;


/// How the planes that a tuple gains are filled when its depth increases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DepthPromotion {

    /// Copy the first sample into every new plane,
    /// for example to turn gray into red, green and blue.
    ReplicateFirstPlane,

    /// Fill the new planes with the maxval, which means fully opaque.
    AppendOpaqueAlpha,

    /// Fill the new planes with zero.
    AppendZero,
}


/// A row of zero tuples that fits the image.
pub fn allocate_row(descriptor: &ImageDescriptor) -> Row {
    Row::new(descriptor.width(), descriptor.depth)
}

/// Whether two tuples contain the same samples.
/// Fails if the tuples do not have the same depth.
pub fn compare_equal(a: &[Sample], b: &[Sample]) -> Result<bool> {
    if a.len() != b.len() {
        return Err(Error::invalid("compared tuples of different depths"));
    }

    Ok(a == b)
}

/// Copy the samples of one tuple into another of the same depth.
pub fn assign_tuple(destination: &mut [Sample], source: &[Sample]) -> UnitResult {
    if destination.len() != source.len() {
        return Err(Error::invalid("assigned tuple of a different depth"));
    }

    destination.copy_from_slice(source);
    Ok(())
}


/// Map a sample linearly from one maxval to another, rounding to the nearest value.
/// Zero stays zero, and `from_maxval` becomes `to_maxval`.
#[inline]
pub fn scale_sample(value: Sample, from_maxval: Sample, to_maxval: Sample) -> Sample {
    let scaled = rescale(u32::from(value), u32::from(from_maxval), u32::from(to_maxval));

    // only a value above `from_maxval` could scale beyond the target range
    Sample::try_from(scaled).unwrap_or(Sample::MAX)
}

/// Scale every sample of the tuple in place.
pub fn scale_tuple(tuple: &mut [Sample], from_maxval: Sample, to_maxval: Sample) {
    for sample in tuple {
        *sample = scale_sample(*sample, from_maxval, to_maxval);
    }
}

/// Scale every sample of the row in place.
pub fn scale_row(row: &mut Row, from_maxval: Sample, to_maxval: Sample) {
    if from_maxval != to_maxval {
        scale_tuple(row.samples_mut(), from_maxval, to_maxval);
    }
}


/// Widen a tuple to a larger depth, filling the new planes according to the policy.
/// The `maxval` is only used by `AppendOpaqueAlpha`.
pub fn promote_depth(
    tuple: &[Sample], from_depth: usize, to_depth: usize,
    policy: DepthPromotion, maxval: Sample
) -> Result<Tuple>
{
    if tuple.len() != from_depth {
        return Err(Error::invalid("tuple does not have the specified depth"));
    }

    if to_depth < from_depth {
        return Err(Error::invalid("depth promotion cannot remove planes"));
    }

    let fill = match policy {
        DepthPromotion::ReplicateFirstPlane => *tuple.first()
            .ok_or_else(|| Error::invalid("cannot replicate a plane of an empty tuple"))?,

        DepthPromotion::AppendOpaqueAlpha => maxval,
        DepthPromotion::AppendZero => 0,
    };

    let mut promoted = Tuple::with_capacity(to_depth);
    promoted.extend_from_slice(tuple);
    promoted.resize(to_depth, fill);
    Ok(promoted)
}

/// Widen every tuple of the row, see `promote_depth`.
pub fn promote_row(row: &Row, to_depth: usize, policy: DepthPromotion, maxval: Sample) -> Result<Row> {
    let mut samples = Vec::with_capacity(row.width() * to_depth);

    for tuple in row.tuples() {
        samples.extend_from_slice(&promote_depth(tuple, row.depth(), to_depth, policy, maxval)?);
    }

    Row::from_samples(samples, to_depth)
}


/// The index of the plane that contains opacity, if the tuple type of the image has one.
pub fn opacity_plane(descriptor: &ImageDescriptor) -> Option<usize> {
    descriptor.effective_tuple_type().opacity_plane()
        .filter(|&plane| plane < descriptor.depth)
}

/// Whether the tuple type of the image has an opacity plane.
pub fn has_opacity(descriptor: &ImageDescriptor) -> bool {
    opacity_plane(descriptor).is_some()
}

/// The tuple that represents black: all samples zero, except for an opaque alpha plane.
/// In bitmaps, where a set bit is black, this is the tuple `[1]`.
pub fn black_tuple(descriptor: &ImageDescriptor) -> Tuple {
    if descriptor.format.is_bitmap() {
        return smallvec![1];
    }

    let mut tuple: Tuple = smallvec![0; descriptor.depth];

    if let Some(plane) = opacity_plane(descriptor) {
        tuple[plane] = descriptor.maxval;
    }

    tuple
}

/// The tuple that represents white: all samples at the maxval, including alpha.
/// In bitmaps this is the tuple `[0]`.
pub fn white_tuple(descriptor: &ImageDescriptor) -> Tuple {
    if descriptor.format.is_bitmap() {
        return smallvec![0];
    }

    smallvec![descriptor.maxval; descriptor.depth]
}


/// Bitmap samples are set for black, while all other images use zero for black.
/// Returns the row with zero for black, borrowing it if it is not a bitmap.
fn zero_is_black<'r>(descriptor: &ImageDescriptor, row: &'r Row) -> Cow<'r, Row> {
    if !descriptor.format.is_bitmap() {
        return Cow::Borrowed(row);
    }

    let mut inverted = row.clone();
    for sample in inverted.samples_mut() {
        *sample = Sample::from(*sample == 0);
    }

    Cow::Owned(inverted)
}


/// The descriptor of the image that `add_opacity_row` produces.
/// Only black and white, grayscale and RGB images can gain an opacity plane.
/// An image that already has opacity is returned unchanged.
pub fn with_opacity(descriptor: &ImageDescriptor) -> Result<ImageDescriptor> {
    if has_opacity(descriptor) {
        return Ok(descriptor.clone());
    }

    let tuple_type = descriptor.effective_tuple_type();
    let with_alpha = tuple_type.with_alpha();

    match with_alpha.opacity_plane() {
        Some(plane) if plane == descriptor.depth => Ok(ImageDescriptor {
            format: FormatVariant::ArbitraryMap,
            depth: descriptor.depth + 1,
            tuple_type: with_alpha,
            .. descriptor.clone()
        }),

        Some(_) => Err(Error::invalid("depth does not match the tuple type")),
        None => Err(Error::unsupported(format!("opacity for tuple type {:?}", tuple_type.label()))),
    }
}

/// Append a fully opaque plane to every tuple of a row of the specified image.
/// A row that already has opacity is copied unchanged.
/// Bitmap pixels are inverted, as black is zero in the resulting image.
pub fn add_opacity_row(descriptor: &ImageDescriptor, row: &Row) -> Result<Row> {
    row.validate_for(descriptor)?;
    let target = with_opacity(descriptor)?;
    let row = zero_is_black(descriptor, row);

    if target.depth == row.depth() { Ok(row.into_owned()) }
    else { promote_row(&row, target.depth, DepthPromotion::AppendOpaqueAlpha, descriptor.maxval) }
}

/// Convert a row with fewer than three color planes to red, green and blue,
/// replicating the gray plane and keeping an opacity plane.
/// Rows that already have three or more planes are copied unchanged.
/// A set bitmap pixel becomes black, which is zero in every color plane.
pub fn make_row_rgb(descriptor: &ImageDescriptor, row: &Row) -> Result<Row> {
    row.validate_for(descriptor)?;

    if row.depth() >= 3 {
        return Ok(row.clone());
    }

    let row = zero_is_black(descriptor, row);
    let opacity = opacity_plane(descriptor);
    let depth = if opacity.is_some() { 4 } else { 3 };
    let mut samples = Vec::with_capacity(row.width() * depth);

    for tuple in row.tuples() {
        samples.extend_from_slice(&[tuple[0]; 3]);

        if let Some(plane) = opacity {
            samples.push(tuple[plane]);
        }
    }

    Row::from_samples(samples, depth)
}

/// The descriptor of the image that `make_row_rgb` produces.
pub fn rgb_descriptor(descriptor: &ImageDescriptor) -> ImageDescriptor {
    if descriptor.depth >= 3 {
        return descriptor.clone();
    }

    let (depth, tuple_type) =
        if has_opacity(descriptor) { (4, TupleType::RgbAlpha) }
        else { (3, TupleType::Rgb) };

    ImageDescriptor {
        format: FormatVariant::ArbitraryMap,
        depth, tuple_type,
        .. descriptor.clone()
    }
}


/// Map every sample to the range `0.0 ..= 1.0`.
pub fn normalize_tuple(tuple: &[Sample], maxval: Sample) -> NormalizedTuple {
    let maxval = f32::from(maxval.max(1));
    tuple.iter().map(|&sample| f32::from(sample) / maxval).collect()
}

/// Map every value from `0.0 ..= 1.0` to a sample, rounding to the nearest value.
/// Values outside the range are clamped.
pub fn unnormalize_tuple(tuple: &[f32], maxval: Sample) -> Tuple {
    tuple.iter()
        .map(|&value| {
            let value = if value.is_nan() { 0.0 } else { value.max(0.0).min(1.0) };

            // cannot truncate, the value is clamped to the maxval
            (value * f32::from(maxval)).round() as Sample
        })
        .collect()
}
