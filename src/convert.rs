
//! Convert images between format variants and maxvals, one row at a time.
//! Only conversions that do not need color arithmetic are supported:
//! bitmaps can become gray, gray can become color, and alpha can be added or dropped.

use crate::error::{Error, Result};
use crate::meta::ImageDescriptor;
use crate::meta::attribute::{FormatVariant, TupleType};
use crate::row::{Row, Sample};
use crate::tuple::{opacity_plane, scale_sample};


impl ImageDescriptor {

    /// The descriptor of this image converted to another format variant and maxval.
    /// Bitmaps always have the maxval one, and legacy variants imply their depth.
    /// Converting to PAM keeps the depth and tuple type.
    pub fn converted_to(&self, format: FormatVariant, maxval: Sample) -> Result<Self> {
        if maxval == 0 {
            return Err(Error::invalid("maxval of zero"));
        }

        let (depth, tuple_type, maxval) = match format.implied_depth() {
            Some(depth) => (
                depth, format.implied_tuple_type(),
                if format.is_bitmap() { 1 } else { maxval }
            ),

            None if self.format.is_bitmap() => (1, TupleType::BlackAndWhite, maxval),
            None => (self.depth, self.effective_tuple_type(), maxval),
        };

        Ok(ImageDescriptor {
            format, depth, tuple_type, maxval,
            size: self.size,
            comments: self.comments.clone(),
        })
    }
}


/// Convert one row of the `from` image to a row of the `to` image.
/// Both images must have the same width.
///
/// Samples are rescaled to the target maxval. Bitmap pixels become gray,
/// where a set bit is black. Gray is replicated into red, green and blue.
/// An opacity plane is dropped, kept, or added as fully opaque.
/// Fails with `NotSupported` for conversions that would need to reduce colors,
/// such as color to gray, or gray to a bitmap.
pub fn convert_row(row: &Row, from: &ImageDescriptor, to: &ImageDescriptor) -> Result<Row> {
    row.validate_for(from)?;

    if from.width() != to.width() {
        return Err(Error::invalid("converted images must have the same width"));
    }

    let source = Planes::of(from);
    let target = Planes::of(to);

    match (source.model, target.model) {
        (ColorModel::Bits, ColorModel::Bits) => return Ok(row.clone()),

        (ColorModel::Bits, ColorModel::Gray) | (ColorModel::Bits, ColorModel::Rgb) |
        (ColorModel::Gray, ColorModel::Gray) | (ColorModel::Gray, ColorModel::Rgb) |
        (ColorModel::Rgb, ColorModel::Rgb) => {},

        // only a two-level gray image can become a bitmap without a threshold
        (ColorModel::Gray, ColorModel::Bits) if from.maxval == 1 => {},
        (ColorModel::Other(source_depth), ColorModel::Other(target_depth)) if source_depth == target_depth => {},

        (source, target) => return Err(Error::unsupported(format!(
            "converting {:?} tuples to {:?} tuples", source, target
        ))),
    }

    if target.color_planes() + usize::from(target.opacity.is_some()) > to.depth {
        return Err(Error::invalid("target depth does not fit the tuple type"));
    }

    // bitmaps are treated as gray with the maxval one
    let source_maxval = if source.model == ColorModel::Bits { 1 } else { from.maxval };
    let mut samples = Vec::with_capacity(row.width() * to.depth);

    for tuple in row.tuples() {
        if target.model == ColorModel::Bits {
            samples.push(Sample::from(tuple[0] == 0));
            continue;
        }

        let start = samples.len();
        samples.resize(start + to.depth, 0);
        let converted = &mut samples[start ..];

        if source.model == ColorModel::Bits {
            let gray = scale_sample(Sample::from(tuple[0] == 0), 1, to.maxval);
            converted[.. target.color_planes()].fill(gray);
        }
        else if source.color_planes() == target.color_planes() {
            for (converted, &sample) in converted.iter_mut().zip(&tuple[.. source.color_planes()]) {
                *converted = scale_sample(sample, source_maxval, to.maxval);
            }
        }
        else {
            let gray = scale_sample(tuple[0], source_maxval, to.maxval);
            converted[.. target.color_planes()].fill(gray);
        }

        if let Some(target_plane) = target.opacity {
            converted[target_plane] = match source.opacity {
                Some(source_plane) => scale_sample(tuple[source_plane], source_maxval, to.maxval),
                None => to.maxval,
            };
        }
    }

    Row::from_samples(samples, to.depth)
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ColorModel {

    /// One bit per pixel, set for black.
    Bits,

    Gray,
    Rgb,

    /// Planes of unknown meaning, which can only be rescaled.
    Other(usize),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct Planes {
    model: ColorModel,
    opacity: Option<usize>,
}

impl Planes {
    fn of(descriptor: &ImageDescriptor) -> Self {
        if descriptor.format.is_bitmap() {
            return Planes { model: ColorModel::Bits, opacity: None };
        }

        let model = match descriptor.effective_tuple_type() {
            TupleType::BlackAndWhite | TupleType::BlackAndWhiteAlpha |
            TupleType::Grayscale | TupleType::GrayscaleAlpha => ColorModel::Gray,

            TupleType::Rgb | TupleType::RgbAlpha => ColorModel::Rgb,

            TupleType::Unspecified | TupleType::Custom(_) => match descriptor.depth {
                1 => ColorModel::Gray,
                3 => ColorModel::Rgb,
                depth => ColorModel::Other(depth),
            },
        };

        Planes { model, opacity: opacity_plane(descriptor) }
    }

    fn color_planes(&self) -> usize {
        match self.model {
            ColorModel::Bits | ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Other(depth) => depth,
        }
    }
}
