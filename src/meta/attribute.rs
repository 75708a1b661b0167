
//! Contains the data types that describe how the samples of an image are stored and interpreted.

use std::fmt;
use smallvec::SmallVec;
use crate::error::{Error, HeaderError, Result};


/// The comment lines of a header, without the leading `#` and without the line terminator.
/// Kept as raw bytes, as headers do not declare a text encoding.
pub type Comments = SmallVec<[Vec<u8>; 1]>;

/// Longest tuple type label, including the spaces inserted between repeated `TUPLTYPE` lines.
pub const MAX_TUPLE_TYPE_LENGTH: usize = 255;


/// The kind of encoding used to store sample values.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SampleEncoding {

    /// Samples are unsigned binary integers, big endian if they need two bytes.
    /// Bitmap samples are packed eight to a byte.
    Raw,

    /// Samples are decimal ASCII tokens separated by whitespace.
    Plain,
}

/// Which of the seven wire formats an image is stored in.
/// Selected by the magic number at the start of every image.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FormatVariant {

    /// `P1`, ASCII `0` and `1` characters.
    PlainBitmap,

    /// `P4`, eight pixels packed into each byte.
    RawBitmap,

    /// `P2`, one ASCII decimal sample per pixel.
    PlainGraymap,

    /// `P5`, one binary sample per pixel.
    RawGraymap,

    /// `P3`, three ASCII decimal samples per pixel.
    PlainPixmap,

    /// `P6`, three binary samples per pixel.
    RawPixmap,

    /// `P7`, the PAM format with explicit depth, maxval and tuple type.
    ArbitraryMap,
}

impl FormatVariant {

    /// All variants, in the order of their magic numbers.
    pub const ALL: [FormatVariant; 7] = [
        FormatVariant::PlainBitmap, FormatVariant::PlainGraymap, FormatVariant::PlainPixmap,
        FormatVariant::RawBitmap, FormatVariant::RawGraymap, FormatVariant::RawPixmap,
        FormatVariant::ArbitraryMap,
    ];

    /// Select the variant from the first two bytes of an image.
    pub fn from_magic(magic: [u8; 2]) -> Result<Self> {
        Ok(match &magic {
            b"P1" => FormatVariant::PlainBitmap,
            b"P2" => FormatVariant::PlainGraymap,
            b"P3" => FormatVariant::PlainPixmap,
            b"P4" => FormatVariant::RawBitmap,
            b"P5" => FormatVariant::RawGraymap,
            b"P6" => FormatVariant::RawPixmap,
            b"P7" => FormatVariant::ArbitraryMap,
            _ => return Err(Error::Header(HeaderError::BadMagic(magic))),
        })
    }

    /// The two bytes that start an image of this variant.
    pub fn magic(self) -> [u8; 2] {
        match self {
            FormatVariant::PlainBitmap => *b"P1",
            FormatVariant::PlainGraymap => *b"P2",
            FormatVariant::PlainPixmap => *b"P3",
            FormatVariant::RawBitmap => *b"P4",
            FormatVariant::RawGraymap => *b"P5",
            FormatVariant::RawPixmap => *b"P6",
            FormatVariant::ArbitraryMap => *b"P7",
        }
    }

    /// Whether samples are stored as binary or as text. PAM is always binary.
    pub fn encoding(self) -> SampleEncoding {
        match self {
            FormatVariant::PlainBitmap | FormatVariant::PlainGraymap | FormatVariant::PlainPixmap
                => SampleEncoding::Plain,

            _ => SampleEncoding::Raw,
        }
    }

    /// The same kind of map in the other encoding.
    /// PAM has no plain encoding and is returned unchanged.
    pub fn with_encoding(self, encoding: SampleEncoding) -> Self {
        use FormatVariant::*;
        use SampleEncoding::*;

        match (self, encoding) {
            (PlainBitmap, Raw) | (RawBitmap, Raw) => RawBitmap,
            (PlainBitmap, Plain) | (RawBitmap, Plain) => PlainBitmap,
            (PlainGraymap, Raw) | (RawGraymap, Raw) => RawGraymap,
            (PlainGraymap, Plain) | (RawGraymap, Plain) => PlainGraymap,
            (PlainPixmap, Raw) | (RawPixmap, Raw) => RawPixmap,
            (PlainPixmap, Plain) | (RawPixmap, Plain) => PlainPixmap,
            (ArbitraryMap, _) => ArbitraryMap,
        }
    }

    /// The number of samples per tuple implied by the legacy formats.
    /// `None` for PAM, which declares its depth in the header.
    pub fn implied_depth(self) -> Option<usize> {
        match self {
            FormatVariant::PlainBitmap | FormatVariant::RawBitmap
            | FormatVariant::PlainGraymap | FormatVariant::RawGraymap => Some(1),

            FormatVariant::PlainPixmap | FormatVariant::RawPixmap => Some(3),
            FormatVariant::ArbitraryMap => None,
        }
    }

    /// `P1` and `P4`, whose maxval is always one.
    pub fn is_bitmap(self) -> bool {
        matches!(self, FormatVariant::PlainBitmap | FormatVariant::RawBitmap)
    }

    /// Everything except PAM.
    pub fn is_legacy(self) -> bool {
        self != FormatVariant::ArbitraryMap
    }

    /// The tuple type that describes the samples of a legacy image.
    pub fn implied_tuple_type(self) -> TupleType {
        match self {
            FormatVariant::PlainBitmap | FormatVariant::RawBitmap => TupleType::BlackAndWhite,
            FormatVariant::PlainGraymap | FormatVariant::RawGraymap => TupleType::Grayscale,
            FormatVariant::PlainPixmap | FormatVariant::RawPixmap => TupleType::Rgb,
            FormatVariant::ArbitraryMap => TupleType::Unspecified,
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [p, number] = self.magic();
        write!(formatter, "{}{}", p as char, number as char)
    }
}


/// The semantic interpretation of the samples in a tuple.
/// Only stored in PAM headers; legacy formats imply it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TupleType {

    /// No `TUPLTYPE` line was present.
    Unspecified,

    /// One sample. In PAM, zero is black and one is white.
    /// Bitmap rows store the bit instead, where one is black.
    BlackAndWhite,

    /// One sample, the amount of light.
    Grayscale,

    /// Red, green and blue.
    Rgb,

    /// `BlackAndWhite` followed by an opacity sample.
    BlackAndWhiteAlpha,

    /// `Grayscale` followed by an opacity sample.
    GrayscaleAlpha,

    /// `Rgb` followed by an opacity sample.
    RgbAlpha,

    /// Any other label, kept verbatim.
    Custom(String),
}

impl TupleType {

    /// Interpret the concatenated `TUPLTYPE` label of a header.
    pub fn from_label(label: &str) -> Self {
        match label {
            "" => TupleType::Unspecified,
            "BLACKANDWHITE" => TupleType::BlackAndWhite,
            "GRAYSCALE" => TupleType::Grayscale,
            "RGB" => TupleType::Rgb,
            "BLACKANDWHITE_ALPHA" => TupleType::BlackAndWhiteAlpha,
            "GRAYSCALE_ALPHA" => TupleType::GrayscaleAlpha,
            "RGB_ALPHA" => TupleType::RgbAlpha,
            other => TupleType::Custom(other.to_string()),
        }
    }

    /// The label as written into a header. Empty for `Unspecified`.
    pub fn label(&self) -> &str {
        match self {
            TupleType::Unspecified => "",
            TupleType::BlackAndWhite => "BLACKANDWHITE",
            TupleType::Grayscale => "GRAYSCALE",
            TupleType::Rgb => "RGB",
            TupleType::BlackAndWhiteAlpha => "BLACKANDWHITE_ALPHA",
            TupleType::GrayscaleAlpha => "GRAYSCALE_ALPHA",
            TupleType::RgbAlpha => "RGB_ALPHA",
            TupleType::Custom(label) => label,
        }
    }

    /// The index of the opacity sample, if this type has one.
    pub fn opacity_plane(&self) -> Option<usize> {
        match self {
            TupleType::BlackAndWhiteAlpha | TupleType::GrayscaleAlpha => Some(1),
            TupleType::RgbAlpha => Some(3),
            _ => None,
        }
    }

    /// The number of samples that the standard tuple types require at least.
    pub fn minimum_depth(&self) -> usize {
        match self {
            TupleType::Unspecified | TupleType::Custom(_) => 1,
            TupleType::BlackAndWhite | TupleType::Grayscale => 1,
            TupleType::BlackAndWhiteAlpha | TupleType::GrayscaleAlpha => 2,
            TupleType::Rgb => 3,
            TupleType::RgbAlpha => 4,
        }
    }

    /// The same color model with an opacity sample.
    /// Types without a known alpha counterpart are returned unchanged.
    pub fn with_alpha(&self) -> Self {
        match self {
            TupleType::BlackAndWhite => TupleType::BlackAndWhiteAlpha,
            TupleType::Grayscale => TupleType::GrayscaleAlpha,
            TupleType::Rgb => TupleType::RgbAlpha,
            other => other.clone(),
        }
    }

    /// The same color model without the opacity sample.
    pub fn without_alpha(&self) -> Self {
        match self {
            TupleType::BlackAndWhiteAlpha => TupleType::BlackAndWhite,
            TupleType::GrayscaleAlpha => TupleType::Grayscale,
            TupleType::RgbAlpha => TupleType::Rgb,
            other => other.clone(),
        }
    }
}

impl Default for TupleType {
    fn default() -> Self { TupleType::Unspecified }
}

impl fmt::Display for TupleType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}
