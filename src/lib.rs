
//! Read and write Netpbm images: the PBM, PGM and PPM formats, and the arbitrary PAM format.
//!
//! Images are processed one row at a time, so that arbitrarily tall images
//! can be streamed in bounded memory. A stream may contain several images.
//!
//! Start with `row::Reader::read_from_buffered()` and `row::write_rows_with()`,
//! or use `image::Image` to load a whole image into memory.
//!
//! This library never panics on malformed input.
//! Any broken header or row results in an error.

#![forbid(unsafe_code)]

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
)]

pub mod io;
pub mod math;
pub mod error;
pub mod meta;
pub mod row;
pub mod tuple;
pub mod convert;
pub mod image;


/// Export the most important items from `netpbm`.
/// _Note: This includes a type called `Result`, possibly overwriting the default `std::Result` type usage._
pub mod prelude {

    // main exports
    pub use crate::meta::{ImageDescriptor, ReadOptions};
    pub use crate::meta::attribute::{FormatVariant, SampleEncoding, TupleType};
    pub use crate::row::{Reader, Row, Sample, Tuple, Writer, WriteOptions, write_rows_with};
    pub use crate::image::{Image, read_all_images_from_buffered, write_all_images_to_buffered};

    // secondary data types
    pub use crate::tuple::DepthPromotion;
    pub use crate::convert::convert_row;
    pub use crate::meta;
    pub use crate::error::{Result, Error};
}
