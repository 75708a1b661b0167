extern crate netpbm;

use std::ffi::OsStr;
use std::panic::catch_unwind;
use std::path::{Path, PathBuf};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use netpbm::prelude::*;
use netpbm::error::{HeaderError, RowError};
use netpbm::image::read_all_images_from_buffered;

fn netpbm_files(path: &str) -> Vec<PathBuf> {
    walkdir::WalkDir::new(path).into_iter().map(std::result::Result::unwrap)
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            let extension = entry.path().extension().and_then(OsStr::to_str);
            matches!(extension, Some("pbm") | Some("pgm") | Some("ppm") | Some("pam"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn read_all(path: &Path) -> netpbm::error::Result<Vec<Image>> {
    let file = std::io::BufReader::new(std::fs::File::open(path)?);
    read_all_images_from_buffered(file, ReadOptions::default())
}

#[test]
fn read_all_valid_files() {
    let files = netpbm_files("tests/images/valid");
    assert!(files.len() >= 10, "missing test images");

    let failures: Vec<String> = files.into_par_iter()
        .filter_map(|path| match read_all(&path) {
            Ok(images) if !images.is_empty() => None,
            Ok(_) => Some(format!("{:?}: no images", path)),
            Err(error) => Some(format!("{:?}: {}", path, error)),
        })
        .collect();

    assert!(failures.is_empty(), "could not read {:#?}", failures);
}

#[test]
fn reject_all_invalid_files() {
    let files = netpbm_files("tests/images/invalid");
    assert!(files.len() >= 10, "missing test images");

    let accepted: Vec<PathBuf> = files.into_par_iter()
        .filter(|path| {
            let path = path.clone();
            let result = catch_unwind(move || read_all(&path).map(|_| ()));
            !matches!(result, Ok(Err(_)))
        })
        .collect();

    assert!(accepted.is_empty(), "invalid files did not result in an error: {:#?}", accepted);
}

#[test]
fn valid_file_contents() {
    let bitmap = Image::read_from_file("tests/images/valid/bitmap_raw.pbm", ReadOptions::pedantic()).unwrap();
    assert_eq!(bitmap.rows[0].samples(), &[1, 0, 1, 0, 1, 0, 1, 0, 1, 1]);
    assert_eq!(bitmap.rows[1].samples(), &[0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);

    let plain_bitmap = Image::read_from_file("tests/images/valid/bitmap_plain.pbm", ReadOptions::pedantic()).unwrap();
    assert_eq!(plain_bitmap.rows[1].samples(), &[0, 1, 0, 1, 0]);

    let deep = Image::read_from_file("tests/images/valid/gray_16bit.pgm", ReadOptions::default()).unwrap();
    assert_eq!(deep.descriptor.bytes_per_sample(), 2);
    assert_eq!(deep.rows[0].samples(), &[0, 0x1234]);
    assert_eq!(deep.rows[1].samples(), &[0xFFFF, 0x8000]);

    let color = Image::read_from_file("tests/images/valid/color_plain.ppm", ReadOptions::default()).unwrap();
    assert_eq!(color.tuple(1, 0), &[0, 255, 0]);
    assert_eq!(color.tuple(0, 1), &[0, 0, 255]);

    let rgba = Image::read_from_file("tests/images/valid/rgba.pam", ReadOptions::pedantic()).unwrap();
    assert_eq!(rgba.descriptor.tuple_type, TupleType::RgbAlpha);
    assert_eq!(rgba.descriptor.comments.as_slice(), &[ b" premultiplied".to_vec() ]);
    assert_eq!(rgba.tuple(1, 1), &[12, 13, 14, 15]);

    let gray_alpha = Image::read_from_file("tests/images/valid/gray_alpha_16bit.pam", ReadOptions::pedantic()).unwrap();
    assert_eq!(gray_alpha.tuple(0, 0), &[1000, 0]);
    assert_eq!(gray_alpha.tuple(0, 1), &[1, 1000]);
}

#[test]
fn invalid_file_errors() {
    fn error_of(name: &str) -> Error {
        read_all(&Path::new("tests/images/invalid").join(name)).unwrap_err()
    }

    assert!(matches!(error_of("bad_magic.pgm"), Error::Header(HeaderError::BadMagic(_))));
    assert!(matches!(error_of("missing_depth.pam"), Error::Header(HeaderError::MissingField("DEPTH"))));
    assert!(matches!(error_of("unknown_field.pam"), Error::Header(HeaderError::UnrecognizedField(_))));
    assert!(matches!(error_of("zero_width.pbm"), Error::Header(HeaderError::OutOfRange(..))));
    assert!(matches!(error_of("maxval_too_large.ppm"), Error::Header(HeaderError::OutOfRange(..))));
    assert!(matches!(error_of("empty.pam"), Error::Header(HeaderError::UnexpectedEof)));
    assert!(matches!(error_of("truncated.ppm"), Error::Row(RowError::TruncatedRow { row: 1 })));
    assert!(matches!(error_of("sample_too_large.pgm"), Error::Row(RowError::SampleOutOfRange { sample: 11, maxval: 10, .. })));
    assert!(matches!(error_of("bitmap_digit.pbm"), Error::Row(RowError::MalformedSample { byte: b'2', .. })));
    assert!(matches!(error_of("garbage_after_image.pgm"), Error::Header(HeaderError::BadMagic(_))));

    assert!(matches!(
        error_of("negative_height.pgm"),
        Error::Header(HeaderError::OutOfRange(..)) | Error::Header(HeaderError::MalformedToken(_))
    ));
}
