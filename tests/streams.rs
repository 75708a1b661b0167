extern crate netpbm;

use netpbm::prelude::*;
use netpbm::error::{HeaderError, RowError};

fn raw_graymap(width: u8, height: u8, first_sample: u8) -> Vec<u8> {
    let mut bytes = format!("P5\n{} {}\n255\n", width, height).into_bytes();
    bytes.extend((0 .. width * height).map(|index| first_sample + index));
    bytes
}

#[test]
fn exactly_height_rows_can_be_read() {
    let bytes = raw_graymap(2, 3, 0);
    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();

    for y in 0 .. 3 {
        assert_eq!(reader.next_row_index(), y);
        assert_eq!(reader.read_row().unwrap().samples().len(), 2);
    }

    match reader.read_row() {
        Err(Error::Row(RowError::AllRowsConsumed { height: 3 })) => {},
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn exactly_height_rows_can_be_written() {
    let descriptor = ImageDescriptor::graymap((2, 2), 255, SampleEncoding::Raw);
    let row = Row::new(2, 1);

    let result = write_rows_with(Vec::new(), descriptor.clone(), WriteOptions::default(), |writer| {
        writer.write_row(&row)
    });

    assert!(matches!(result, Err(Error::Row(RowError::MissingRows { written: 1, height: 2 }))));

    let result = write_rows_with(Vec::new(), descriptor, WriteOptions::default(), |writer| {
        writer.write_row(&row)?;
        writer.write_row(&row)?;
        writer.write_row(&row)
    });

    assert!(matches!(result, Err(Error::Row(RowError::AllRowsConsumed { height: 2 }))));
}

#[test]
fn two_concatenated_graymaps() {
    let mut bytes = raw_graymap(3, 2, 10);
    bytes.extend(raw_graymap(2, 2, 50));

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    assert_eq!(reader.image_index(), 0);

    let first: Vec<Row> = reader.rows().collect::<Result<_>>().unwrap();
    assert_eq!(first[0].samples(), &[10, 11, 12]);
    assert_eq!(first[1].samples(), &[13, 14, 15]);

    assert!(reader.next_image().unwrap());
    assert_eq!(reader.image_index(), 1);
    assert_eq!(reader.descriptor().width(), 2);

    let second: Vec<Row> = reader.rows().collect::<Result<_>>().unwrap();
    assert_eq!(second[0].samples(), &[50, 51]);
    assert_eq!(second[1].samples(), &[52, 53]);

    assert!(!reader.next_image().unwrap());
    assert!(!reader.next_image().unwrap());
    assert_eq!(reader.byte_position(), bytes.len());
}

#[test]
fn next_image_skips_unread_rows() {
    let mut bytes = raw_graymap(2, 4, 0);
    bytes.extend(raw_graymap(1, 1, 99));

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    reader.read_row().unwrap();

    assert!(reader.next_image().unwrap());
    assert_eq!(reader.read_row().unwrap().samples(), &[99]);
    assert!(!reader.next_image().unwrap());
}

#[test]
fn skipped_rows_are_validated() {
    let bytes = b"P2\n1 3\n10\n1\n2\n11\n";

    let mut reader = Reader::read_from_buffered(&bytes[..], ReadOptions::default()).unwrap();
    reader.skip_row().unwrap();

    assert!(matches!(
        reader.next_image(),
        Err(Error::Row(RowError::SampleOutOfRange { row: 2, sample: 11, maxval: 10 }))
    ));
}

#[test]
fn trailing_whitespace_is_a_clean_end() {
    let mut bytes = raw_graymap(1, 1, 7);
    bytes.extend_from_slice(b" \n\t\n");

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    reader.read_row().unwrap();
    assert!(!reader.next_image().unwrap());
}

#[test]
fn trailing_garbage_is_an_error() {
    let mut bytes = raw_graymap(1, 1, 7);
    bytes.extend_from_slice(b"\nP");

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    reader.read_row().unwrap();

    match reader.next_image() {
        Err(Error::Header(HeaderError::UnexpectedEof)) => {},
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn truncated_row_reports_its_index() {
    let mut bytes = raw_graymap(4, 3, 0);
    bytes.truncate(bytes.len() - 2);

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    reader.read_row().unwrap();
    reader.read_row().unwrap();

    let error = reader.read_row().unwrap_err();
    assert!(error.is_unexpected_eof());
    assert!(matches!(error, Error::Row(RowError::TruncatedRow { row: 2 })));
}

#[test]
fn negative_height_is_rejected() {
    let result = Reader::read_from_buffered(&b"P5\n10 -5 255\n0123456789"[..], ReadOptions::default());

    assert!(matches!(
        result.map(|reader| reader.descriptor().clone()),
        Err(Error::Header(HeaderError::OutOfRange(..))) | Err(Error::Header(HeaderError::MalformedToken(_)))
    ));
}

#[test]
fn limits_are_checked_before_reading_rows() {
    let options = ReadOptions { max_width: 100, .. ReadOptions::default() };
    let result = Reader::read_from_buffered(&b"P5\n101 1\n255\n"[..], options);
    assert!(matches!(result.map(|_| ()), Err(Error::Header(HeaderError::OutOfRange("width", 101)))));

    let huge = Reader::read_from_buffered(&b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 5000\nMAXVAL 255\nENDHDR\n"[..], ReadOptions::default());
    assert!(matches!(huge.map(|_| ()), Err(Error::Header(HeaderError::OutOfRange("depth", 5000)))));
    // width and depth are each allowed, but a single row would need 128 GiB
    let wide_and_deep = Reader::read_from_buffered(
        &b"P7\nWIDTH 16777216\nHEIGHT 1\nDEPTH 4096\nMAXVAL 255\nENDHDR\n"[..], ReadOptions::default()
    );

    assert!(matches!(
        wide_and_deep.map(|_| ()),
        Err(Error::Header(HeaderError::OutOfRange("row sample count", 68_719_476_736)))
    ));

    let options = ReadOptions { max_samples_per_row: 12, .. ReadOptions::default() };
    assert!(Reader::read_from_buffered(&b"P6\n4 1\n255\n"[..], options).is_ok());
    assert!(Reader::read_from_buffered(&b"P6\n5 1\n255\n"[..], options).is_err());
}

#[test]
fn rows_into_existing_buffer() {
    let bytes = raw_graymap(3, 2, 1);
    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();

    let mut row = reader.allocate_row();
    reader.read_row_into(&mut row).unwrap();
    assert_eq!(row.samples(), &[1, 2, 3]);

    reader.read_row_into(&mut row).unwrap();
    assert_eq!(row.samples(), &[4, 5, 6]);

    let mut wrong = Row::new(3, 2);
    assert!(matches!(reader.read_row_into(&mut wrong), Err(Error::Row(RowError::AllRowsConsumed { .. }))));

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::default()).unwrap();
    assert!(matches!(reader.read_row_into(&mut wrong), Err(Error::Invalid(_))));
}

#[test]
fn written_streams_can_be_read_again() {
    let first = ImageDescriptor::pixmap((2, 1), 7, SampleEncoding::Plain);
    let second = ImageDescriptor::arbitrary((1, 2), 2, 300, TupleType::GrayscaleAlpha);

    let bytes = write_rows_with(Vec::new(), first.clone(), WriteOptions::default(), |writer| {
        writer.write_row(&Row::from_samples(vec![1, 2, 3, 4, 5, 6], 3)?)?;
        writer.next_image(second.clone())?;
        writer.write_row(&Row::from_samples(vec![300, 0], 2)?)?;
        writer.write_row(&Row::from_samples(vec![0, 300], 2)?)
    }).unwrap();

    let mut reader = Reader::read_from_buffered(bytes.as_slice(), ReadOptions::pedantic()).unwrap();
    assert_eq!(reader.descriptor(), &first);
    assert_eq!(reader.read_row().unwrap().samples(), &[1, 2, 3, 4, 5, 6]);

    assert!(reader.next_image().unwrap());
    assert_eq!(reader.descriptor(), &second);
    assert_eq!(reader.read_row().unwrap().samples(), &[300, 0]);
    assert_eq!(reader.read_row().unwrap().samples(), &[0, 300]);
    assert!(!reader.next_image().unwrap());
}
