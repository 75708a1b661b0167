
//! Convert between the bytes of a single raster row and a `Row` of tuples.
//! Only ever holds one row in memory.

use bit_field::BitField;
use crate::error::*;
use crate::io::*;
use crate::math::divide_rounding_up;
use crate::meta::ImageDescriptor;
use crate::meta::attribute::{FormatVariant, SampleEncoding};
use crate::row::{Row, Sample};


/// The default maximum line length of plain rasters, in characters.
pub const DEFAULT_PLAIN_LINE_WIDTH: usize = 70;


/// Decodes and encodes rows, reusing one byte buffer for all rows of a stream.
#[derive(Debug, Clone)]
pub struct RowCodec {
    bytes: Vec<u8>,
    plain_line_width: usize,
}

impl Default for RowCodec {
    fn default() -> Self { Self::new(DEFAULT_PLAIN_LINE_WIDTH) }
}

impl RowCodec {

    /// Plain rows are wrapped before exceeding `plain_line_width` characters.
    pub fn new(plain_line_width: usize) -> Self {
        RowCodec { bytes: Vec::new(), plain_line_width: plain_line_width.max(1) }
    }

    /// Decode the next row of the stream into an existing row buffer.
    /// The `row_index` is only used for error messages.
    pub fn decode_into(
        &mut self, read: &mut PeekRead<impl Read>,
        descriptor: &ImageDescriptor, row_index: usize, row: &mut Row
    ) -> UnitResult
    {
        row.validate_for(descriptor)?;

        let result = match descriptor.format {
            FormatVariant::RawBitmap => self.decode_raw_bitmap(read, row),
            FormatVariant::PlainBitmap => decode_plain_bitmap(read, row_index, row),
            format if format.encoding() == SampleEncoding::Plain => decode_plain_samples(read, descriptor.maxval, row_index, row),
            _ => self.decode_raw_samples(read, descriptor, row_index, row),
        };

        result.map_err(|error| error.in_row(row_index))
    }

    /// Encode a row and write it to the stream.
    /// Samples larger than the maxval are rejected before anything is written.
    pub fn encode(
        &mut self, write: &mut impl Write,
        descriptor: &ImageDescriptor, row_index: usize, row: &Row
    ) -> UnitResult
    {
        row.validate_for(descriptor)?;
        validate_samples(row.samples(), descriptor.maxval, row_index)?;

        self.bytes.clear();

        match descriptor.format {
            FormatVariant::RawBitmap => self.encode_raw_bitmap(row),
            FormatVariant::PlainBitmap => self.encode_plain_bitmap(row),
            format if format.encoding() == SampleEncoding::Plain => self.encode_plain_samples(row),

            _ => if descriptor.bytes_per_sample() == 1 {
                // every sample is at most the maxval, which fits a byte
                self.bytes.extend(row.samples().iter().map(|&sample| sample as u8));
            }
            else {
                u16::write_slice(&mut self.bytes, row.samples())?;
            },
        }

        write.write_all(&self.bytes)?;
        Ok(())
    }

    /// Eight pixels per byte, the first pixel in the most significant bit.
    /// Padding bits at the end of the row are ignored.
    fn decode_raw_bitmap(&mut self, read: &mut impl Read, row: &mut Row) -> UnitResult {
        let byte_count = divide_rounding_up(row.width(), 8);
        self.bytes.resize(byte_count, 0);
        read.read_exact(&mut self.bytes)?;

        for (x, sample) in row.samples_mut().iter_mut().enumerate() {
            *sample = Sample::from(self.bytes[x / 8].get_bit(7 - x % 8));
        }

        Ok(())
    }

    fn decode_raw_samples(
        &mut self, read: &mut impl Read,
        descriptor: &ImageDescriptor, row_index: usize, row: &mut Row
    ) -> UnitResult
    {
        if descriptor.bytes_per_sample() == 1 {
            self.bytes.resize(row.samples().len(), 0);
            read.read_exact(&mut self.bytes)?;

            for (sample, &byte) in row.samples_mut().iter_mut().zip(&self.bytes) {
                *sample = Sample::from(byte);
            }
        }
        else {
            u16::read_slice(read, row.samples_mut())?;
        }

        validate_samples(row.samples(), descriptor.maxval, row_index)
    }

    fn encode_raw_bitmap(&mut self, row: &Row) {
        self.bytes.resize(divide_rounding_up(row.width(), 8), 0);

        for (x, &sample) in row.samples().iter().enumerate() {
            if sample != 0 {
                self.bytes[x / 8].set_bit(7 - x % 8, true);
            }
        }
    }

    /// One character per pixel without separators, wrapped to the line width.
    fn encode_plain_bitmap(&mut self, row: &Row) {
        for (x, &sample) in row.samples().iter().enumerate() {
            if x != 0 && x % self.plain_line_width == 0 {
                self.bytes.push(b'\n');
            }

            self.bytes.push(if sample == 0 { b'0' } else { b'1' });
        }

        self.bytes.push(b'\n');
    }

    /// Decimal samples separated by spaces, wrapped to the line width.
    /// Every row starts on a new line.
    fn encode_plain_samples(&mut self, row: &Row) {
        let mut line_length = 0;

        for &sample in row.samples() {
            let mut digits = [0_u8; 5];
            let digits = format_decimal(sample, &mut digits);

            if line_length != 0 {
                if line_length + 1 + digits.len() > self.plain_line_width {
                    self.bytes.push(b'\n');
                    line_length = 0;
                }
                else {
                    self.bytes.push(b' ');
                    line_length += 1;
                }
            }

            self.bytes.extend_from_slice(digits);
            line_length += digits.len();
        }

        self.bytes.push(b'\n');
    }
}


/// Read one row from a stream.
/// Errors report the row index zero, as a single call cannot know its position;
/// use a `Reader` to track positions in a whole image.
pub fn decode_row(read: &mut PeekRead<impl Read>, descriptor: &ImageDescriptor) -> Result<Row> {
    let mut row = Row::try_new(descriptor.width(), descriptor.depth)?;
    RowCodec::default().decode_into(read, descriptor, 0, &mut row)?;
    Ok(row)
}

/// Write one row to a stream.
pub fn encode_row(write: &mut impl Write, descriptor: &ImageDescriptor, row: &Row) -> UnitResult {
    RowCodec::default().encode(write, descriptor, 0, row)
}


/// Single `0` or `1` characters, optionally separated by whitespace and comments.
fn decode_plain_bitmap(read: &mut PeekRead<impl Read>, row_index: usize, row: &mut Row) -> UnitResult {
    for sample in row.samples_mut() {
        skip_whitespace_and_comments(read)?;

        *sample = match read.next_u8()? {
            Some(b'0') => 0,
            Some(b'1') => 1,
            Some(byte) => return Err(RowError::MalformedSample { row: row_index, byte }.into()),
            None => return Err(RowError::TruncatedRow { row: row_index }.into()),
        };
    }

    Ok(())
}

fn decode_plain_samples(read: &mut PeekRead<impl Read>, maxval: Sample, row_index: usize, row: &mut Row) -> UnitResult {
    for sample in row.samples_mut() {
        *sample = read_plain_sample(read, maxval, row_index)?;
    }

    Ok(())
}

fn read_plain_sample(read: &mut PeekRead<impl Read>, maxval: Sample, row_index: usize) -> Result<Sample> {
    skip_whitespace_and_comments(read)?;

    match read.peek_u8()? {
        None => return Err(RowError::TruncatedRow { row: row_index }.into()),
        Some(byte) if !byte.is_ascii_digit() => return Err(RowError::MalformedSample { row: row_index, byte }.into()),
        Some(_) => {},
    }

    let mut value = 0_u32;
    while let Some(digit) = read.peek_u8()?.filter(u8::is_ascii_digit) {
        read.next_u8()?;
        value = value.saturating_mul(10).saturating_add(u32::from(digit - b'0'));
    }

    if value > u32::from(maxval) {
        return Err(RowError::SampleOutOfRange { row: row_index, sample: value, maxval }.into());
    }

    // cannot truncate, the value is at most the maxval
    Ok(value as Sample)
}

fn validate_samples(samples: &[Sample], maxval: Sample, row_index: usize) -> UnitResult {
    match samples.iter().find(|&&sample| sample > maxval) {
        None => Ok(()),
        Some(&sample) => Err(RowError::SampleOutOfRange {
            row: row_index, sample: u32::from(sample), maxval
        }.into()),
    }
}

/// Write the decimal digits of the value into the buffer, returning the used part.
fn format_decimal(mut value: Sample, buffer: &mut [u8; 5]) -> &[u8] {
    let mut start = buffer.len();

    loop {
        start -= 1;
        buffer[start] = b'0' + (value % 10) as u8;
        value /= 10;

        if value == 0 { break; }
    }

    &buffer[start ..]
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::meta::attribute::TupleType;

    fn encoded(descriptor: &ImageDescriptor, samples: Vec<Sample>) -> Vec<u8> {
        let row = Row::from_samples(samples, descriptor.depth).unwrap();
        let mut bytes = Vec::new();
        encode_row(&mut bytes, descriptor, &row).unwrap();
        bytes
    }

    fn decoded(descriptor: &ImageDescriptor, bytes: &[u8]) -> Result<Vec<Sample>> {
        decode_row(&mut PeekRead::new(bytes), descriptor).map(Row::into_samples)
    }

    #[test]
    fn raw_bitmap_packing(){
        let descriptor = ImageDescriptor::bitmap((10, 1), SampleEncoding::Raw);
        let samples = vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 1];

        let bytes = encoded(&descriptor, samples.clone());
        assert_eq!(bytes, vec![0b1010_1010, 0b1100_0000]);
        assert_eq!(decoded(&descriptor, &bytes).unwrap(), samples);
    }

    #[test]
    fn raw_bitmap_ignores_padding(){
        let descriptor = ImageDescriptor::bitmap((3, 1), SampleEncoding::Raw);
        assert_eq!(decoded(&descriptor, &[0b0101_1111]).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn plain_bitmap_with_and_without_separators(){
        let descriptor = ImageDescriptor::bitmap((5, 1), SampleEncoding::Plain);

        assert_eq!(decoded(&descriptor, b"1 0 # comment\n 1 1 0").unwrap(), vec![1, 0, 1, 1, 0]);
        assert_eq!(decoded(&descriptor, b"10110").unwrap(), vec![1, 0, 1, 1, 0]);
        assert_eq!(encoded(&descriptor, vec![1, 0, 1, 1, 0]), b"10110\n".to_vec());

        match decoded(&descriptor, b"1 0 2 1 1") {
            Err(Error::Row(RowError::MalformedSample { row: 0, byte: b'2' })) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn plain_bitmap_wraps_long_rows(){
        let descriptor = ImageDescriptor::bitmap((75, 1), SampleEncoding::Plain);
        let bytes = encoded(&descriptor, vec![1; 75]);

        let lines: Vec<&[u8]> = bytes.split(|&byte| byte == b'\n').collect();
        assert_eq!(lines[0].len(), 70);
        assert_eq!(lines[1].len(), 5);
    }

    #[test]
    fn sixteen_bit_samples_are_big_endian(){
        let descriptor = ImageDescriptor::graymap((2, 1), 65535, SampleEncoding::Raw);
        let bytes = encoded(&descriptor, vec![0x1234, 0xFFFF]);

        assert_eq!(bytes, vec![0x12, 0x34, 0xFF, 0xFF]);
        assert_eq!(decoded(&descriptor, &bytes).unwrap(), vec![0x1234, 0xFFFF]);
    }

    #[test]
    fn raw_sample_above_maxval(){
        let descriptor = ImageDescriptor::graymap((3, 1), 100, SampleEncoding::Raw);

        match decoded(&descriptor, &[1, 101, 2]) {
            Err(Error::Row(RowError::SampleOutOfRange { sample: 101, maxval: 100, .. })) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn encoding_rejects_sample_above_maxval(){
        let descriptor = ImageDescriptor::graymap((1, 1), 7, SampleEncoding::Plain);
        let row = Row::from_samples(vec![8], 1).unwrap();

        let mut bytes = Vec::new();
        assert!(encode_row(&mut bytes, &descriptor, &row).is_err());
        assert!(bytes.is_empty());
    }

    #[test]
    fn truncated_rows(){
        let raw = ImageDescriptor::pixmap((2, 1), 255, SampleEncoding::Raw);
        let plain = ImageDescriptor::pixmap((2, 1), 255, SampleEncoding::Plain);
        let bitmap = ImageDescriptor::bitmap((9, 1), SampleEncoding::Raw);

        for (descriptor, bytes) in [(&raw, &b"12345"[..]), (&plain, &b"1 2 3 4 5"[..]), (&bitmap, &b"\x00"[..])].iter() {
            match decoded(descriptor, bytes) {
                Err(Error::Row(RowError::TruncatedRow { row: 0 })) => {},
                other => panic!("unexpected result {:?} for {}", other, descriptor.format),
            }
        }
    }

    #[test]
    fn plain_samples(){
        let descriptor = ImageDescriptor::pixmap((2, 1), 1000, SampleEncoding::Plain);

        assert_eq!(decoded(&descriptor, b"0 1000\n  7#x\n8\t9 10").unwrap(), vec![0, 1000, 7, 8, 9, 10]);
        assert_eq!(encoded(&descriptor, vec![0, 1000, 7, 8, 9, 10]), b"0 1000 7 8 9 10\n".to_vec());

        match decoded(&descriptor, b"0 1001 7 8 9 10") {
            Err(Error::Row(RowError::SampleOutOfRange { sample: 1001, .. })) => {},
            other => panic!("unexpected result {:?}", other),
        }

        match decoded(&descriptor, b"0 -1 7 8 9 10") {
            Err(Error::Row(RowError::MalformedSample { byte: b'-', .. })) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn plain_samples_wrap_lines(){
        let descriptor = ImageDescriptor::graymap((30, 1), 65535, SampleEncoding::Plain);
        let bytes = encoded(&descriptor, vec![65535; 30]);

        for line in bytes.split(|&byte| byte == b'\n') {
            assert!(line.len() <= DEFAULT_PLAIN_LINE_WIDTH);
        }

        assert_eq!(decoded(&descriptor, &bytes).unwrap(), vec![65535; 30]);
    }

    #[test]
    fn row_must_match_descriptor(){
        let descriptor = ImageDescriptor::arbitrary((2, 1), 4, 255, TupleType::RgbAlpha);
        let row = Row::new(2, 3);

        assert!(matches!(encode_row(&mut Vec::new(), &descriptor, &row), Err(Error::Invalid(_))));
    }

    #[test]
    fn decimal_formatting(){
        let mut buffer = [0; 5];
        assert_eq!(format_decimal(0, &mut buffer), b"0");
        assert_eq!(format_decimal(65535, &mut buffer), b"65535");
        assert_eq!(format_decimal(120, &mut buffer), b"120");
    }
}
