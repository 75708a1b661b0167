
//! Parse and write the textual header that starts every image.

use std::convert::TryFrom;
use log::{debug, trace};
use crate::error::*;
use crate::io::*;
use crate::math::Vec2;
use crate::meta::{ImageDescriptor, ReadOptions};
use crate::meta::attribute::*;


impl ImageDescriptor {

    /// Parse the header of the next image.
    /// On success, the stream is positioned at the first byte of the raster.
    pub fn read_from_buffered_peekable(read: &mut PeekRead<impl Read>, options: &ReadOptions) -> Result<Self> {
        let descriptor = read_header(read, options).map_err(Error::in_header)?;
        descriptor.validate(options)?;

        debug!(
            "read {} header: {}x{}, depth {}, maxval {}, tuple type {:?}",
            descriptor.format, descriptor.width(), descriptor.height(),
            descriptor.depth, descriptor.maxval, descriptor.tuple_type.label()
        );

        Ok(descriptor)
    }

    /// Write the header of this image, including comments if requested.
    /// The raster must follow immediately.
    pub fn write(&self, write: &mut impl Write, include_comments: bool) -> UnitResult {
        self.validate(&ReadOptions::unlimited())?;

        let comments: &[Vec<u8>] = if include_comments { &self.comments } else { &[] };
        if comments.iter().any(|comment| comment.contains(&b'\n')) {
            return Err(Error::invalid("comment containing a line feed"));
        }

        let mut header = format!("{}\n", self.format).into_bytes();

        for comment in comments {
            header.push(b'#');
            header.extend_from_slice(comment);
            header.push(b'\n');
        }

        let fields = {
            if self.format.is_legacy() {
                if self.format.is_bitmap() { format!("{} {}\n", self.width(), self.height()) }
                else { format!("{} {}\n{}\n", self.width(), self.height(), self.maxval) }
            }
            else {
                let mut fields = format!(
                    "WIDTH {}\nHEIGHT {}\nDEPTH {}\nMAXVAL {}\n",
                    self.width(), self.height(), self.depth, self.maxval
                );

                if self.tuple_type != TupleType::Unspecified {
                    fields.push_str(&format!("TUPLTYPE {}\n", self.tuple_type.label()));
                }

                fields.push_str("ENDHDR\n");
                fields
            }
        };

        header.extend_from_slice(fields.as_bytes());
        write.write_all(&header)?;

        debug!(
            "wrote {} header: {}x{}, depth {}, maxval {}",
            self.format, self.width(), self.height(), self.depth, self.maxval
        );

        Ok(())
    }
}


fn read_header(read: &mut PeekRead<impl Read>, options: &ReadOptions) -> Result<ImageDescriptor> {
    let format = FormatVariant::from_magic(read_magic(read)?)?;

    if format.is_legacy() { read_legacy_header(read, format) }
    else { read_arbitrary_header(read, options) }
}

fn read_magic(read: &mut PeekRead<impl Read>) -> Result<[u8; 2]> {
    let mut magic = [0_u8; 2];

    for byte in magic.iter_mut() {
        *byte = read.next_u8()?.ok_or(HeaderError::UnexpectedEof)?;
    }

    Ok(magic)
}

fn read_maxval(value: u32) -> Result<u16> {
    match u16::try_from(value) {
        Ok(maxval) if maxval > 0 => Ok(maxval),
        _ => Err(Error::out_of_range("maxval", value)),
    }
}

/// Whitespace separated decimal tokens, with comments allowed anywhere in between.
/// Exactly one whitespace byte separates the last token from the raster.
fn read_legacy_header(read: &mut PeekRead<impl Read>, format: FormatVariant) -> Result<ImageDescriptor> {
    let width = read_header_decimal(read, "width")?;
    let height = read_header_decimal(read, "height")?;

    let maxval = {
        if format.is_bitmap() { 1 }
        else { read_maxval(read_header_decimal(read, "maxval")?)? }
    };

    match read.next_u8()? {
        Some(byte) if is_whitespace(byte) => {},
        Some(_) => return Err(Error::malformed("separator between header and raster")),

        // the first row will report the missing raster
        None => {},
    }

    let size = Vec2(width, height).to_usize("image size")?;

    Ok(ImageDescriptor {
        format, size, maxval,
        depth: format.implied_depth().unwrap_or(1),
        tuple_type: format.implied_tuple_type(),
        comments: Comments::new(),
    })
}

/// Line based `KEYWORD value` fields, terminated by `ENDHDR`.
fn read_arbitrary_header(read: &mut PeekRead<impl Read>, options: &ReadOptions) -> Result<ImageDescriptor> {
    let rest_of_magic_line = read_header_line(read)?;
    if !rest_of_magic_line.iter().all(|&byte| is_whitespace(byte)) {
        return Err(Error::malformed("content after the P7 magic number"));
    }

    let mut width = None;
    let mut height = None;
    let mut depth = None;
    let mut maxval = None;
    let mut tuple_type = String::new();
    let mut comments = Comments::new();

    loop {
        let line = read_header_line(read)?;

        if line.first() == Some(&b'#') {
            let mut comment = &line[1..];
            if comment.last() == Some(&b'\r') { comment = &comment[.. comment.len() - 1]; }

            trace!("header comment {:?}", String::from_utf8_lossy(comment));
            comments.push(comment.to_vec());
            continue;
        }

        let line = trim(&line);
        if line.is_empty() { continue; }

        let keyword_end = line.iter().position(|&byte| is_whitespace(byte)).unwrap_or(line.len());
        let (keyword, value) = line.split_at(keyword_end);
        let value = trim(value);

        let field = match keyword {
            b"ENDHDR" => break,
            b"WIDTH" => &mut width,
            b"HEIGHT" => &mut height,
            b"DEPTH" => &mut depth,
            b"MAXVAL" => &mut maxval,

            b"TUPLTYPE" => {
                if !value.is_empty() {
                    if !tuple_type.is_empty() { tuple_type.push(' '); }
                    tuple_type.push_str(&String::from_utf8_lossy(value));
                }

                if tuple_type.len() > MAX_TUPLE_TYPE_LENGTH {
                    return Err(Error::out_of_range("tuple type length", usize_to_u64(tuple_type.len())));
                }

                continue;
            },

            unknown => return Err(Error::Header(HeaderError::UnrecognizedField(
                String::from_utf8_lossy(unknown).into_owned()
            ))),
        };

        if options.pedantic && field.is_some() {
            return Err(Error::malformed("duplicate header line"));
        }

        let name = keyword_name(keyword);
        *field = Some(parse_decimal(value, name)?);
    }

    let width = width.ok_or(HeaderError::MissingField("WIDTH"))?;
    let height = height.ok_or(HeaderError::MissingField("HEIGHT"))?;
    let depth = depth.ok_or(HeaderError::MissingField("DEPTH"))?;
    let maxval = read_maxval(maxval.ok_or(HeaderError::MissingField("MAXVAL"))?)?;

    Ok(ImageDescriptor {
        format: FormatVariant::ArbitraryMap,
        size: Vec2(width, height).to_usize("image size")?,
        depth: u32_to_usize(depth, "depth")?,
        maxval,
        tuple_type: TupleType::from_label(&tuple_type),
        comments,
    })
}

fn keyword_name(keyword: &[u8]) -> &'static str {
    match keyword {
        b"WIDTH" => "width",
        b"HEIGHT" => "height",
        b"DEPTH" => "depth",
        _ => "maxval",
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&byte| !is_whitespace(byte)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&byte| !is_whitespace(byte)).map_or(start, |last| last + 1);
    &bytes[start .. end]
}
