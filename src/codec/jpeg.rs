//! JPEG marker-level inspection and ICC profile embedding
//!
//! JPEG files embed ICC profiles using the APP2 application marker with the
//! "ICC_PROFILE" identifier; large profiles are split across multiple APP2
//! segments to comply with JPEG's 64KB segment size limit. Inspection and
//! embedding both work on the marker stream directly, so the compressed
//! image data is passed through untouched (no re-encode, no quality loss).
//!
//! The color space is taken from the frame header: a 4-component SOF is
//! CMYK (or Adobe YCCK, which needs the same profile treatment), 3
//! components are RGB/YCbCr, 1 component is grayscale.

use crate::codec::ImageInfo;
use crate::types::ColorSpace;

const ICC_IDENTIFIER: &[u8] = b"ICC_PROFILE\0";

/// Segment header: marker + length field + identifier + seq + total
const APP2_HEADER_SIZE: usize = 2 + 2 + 12 + 1 + 1;
const MAX_SEGMENT_SIZE: usize = 65535;
const MAX_ICC_DATA_PER_SEGMENT: usize = MAX_SEGMENT_SIZE - APP2_HEADER_SIZE;

type CodecResult<T> = std::result::Result<T, String>;

/// One marker segment in the header section (everything before SOS)
struct Segment<'a> {
    marker: u8,
    /// Segment bytes without the two marker bytes and the length field
    body: &'a [u8],
    /// Offset of the marker byte pair in the input
    start: usize,
    /// Offset one past the segment's last byte
    end: usize,
}

impl Segment<'_> {
    fn is_icc(&self) -> bool {
        self.marker == 0xE2 && self.body.starts_with(ICC_IDENTIFIER)
    }
}

/// Parse the header section into segments.
///
/// Returns the segments and the offset where the remainder of the file
/// begins (the SOS or EOI marker); nothing past that offset is parsed,
/// since entropy-coded data may contain arbitrary 0xFF bytes.
fn parse_header(data: &[u8]) -> CodecResult<(Vec<Segment<'_>>, usize)> {
    if data.len() < 2 || data[0..2] != [0xFF, 0xD8] {
        return Err("missing SOI marker".to_string());
    }

    let mut segments = Vec::new();
    let mut pos = 2usize;

    loop {
        if pos + 2 > data.len() {
            return Err("truncated JPEG: no scan data".to_string());
        }
        if data[pos] != 0xFF {
            return Err(format!("invalid marker byte at offset {pos}"));
        }

        let marker = data[pos + 1];
        match marker {
            // fill byte before a marker
            0xFF => {
                pos += 1;
            },
            // SOS or EOI ends the header section
            0xDA | 0xD9 => return Ok((segments, pos)),
            0xD8 => return Err("unexpected SOI marker inside stream".to_string()),
            // standalone markers carry no length field
            0x01 | 0xD0..=0xD7 => {
                segments.push(Segment {
                    marker,
                    body: &[],
                    start: pos,
                    end: pos + 2,
                });
                pos += 2;
            },
            _ => {
                if pos + 4 > data.len() {
                    return Err("truncated marker segment".to_string());
                }
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                if len < 2 || pos + 2 + len > data.len() {
                    return Err("truncated marker segment".to_string());
                }
                segments.push(Segment {
                    marker,
                    body: &data[pos + 4..pos + 2 + len],
                    start: pos,
                    end: pos + 2 + len,
                });
                pos += 2 + len;
            },
        }
    }
}

/// Read color space and ICC presence from the JPEG header section
pub(crate) fn inspect(data: &[u8]) -> CodecResult<ImageInfo> {
    let (segments, _) = parse_header(data)?;

    let has_profile = segments.iter().any(Segment::is_icc);
    let components = segments
        .iter()
        .find(|s| is_sof(s.marker))
        .and_then(|s| s.body.get(5))
        .copied();

    let color_space = match components {
        Some(4) => ColorSpace::Cmyk,
        Some(3) => ColorSpace::Rgb,
        Some(1) => ColorSpace::Gray,
        Some(_) => ColorSpace::Unknown,
        None => return Err("no frame header before scan data".to_string()),
    };

    Ok(ImageInfo {
        color_space,
        has_profile,
    })
}

/// Extract the embedded ICC profile, reassembled from its APP2 segments
pub(crate) fn read_profile(data: &[u8]) -> CodecResult<Option<Vec<u8>>> {
    let (segments, _) = parse_header(data)?;

    // identifier(12) seq(1) total(1) payload
    let mut chunks: Vec<(u8, &[u8])> = segments
        .iter()
        .filter(|s| s.is_icc() && s.body.len() > 14)
        .map(|s| (s.body[12], &s.body[14..]))
        .collect();

    if chunks.is_empty() {
        return Ok(None);
    }

    chunks.sort_by_key(|(seq, _)| *seq);
    let mut profile = Vec::new();
    for (_, chunk) in chunks {
        profile.extend_from_slice(chunk);
    }
    Ok(Some(profile))
}

/// Rewrite the JPEG with `icc` as its embedded profile.
///
/// Any existing APP2 ICC segments are dropped; the replacement segments are
/// inserted after the JFIF/EXIF preamble (or directly after SOI when there
/// is none). Everything from the scan marker onwards is copied verbatim.
pub(crate) fn embed_profile(data: &[u8], icc: &[u8]) -> CodecResult<Vec<u8>> {
    if icc.is_empty() {
        return Err("refusing to embed an empty profile".to_string());
    }

    let (segments, tail_start) = parse_header(data)?;
    let app2 = build_app2_segments(icc)?;

    let mut out = Vec::with_capacity(data.len() + app2.len());
    out.extend_from_slice(&data[0..2]);

    let mut inserted = false;
    for segment in &segments {
        // keep the JFIF/EXIF preamble ahead of the profile
        if !inserted && !matches!(segment.marker, 0xE0 | 0xE1) {
            out.extend_from_slice(&app2);
            inserted = true;
        }
        if !segment.is_icc() {
            out.extend_from_slice(&data[segment.start..segment.end]);
        }
    }
    if !inserted {
        out.extend_from_slice(&app2);
    }

    out.extend_from_slice(&data[tail_start..]);
    Ok(out)
}

/// Build the APP2 segment run for `icc`, chunked to the segment size limit
fn build_app2_segments(icc: &[u8]) -> CodecResult<Vec<u8>> {
    let total_segments = icc.len().div_ceil(MAX_ICC_DATA_PER_SEGMENT);
    if total_segments > 255 {
        return Err("ICC profile too large: requires more than 255 APP2 segments".to_string());
    }

    let mut out = Vec::with_capacity(icc.len() + total_segments * APP2_HEADER_SIZE);
    for (index, chunk) in icc.chunks(MAX_ICC_DATA_PER_SEGMENT).enumerate() {
        // length field counts itself, the identifier, seq/total and the data
        let segment_length = (2 + ICC_IDENTIFIER.len() + 2 + chunk.len()) as u16;

        out.extend_from_slice(&[0xFF, 0xE2]);
        out.extend_from_slice(&segment_length.to_be_bytes());
        out.extend_from_slice(ICC_IDENTIFIER);
        out.push((index + 1) as u8);
        out.push(total_segments as u8);
        out.extend_from_slice(chunk);
    }
    Ok(out)
}

fn is_sof(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}
