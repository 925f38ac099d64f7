//! PNG inspection and iCCP chunk embedding
//!
//! Inspection goes through the `image` crate's PNG decoder (color type and
//! `icc_profile()`); embedding inserts a zlib-compressed iCCP chunk before
//! the first IDAT chunk per the PNG specification, leaving the image data
//! untouched. PNG has no CMYK color type, so PNG assets never satisfy the
//! eligibility rule; the embed path exists to complete the codec
//! capability.

use crate::codec::ImageInfo;
use crate::types::ColorSpace;
use flate2::{write::ZlibEncoder, Compression};
use image::codecs::png::PngDecoder;
use image::{ExtendedColorType, ImageDecoder};
use std::io::{Cursor, Write};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const ICCP_PROFILE_NAME: &str = "ICC Profile";

type CodecResult<T> = std::result::Result<T, String>;

/// Read color type and ICC presence via the PNG decoder
pub(crate) fn inspect(data: &[u8]) -> CodecResult<ImageInfo> {
    let mut decoder = PngDecoder::new(Cursor::new(data))
        .map_err(|e| format!("failed to create PNG decoder: {e}"))?;

    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L1
        | ExtendedColorType::L2
        | ExtendedColorType::L4
        | ExtendedColorType::L8
        | ExtendedColorType::L16
        | ExtendedColorType::La8
        | ExtendedColorType::La16 => ColorSpace::Gray,
        ExtendedColorType::Rgb8
        | ExtendedColorType::Rgb16
        | ExtendedColorType::Rgba8
        | ExtendedColorType::Rgba16 => ColorSpace::Rgb,
        _ => ColorSpace::Unknown,
    };

    let has_profile = match decoder.icc_profile() {
        Ok(profile) => profile.is_some_and(|p| !p.is_empty()),
        Err(e) => {
            log::debug!("failed to read ICC profile from PNG: {e}");
            false
        },
    };

    Ok(ImageInfo {
        color_space,
        has_profile,
    })
}

/// Extract the embedded ICC profile (decompressed), if any
pub(crate) fn read_profile(data: &[u8]) -> CodecResult<Option<Vec<u8>>> {
    let mut decoder = PngDecoder::new(Cursor::new(data))
        .map_err(|e| format!("failed to create PNG decoder: {e}"))?;

    match decoder.icc_profile() {
        Ok(profile) => Ok(profile),
        Err(e) => Err(format!("failed to read ICC profile from PNG: {e}")),
    }
}

/// Rewrite the PNG with `icc` embedded as its iCCP chunk.
///
/// Any existing iCCP chunk is dropped, as is a conflicting sRGB chunk; the
/// replacement is inserted before the first IDAT chunk. All other chunks
/// are copied verbatim.
pub(crate) fn embed_profile(data: &[u8], icc: &[u8]) -> CodecResult<Vec<u8>> {
    if icc.is_empty() {
        return Err("refusing to embed an empty profile".to_string());
    }
    if data.len() < 8 || &data[0..8] != PNG_SIGNATURE {
        return Err("invalid PNG signature".to_string());
    }

    let iccp_chunk = build_iccp_chunk(icc)?;
    let mut out = Vec::with_capacity(data.len() + iccp_chunk.len());
    out.extend_from_slice(&data[0..8]);

    let mut pos = 8usize;
    let mut inserted = false;

    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err("truncated PNG chunk header".to_string());
        }
        let length = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let total = 12 + length; // length + type + data + crc
        if pos + total > data.len() {
            return Err("truncated PNG chunk".to_string());
        }

        if chunk_type == b"IDAT" && !inserted {
            out.extend_from_slice(&iccp_chunk);
            inserted = true;
        }

        // drop a prior profile and a conflicting sRGB declaration
        if chunk_type != b"iCCP" && chunk_type != b"sRGB" {
            out.extend_from_slice(&data[pos..pos + total]);
        }
        pos += total;

        if chunk_type == b"IEND" {
            break;
        }
    }

    if !inserted {
        return Err("could not find IDAT chunk to insert iCCP".to_string());
    }
    Ok(out)
}

/// Build a complete iCCP chunk: name, compression method, zlib data, CRC
fn build_iccp_chunk(icc: &[u8]) -> CodecResult<Vec<u8>> {
    let mut compressed = Vec::new();
    {
        let mut encoder = ZlibEncoder::new(&mut compressed, Compression::default());
        encoder
            .write_all(icc)
            .and_then(|()| encoder.finish().map(|_| ()))
            .map_err(|e| format!("failed to compress ICC data: {e}"))?;
    }

    let mut chunk_data = Vec::with_capacity(ICCP_PROFILE_NAME.len() + 2 + compressed.len());
    chunk_data.extend_from_slice(ICCP_PROFILE_NAME.as_bytes());
    chunk_data.push(0); // name terminator
    chunk_data.push(0); // compression method: zlib
    chunk_data.extend_from_slice(&compressed);

    let length: u32 = chunk_data
        .len()
        .try_into()
        .map_err(|_| "ICC profile too large for a PNG chunk".to_string())?;

    let mut chunk = Vec::with_capacity(12 + chunk_data.len());
    chunk.extend_from_slice(&length.to_be_bytes());
    chunk.extend_from_slice(b"iCCP");
    chunk.extend_from_slice(&chunk_data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(b"iCCP");
    hasher.update(&chunk_data);
    chunk.extend_from_slice(&hasher.finalize().to_be_bytes());

    Ok(chunk)
}
