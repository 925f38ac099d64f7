//! Shared fixtures for the correction pipeline tests
//!
//! Builds synthetic ePub archives from byte-level image fixtures. The
//! JPEG fixtures carry only the marker structure the codec reads (SOI,
//! JFIF, SOF, SOS, opaque entropy data); the PNG fixtures are real encoded
//! images.

#![allow(dead_code)]

use epub_cmyk_repair::{ImageCodec, MarkerCodec};
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Minimal structurally valid JPEG: SOI, JFIF APP0, SOF0 with the given
/// component count, SOS, two bytes of entropy data, EOI.
pub fn minimal_jpeg(components: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];

    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\0");
    data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);

    let sof_len = (8 + 3 * components as usize) as u16;
    data.extend_from_slice(&[0xFF, 0xC0]);
    data.extend_from_slice(&sof_len.to_be_bytes());
    data.extend_from_slice(&[0x08, 0x00, 0x01, 0x00, 0x01]);
    data.push(components);
    for c in 0..components {
        data.extend_from_slice(&[c + 1, 0x11, 0x00]);
    }

    let sos_len = (6 + 2 * components as usize) as u16;
    data.extend_from_slice(&[0xFF, 0xDA]);
    data.extend_from_slice(&sos_len.to_be_bytes());
    data.push(components);
    for c in 0..components {
        data.extend_from_slice(&[c + 1, 0x00]);
    }
    data.extend_from_slice(&[0x00, 0x3F, 0x00]);

    data.extend_from_slice(&[0x12, 0x34]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A CMYK JPEG without an embedded profile
pub fn cmyk_jpeg() -> Vec<u8> {
    minimal_jpeg(4)
}

/// An RGB JPEG without an embedded profile
pub fn rgb_jpeg() -> Vec<u8> {
    minimal_jpeg(3)
}

/// A JPEG of the given component count with `icc` embedded as a single
/// APP2 segment after the JFIF header
pub fn jpeg_with_profile(components: u8, icc: &[u8]) -> Vec<u8> {
    let base = minimal_jpeg(components);
    let jfif_end = 2 + 18; // SOI + APP0 segment

    let mut out = Vec::with_capacity(base.len() + icc.len() + 18);
    out.extend_from_slice(&base[0..jfif_end]);
    let segment_length = (2 + 12 + 2 + icc.len()) as u16;
    out.extend_from_slice(&[0xFF, 0xE2]);
    out.extend_from_slice(&segment_length.to_be_bytes());
    out.extend_from_slice(b"ICC_PROFILE\0");
    out.push(1);
    out.push(1);
    out.extend_from_slice(icc);
    out.extend_from_slice(&base[jfif_end..]);
    out
}

/// A real 1x1 RGB PNG
pub fn rgb_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(1, 1, image::Rgb([40, 50, 60]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Write a zip archive with the given entries, `mimetype` stored first
/// when present
pub fn build_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, data) in entries {
        let method = if *name == "mimetype" {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        writer
            .start_file(
                *name,
                SimpleFileOptions::default().compression_method(method),
            )
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// Write a well-formed ePub containing the given images under
/// `OEBPS/images/` plus a mimetype marker and a package file
pub fn build_epub(path: &Path, images: &[(&str, &[u8])]) {
    let mut entries: Vec<(String, &[u8])> = vec![
        ("mimetype".to_string(), b"application/epub+zip".as_slice()),
        (
            "OEBPS/content.opf".to_string(),
            b"<package version=\"2.0\"/>".as_slice(),
        ),
    ];
    for (name, data) in images {
        entries.push((format!("OEBPS/images/{name}"), data));
    }
    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(name, data)| (name.as_str(), *data))
        .collect();
    build_zip(path, &borrowed);
}

/// All entry names of an archive, in central directory order
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Bytes of one archive entry
pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// Embedded ICC profile of an image given as raw bytes
pub fn embedded_profile(image_bytes: &[u8], extension: &str) -> Option<Vec<u8>> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("probe.{extension}"));
    std::fs::write(&path, image_bytes).unwrap();
    MarkerCodec::new().read_profile(&path).unwrap()
}

/// Write a reference profile file and load it
pub fn reference_profile(dir: &Path, bytes: &[u8]) -> epub_cmyk_repair::ReferenceProfile {
    let path = dir.join("reference.icc");
    std::fs::write(&path, bytes).unwrap();
    epub_cmyk_repair::ReferenceProfile::load(&path).unwrap()
}
