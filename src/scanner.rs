//! Image asset discovery inside an extracted archive

use crate::codec::ImageCodec;
use crate::error::Result;
use crate::types::ImageAsset;
use std::path::{Path, PathBuf};

/// Image directory inside the extraction root
pub const IMAGE_DIR: &str = "OEBPS/images";

/// Recognized image extensions (case-sensitive match)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Enumerates image assets under an extraction root.
///
/// Only files directly under [`IMAGE_DIR`] whose extension is in
/// [`IMAGE_EXTENSIONS`] are considered; nothing else in the archive is
/// inspected.
pub struct ImageScanner<'a> {
    codec: &'a dyn ImageCodec,
}

impl<'a> ImageScanner<'a> {
    /// Create a scanner that inspects assets through `codec`
    #[must_use]
    pub fn new(codec: &'a dyn ImageCodec) -> Self {
        Self { codec }
    }

    /// Enumerate the image assets under `root` in lexicographic path order.
    ///
    /// The returned sequence is lazy (each asset is inspected when the
    /// iterator reaches it) and restartable (`scan` may be called again).
    /// A missing image directory yields an empty sequence. An asset that
    /// cannot be inspected is yielded as an `Err` item; the scan continues
    /// past it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the image directory itself cannot be
    /// listed.
    pub fn scan(&self, root: &Path) -> Result<ScannedAssets<'a>> {
        let image_dir = root.join(IMAGE_DIR);
        let mut entries = Vec::new();

        if image_dir.is_dir() {
            for dir_entry in std::fs::read_dir(&image_dir)? {
                let dir_entry = dir_entry?;
                if !dir_entry.file_type()?.is_file() {
                    continue;
                }
                let path = dir_entry.path();
                if is_image_file(&path) {
                    let rel_path = PathBuf::from(IMAGE_DIR).join(dir_entry.file_name());
                    entries.push((path, rel_path));
                }
            }
        }
        entries.sort();

        Ok(ScannedAssets {
            codec: self.codec,
            entries: entries.into_iter(),
        })
    }
}

/// Lazy iterator over scanned image assets
pub struct ScannedAssets<'a> {
    codec: &'a dyn ImageCodec,
    entries: std::vec::IntoIter<(PathBuf, PathBuf)>,
}

impl Iterator for ScannedAssets<'_> {
    type Item = Result<ImageAsset>;

    fn next(&mut self) -> Option<Self::Item> {
        let (path, rel_path) = self.entries.next()?;
        match self.codec.inspect(&path) {
            Ok(info) => Some(Ok(ImageAsset::new(
                path,
                rel_path,
                info.color_space,
                info.has_profile,
            ))),
            Err(e) => Some(Err(e)),
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}
