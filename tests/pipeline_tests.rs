//! End-to-end tests of the per-archive correction pipeline

mod common;

use common::{
    build_epub, build_zip, cmyk_jpeg, embedded_profile, entry_names, jpeg_with_profile,
    read_entry, reference_profile, rgb_jpeg, rgb_png,
};
use epub_cmyk_repair::{
    repair_epub_file, ArchiveOutcome, RepairConfig, SkipReason,
};

const REFERENCE_ICC: &[u8] = b"reference cmyk profile bytes";

#[test]
fn correction_completeness() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(&epub, &[("cover.jpg", &cmyk_jpeg())]);
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let result = repair_epub_file(&epub, &profile, &RepairConfig::default()).unwrap();

    assert_eq!(result.images_changed, 1);
    assert!(result.rewritten());
    assert_eq!(result.outcome, ArchiveOutcome::Repacked);

    let corrected = read_entry(&epub, "OEBPS/images/cover.jpg");
    assert_eq!(
        embedded_profile(&corrected, "jpg").as_deref(),
        Some(REFERENCE_ICC)
    );
}

#[test]
fn idempotence() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(
        &epub,
        &[("a.jpg", &cmyk_jpeg()), ("b.jpg", &cmyk_jpeg())],
    );
    let profile = reference_profile(dir.path(), REFERENCE_ICC);
    let config = RepairConfig::default();

    let first = repair_epub_file(&epub, &profile, &config).unwrap();
    assert_eq!(first.images_changed, 2);

    let after_first = std::fs::read(&epub).unwrap();
    let second = repair_epub_file(&epub, &profile, &config).unwrap();

    assert_eq!(second.images_changed, 0);
    assert_eq!(second.outcome, ArchiveOutcome::Unchanged);
    assert_eq!(std::fs::read(&epub).unwrap(), after_first);
}

#[test]
fn noop_safety() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(
        &epub,
        &[
            ("photo.jpg", &rgb_jpeg()),
            ("chart.png", &rgb_png()),
            ("print.jpg", &jpeg_with_profile(4, b"existing profile")),
        ],
    );
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let before = std::fs::read(&epub).unwrap();
    let result = repair_epub_file(&epub, &profile, &RepairConfig::default()).unwrap();

    assert_eq!(result.images_changed, 0);
    assert_eq!(result.outcome, ArchiveOutcome::Unchanged);
    assert_eq!(std::fs::read(&epub).unwrap(), before);
}

#[test]
fn force_replaces_existing_profile() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(&epub, &[("print.jpg", &jpeg_with_profile(4, b"existing profile"))]);
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let config = RepairConfig::builder().force(true).build();
    let result = repair_epub_file(&epub, &profile, &config).unwrap();

    assert_eq!(result.images_changed, 1);
    let corrected = read_entry(&epub, "OEBPS/images/print.jpg");
    assert_eq!(
        embedded_profile(&corrected, "jpg").as_deref(),
        Some(REFERENCE_ICC)
    );
}

#[test]
fn non_image_files_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    let css = b"body { margin: 0 }".as_slice();
    let chapter = b"<html><body>ch 1</body></html>".as_slice();
    // a CMYK image outside the image directory must not be touched either
    let stray = cmyk_jpeg();
    build_zip(
        &epub,
        &[
            ("mimetype", b"application/epub+zip"),
            ("OEBPS/content.opf", b"<package/>"),
            ("OEBPS/styles/main.css", css),
            ("OEBPS/text/ch1.xhtml", chapter),
            ("OEBPS/extra/stray.jpg", &stray),
            ("OEBPS/images/cover.jpg", &cmyk_jpeg()),
        ],
    );
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let result = repair_epub_file(&epub, &profile, &RepairConfig::default()).unwrap();
    assert_eq!(result.images_changed, 1);

    assert_eq!(read_entry(&epub, "mimetype"), b"application/epub+zip");
    assert_eq!(read_entry(&epub, "OEBPS/content.opf"), b"<package/>");
    assert_eq!(read_entry(&epub, "OEBPS/styles/main.css"), css);
    assert_eq!(read_entry(&epub, "OEBPS/text/ch1.xhtml"), chapter);
    assert_eq!(read_entry(&epub, "OEBPS/extra/stray.jpg"), stray);

    // the repacked archive keeps the mimetype first
    assert_eq!(entry_names(&epub)[0], "mimetype");
}

#[test]
fn validation_gate_rejects_non_zip() {
    let dir = tempfile::tempdir().unwrap();
    let not_zip = dir.path().join("fake.epub");
    std::fs::write(&not_zip, b"plain text pretending to be an ePub").unwrap();
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let result = repair_epub_file(&not_zip, &profile, &RepairConfig::default()).unwrap();

    assert_eq!(result.images_changed, 0);
    assert_eq!(result.outcome, ArchiveOutcome::Skipped(SkipReason::NotAnArchive));
    assert_eq!(
        std::fs::read(&not_zip).unwrap(),
        b"plain text pretending to be an ePub"
    );
}

#[test]
fn marker_enforcement() {
    let dir = tempfile::tempdir().unwrap();
    let profile = reference_profile(dir.path(), REFERENCE_ICC);
    let config = RepairConfig::default();

    // no marker at all
    let no_marker = dir.path().join("nomarker.epub");
    build_zip(
        &no_marker,
        &[("OEBPS/images/cover.jpg", &cmyk_jpeg())],
    );
    let before = std::fs::read(&no_marker).unwrap();
    let result = repair_epub_file(&no_marker, &profile, &config).unwrap();
    assert_eq!(
        result.outcome,
        ArchiveOutcome::Skipped(SkipReason::MissingTypeMarker)
    );
    assert_eq!(std::fs::read(&no_marker).unwrap(), before);

    // marker present with the wrong content
    let bad_marker = dir.path().join("badmarker.epub");
    build_zip(
        &bad_marker,
        &[
            ("mimetype", b"application/x-not-an-epub"),
            ("OEBPS/images/cover.jpg", &cmyk_jpeg()),
        ],
    );
    let before = std::fs::read(&bad_marker).unwrap();
    let result = repair_epub_file(&bad_marker, &profile, &config).unwrap();
    assert_eq!(
        result.outcome,
        ArchiveOutcome::Skipped(SkipReason::TypeMismatch)
    );
    assert_eq!(std::fs::read(&bad_marker).unwrap(), before);
}

#[test]
fn batch_isolation() {
    let dir = tempfile::tempdir().unwrap();
    let profile = reference_profile(dir.path(), REFERENCE_ICC);
    let config = RepairConfig::default();

    let good_one = dir.path().join("one.epub");
    build_epub(&good_one, &[("a.jpg", &cmyk_jpeg())]);
    let malformed = dir.path().join("two.epub");
    std::fs::write(&malformed, b"garbage").unwrap();
    let good_two = dir.path().join("three.epub");
    build_epub(&good_two, &[("b.jpg", &cmyk_jpeg())]);

    let mut images_changed = 0;
    let mut files_changed = 0;
    let mut skipped = 0;
    for epub in [&good_one, &malformed, &good_two] {
        let result = repair_epub_file(epub, &profile, &config).unwrap();
        images_changed += result.images_changed;
        if result.rewritten() {
            files_changed += 1;
        }
        if matches!(result.outcome, ArchiveOutcome::Skipped(_)) {
            skipped += 1;
        }
    }

    assert_eq!(images_changed, 2);
    assert_eq!(files_changed, 2);
    assert_eq!(skipped, 1);

    // both valid archives were actually corrected
    for (epub, image) in [(&good_one, "a.jpg"), (&good_two, "b.jpg")] {
        let corrected = read_entry(epub, &format!("OEBPS/images/{image}"));
        assert_eq!(
            embedded_profile(&corrected, "jpg").as_deref(),
            Some(REFERENCE_ICC)
        );
    }
}

#[test]
fn unreadable_asset_excluded_scan_continues() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(
        &epub,
        &[
            ("broken.jpg", b"not actually a jpeg"),
            ("cover.jpg", &cmyk_jpeg()),
        ],
    );
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let result = repair_epub_file(&epub, &profile, &RepairConfig::default()).unwrap();

    // the broken asset is excluded, the readable one is still corrected
    assert_eq!(result.images_changed, 1);
    assert_eq!(read_entry(&epub, "OEBPS/images/broken.jpg"), b"not actually a jpeg");
    let corrected = read_entry(&epub, "OEBPS/images/cover.jpg");
    assert_eq!(
        embedded_profile(&corrected, "jpg").as_deref(),
        Some(REFERENCE_ICC)
    );
}

#[test]
fn png_assets_are_never_eligible() {
    let dir = tempfile::tempdir().unwrap();
    let epub = dir.path().join("book.epub");
    build_epub(&epub, &[("chart.png", &rgb_png())]);
    let profile = reference_profile(dir.path(), REFERENCE_ICC);

    let before = std::fs::read(&epub).unwrap();
    let result = repair_epub_file(&epub, &profile, &RepairConfig::default()).unwrap();

    assert_eq!(result.images_changed, 0);
    assert_eq!(std::fs::read(&epub).unwrap(), before);
}
