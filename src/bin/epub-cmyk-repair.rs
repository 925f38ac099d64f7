//! ePub CMYK Repair CLI Tool
//!
//! Command-line interface for correcting CMYK images without an embedded
//! color profile inside ePub archives.

#[cfg(feature = "cli")]
use epub_cmyk_repair::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
