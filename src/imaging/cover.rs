//! `cover.jpg` thumbnails built from the first image of a directory.

use super::{DerivationOptions, DerivationOutcome, codec};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// File name of the generated cover.
pub const COVER_FILE: &str = "cover.jpg";

/// Stem that marks a request as a cover request.
pub const COVER_STEM: &str = "cover";

/// Source images, highest precedence first.
pub const SOURCE_CANDIDATES: &[&str] = &["1.jpg", "1.jpeg", "1.png", "1.avif", "1.gif", "1.webp"];

/// First existing source candidate in `dir`.
pub fn find_source(dir: &Path) -> Option<PathBuf> {
    SOURCE_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Produce `dir/cover.jpg` unless it already exists.
pub fn derive(dir: &Path, options: &DerivationOptions) -> DerivationOutcome {
    let target = dir.join(COVER_FILE);
    if target.is_file() {
        return DerivationOutcome::Derived(target);
    }

    let Some(source) = find_source(dir) else {
        tracing::debug!(dir = %dir.display(), "No cover source candidate");
        return DerivationOutcome::Unavailable;
    };

    match render(&source, &target, options) {
        Ok(()) => {
            tracing::info!(
                source = %source.display(),
                target = %target.display(),
                "Generated cover"
            );
            DerivationOutcome::Derived(target)
        }
        Err(e) => {
            tracing::warn!(
                source = %source.display(),
                error = %e,
                "Cover generation failed, serving source"
            );
            DerivationOutcome::Fallback(source)
        }
    }
}

/// Decode `source`, shrink it to the cover width if wider, write JPEG.
fn render(source: &Path, target: &Path, options: &DerivationOptions) -> Result<()> {
    let img = codec::decode(source)?;

    let img = if img.width() > options.cover_width {
        codec::resize_to_width(&img, options.cover_width)
    } else {
        img
    };

    codec::save_jpeg(&img, target, options.jpeg_quality)
}
