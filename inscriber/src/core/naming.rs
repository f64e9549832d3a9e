//! File naming rules shared by the batch loop and the planner.

use std::path::{Path, PathBuf};

/// Width of the zero-padded index in image file names.
pub const INDEX_WIDTH: usize = 5;

/// `<prefix><index:05>.<extension>`.
pub fn image_file_name(prefix: &str, index: u32, extension: &str) -> String {
    format!("{prefix}{index:0width$}.{extension}", width = INDEX_WIDTH)
}

/// Expected location of the image for `index` inside `directory`.
pub fn image_path(directory: &Path, prefix: &str, index: u32, extension: &str) -> PathBuf {
    directory.join(image_file_name(prefix, index, extension))
}

/// Derive the progress batch key from an image file name.
///
/// Drops the extension, then the trailing [`INDEX_WIDTH`] characters. For
/// names built by [`image_file_name`] with an index below 100000 this is the
/// prefix.
pub fn batch_key(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let keep = stem.chars().count().saturating_sub(INDEX_WIDTH);
    stem.chars().take(keep).collect()
}
