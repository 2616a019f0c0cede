//! Human-legible chunk identifiers of the form `<sanitized stem>_<index>`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ChunkIdError;
use crate::types::UNKNOWN_SOURCE;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w-]").expect("static pattern is valid"));

/// File stem of `source_path` with spaces and non-word characters replaced by `_`.
///
/// An empty path maps to `"unknown"`.
///
/// # Errors
///
/// Returns [`ChunkIdError::NoFileStem`] when a non-empty path has no file stem (`/`, `..`).
pub fn sanitize_stem(source_path: &str) -> Result<String, ChunkIdError> {
    if source_path.is_empty() {
        return Ok(UNKNOWN_SOURCE.to_owned());
    }
    let stem = Path::new(source_path)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChunkIdError::NoFileStem {
            path: source_path.to_owned(),
        })?;
    let spaced = stem.replace(' ', "_");
    Ok(NON_WORD.replace_all(&spaced, "_").into_owned())
}

/// Chunk identifier for the chunk at `index` cut from `source_path`.
///
/// The index is zero-padded to at least three digits: `7` -> `_007`, `1000` -> `_1000`.
///
/// # Errors
///
/// Propagates [`sanitize_stem`] failures.
pub fn identify(source_path: &str, index: usize) -> Result<String, ChunkIdError> {
    let stem = sanitize_stem(source_path)?;
    Ok(format_id(&stem, index))
}

pub(crate) fn format_id(stem: &str, index: usize) -> String {
    format!("{stem}_{index:03}")
}

/// Short stable hash of the full source path, for disambiguating equal stems across runs.
#[must_use]
pub fn source_hash(source_path: &str) -> String {
    let hash = blake3::hash(source_path.as_bytes());
    hash.to_hex()[..16].to_owned()
}
