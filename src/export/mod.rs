//! Artifact Export Module for Treecast
//!
//! This module assembles the static artifacts: bordered plain text,
//! self-contained SVG, and standalone HTML, each delivered to the caller as
//! a named byte blob.
//!
//! # Supported Export Formats
//!
//! - **Text**: monospace bordered grid / connector tree with a header block
//! - **SVG**: viewport-sized vector image with inlined, sanitized styles
//!   and an optionally embedded font
//! - **HTML**: full standalone page with title and embedded cloned markup
//!
//! # Architecture
//!
//! - `options.rs` - Export configuration, formats, and targets
//! - `text.rs` - Plain-text grid and tree renderers
//! - `font.rs` - Best-effort font embedding as a data URI
//! - `svg.rs` - Vector envelope assembly
//! - `html.rs` - Standalone document assembly

pub mod font;
pub mod html;
pub mod options;
pub mod svg;
pub mod text;

pub use font::{embed_font, FontRequest};
pub use options::{ExportFormat, ExportOptions, ExportTarget};

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Artifacts
// ─────────────────────────────────────────────────────────────────────────────

/// A finished export: a named, self-contained byte blob ready to hand to
/// the caller for download or saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, content_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// Build an artifact from already-rendered text.
    pub fn from_text(filename: impl Into<String>, content_type: &'static str, body: String) -> Self {
        Self::new(filename, content_type, body.into_bytes())
    }

    /// The blob as UTF-8 text, when it is text.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Write the blob into `dir` under its own filename, creating the
    /// directory when needed. Returns the full path written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|source| Error::ArtifactWrite {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes).map_err(|source| Error::ArtifactWrite {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
