//! Export Options and Configuration
//!
//! This module defines the export options, format types, export targets,
//! and the persisted settings shape for the export pipeline.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::export::font::FontRequest;

/// Content types stamped onto artifacts, by format.
pub mod content_types {
    pub const TEXT: &str = "text/plain;charset=utf-8";
    pub const SVG: &str = "image/svg+xml;charset=utf-8";
    pub const HTML: &str = "text/html;charset=utf-8";
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Format
// ─────────────────────────────────────────────────────────────────────────────

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Monospace bordered text
    #[default]
    Text,
    /// Self-contained vector image
    Svg,
    /// Standalone HTML page
    Html,
}

impl ExportFormat {
    /// Get the display label for this format.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Text => "Plain Text",
            ExportFormat::Svg => "SVG Image",
            ExportFormat::Html => "HTML Page",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Svg => "svg",
            ExportFormat::Html => "html",
        }
    }

    /// Get the artifact content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => content_types::TEXT,
            ExportFormat::Svg => content_types::SVG,
            ExportFormat::Html => content_types::HTML,
        }
    }

    /// Get all available export formats.
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Text, ExportFormat::Svg, ExportFormat::Html]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Target
// ─────────────────────────────────────────────────────────────────────────────

/// What gets exported: one of the two tables, or the classification tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportTarget {
    DataTable,
    ValueTable,
    #[default]
    Tree,
}

impl ExportTarget {
    /// Get the display label for this target.
    pub fn label(&self) -> &'static str {
        match self {
            ExportTarget::DataTable => "data table",
            ExportTarget::ValueTable => "value table",
            ExportTarget::Tree => "tree",
        }
    }

    /// Base name used for default artifact filenames.
    pub fn basename(&self) -> &'static str {
        match self {
            ExportTarget::DataTable => "data-table",
            ExportTarget::ValueTable => "value-table",
            ExportTarget::Tree => "decision-tree",
        }
    }

    /// Title used by standalone document exports.
    pub fn document_title(&self) -> &'static str {
        match self {
            ExportTarget::DataTable => "Data Table",
            ExportTarget::ValueTable => "Value Table",
            ExportTarget::Tree => "Decision Tree ID3",
        }
    }

    /// Default artifact filename for the given format.
    pub fn default_filename(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.basename(), format.extension())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for a single export invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportOptions {
    /// The artifact format to produce
    pub format: ExportFormat,

    /// What to export
    pub target: ExportTarget,

    /// Overrides the default `<target>.<extension>` artifact name
    pub filename: Option<String>,

    /// Font embedded into vector exports (family name + resource location)
    pub embed_font: Option<FontRequest>,

    /// Custom CSS appended to captured styles (optional)
    pub custom_css: Option<String>,
}

impl ExportOptions {
    /// Create options for the given target and format.
    pub fn new(target: ExportTarget, format: ExportFormat) -> Self {
        Self {
            target,
            format,
            ..Default::default()
        }
    }

    /// Set the artifact filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the font embedded by vector exports.
    pub fn with_font(mut self, font: FontRequest) -> Self {
        self.embed_font = Some(font);
        self
    }

    /// The artifact filename: explicit override or the target default.
    pub fn artifact_name(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| self.target.default_filename(self.format))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Settings (for persistence)
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent export settings stored in user configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportSettings {
    /// Last used export format
    pub last_format: ExportFormat,

    /// Last export directory (for remembering user preference)
    pub last_export_directory: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_default() {
        assert_eq!(ExportFormat::default(), ExportFormat::Text);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Text.extension(), "txt");
        assert_eq!(ExportFormat::Svg.extension(), "svg");
        assert_eq!(ExportFormat::Html.extension(), "html");
    }

    #[test]
    fn test_export_format_content_type() {
        assert_eq!(ExportFormat::Svg.content_type(), content_types::SVG);
    }

    #[test]
    fn test_default_filenames() {
        assert_eq!(
            ExportTarget::DataTable.default_filename(ExportFormat::Text),
            "data-table.txt"
        );
        assert_eq!(
            ExportTarget::ValueTable.default_filename(ExportFormat::Svg),
            "value-table.svg"
        );
        assert_eq!(
            ExportTarget::Tree.default_filename(ExportFormat::Html),
            "decision-tree.html"
        );
    }

    #[test]
    fn test_artifact_name_override() {
        let options = ExportOptions::new(ExportTarget::Tree, ExportFormat::Text);
        assert_eq!(options.artifact_name(), "decision-tree.txt");

        let options = options.with_filename("my-tree.txt");
        assert_eq!(options.artifact_name(), "my-tree.txt");
    }

    #[test]
    fn test_export_options_serialization() {
        let options = ExportOptions::new(ExportTarget::DataTable, ExportFormat::Svg);
        let json = serde_json::to_string(&options).unwrap();
        let deserialized: ExportOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, deserialized);
    }
}
