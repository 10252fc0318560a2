//! Style System for Treecast
//!
//! Presentation rules are captured from the view layer at export time and
//! baked into the artifact so it renders identically with no external
//! dependency. The pieces are deliberately decoupled from any rendering
//! engine:
//!
//! - [`RuleLibrary`]: every discoverable rule source, raw `<style>` block
//!   texts plus stylesheets, where a sheet whose rules cannot be enumerated
//!   (cross-origin denial) is represented and skipped silently.
//! - [`StyleResolver`]: the injected "computed style" oracle; the pipeline
//!   only ever asks it for the resolved value of one property on one
//!   element.
//! - `capture`: inlines resolved values onto clones, collects matching
//!   rules, and synthesizes the border override rules.
//! - `sanitize`: strips unsafe declarations and escapes characters illegal
//!   in the target markup.

pub mod capture;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::markup::Element;

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// A single captured presentation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CssRule {
    /// Ordinary style rule: comma-separated selector list plus declarations
    Style {
        selectors: String,
        declarations: String,
    },
    /// `@font-face` block; always included verbatim
    FontFace { declarations: String },
    /// `@keyframes` block; always included verbatim
    Keyframes { name: String, body: String },
}

impl CssRule {
    /// The rule rendered back to CSS text.
    pub fn css_text(&self) -> String {
        match self {
            CssRule::Style {
                selectors,
                declarations,
            } => format!("{} {{ {} }}", selectors, declarations),
            CssRule::FontFace { declarations } => {
                format!("@font-face {{ {} }}", declarations)
            }
            CssRule::Keyframes { name, body } => {
                format!("@keyframes {} {{ {} }}", name, body)
            }
        }
    }
}

/// A stylesheet as discovered in the view layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    /// Provenance label (link href or similar), for logging only
    pub href: Option<String>,
    /// `None` when rule enumeration was denied (cross-origin sheet); such
    /// sheets are skipped silently during capture
    pub rules: Option<Vec<CssRule>>,
}

impl StyleSheet {
    pub fn enumerable(rules: Vec<CssRule>) -> Self {
        Self {
            href: None,
            rules: Some(rules),
        }
    }

    pub fn denied(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            rules: None,
        }
    }
}

/// Every rule source discoverable at export time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleLibrary {
    /// Raw `<style>` block texts, included unconditionally
    pub inline_css: Vec<String>,
    pub sheets: Vec<StyleSheet>,
}

impl RuleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inline(mut self, css: impl Into<String>) -> Self {
        self.inline_css.push(css.into());
        self
    }

    pub fn with_sheet(mut self, sheet: StyleSheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolvers
// ─────────────────────────────────────────────────────────────────────────────

/// The injected style-resolution environment.
///
/// Implementations answer "what is the resolved value of `property` on
/// `element`?". In the live view this is the computed style; in tests and
/// headless snapshots it is a recorded map.
pub trait StyleResolver {
    fn resolved_value(&self, element: &Element, property: &str) -> Option<String>;
}

/// A resolver backed by recorded per-element values, keyed by element id.
/// Elements without an id resolve nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapResolver {
    by_id: HashMap<String, HashMap<String, String>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(by_id: HashMap<String, HashMap<String, String>>) -> Self {
        Self { by_id }
    }

    pub fn insert(
        &mut self,
        element_id: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.by_id
            .entry(element_id.into())
            .or_default()
            .insert(property.into(), value.into());
    }
}

impl StyleResolver for MapResolver {
    fn resolved_value(&self, element: &Element, property: &str) -> Option<String> {
        let id = element.id.as_deref()?;
        self.by_id.get(id)?.get(property).cloned()
    }
}

/// A resolver that resolves nothing; capture over it degrades to the rule
/// library and synthesized overrides alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl StyleResolver for NullResolver {
    fn resolved_value(&self, _element: &Element, _property: &str) -> Option<String> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
