//! Style Capture
//!
//! Gathers the presentation rules that apply to an export root and bakes
//! them into the clone: resolved values inlined per element, matching
//! library rules collected into a CSS block, and synthesized override rules
//! that normalize table separators across all output formats.
//!
//! Capture is a pure function of `(scoped subtree, resolver, rule library)`;
//! nothing here touches shared or global state.

use log::debug;

use crate::markup::{selector_matches, Element};
use crate::style::{RuleLibrary, StyleResolver};

// ─────────────────────────────────────────────────────────────────────────────
// Property Allow-Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Visual properties inlined onto generic markup clones.
const INLINE_PROPS: &[&str] = &[
    "display",
    "position",
    "box-sizing",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "text-align",
    "white-space",
    "color",
    "background",
    "background-color",
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "border-collapse",
    "border-spacing",
    "border-color",
    "border-width",
    "border-style",
    "vertical-align",
];

/// Visual properties inlined when the export root is an `svg` element.
const SVG_INLINE_PROPS: &[&str] = &[
    "fill",
    "stroke",
    "stroke-width",
    "font-size",
    "font-family",
    "font-weight",
    "text-anchor",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
];

/// Resolved values that carry no information and are never inlined.
const SKIPPED_VALUES: &[&str] = &["normal", "auto", "0px", "initial"];

// ─────────────────────────────────────────────────────────────────────────────
// Inlining
// ─────────────────────────────────────────────────────────────────────────────

/// Write resolved values for the property allow-list directly onto every
/// element of the clone. The list is chosen by the root's kind: the SVG
/// list for `svg` roots, the generic list otherwise.
pub fn inline_resolved_styles(root: &mut Element, resolver: &dyn StyleResolver) {
    let props = if root.is_tag("svg") {
        SVG_INLINE_PROPS
    } else {
        INLINE_PROPS
    };

    root.walk_mut(&mut |el| {
        let pairs: Vec<String> = props
            .iter()
            .filter_map(|prop| {
                resolver
                    .resolved_value(el, prop)
                    .filter(|v| !v.is_empty() && !SKIPPED_VALUES.contains(&v.as_str()))
                    .map(|v| format!("{}:{}", prop, v))
            })
            .collect();
        if !pairs.is_empty() {
            el.style = Some(pairs.join(";"));
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule Collection
// ─────────────────────────────────────────────────────────────────────────────

/// Collect every library rule that applies to the export root: raw
/// `<style>` block texts unconditionally, `@font-face` and `@keyframes`
/// blocks unconditionally, and style rules whose selector list matches the
/// root or a descendant. Sheets that cannot be enumerated are skipped.
pub fn collect_rules(root: &Element, library: &RuleLibrary) -> String {
    let mut css = String::new();

    for block in &library.inline_css {
        if !block.is_empty() {
            css.push('\n');
            css.push_str(block);
        }
    }

    for sheet in &library.sheets {
        let Some(rules) = &sheet.rules else {
            debug!(
                "Skipping non-enumerable stylesheet {}",
                sheet.href.as_deref().unwrap_or("(inline)")
            );
            continue;
        };

        for rule in rules {
            let include = match rule {
                crate::style::CssRule::FontFace { .. } | crate::style::CssRule::Keyframes { .. } => {
                    true
                }
                crate::style::CssRule::Style { selectors, .. } => selectors
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .any(|selector| selector_matches(root, selector)),
            };
            if include {
                css.push('\n');
                css.push_str(&rule.css_text());
            }
        }
    }

    css
}

/// Collect applicable rules for a table export and append the horizontal
/// separator overrides scoped to the table.
pub fn collect_table_css(root: &Element, library: &RuleLibrary) -> String {
    let mut css = collect_rules(root, library);
    css.push_str(&horizontal_separator_overrides(scope_selector(root)));
    css
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthesized Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// The selector scoping synthesized overrides to the export root.
pub fn scope_selector(root: &Element) -> &'static str {
    if root.is_tag("table") && root.has_class("table") {
        ".table"
    } else {
        "table"
    }
}

/// Suppress captured horizontal borders and draw a single thin separator
/// above every row except the first. Compensates for lossy shorthand
/// capture so all output formats show the same separators.
pub fn horizontal_separator_overrides(scope: &str) -> String {
    format!(
        r#"
/* === Export overrides: horizontal separators only === */
{scope} th, {scope} td {{
  border-top: none !important;
  border-bottom: none !important;
}}

/* From the second row on, draw the horizontal separator */
{scope} tr + tr > th,
{scope} tr + tr > td {{
  border-top: 1px solid #bbb !important;
}}

/* Never draw a border above the first row (header) */
{scope} thead tr:first-child > th,
{scope} thead tr:first-child > td,
{scope} tbody tr:first-child > th,
{scope} tbody tr:first-child > td,
{scope} tr:first-child > th,
{scope} tr:first-child > td {{
  border-top: none !important;
}}
"#
    )
}

/// Reconstruct the outer vertical separators of body rows from a sampled
/// representative row. Returns an empty string when the table has no body
/// row to sample.
pub fn vertical_divider_rule(table: &Element, resolver: &dyn StyleResolver) -> String {
    let scope = scope_selector(table);

    let has_thead = table.find_first("thead").is_some();
    let body_row_sel = if has_thead {
        "tbody tr"
    } else {
        "tr:not(:first-child)"
    };

    let Some(sample_row) = sample_body_row(table, has_thead) else {
        return String::new();
    };

    let cells: Vec<&Element> = sample_row
        .elements()
        .filter(|el| el.is_tag("th") || el.is_tag("td"))
        .collect();
    let first_cell = cells.first().copied();
    let last_cell = cells.last().copied();

    // Border to the right of the FIRST cell
    let right_width = sampled_width(first_cell, resolver, "border-right-width");
    let right_color = sampled_color(first_cell, resolver, "border-right-color");

    // Border to the left of the LAST cell
    let left_width = sampled_width(last_cell, resolver, "border-left-width");
    let left_color = sampled_color(last_cell, resolver, "border-left-color");

    format!(
        r#"
{scope} {body} > th:first-child,
{scope} {body} > td:first-child {{ border-right: {rw}px solid {rc} !important; }}

{scope} {body} > th:last-child,
{scope} {body} > td:last-child  {{ border-left:  {lw}px  solid {lc}  !important; }}
"#,
        scope = scope,
        body = body_row_sel,
        rw = format_width(right_width),
        rc = right_color,
        lw = format_width(left_width),
        lc = left_color,
    )
}

/// First body row of the table: the first `tbody` row when a `thead`
/// exists, otherwise the first `tr` that is not the table's first row.
fn sample_body_row(table: &Element, has_thead: bool) -> Option<&Element> {
    let mut rows = Vec::new();
    if has_thead {
        table.find_first("tbody")?.find_all("tr", &mut rows);
        rows.first().copied()
    } else {
        table.find_all("tr", &mut rows);
        rows.get(1).copied()
    }
}

fn sampled_width(cell: Option<&Element>, resolver: &dyn StyleResolver, property: &str) -> f64 {
    cell.and_then(|el| resolver.resolved_value(el, property))
        .and_then(|v| parse_px(&v))
        .map(|w| w.max(1.0))
        .unwrap_or(1.0)
}

fn sampled_color(cell: Option<&Element>, resolver: &dyn StyleResolver, property: &str) -> String {
    cell.and_then(|el| resolver.resolved_value(el, property))
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "#000".to_string())
}

/// Parse the leading numeric component of a length like `"1.5px"`.
fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Render a width without a trailing `.0` for whole values.
fn format_width(width: f64) -> String {
    if width.fract() == 0.0 {
        format!("{}", width as i64)
    } else {
        format!("{}", width)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
