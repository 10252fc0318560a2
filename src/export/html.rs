//! HTML Export Generation
//!
//! This module generates complete standalone HTML documents from cloned
//! export markup, with captured styles inlined for dependency-free viewing.

use crate::error::{Error, Result};
use crate::export::options::ExportOptions;
use crate::export::Artifact;
use crate::markup::{escape_text, Element};
use crate::style::capture::{collect_table_css, inline_resolved_styles, vertical_divider_rule};
use crate::style::sanitize::strip_unsafe_declarations;
use crate::style::{RuleLibrary, StyleResolver};

// ─────────────────────────────────────────────────────────────────────────────
// Table Documents
// ─────────────────────────────────────────────────────────────────────────────

/// Export table markup as a standalone HTML page: resolved styles inlined
/// on the clone, applicable rules plus synthesized divider rules in the
/// document's style block.
///
/// # Errors
///
/// Returns [`Error::EmptyExportRoot`] when the markup holds no visible
/// text; no artifact is produced.
pub fn export_table_html(
    root: &Element,
    resolver: &dyn StyleResolver,
    library: &RuleLibrary,
    options: &ExportOptions,
) -> Result<Artifact> {
    if root.is_effectively_empty() {
        return Err(Error::EmptyExportRoot {
            target: options.target.label().to_string(),
        });
    }

    let mut clone = root.clone();
    inline_resolved_styles(&mut clone, resolver);
    if clone.is_tag("table") {
        ensure_border_collapse(&mut clone);
    }

    let mut css = collect_table_css(root, library);
    css.push_str(&vertical_divider_rule(root, resolver));
    if let Some(custom) = &options.custom_css {
        css.push('\n');
        css.push_str(custom);
    }
    let style_block = format!("<style>{}</style>", strip_unsafe_declarations(&css));

    let title = options.target.document_title();
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{styles}
</head>
<body style="margin:16px;font-family:system-ui,Segoe UI,Roboto,Arial,Helvetica,sans-serif">
  <h1 style="font-size:18px;margin:0 0 12px">{title}</h1>
  {markup}
</body></html>"#,
        title = escape_text(title),
        styles = style_block,
        markup = clone.serialize(),
    );

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        html,
    ))
}

/// Append `border-collapse:collapse; border-spacing:0;` unless border
/// collapsing is already declared on the clone.
fn ensure_border_collapse(clone: &mut Element) {
    let declared = clone
        .style
        .as_deref()
        .is_some_and(|style| style.contains("border-collapse"));
    if !declared {
        clone.append_inline_style("border-collapse:collapse; border-spacing:0;");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Documents
// ─────────────────────────────────────────────────────────────────────────────

/// Export the tree diagram as a standalone HTML page embedding the svg
/// markup with its namespaces ensured.
///
/// # Errors
///
/// Returns [`Error::MissingExportRoot`] when the root is not an `svg`
/// element.
pub fn export_tree_html(diagram: &Element, options: &ExportOptions) -> Result<Artifact> {
    if !diagram.is_tag("svg") {
        return Err(Error::MissingExportRoot {
            target: "tree diagram".to_string(),
        });
    }

    let mut clone = diagram.clone();
    clone.set_attr("xmlns", "http://www.w3.org/2000/svg");
    clone.set_attr("xmlns:xlink", "http://www.w3.org/1999/xlink");

    let title = options.target.document_title();
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>
    body {{
      font-family: Arial, sans-serif;
      background-color: white;
      text-align: center;
      margin: 0;
      padding: 20px;
    }}
    .svg-container {{
      display: flex;
      justify-content: center;
      align-items: center;
      margin-top: 20px;
    }}
    svg {{ max-width: 100%; height: auto; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <div class="svg-container">
    {markup}
  </div>
</body>
</html>"#,
        title = escape_text(title),
        markup = clone.serialize(),
    );

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        html,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
