//! SVG Export Generation
//!
//! Assembles self-contained vector artifacts. Two envelope shapes exist:
//!
//! - Generic markup (the tables) is wrapped in a viewport-sized `svg`
//!   carrying a `foreignObject` with an XHTML region that holds the cloned
//!   markup and its sanitized styles. The viewport is sized from the
//!   *original* element's live bounding box, rounded up to whole units.
//! - An `svg` export root (the tree diagram) is cloned natively: namespaces
//!   ensured, suppressed groups pruned, collected styles and the embedded
//!   font inserted as leading `<style>` children.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::export::font::{embed_font, fallback_rule, FontRequest};
use crate::export::options::ExportOptions;
use crate::export::Artifact;
use crate::markup::{BoundingBox, Element, Node};
use crate::style::capture::{collect_rules, collect_table_css, inline_resolved_styles, vertical_divider_rule};
use crate::style::sanitize::{sanitize_css, strip_unsafe_declarations};
use crate::style::{RuleLibrary, StyleResolver};

/// XML declaration prepended to native svg artifacts.
const XML_HEADER: &str = "<?xml version=\"1.0\" standalone=\"no\"?>";

/// Font stack applied to the XHTML region wrapping table clones.
const REGION_STYLE: &str = "font-family:system-ui,Segoe UI,Roboto,Arial,Helvetica,sans-serif;\
                            color:#111; background:#fff; display:inline-block;";

// ─────────────────────────────────────────────────────────────────────────────
// Table Vector Export
// ─────────────────────────────────────────────────────────────────────────────

/// Export table markup as a self-contained vector image.
///
/// # Errors
///
/// Returns [`Error::EmptyExportRoot`] when the markup holds no visible
/// text; no artifact is produced.
pub fn export_table_svg(
    root: &Element,
    resolver: &dyn StyleResolver,
    library: &RuleLibrary,
    bounds: BoundingBox,
    options: &ExportOptions,
) -> Result<Artifact> {
    if root.is_effectively_empty() {
        return Err(Error::EmptyExportRoot {
            target: options.target.label().to_string(),
        });
    }

    let mut clone = root.clone();
    inline_resolved_styles(&mut clone, resolver);
    ensure_border_collapse(&mut clone);

    let mut css = collect_table_css(root, library);
    css.push_str(&vertical_divider_rule(root, resolver));
    if let Some(custom) = &options.custom_css {
        css.push('\n');
        css.push_str(custom);
    }
    let style_block = format!("<style>{}</style>", sanitize_css(&css));

    let width = bounds.viewport_width();
    let height = bounds.viewport_height();

    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\"\n     \
         width=\"{width}\" height=\"{height}\"\n     \
         viewBox=\"0 0 {width} {height}\">\n  \
         <foreignObject x=\"0\" y=\"0\" width=\"100%\" height=\"100%\">\n    \
         <div xmlns=\"http://www.w3.org/1999/xhtml\"\n         style=\"{region}\">\n      \
         {styles}\n      {markup}\n    </div>\n  \
         </foreignObject>\n</svg>\n",
        width = width,
        height = height,
        region = REGION_STYLE,
        styles = style_block,
        markup = clone.serialize(),
    );

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        svg,
    ))
}

/// Append `border-collapse:collapse;border-spacing:0;` to the clone's
/// inline style unless border collapsing is already declared.
fn ensure_border_collapse(clone: &mut Element) {
    let declared = clone
        .style
        .as_deref()
        .is_some_and(|style| style.contains("border-collapse"));
    if !declared {
        clone.append_inline_style("border-collapse:collapse;border-spacing:0;");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Vector Export
// ─────────────────────────────────────────────────────────────────────────────

/// Export the tree diagram (an `svg` export root) as a self-contained
/// vector image: suppressed groups pruned, styles collected and sanitized,
/// the configured font embedded. Font embedding completes before final
/// assembly and never fails the export.
///
/// # Errors
///
/// Returns [`Error::MissingExportRoot`] when the root is not an `svg`
/// element.
pub fn export_tree_svg(
    diagram: &Element,
    resolver: &dyn StyleResolver,
    library: &RuleLibrary,
    font: Option<&FontRequest>,
    options: &ExportOptions,
) -> Result<Artifact> {
    if !diagram.is_tag("svg") {
        return Err(Error::MissingExportRoot {
            target: "tree diagram".to_string(),
        });
    }

    let mut clone = diagram.clone();
    clone.set_attr("version", "1.1");
    clone.set_attr("xmlns", "http://www.w3.org/2000/svg");
    clone.set_attr("xmlns:xlink", "http://www.w3.org/1999/xlink");

    prune_suppressed(diagram, &mut clone, resolver);
    inline_resolved_styles(&mut clone, resolver);

    // Styles first, then the font rule in front of it, both ahead of the
    // diagram content. Stripped but not entity-escaped: the style text is a
    // child node here, so escaping happens at serialization.
    let css = collect_rules(diagram, library);
    if !css.trim().is_empty() {
        insert_style_child(&mut clone, strip_unsafe_declarations(&css));
    }
    let font_css = match font {
        Some(request) => embed_font(request),
        None => fallback_rule().to_string(),
    };
    insert_style_child(&mut clone, font_css);

    let mut source = clone.serialize();
    if !source.starts_with("<?xml") {
        source = format!("{}\n{}", XML_HEADER, source);
    }

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        source,
    ))
}

/// Remove from the clone every `g`/`use` element whose display state is
/// suppressed in the original.
fn prune_suppressed(original: &Element, clone: &mut Element, resolver: &dyn StyleResolver) {
    let mut suppressed: HashSet<String> = HashSet::new();
    original.walk(&mut |el| {
        if (el.is_tag("g") || el.is_tag("use")) && el.id.is_some() {
            let hidden = resolver
                .resolved_value(el, "display")
                .is_some_and(|display| display == "none");
            if hidden {
                if let Some(id) = &el.id {
                    suppressed.insert(id.clone());
                }
            }
        }
    });

    if !suppressed.is_empty() {
        clone.remove_elements_with_ids(&suppressed);
    }
}

fn insert_style_child(svg: &mut Element, css: String) {
    let style = Element::new("style")
        .with_attr("type", "text/css")
        .text(css);
    svg.children.insert(0, Node::Element(style));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
