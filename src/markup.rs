//! Generic Markup Tree
//!
//! A lightweight element tree standing in for the live view's node tree.
//! Export entry points receive the scoped export root as an [`Element`],
//! clone it (values only, never references), decorate the clone with
//! captured styles, and serialize it into the artifact envelope.
//!
//! The module also provides the small selector subset used when deciding
//! which library rules apply to an export root (tag, `#id`, `.class`,
//! compounds, descendant and child combinators). Selectors outside the
//! subset match nothing; rule collection degrades silently rather than
//! failing an export.

use serde::{Deserialize, Serialize};

use crate::model::TableView;

// ─────────────────────────────────────────────────────────────────────────────
// Nodes and Elements
// ─────────────────────────────────────────────────────────────────────────────

/// A markup node: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// An element of the markup tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Additional attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Inline style text, if any
    pub style: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value of the same name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            entry.1 = value;
        } else {
            self.attributes.push((name.to_string(), value));
        }
    }

    /// Append declarations to the inline style (with a `;` separator when
    /// style text already exists).
    pub fn append_inline_style(&mut self, extra: &str) {
        match &mut self.style {
            Some(style) if !style.is_empty() => {
                if !style.ends_with(';') {
                    style.push(';');
                }
                style.push_str(extra);
            }
            _ => self.style = Some(extra.to_string()),
        }
    }

    /// Direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Visit this element and every descendant element, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.elements() {
            child.walk(visit);
        }
    }

    /// Visit this element and every descendant element mutably, depth first.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.walk_mut(visit);
            }
        }
    }

    /// First descendant (or self) with the given tag, depth first.
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        if self.is_tag(tag) {
            return Some(self);
        }
        self.elements().find_map(|child| child.find_first(tag))
    }

    /// All descendants (and self) with the given tag, in document order.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.is_tag(tag) {
            out.push(self);
        }
        for child in self.elements() {
            child.find_all(tag, out);
        }
    }

    /// Remove every descendant element whose id is in `ids`.
    pub fn remove_elements_with_ids(&mut self, ids: &std::collections::HashSet<String>) {
        self.children.retain(|node| match node {
            Node::Element(el) => !el.id.as_ref().is_some_and(|id| ids.contains(id)),
            Node::Text(_) => true,
        });
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.remove_elements_with_ids(ids);
            }
        }
    }

    /// Concatenated text content of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// True when the subtree carries no visible text.
    pub fn is_effectively_empty(&self) -> bool {
        self.text_content().trim().is_empty()
    }

    /// Serialize this subtree to markup text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        serialize_element(self, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(text);
            }
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialization
// ─────────────────────────────────────────────────────────────────────────────

/// Escape text content for markup (`&`, `<`, `>`).
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for markup (`&`, `<`, `>`, `"`).
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn serialize_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);

    if let Some(id) = &el.id {
        out.push_str(&format!(" id=\"{}\"", escape_attr(id)));
    }
    if !el.classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", escape_attr(&el.classes.join(" "))));
    }
    if let Some(style) = &el.style {
        out.push_str(&format!(" style=\"{}\"", escape_attr(style)));
    }
    for (name, value) in &el.attributes {
        out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }
    out.push('>');

    for node in &el.children {
        match node {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(child) => serialize_element(child, out),
        }
    }

    out.push_str(&format!("</{}>", el.tag));
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounding Box
// ─────────────────────────────────────────────────────────────────────────────

/// The live bounding box of the original (on-screen) export root, measured
/// by the view layer. Vector exports size their viewport from it, rounding
/// up to whole device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width rounded up to whole units (at least 1).
    pub fn viewport_width(&self) -> u32 {
        self.width.ceil().max(1.0) as u32
    }

    /// Height rounded up to whole units (at least 1).
    pub fn viewport_height(&self) -> u32 {
        self.height.ceil().max(1.0) as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Selector Matching
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Debug, Clone)]
struct SelectorPart {
    combinator: Combinator,
    compound: Compound,
}

/// True when `selector` matches `root` or any of its descendants.
///
/// Supports the subset actually found in the captured rule libraries: tag,
/// `#id`, `.class`, compounds of those, `*`, and descendant/child
/// combinators. Anything else (pseudo-classes, attribute selectors, sibling
/// combinators) is unsupported and matches nothing.
pub fn selector_matches(root: &Element, selector: &str) -> bool {
    let Some(parts) = parse_selector(selector) else {
        return false;
    };
    if parts.is_empty() {
        return false;
    }

    let mut matched = false;
    root.walk(&mut |el| {
        if !matched && compound_matches(el, &parts[0].compound) && tail_matches(el, &parts[1..]) {
            matched = true;
        }
    });
    matched
}

fn tail_matches(el: &Element, parts: &[SelectorPart]) -> bool {
    let Some(part) = parts.first() else {
        return true;
    };

    match part.combinator {
        Combinator::Child => el
            .elements()
            .any(|child| compound_matches(child, &part.compound) && tail_matches(child, &parts[1..])),
        Combinator::Descendant => {
            let mut matched = false;
            for child in el.elements() {
                child.walk(&mut |desc| {
                    if !matched
                        && compound_matches(desc, &part.compound)
                        && tail_matches(desc, &parts[1..])
                    {
                        matched = true;
                    }
                });
                if matched {
                    break;
                }
            }
            matched
        }
    }
}

fn compound_matches(el: &Element, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if tag != "*" && !el.is_tag(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if el.id.as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    compound.classes.iter().all(|class| el.has_class(class))
}

/// Parse a selector into combinator/compound parts, or `None` when it uses
/// syntax outside the supported subset.
fn parse_selector(selector: &str) -> Option<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut combinator = Combinator::Descendant;

    for token in selector.split_whitespace() {
        if token == ">" {
            combinator = Combinator::Child;
            continue;
        }
        // Compounds glued to a `>` are split here rather than rejected.
        for (idx, piece) in token.split('>').enumerate() {
            if piece.is_empty() {
                combinator = Combinator::Child;
                continue;
            }
            let compound = parse_compound(piece)?;
            parts.push(SelectorPart {
                combinator: if idx > 0 { Combinator::Child } else { combinator },
                compound,
            });
            combinator = Combinator::Descendant;
        }
    }

    Some(parts)
}

fn parse_compound(piece: &str) -> Option<Compound> {
    let mut tag = None;
    let mut id = None;
    let mut classes = Vec::new();

    let mut rest = piece;
    if !rest.starts_with('.') && !rest.starts_with('#') {
        let end = rest
            .find(['.', '#'])
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if !is_simple_name(name) && name != "*" {
            return None;
        }
        tag = Some(name.to_ascii_lowercase());
        rest = &rest[end..];
    }

    while !rest.is_empty() {
        let marker = rest.chars().next()?;
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let name = &body[..end];
        if !is_simple_name(name) {
            return None;
        }
        match marker {
            '.' => classes.push(name.to_string()),
            '#' => id = Some(name.to_string()),
            _ => return None,
        }
        rest = &body[end..];
    }

    Some(Compound { tag, id, classes })
}

fn is_simple_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ─────────────────────────────────────────────────────────────────────────────
// Table Markup Synthesis
// ─────────────────────────────────────────────────────────────────────────────

/// Build table markup from a [`TableView`], mirroring the structure the live
/// view renders: a `table.table` root, a `thead` when the view carries a
/// header section, and body rows under `tbody`. Cells keep their span
/// attributes; cell text is flattened.
pub fn table_markup(table: &TableView) -> Element {
    let mut root = Element::new("table").with_class("table");

    let mut body_rows = table.rows.as_slice();
    if table.has_header_section {
        if let Some((header, rest)) = table.rows.split_first() {
            let mut thead = Element::new("thead");
            thead = thead.child(row_markup(header, "th"));
            root = root.child(thead);
            body_rows = rest;
        }
    }

    let mut tbody = Element::new("tbody");
    for row in body_rows {
        tbody = tbody.child(row_markup(row, "td"));
    }
    root.child(tbody)
}

fn row_markup(row: &crate::model::Row, cell_tag: &str) -> Element {
    let mut tr = Element::new("tr");
    for cell in row.cells() {
        let mut el = Element::new(cell_tag).text(cell.flattened_text());
        if cell.row_span > 1 {
            el = el.with_attr("rowspan", cell.row_span.to_string());
        }
        if cell.col_span > 1 {
            el = el.with_attr("colspan", cell.col_span.to_string());
        }
        tr = tr.child(el);
    }
    tr
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row, TableView};

    fn sample_table_el() -> Element {
        Element::new("table").with_class("table").child(
            Element::new("tbody").child(
                Element::new("tr")
                    .child(Element::new("td").with_id("c1").text("a"))
                    .child(Element::new("td").text("b")),
            ),
        )
    }

    #[test]
    fn test_serialize_escapes_text_and_attrs() {
        let el = Element::new("td")
            .with_attr("title", "a \"quoted\" <value>")
            .text("1 < 2 & 3 > 2");
        let markup = el.serialize();
        assert_eq!(
            markup,
            "<td title=\"a &quot;quoted&quot; &lt;value&gt;\">1 &lt; 2 &amp; 3 &gt; 2</td>"
        );
    }

    #[test]
    fn test_serialize_id_class_style() {
        let el = Element::new("div")
            .with_id("root")
            .with_class("a")
            .with_class("b")
            .with_style("color:#111");
        assert_eq!(
            el.serialize(),
            "<div id=\"root\" class=\"a b\" style=\"color:#111\"></div>"
        );
    }

    #[test]
    fn test_selector_tag_and_class() {
        let el = sample_table_el();
        assert!(selector_matches(&el, "table"));
        assert!(selector_matches(&el, ".table"));
        assert!(selector_matches(&el, "table.table"));
        assert!(selector_matches(&el, "td"));
        assert!(selector_matches(&el, "#c1"));
        assert!(!selector_matches(&el, ".missing"));
        assert!(!selector_matches(&el, "span"));
    }

    #[test]
    fn test_selector_combinators() {
        let el = sample_table_el();
        assert!(selector_matches(&el, "table td"));
        assert!(selector_matches(&el, "tbody > tr"));
        assert!(selector_matches(&el, "tbody>tr"));
        assert!(selector_matches(&el, "table > tbody > tr > td"));
        // `tr` is not a direct child of `table`
        assert!(!selector_matches(&el, "table > tr"));
    }

    #[test]
    fn test_unsupported_selector_matches_nothing() {
        let el = sample_table_el();
        assert!(!selector_matches(&el, "tr:first-child > td"));
        assert!(!selector_matches(&el, "tr + tr"));
        assert!(!selector_matches(&el, "td[title]"));
        assert!(!selector_matches(&el, ""));
    }

    #[test]
    fn test_text_content_and_emptiness() {
        let el = sample_table_el();
        assert_eq!(el.text_content(), "a b");
        assert!(!el.is_effectively_empty());
        assert!(Element::new("div").is_effectively_empty());
    }

    #[test]
    fn test_remove_elements_with_ids() {
        let mut el = Element::new("svg")
            .child(Element::new("g").with_id("keep").child(Element::new("use").with_id("drop")))
            .child(Element::new("g").with_id("drop2"));

        let ids: std::collections::HashSet<String> =
            ["drop".to_string(), "drop2".to_string()].into_iter().collect();
        el.remove_elements_with_ids(&ids);

        let markup = el.serialize();
        assert!(markup.contains("keep"));
        assert!(!markup.contains("drop"));
    }

    #[test]
    fn test_append_inline_style() {
        let mut el = Element::new("table").with_style("color:#111");
        el.append_inline_style("border-collapse:collapse");
        assert_eq!(
            el.style.as_deref(),
            Some("color:#111;border-collapse:collapse")
        );

        let mut bare = Element::new("table");
        bare.append_inline_style("border-collapse:collapse");
        assert_eq!(bare.style.as_deref(), Some("border-collapse:collapse"));
    }

    #[test]
    fn test_table_markup_with_header() {
        let table = TableView::new(vec![
            Row::new(vec![Cell::new("Outlook"), Cell::new("Play")]),
            Row::new(vec![Cell::spanning("Sunny", 2, 1), Cell::new("No")]),
        ])
        .with_header(true);

        let el = table_markup(&table);
        assert!(el.find_first("thead").is_some());
        let markup = el.serialize();
        assert!(markup.contains("<th>Outlook</th>"));
        assert!(markup.contains("rowspan=\"2\""));
        assert!(markup.contains("<td>No</td>"));
    }

    #[test]
    fn test_table_markup_without_header() {
        let table = TableView::new(vec![Row::new(vec![Cell::new("only")])]);
        let el = table_markup(&table);
        assert!(el.find_first("thead").is_none());
        assert!(el.find_first("tbody").is_some());
    }

    #[test]
    fn test_markup_serde_round_trip() {
        let el = sample_table_el();
        let json = serde_json::to_string(&el).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(el, back);
    }
}
