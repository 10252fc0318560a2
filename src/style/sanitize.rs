//! Style Sanitization
//!
//! Captured CSS may carry declarations that either execute script, reach for
//! vendor behaviors a standalone artifact cannot honor, or contain
//! characters illegal in the target markup. Sanitization strips the former
//! and escapes the latter; it never fails.

use regex::Regex;
use std::sync::LazyLock;

/// Non-standard / script-executing declaration patterns, stripped in order.
static UNSAFE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)progid:[^;]+;?",
        r"(?i)expression\s*\([^)]*\)",
        r"(?i)behavior\s*:[^;]+;?",
        r"(?i)-ms-filter\s*:[^;]+;?",
        r"(?i)filter\s*:[^;]+;?",
        r#"(?i)url\(["']?javascript:[^"')]+["']?\)"#,
        r"<!--|-->",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("unsafe-declaration pattern is valid"))
    .collect()
});

/// Remove non-standard filter/behavior/expression declarations,
/// script-executing pseudo-URLs, and XML comment markers.
pub fn strip_unsafe_declarations(css: &str) -> String {
    let mut cleaned = css.to_string();
    for pattern in UNSAFE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// Escape the characters illegal in the vector markup (`&`, `<`, `>`, `"`).
pub fn escape_for_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Full sanitization for the vector path: strip unsafe declarations, then
/// escape for embedding in XML markup.
pub fn sanitize_css(css: &str) -> String {
    escape_for_markup(&strip_unsafe_declarations(css))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
