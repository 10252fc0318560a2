//! Font Embedding
//!
//! Vector artifacts must render with the same typeface everywhere, so the
//! configured font is fetched and inlined as a `data:` URI behind a
//! `@font-face` rule, plus a rule forcing text elements to the family.
//!
//! This step is strictly best-effort: any fetch or read failure falls back
//! to a generic sans-serif stack and the export proceeds.

use base64::Engine as _;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

/// Rule emitted when the font resource cannot be embedded.
const FALLBACK_RULE: &str = "text,tspan{font-family:Arial, Helvetica, sans-serif;}";

/// Upper bound on an embedded font resource (sanity cap for reads).
const MAX_FONT_BYTES: u64 = 8 * 1024 * 1024;

/// Timeout for the best-effort network fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A font to embed: family name plus the resource location (an `http(s)`
/// URL or a local path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRequest {
    pub family: String,
    pub source: String,
}

impl FontRequest {
    pub fn new(family: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            source: source.into(),
        }
    }
}

/// Fetch the font resource and synthesize the face + family-forcing rules.
///
/// Never fails: on any fetch/decode problem the generic fallback stack is
/// returned instead and a warning is logged.
pub fn embed_font(request: &FontRequest) -> String {
    match fetch_font_bytes(&request.source) {
        Ok(bytes) => {
            debug!(
                "Embedding font '{}' ({} bytes) from {}",
                request.family,
                bytes.len(),
                request.source
            );
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            let (mime, format) = font_format(&request.source);
            format!(
                "@font-face{{font-family:'{family}';\
                 src:url(data:{mime};base64,{data}) format('{format}');\
                 font-weight:normal;font-style:normal;font-display:block;}}\n\
                 text,tspan{{font-family:'{family}', Arial, Helvetica, sans-serif;}}",
                family = request.family,
                mime = mime,
                data = encoded,
                format = format,
            )
        }
        Err(err) => {
            warn!(
                "Could not embed font '{}' from {}: {}. Falling back to generic stack.",
                request.family, request.source, err
            );
            FALLBACK_RULE.to_string()
        }
    }
}

/// The fallback rule, for callers that skip embedding entirely.
pub fn fallback_rule() -> &'static str {
    FALLBACK_RULE
}

fn fetch_font_bytes(source: &str) -> std::io::Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = ureq::get(source)
            .timeout(FETCH_TIMEOUT)
            .call()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_FONT_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(source)
    }
}

/// MIME type and `format()` hint derived from the resource extension.
fn font_format(source: &str) -> (&'static str, &'static str) {
    let lower = source.to_ascii_lowercase();
    if lower.ends_with(".woff") {
        ("font/woff", "woff")
    } else if lower.ends_with(".ttf") {
        ("font/ttf", "truetype")
    } else if lower.ends_with(".otf") {
        ("font/otf", "opentype")
    } else {
        ("font/woff2", "woff2")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
