//! Mobiledoc conversion
//!
//! The Admin API stores post bodies as mobiledoc. Plain text, HTML or
//! Markdown content is wrapped in a single HTML card so Ghost renders it
//! unchanged.

use serde_json::json;

pub const MOBILEDOC_VERSION: &str = "0.3.1";

/// Card section marker followed by the card index.
const CARD_SECTION: u8 = 10;

/// Wrap `content` in a mobiledoc document holding one HTML card.
///
/// Returns the serialized JSON string, which is what the `mobiledoc` post
/// field expects.
pub fn to_mobiledoc(content: &str) -> String {
    json!({
        "version": MOBILEDOC_VERSION,
        "markups": [],
        "atoms": [],
        "cards": [["html", { "html": content }]],
        "sections": [[CARD_SECTION, 0]],
    })
    .to_string()
}
