use std::sync::LazyLock;

use regex::Regex;

use super::dom::CardView;
use crate::record::RawCard;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"por\s*(?:R\$|U\$)\s*\d[\d,.]*").unwrap());

const LOGO_WORD: &str = "Logo";
const POINTS_ANCHOR: &str = "ponto";

/// Pull the raw name, points and price strings out of one card.
///
/// Returns `None` only when the card has no usable partner name; missing
/// points or price leave those fields empty.
pub fn extract(view: &CardView) -> Option<RawCard> {
    let name = partner_name(view.image_alt.as_deref()?)?;

    // The anchor needs a predecessor, so the first block never qualifies.
    let anchor = view
        .blocks
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, b)| b.text.to_lowercase().contains(POINTS_ANCHOR))
        .map(|(i, _)| i);

    let points_text = anchor.map(|i| view.blocks[i - 1].text.clone());
    let price_text = anchor.and_then(|i| find_price(&view.blocks[i].following));

    Some(RawCard {
        name,
        points_text,
        price_text,
    })
}

/// Alt text minus a leading "Logo" word. A bare "Logo" carries no name.
fn partner_name(alt: &str) -> Option<String> {
    let alt = alt.trim();
    let name = match alt.strip_prefix(LOGO_WORD) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => alt,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Concatenate sibling texts until they contain a "por <symbol> <number>" phrase.
fn find_price(following: &[String]) -> Option<String> {
    let mut combined = String::new();
    for text in following {
        if !combined.is_empty() {
            combined.push(' ');
        }
        combined.push_str(text);
        if let Some(m) = PRICE_RE.find(&combined) {
            return Some(m.as_str().to_string());
        }
    }
    None
}
