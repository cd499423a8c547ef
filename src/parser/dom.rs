use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-testid="a_PartnerCard_card_link"]"#).unwrap());
static IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-testid="img_PartnerCard_partnerImage"]"#).unwrap());
static TEXT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-testid="Text_Typography"]"#).unwrap());

/// Typed view of one partner card, detached from the HTML tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardView {
    pub image_alt: Option<String>,
    pub blocks: Vec<TextBlock>,
}

/// A typography block and the visible text of every sibling node after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub following: Vec<String>,
}

/// Parse a listing page and return one view per partner card, in document order.
pub fn card_views(html: &str) -> Vec<CardView> {
    let document = Html::parse_document(html);
    document.select(&CARD_SEL).map(card_view).collect()
}

fn card_view(card: ElementRef) -> CardView {
    let image_alt = card
        .select(&IMAGE_SEL)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(str::to_string);

    let blocks = card
        .select(&TEXT_SEL)
        .map(|block| TextBlock {
            text: visible_text(block),
            following: following_texts(block),
        })
        .collect();

    CardView { image_alt, blocks }
}

/// Text nodes of one element, each trimmed, glued without a separator.
fn visible_text(el: ElementRef) -> String {
    el.text().map(str::trim).collect()
}

fn following_texts(el: ElementRef) -> Vec<String> {
    el.next_siblings()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.trim().to_string()),
            Node::Element(_) => ElementRef::wrap(node).map(visible_text),
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .collect()
}
