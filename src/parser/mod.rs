pub mod cards;
pub mod dom;
pub mod price;

use chrono::NaiveDate;
use tracing::info;

use crate::pipeline::{self, normalize::ExchangeTable};
use crate::record::PartnerRecord;

/// Two-pass pipeline: HTML → card views → raw cards, then parse and rate each card.
pub fn process_document(html: &str, day: NaiveDate, table: &ExchangeTable) -> Vec<PartnerRecord> {
    let views = dom::card_views(html);
    let mut records: Vec<PartnerRecord> = views
        .iter()
        .filter_map(cards::extract)
        .map(|card| pipeline::record_from_card(card, day, table))
        .collect();

    records.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        cards = views.len(),
        partners = records.len(),
        rated = records.iter().filter(|r| r.rate.is_some()).count(),
        "Extracted partner listing"
    );
    records
}
