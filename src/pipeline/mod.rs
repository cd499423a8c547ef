pub mod normalize;
pub mod rate;
pub mod trend;

use chrono::NaiveDate;

use crate::parser::price;
use crate::record::{PartnerRecord, RawCard};
use normalize::ExchangeTable;

/// Assemble a record from parsed fields: default the currency, convert the
/// amount and compute the rate. Trend is left for [`trend::classify`].
pub fn build_record(
    name: String,
    points: Option<f64>,
    currency: Option<String>,
    raw_amount: Option<f64>,
    observed_day: Option<NaiveDate>,
    table: &ExchangeTable,
) -> PartnerRecord {
    let currency = currency.unwrap_or_else(|| table.reference_symbol.clone());
    let normalized_amount = raw_amount.map(|amount| table.normalize(&currency, amount));
    let rate = rate::points_per_unit(points, normalized_amount);

    PartnerRecord {
        name,
        points,
        currency,
        raw_amount,
        normalized_amount,
        rate,
        observed_day,
        trend: None,
    }
}

/// Parse the free-text fields of a scraped card into a record for `day`.
pub fn record_from_card(card: RawCard, day: NaiveDate, table: &ExchangeTable) -> PartnerRecord {
    let points = card.points_text.as_deref().and_then(price::parse_lone_number);
    let (currency, raw_amount) = match card
        .price_text
        .as_deref()
        .and_then(|text| price::parse_price(text, &table.reference_symbol))
    {
        Some(p) => (Some(p.symbol), Some(p.amount)),
        None => (None, None),
    };

    build_record(card.name, points, currency, raw_amount, Some(day), table)
}

/// Annotate a loaded history with trend labels for its latest day.
pub fn annotate_history(records: Vec<PartnerRecord>) -> Vec<PartnerRecord> {
    trend::classify(records)
}
