use chrono::NaiveDate;
use serde::Serialize;

/// Raw strings pulled out of one partner card, before any parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCard {
    pub name: String,
    pub points_text: Option<String>,
    pub price_text: Option<String>,
}

/// Day-over-day movement of a partner's rate against its historical mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "UP",
            Trend::Down => "DOWN",
            Trend::Flat => "FLAT",
        }
    }
}

/// One partner observed on one day. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerRecord {
    pub name: String,
    pub points: Option<f64>,
    pub currency: String,
    #[serde(rename = "rawAmount")]
    pub raw_amount: Option<f64>,
    #[serde(rename = "normalizedAmount")]
    pub normalized_amount: Option<f64>,
    pub rate: Option<f64>,
    /// Absent only for history rows whose date cell could not be read.
    #[serde(rename = "observedDay")]
    pub observed_day: Option<NaiveDate>,
    #[serde(rename = "trendIndicator")]
    pub trend: Option<Trend>,
}
