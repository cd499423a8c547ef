use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::record::{PartnerRecord, Trend};

/// Label every record on the latest day against its partner's mean rate
/// over all earlier days. Earlier records always come back unlabelled.
///
/// The latest day is global to the whole set, not per partner. Order and
/// length of the input are preserved.
pub fn classify(records: Vec<PartnerRecord>) -> Vec<PartnerRecord> {
    let Some(max_day) = records.iter().filter_map(|r| r.observed_day).max() else {
        return records
            .into_iter()
            .map(|r| PartnerRecord { trend: None, ..r })
            .collect();
    };
    let means = historical_means(&records, max_day);

    records
        .into_iter()
        .map(|r| {
            let trend = if r.observed_day == Some(max_day) {
                r.rate
                    .zip(means.get(r.name.as_str()).copied())
                    .and_then(|(rate, mean)| compare(rate, mean))
            } else {
                None
            };
            PartnerRecord { trend, ..r }
        })
        .collect()
}

/// Mean rate per partner over rated records strictly before `max_day`.
pub fn historical_means(records: &[PartnerRecord], max_day: NaiveDate) -> HashMap<String, f64> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for r in records {
        let (Some(day), Some(rate)) = (r.observed_day, r.rate) else {
            continue;
        };
        if day < max_day {
            let entry = sums.entry(r.name.as_str()).or_insert((0.0, 0));
            entry.0 += rate;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect()
}

fn compare(rate: f64, mean: f64) -> Option<Trend> {
    match rate.partial_cmp(&mean)? {
        Ordering::Greater => Some(Trend::Up),
        Ordering::Less => Some(Trend::Down),
        Ordering::Equal => Some(Trend::Flat),
    }
}
