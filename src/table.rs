//! Tabular boundary: the positional history export in, the annotated table out.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::parser::price;
use crate::pipeline::{self, normalize::ExchangeTable};
use crate::record::PartnerRecord;

/// Column names given to the history export, by position.
pub const HISTORY_COLUMNS: [&str; 5] = ["name", "points", "currency", "amount", "observedDay"];

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot open history table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed history table: {0}")]
    Csv(#[from] csv::Error),
    #[error("history table has no columns")]
    NoColumns,
}

/// Map one row onto the five history columns by position. Missing trailing
/// cells become empty, extra cells are dropped. Blank cells are `None`.
fn positional(record: &csv::StringRecord) -> [Option<&str>; 5] {
    let mut cells = [None; 5];
    for (slot, value) in cells.iter_mut().zip(record.iter()) {
        let value = value.trim();
        if !value.is_empty() {
            *slot = Some(value);
        }
    }
    cells
}

/// Accepts `YYYY-MM-DD`, a timestamp starting with one, or `DD/MM/YYYY`.
pub fn parse_day(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    NaiveDate::parse_from_str(cell, DAY_FORMAT)
        .ok()
        .or_else(|| {
            cell.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, DAY_FORMAT).ok())
        })
        .or_else(|| NaiveDate::parse_from_str(cell, "%d/%m/%Y").ok())
}

fn history_record(cells: [Option<&str>; 5], table: &ExchangeTable) -> Option<PartnerRecord> {
    let [name, points, currency, amount, day] = cells;
    Some(pipeline::build_record(
        name?.to_string(),
        points.and_then(price::parse_lone_number),
        currency.map(str::to_string),
        amount.and_then(price::parse_lone_number),
        day.and_then(parse_day),
        table,
    ))
}

/// Read a history export. The header row is skipped and never matched by name.
pub fn read_history<R: Read>(
    reader: R,
    table: &ExchangeTable,
) -> Result<Vec<PartnerRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TableError::NoColumns);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        if let Some(record) = history_record(positional(&row?), table) {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn load_history(path: &Path, table: &ExchangeTable) -> Result<Vec<PartnerRecord>, TableError> {
    let file = std::fs::File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_history(file, table)
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Append records to a history file in the positional layout, writing the
/// header only when the file is new or empty.
pub fn append_history(path: &Path, records: &[PartnerRecord]) -> Result<(), TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let is_new = file.metadata().map_err(io_err)?.len() == 0;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if is_new {
        writer.write_record(HISTORY_COLUMNS)?;
    }
    for r in records {
        writer.write_record([
            r.name.clone(),
            cell(r.points),
            r.currency.clone(),
            cell(r.raw_amount),
            r.observed_day
                .map(|d| d.format(DAY_FORMAT).to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

pub fn write_csv<W: Write>(out: W, records: &[PartnerRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for r in records {
        writer.serialize(r)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(out: W, records: &[PartnerRecord]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, records)
}

fn fmt_num(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".into())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

/// Compact terminal table.
pub fn render_overview(records: &[PartnerRecord]) -> String {
    let mut out = format!(
        "{:>3} | {:<28} | {:>7} | {:<3} | {:>8} | {:>8} | {:>7} | {:<10} | {:<5}\n",
        "#", "Partner", "Points", "Cur", "Amount", "In ref", "Rate", "Day", "Trend"
    );
    out.push_str(&"-".repeat(104));
    out.push('\n');

    for (i, r) in records.iter().enumerate() {
        let day = r
            .observed_day
            .map(|d| d.format(DAY_FORMAT).to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:>3} | {:<28} | {:>7} | {:<3} | {:>8} | {:>8} | {:>7} | {:<10} | {:<5}\n",
            i + 1,
            truncate(&r.name, 28),
            fmt_num(r.points, 1),
            r.currency,
            fmt_num(r.raw_amount, 2),
            fmt_num(r.normalized_amount, 2),
            fmt_num(r.rate, 2),
            day,
            r.trend.map(|t| t.label()).unwrap_or("-"),
        ));
    }

    let rated = records.iter().filter(|r| r.rate.is_some()).count();
    out.push_str(&format!("\n{} partners | {} rated", records.len(), rated));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Trend;

    fn read(csv: &str) -> Vec<PartnerRecord> {
        read_history(csv.as_bytes(), &ExchangeTable::default()).unwrap()
    }

    #[test]
    fn columns_are_taken_by_position() {
        let rows = read("nome,pontos,moeda,valor,scraping_day\nAmazon,4,U$,2,2024-11-01\n");
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.name, "Amazon");
        assert_eq!(r.points, Some(4.0));
        assert_eq!(r.currency, "U$");
        assert_eq!(r.raw_amount, Some(2.0));
        assert_eq!(r.normalized_amount, Some(11.0));
        assert_eq!(r.observed_day, NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn reordered_upstream_columns_are_misread() {
        // Positional contract: a swapped export is consumed as-is, not repaired.
        let rows = read("name,currency,points,amount,day\nAmazon,U$,4,2,2024-11-01\n");
        let r = &rows[0];
        assert!(r.points.is_none());
        assert_eq!(r.currency, "4");
        assert_eq!(r.normalized_amount, Some(2.0));
        assert!(r.rate.is_none());
    }

    #[test]
    fn short_rows_are_padded() {
        let rows = read("a,b,c\nAmazon,4,R$\n");
        let r = &rows[0];
        assert_eq!(r.points, Some(4.0));
        assert!(r.raw_amount.is_none());
        assert!(r.observed_day.is_none());
        assert!(r.rate.is_none());
    }

    #[test]
    fn extra_columns_are_truncated() {
        let rows = read("a,b,c,d,e,f,g\nAmazon,3,R$,1,2024-11-01,9.9,junk\n");
        let r = &rows[0];
        assert_eq!(r.rate, Some(3.0));
        assert_eq!(r.observed_day, NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn bad_cells_degrade_to_absent() {
        let rows = read("a,b,c,d,e\nAmazon,muitos,,abc,ontem\n");
        let r = &rows[0];
        assert!(r.points.is_none());
        assert_eq!(r.currency, "R$");
        assert!(r.raw_amount.is_none());
        assert!(r.observed_day.is_none());
    }

    #[test]
    fn history_cells_follow_the_scraped_number_rule() {
        let rows = read("a,b,c,d,e\nAmazon,-4,R$,2,2024-11-01\nUber,1e3,R$,+2,2024-11-01\nMagalu,\"2,5\",R$,\"0,5\",2024-11-01\n");
        assert!(rows[0].points.is_none());
        assert!(rows[0].rate.is_none());
        assert!(rows[1].points.is_none());
        assert!(rows[1].raw_amount.is_none());
        assert_eq!(rows[2].points, Some(2.5));
        assert_eq!(rows[2].rate, Some(5.0));
        assert!(rows.iter().all(|r| r.points.map_or(true, |p| p >= 0.0)));
    }

    #[test]
    fn nameless_rows_are_dropped() {
        let rows = read("a,b,c,d,e\n,3,R$,1,2024-11-01\nAmazon,3,R$,1,2024-11-01\n");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_table_is_fatal() {
        let err = read_history("".as_bytes(), &ExchangeTable::default()).unwrap_err();
        assert!(matches!(err, TableError::NoColumns));
    }

    #[test]
    fn day_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 5);
        assert_eq!(parse_day("2024-11-05"), expected);
        assert_eq!(parse_day("2024-11-05 00:00:00"), expected);
        assert_eq!(parse_day("05/11/2024"), expected);
        assert_eq!(parse_day("nov 5"), None);
    }

    #[test]
    fn history_fixture_round_trip_through_trend() {
        let file = std::fs::read_to_string("tests/fixtures/history.csv").unwrap();
        let out = pipeline::annotate_history(read(&file));
        let latest: Vec<_> = out
            .iter()
            .filter(|r| r.observed_day == NaiveDate::from_ymd_opt(2024, 11, 3))
            .map(|r| (r.name.as_str(), r.trend))
            .collect();
        assert_eq!(
            latest,
            vec![
                ("Americanas", Some(Trend::Up)),
                ("Apple", Some(Trend::Down)),
                ("Netshoes", Some(Trend::Flat)),
                ("Uber", None),
                ("Magalu", None),
            ]
        );
        assert!(out
            .iter()
            .filter(|r| r.observed_day < NaiveDate::from_ymd_opt(2024, 11, 3))
            .all(|r| r.trend.is_none()));
    }

    #[test]
    fn csv_output_columns_and_empties() {
        let rows = read("a,b,c,d,e\nAmazon,4,U$,2,2024-11-01\nUber,2,,,2024-11-01\n");
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("name,points,currency,rawAmount,normalizedAmount,rate,observedDay,trendIndicator")
        );
        let amazon = lines.next().unwrap();
        assert!(amazon.starts_with("Amazon,4.0,U$,2.0,11.0,0.3636"));
        assert!(amazon.ends_with(",2024-11-01,"));
        assert_eq!(lines.next(), Some("Uber,2.0,R$,,,,2024-11-01,"));
    }

    #[test]
    fn output_is_deterministic() {
        let file = std::fs::read_to_string("tests/fixtures/history.csv").unwrap();
        let render = || {
            let mut buf = Vec::new();
            write_csv(&mut buf, &pipeline::annotate_history(read(&file))).unwrap();
            buf
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn json_uses_null_for_absent() {
        let rows = read("a,b,c,d,e\nUber,2,,,2024-11-01\n");
        let mut buf = Vec::new();
        write_json(&mut buf, &rows).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["name"], "Uber");
        assert!(value[0]["rate"].is_null());
        assert_eq!(value[0]["observedDay"], "2024-11-01");
    }

    #[test]
    fn overview_lists_every_record() {
        let rows = read("a,b,c,d,e\nAmazon,4,U$,2,2024-11-01\nUber,2,,,2024-11-01\n");
        let text = render_overview(&rows);
        assert!(text.contains("Amazon"));
        assert!(text.contains("0.36"));
        assert!(text.ends_with("2 partners | 1 rated"));
    }

    #[test]
    fn append_then_reload() {
        let path = std::env::temp_dir().join(format!("livelo_history_{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let table = ExchangeTable::default();
        let day = NaiveDate::from_ymd_opt(2024, 11, 5);
        let batch = vec![
            pipeline::build_record("Apple".into(), Some(11.0), Some("U$".into()), Some(2.0), day, &table),
            pipeline::build_record("Uber".into(), Some(2.0), None, None, day, &table),
        ];
        append_history(&path, &batch).unwrap();
        append_history(&path, &batch[..1]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("name,")).count(), 1);

        let reloaded = load_history(&path, &table).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded[0], batch[0]);
        assert_eq!(reloaded[1], batch[1]);
    }

    #[test]
    fn missing_history_file_is_io_error() {
        let err = load_history(Path::new("tests/fixtures/does_not_exist.csv"), &ExchangeTable::default())
            .unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
