//! Scraped table rows to validated split records.

pub mod source;

pub use source::{HtmlTableSource, RowSource, RowsFileSource};

use crate::config::ColumnConfig;
use crate::model::{SplitRecord, Verdict};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const EX_DATE_FORMAT: &str = "%Y-%m-%d";

/// A row that passed validation, before exchange enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSplit {
    pub ticker: String,
    pub company_name: String,
    pub ratio: String,
    pub ex_date: NaiveDate,
    /// Exchange cell, when the table has one and it is non-empty.
    pub exchange: Option<String>,
}

impl RawSplit {
    pub fn is_reverse(&self) -> bool {
        is_reverse_split(&self.ratio)
    }

    /// Finish the record; reverse splits start pending, forward splits are n/a.
    pub fn into_record(self, exchange: String) -> SplitRecord {
        let classification = if self.is_reverse() {
            Verdict::Pending
        } else {
            Verdict::NotApplicable
        };
        SplitRecord {
            ticker: self.ticker,
            company_name: self.company_name,
            ratio: self.ratio,
            ex_date: self.ex_date.format(EX_DATE_FORMAT).to_string(),
            exchange,
            classification,
            reasoning: String::new(),
        }
    }
}

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRejection {
    TooShort,
    MissingField,
    BadDate,
    NotUpcoming,
}

/// Validate one row against the column map.
///
/// Rows must carry a ticker, a ratio and a `%Y-%m-%d` ex-date strictly after
/// `today`.
pub fn parse_row(
    row: &[String],
    columns: &ColumnConfig,
    today: NaiveDate,
) -> Result<RawSplit, RowRejection> {
    if row.len() < columns.min_row_len() {
        return Err(RowRejection::TooShort);
    }
    let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or_default();

    let ticker = cell(columns.ticker);
    let ratio = cell(columns.ratio);
    let ex_date_raw = cell(columns.ex_date);
    if ticker.is_empty()
        || ratio.is_empty()
        || ex_date_raw.is_empty()
        || ex_date_raw.eq_ignore_ascii_case("n/a")
    {
        return Err(RowRejection::MissingField);
    }

    let ex_date =
        NaiveDate::parse_from_str(ex_date_raw, EX_DATE_FORMAT).map_err(|_| RowRejection::BadDate)?;
    if ex_date <= today {
        return Err(RowRejection::NotUpcoming);
    }

    let exchange = columns
        .exchange
        .map(cell)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    Ok(RawSplit {
        ticker: ticker.to_string(),
        company_name: cell(columns.company).to_string(),
        ratio: ratio.to_string(),
        ex_date,
        exchange,
    })
}

/// Counts from one ingest pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub rows_seen: usize,
    pub kept: usize,
    pub too_short: usize,
    pub missing_field: usize,
    pub bad_date: usize,
    pub not_upcoming: usize,
}

/// Validate every row, keeping table order.
pub fn parse_rows(
    rows: &[Vec<String>],
    columns: &ColumnConfig,
    today: NaiveDate,
) -> (Vec<RawSplit>, IngestStats) {
    let mut stats = IngestStats {
        rows_seen: rows.len(),
        ..Default::default()
    };
    let mut kept = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match parse_row(row, columns, today) {
            Ok(split) => kept.push(split),
            Err(reason) => {
                debug!(row = i + 1, ?reason, "skipping row");
                match reason {
                    RowRejection::TooShort => stats.too_short += 1,
                    RowRejection::MissingField => stats.missing_field += 1,
                    RowRejection::BadDate => stats.bad_date += 1,
                    RowRejection::NotUpcoming => stats.not_upcoming += 1,
                }
            }
        }
    }
    stats.kept = kept.len();
    (kept, stats)
}

/// True when the ratio shrinks the share count ("1:10", "1/20", "1-for-15").
pub fn is_reverse_split(ratio: &str) -> bool {
    let ratio = ratio.trim();
    let lower = ratio.to_ascii_lowercase();
    let parts: Vec<&str> = if ratio.contains(':') {
        ratio.split(':').collect()
    } else if ratio.contains('/') {
        ratio.split('/').collect()
    } else if lower.contains("-for-") {
        lower.split("-for-").collect()
    } else {
        return false;
    };
    let [new, old] = parts.as_slice() else {
        return false;
    };
    match (new.trim().parse::<f64>(), old.trim().parse::<f64>()) {
        (Ok(new), Ok(old)) => new < old,
        _ => false,
    }
}
