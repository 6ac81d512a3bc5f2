//! Run reports.

pub mod csv;

pub use self::csv::{write_csv, CSV_TIMESTAMP_FORMAT};

use crate::model::SplitRecord;
use serde::Serialize;

/// One report line; field names are the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    pub scrape_timestamp: &'a str,
    #[serde(rename = "Ticker")]
    pub ticker: &'a str,
    #[serde(rename = "Exchange")]
    pub exchange: &'a str,
    #[serde(rename = "CompanyName")]
    pub company_name: &'a str,
    #[serde(rename = "Ratio")]
    pub ratio: &'a str,
    #[serde(rename = "ExDate")]
    pub ex_date: &'a str,
    pub fractional_share_handling: &'static str,
}

impl<'a> ReportRow<'a> {
    pub fn new(timestamp: &'a str, record: &'a SplitRecord) -> Self {
        Self {
            scrape_timestamp: timestamp,
            ticker: &record.ticker,
            exchange: &record.exchange,
            company_name: &record.company_name,
            ratio: &record.ratio,
            ex_date: &record.ex_date,
            fractional_share_handling: record.classification.as_str(),
        }
    }
}
