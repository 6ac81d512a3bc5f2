//! Where table rows come from.
//!
//! Rows are plain cell-value lists; positions are interpreted later through
//! [`crate::config::ColumnConfig`].

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("splitwatch/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> anyhow::Result<Vec<Vec<String>>>;

    fn describe(&self) -> String;
}

/// JSON array of rows (`[["ABCD", "", "Abcd Corp", "1:10", "2026-11-03"], ...]`)
/// written by an external scraper.
pub struct RowsFileSource {
    path: PathBuf,
}

impl RowsFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSource for RowsFileSource {
    async fn fetch_rows(&self) -> anyhow::Result<Vec<Vec<String>>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read rows file {}", self.path.display()))?;
        let rows: Vec<Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("rows file {} is not a JSON array of string arrays", self.path.display()))?;
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .collect();
        info!(path = %self.path.display(), rows = rows.len(), "loaded rows file");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("rows file {}", self.path.display())
    }
}

/// One GET of a server-rendered page; rows come from the `<tbody>` of the
/// table with the configured id.
pub struct HtmlTableSource {
    url: String,
    table_id: String,
    client: reqwest::Client,
}

impl HtmlTableSource {
    pub fn new(url: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table_id: table_id.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RowSource for HtmlTableSource {
    async fn fetch_rows(&self) -> anyhow::Result<Vec<Vec<String>>> {
        crate::providers::network::check_outbound(&self.url)?;
        info!(url = %self.url, "fetching split table");
        let html = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", self.url))?
            .text()
            .await
            .context("failed to read page body")?;

        let rows = extract_table_rows(&html, &self.table_id)
            .with_context(|| format!("table '{}' not found at {}", self.table_id, self.url))?;
        info!(rows = rows.len(), "extracted non-empty rows");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("{} (table #{})", self.url, self.table_id)
    }
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").unwrap())
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<td\b([^>]*)>(.*?)</td>").unwrap())
}

fn data_val_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\bdata-val\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

fn tbody_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody>").unwrap())
}

/// Rows of the table with `table_id`; `None` when no such table exists.
///
/// A cell's value is its `data-val` attribute when present, else its text.
/// Rows whose cells are all blank are dropped.
pub fn extract_table_rows(html: &str, table_id: &str) -> Option<Vec<Vec<String>>> {
    let table_re = Regex::new(&format!(
        r#"(?is)<table\b[^>]*\bid\s*=\s*["']?{}["']?[\s>/][^>]*>?(.*?)</table>"#,
        regex::escape(table_id)
    ))
    .ok()?;
    let table = table_re.captures(html)?.get(1)?.as_str();
    let body = tbody_re()
        .captures(table)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(table);

    let mut rows = Vec::new();
    for row in row_re().captures_iter(body) {
        let inner = row.get(1).map(|m| m.as_str()).unwrap_or_default();
        let cells: Vec<String> = cell_re()
            .captures_iter(inner)
            .map(|cell| {
                let attrs = cell.get(1).map(|m| m.as_str()).unwrap_or_default();
                let content = cell.get(2).map(|m| m.as_str()).unwrap_or_default();
                match data_val_re().captures(attrs) {
                    Some(val) => {
                        let raw = val.get(1).or_else(|| val.get(2)).map(|m| m.as_str());
                        decode_entities(raw.unwrap_or_default()).trim().to_string()
                    }
                    None => cell_text(content),
                }
            })
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            rows.push(cells);
        } else {
            debug!("skipping blank table row");
        }
    }
    Some(rows)
}

fn cell_text(content: &str) -> String {
    let stripped = tag_re().replace_all(content, " ");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PAGE: &str = r#"
<html><body>
<table class="other"><tbody><tr><td>IGNORED</td></tr></tbody></table>
<table id="latest_splits" class="grid">
  <thead><tr><th>Symbol</th><th>Exch</th><th>Company</th><th>Ratio</th><th>Ex-Date</th></tr></thead>
  <tbody>
    <tr>
      <td><a href="/q/abcd">ABCD</a></td><td>NASDAQ</td><td>Abcd &amp; Sons</td>
      <td>1:10</td><td data-val="2026-11-03">Nov 3, 2026</td>
    </tr>
    <tr><td></td><td> </td></tr>
    <tr><td>WXYZ</td><td></td><td>Wxyz Inc</td><td>1-for-15</td><td data-val='2026-12-01'>Dec 1</td></tr>
  </tbody>
</table>
</body></html>"#;

    #[test]
    fn extracts_rows_from_named_table() {
        let rows = extract_table_rows(PAGE, "latest_splits").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["ABCD", "NASDAQ", "Abcd & Sons", "1:10", "2026-11-03"]);
        assert_eq!(rows[1][0], "WXYZ");
        assert_eq!(rows[1][4], "2026-12-01");
    }

    #[test]
    fn missing_table_is_none() {
        assert!(extract_table_rows(PAGE, "splits_history").is_none());
        assert!(extract_table_rows("<p>no tables</p>", "latest_splits").is_none());
    }

    #[tokio::test]
    async fn rows_file_drops_blank_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        std::fs::write(&path, r#"[["ABCD","","Co","1:10","2026-11-03"],["",""," "]]"#).unwrap();
        let rows = RowsFileSource::new(&path).fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "ABCD");
    }

    #[tokio::test]
    async fn rows_file_rejects_bad_json() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        std::fs::write(&path, r#"{"rows": 1}"#).unwrap();
        let err = RowsFileSource::new(&path).fetch_rows().await.unwrap_err();
        assert!(err.to_string().contains("not a JSON array"));
    }
}
