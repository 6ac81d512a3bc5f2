//! Listing-exchange enrichment for tickers whose table row has no exchange.

use crate::providers::network::check_outbound;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://query2.finance.yahoo.com";

pub const LOOKUP_FAILED: &str = "Lookup Failed";
pub const LOOKUP_FAILED_HTTP: &str = "Lookup Failed (HTTP)";
pub const NOT_AVAILABLE: &str = "N/A";
pub const US_ETF_MARKET: &str = "US ETF Market";

/// Resolves a ticker to a display exchange name.
///
/// Lookups never fail; problems are reported through the returned label.
#[async_trait]
pub trait ExchangeLookup: Send + Sync {
    async fn lookup(&self, ticker: &str) -> String;
}

/// Map Yahoo exchange codes to the names used in reports.
pub fn map_exchange_code(code: &str) -> String {
    match code {
        "NMS" => "NASDAQ",
        "NYQ" => "NYSE",
        "ASE" => "NYSE AMEX",
        "PNK" => "OTC Pink",
        "OQB" => "OTCQB",
        "OTCQX" => "OTCQX",
        "TOR" => "TSX",
        "VAN" => "TSX-V",
        other => other,
    }
    .to_string()
}

/// Exchange from the Yahoo Finance search endpoint.
pub struct YahooExchangeLookup {
    base_url: String,
    client: reqwest::Client,
    pause: Duration,
}

impl YahooExchangeLookup {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            pause: Duration::from_millis(200),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sleep after each network lookup.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    async fn fetch(&self, ticker: &str) -> Result<Value, LookupFailure> {
        let url = format!("{}/v1/finance/search", self.base_url);
        check_outbound(&url).map_err(|e| LookupFailure::Other(e.to_string()))?;
        let resp = self
            .client
            .get(&url)
            .query(&[("q", ticker), ("quotesCount", "5"), ("newsCount", "0")])
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0 (compatible; splitwatch)")
            .send()
            .await
            .map_err(|e| LookupFailure::Other(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LookupFailure::Http(status.as_u16()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| LookupFailure::Other(e.to_string()))
    }
}

impl Default for YahooExchangeLookup {
    fn default() -> Self {
        Self::new()
    }
}

enum LookupFailure {
    Http(u16),
    Other(String),
}

/// Pick the exchange label out of a search response.
pub fn exchange_from_search(ticker: &str, body: &Value) -> String {
    let quote = body
        .get("quotes")
        .and_then(Value::as_array)
        .and_then(|quotes| {
            quotes.iter().find(|q| {
                q.get("symbol")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case(ticker))
            })
        });
    let Some(quote) = quote else {
        return NOT_AVAILABLE.to_string();
    };

    match quote.get("exchange").and_then(Value::as_str) {
        Some(code) if !code.trim().is_empty() => map_exchange_code(code.trim()),
        _ if quote.get("quoteType").and_then(Value::as_str) == Some("ETF") => {
            US_ETF_MARKET.to_string()
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[async_trait]
impl ExchangeLookup for YahooExchangeLookup {
    async fn lookup(&self, ticker: &str) -> String {
        let label = match self.fetch(ticker).await {
            Ok(body) => exchange_from_search(ticker, &body),
            Err(LookupFailure::Http(status)) => {
                warn!(%ticker, status, "exchange lookup returned HTTP error");
                LOOKUP_FAILED_HTTP.to_string()
            }
            Err(LookupFailure::Other(e)) => {
                warn!(%ticker, error = %e, "exchange lookup failed");
                LOOKUP_FAILED.to_string()
            }
        };
        debug!(%ticker, exchange = %label, "exchange lookup");
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
        label
    }
}

/// Remembers answers (failures included) for the lifetime of the value.
pub struct CachedExchangeLookup {
    inner: Arc<dyn ExchangeLookup>,
    cache: Mutex<HashMap<String, String>>,
}

impl CachedExchangeLookup {
    pub fn new(inner: Arc<dyn ExchangeLookup>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, ticker: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(ticker)
            .cloned()
    }
}

#[async_trait]
impl ExchangeLookup for CachedExchangeLookup {
    async fn lookup(&self, ticker: &str) -> String {
        if let Some(hit) = self.cached(ticker) {
            return hit;
        }
        let label = self.inner.lookup(ticker).await;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(ticker.to_string(), label.clone());
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn known_codes_are_mapped() {
        assert_eq!(map_exchange_code("NMS"), "NASDAQ");
        assert_eq!(map_exchange_code("NYQ"), "NYSE");
        assert_eq!(map_exchange_code("VAN"), "TSX-V");
        assert_eq!(map_exchange_code("LSE"), "LSE");
    }

    #[test]
    fn search_body_picks_matching_symbol() {
        let body = json!({
            "quotes": [
                {"symbol": "ABCDW", "exchange": "NMS", "quoteType": "EQUITY"},
                {"symbol": "ABCD", "exchange": "NYQ", "quoteType": "EQUITY"}
            ]
        });
        assert_eq!(exchange_from_search("ABCD", &body), "NYSE");
    }

    #[test]
    fn etf_without_exchange_and_no_match() {
        let etf = json!({"quotes": [{"symbol": "XETF", "quoteType": "ETF"}]});
        assert_eq!(exchange_from_search("XETF", &etf), US_ETF_MARKET);

        let empty = json!({"quotes": []});
        assert_eq!(exchange_from_search("ZZZZ", &empty), NOT_AVAILABLE);
        assert_eq!(exchange_from_search("ZZZZ", &json!({})), NOT_AVAILABLE);
    }

    struct Counting(AtomicUsize);

    #[async_trait]
    impl ExchangeLookup for Counting {
        async fn lookup(&self, ticker: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            format!("X-{ticker}")
        }
    }

    #[tokio::test]
    async fn cache_hits_inner_once_per_ticker() {
        let inner = Arc::new(Counting(AtomicUsize::new(0)));
        let cached = CachedExchangeLookup::new(inner.clone());
        assert_eq!(cached.lookup("ABCD").await, "X-ABCD");
        assert_eq!(cached.lookup("ABCD").await, "X-ABCD");
        assert_eq!(cached.lookup("WXYZ").await, "X-WXYZ");
        assert_eq!(inner.0.load(Ordering::SeqCst), 2);
    }
}
