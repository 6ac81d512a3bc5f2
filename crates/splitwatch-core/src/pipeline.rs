//! One discovery pass: rows in, classified records out to CSV and webhook.
//!
//! Only fetching the rows can fail the run. Classification, the report and
//! notifications degrade to sentinels, warnings and counters.

use crate::classify::{BatchStatus, ClassifierService};
use crate::config::{AppConfig, ColumnConfig, PathsConfig};
use crate::errors::ConfigError;
use crate::exchange::{CachedExchangeLookup, ExchangeLookup, YahooExchangeLookup};
use crate::history::NotifiedHistory;
use crate::ingest::{parse_rows, HtmlTableSource, IngestStats, RowSource, RowsFileSource};
use crate::model::{SplitCandidate, SplitRecord, Verdict};
use crate::notify::{DiscordNotifier, Notifier};
use crate::report::write_csv;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Per-invocation switches layered over the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Read rows from this JSON file instead of the configured source.
    pub rows_file: Option<PathBuf>,
    /// Skip the webhook pass even when a webhook is configured.
    pub no_notify: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ingest: IngestStats,
    pub records: usize,
    pub reverse_splits: usize,
    pub batch_status: BatchStatus,
    /// Reverse splits that received a model verdict.
    pub classified: usize,
    /// Reverse splits left with a sentinel verdict.
    pub sentinels: usize,
    pub csv_written: bool,
    pub notifications_sent: usize,
    pub notifications_skipped: usize,
    pub notifications_failed: usize,
}

impl RunSummary {
    /// The batch call itself failed, so every reverse split carries `api error`.
    pub fn is_degraded(&self) -> bool {
        self.batch_status == BatchStatus::Failed
    }
}

pub struct Pipeline {
    source: Box<dyn RowSource>,
    exchange: Arc<dyn ExchangeLookup>,
    classifier: ClassifierService,
    notifier: Option<Arc<dyn Notifier>>,
    columns: ColumnConfig,
    paths: PathsConfig,
    notify_delay: Duration,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn RowSource>,
        exchange: Arc<dyn ExchangeLookup>,
        classifier: ClassifierService,
    ) -> Self {
        Self {
            source,
            exchange,
            classifier,
            notifier: None,
            columns: ColumnConfig::default(),
            paths: PathsConfig::default(),
            notify_delay: Duration::ZERO,
        }
    }

    /// Wire every stage from configuration.
    pub fn from_config(config: &AppConfig, options: &RunOptions) -> Result<Self, ConfigError> {
        let rows_file = options
            .rows_file
            .clone()
            .or_else(|| config.source.rows_file.clone());
        let source: Box<dyn RowSource> = match (rows_file, &config.source.url) {
            (Some(path), _) => Box::new(RowsFileSource::new(path)),
            (None, Some(url)) => Box::new(HtmlTableSource::new(url, &config.source.table_id)),
            (None, None) => {
                return Err(ConfigError::invalid(
                    "source.url",
                    "no row source configured; set source.url or source.rows_file",
                ))
            }
        };

        let mut yahoo = YahooExchangeLookup::new();
        if let Some(base) = &config.source.exchange_lookup_url {
            yahoo = yahoo.with_base_url(base);
        }
        let exchange = Arc::new(CachedExchangeLookup::new(Arc::new(yahoo)));

        let notifier: Option<Arc<dyn Notifier>> = match &config.notify.webhook_url {
            Some(url) if !options.no_notify => Some(Arc::new(DiscordNotifier::new(url))),
            _ => None,
        };

        Ok(Self {
            source,
            exchange,
            classifier: ClassifierService::from_config(config),
            notifier,
            columns: config.source.columns,
            paths: config.paths.clone(),
            notify_delay: Duration::from_millis(config.notify.delay_ms),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_columns(mut self, columns: ColumnConfig) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_paths(mut self, paths: PathsConfig) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_notify_delay(mut self, delay: Duration) -> Self {
        self.notify_delay = delay;
        self
    }

    /// Run with today's local date as the upcoming-split cutoff.
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        self.run_at(chrono::Local::now().date_naive()).await
    }

    pub async fn run_at(&self, today: NaiveDate) -> anyhow::Result<RunSummary> {
        info!(source = %self.source.describe(), "starting split check");
        let rows = self.source.fetch_rows().await?;
        let (splits, ingest) = parse_rows(&rows, &self.columns, today);
        info!(
            rows = ingest.rows_seen,
            kept = ingest.kept,
            not_upcoming = ingest.not_upcoming,
            "validated rows"
        );

        let mut records = Vec::with_capacity(splits.len());
        for split in splits {
            let exchange = match &split.exchange {
                Some(exchange) => exchange.clone(),
                None => self.exchange.lookup(&split.ticker).await,
            };
            records.push(split.into_record(exchange));
        }

        let candidates: Vec<SplitCandidate> = records
            .iter()
            .filter(|r| r.classification == Verdict::Pending)
            .map(SplitRecord::candidate)
            .collect();
        info!(count = candidates.len(), "reverse splits to classify");

        let outcome = self.classifier.classify_batch(&candidates).await;
        let (mut classified, mut sentinels) = (0, 0);
        for record in records
            .iter_mut()
            .filter(|r| r.classification == Verdict::Pending)
        {
            match outcome.get(&record.ticker) {
                Some(result) => {
                    record.classification = result.verdict;
                    record.reasoning = result.reasoning.clone();
                }
                None => record.classification = Verdict::ResponseMissing,
            }
            if record.classification.is_model_verdict() {
                classified += 1;
            } else {
                sentinels += 1;
            }
        }

        let csv_written = match write_csv(&self.paths.csv, &records) {
            Ok(written) => written,
            Err(e) => {
                warn!(error = %e, "could not write CSV report");
                false
            }
        };

        let mut summary = RunSummary {
            ingest,
            records: records.len(),
            reverse_splits: candidates.len(),
            batch_status: outcome.status,
            classified,
            sentinels,
            csv_written,
            notifications_sent: 0,
            notifications_skipped: 0,
            notifications_failed: 0,
        };
        self.notify_new(&records, &mut summary).await;

        info!(
            records = summary.records,
            classified = summary.classified,
            sentinels = summary.sentinels,
            sent = summary.notifications_sent,
            "split check finished"
        );
        Ok(summary)
    }

    async fn notify_new(&self, records: &[SplitRecord], summary: &mut RunSummary) {
        let Some(notifier) = &self.notifier else {
            info!("no webhook configured, skipping notifications");
            return;
        };
        let mut history = NotifiedHistory::load(&self.paths.history);
        let mut attempted = false;
        for record in records {
            let key = record.notification_key();
            if history.contains(&key) {
                summary.notifications_skipped += 1;
                continue;
            }
            if attempted && !self.notify_delay.is_zero() {
                tokio::time::sleep(self.notify_delay).await;
            }
            attempted = true;
            match notifier.notify(record).await {
                Ok(()) => {
                    info!(ticker = %record.ticker, "sent split alert");
                    history.insert(key);
                    summary.notifications_sent += 1;
                }
                Err(e) => {
                    warn!(ticker = %record.ticker, error = %e, "split alert failed, will retry next run");
                    summary.notifications_failed += 1;
                }
            }
        }
        if summary.notifications_sent > 0 {
            history.persist();
        }
    }
}

/// Build a [`Pipeline`] from configuration and run it once.
pub async fn run_once(config: &AppConfig, options: &RunOptions) -> anyhow::Result<RunSummary> {
    Pipeline::from_config(config, options)?.run().await
}
