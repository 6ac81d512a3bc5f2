//! Reverse-split discovery and fractional-share classification.
//!
//! The crate turns scraped split-table rows into [`model::SplitRecord`]s,
//! classifies every reverse split with a single batched LLM call and pushes
//! the results to a CSV report and a chat webhook.
//!
//! The classification subsystem lives in [`classify`]:
//!
//! - prompt builder: one prompt for N candidates plus the ticker manifest
//! - client boundary: exactly one call through [`providers::llm::LlmClient`]
//! - response parser: total, deterministic mapping from free text to verdicts
//! - audit log: every raw response appended to a JSON Lines file
//!
//! # Quick Start
//!
//! ```no_run
//! use splitwatch_core::classify::ClassifierService;
//! use splitwatch_core::config::AppConfig;
//! use splitwatch_core::model::SplitCandidate;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let service = ClassifierService::from_config(&config);
//! let outcome = service
//!     .classify_batch(&[SplitCandidate::new("ABCD", "1:10", "2026-11-03")])
//!     .await;
//! for (ticker, result) in &outcome.results {
//!     println!("{ticker}: {}", result.verdict);
//! }
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod classify;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod history;
pub mod ingest;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod providers;
pub mod report;

pub use classify::{BatchOutcome, BatchStatus, ClassifierService, PhraseSet};
pub use config::AppConfig;
pub use errors::{ConfigError, NotifyError, ProviderError, ProviderResult};
pub use model::{ClassificationResult, MatchConfidence, SplitCandidate, SplitRecord, Verdict};
