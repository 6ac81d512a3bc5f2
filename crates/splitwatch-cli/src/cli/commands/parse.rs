use crate::cli::args::ParseArgs;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use splitwatch_core::classify::{ClassifierService, ParseSummary};
use splitwatch_core::config::{AppConfig, ClassifierConfig};
use splitwatch_core::ClassificationResult;
use std::collections::BTreeMap;
use tracing::info;

pub fn run(args: ParseArgs) -> anyhow::Result<i32> {
    let results = parse_file(&args)?;
    let summary = ParseSummary::from_results(&results);
    info!(
        resolved = summary.resolved,
        unclear = summary.unclear,
        missing = summary.missing,
        "parsed saved response"
    );
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(SUCCESS)
}

fn parse_file(args: &ParseArgs) -> anyhow::Result<BTreeMap<String, ClassificationResult>> {
    let classifier = match &args.config {
        Some(path) => AppConfig::from_file(path)?.classifier,
        None => ClassifierConfig::default(),
    };
    // Offline: no client, only the configured phrase set.
    let service = ClassifierService::new(classifier, None);
    service.phrases().validate()?;

    let bytes = std::fs::read(&args.response)
        .with_context(|| format!("failed to read {}", args.response.display()))?;
    let raw = String::from_utf8_lossy(&bytes);
    let tickers: Vec<String> = args
        .tickers
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    Ok(service.parse(&raw, &tickers))
}
