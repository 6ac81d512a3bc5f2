use crate::cli::args::ClassifyArgs;
use crate::exit_codes::{CONFIG_ERROR, DEGRADED, SUCCESS};
use anyhow::Context;
use splitwatch_core::classify::{BatchStatus, ClassifierService};
use splitwatch_core::config::AppConfig;
use splitwatch_core::model::SplitCandidate;
use tracing::info;

pub async fn run(args: ClassifyArgs) -> anyhow::Result<i32> {
    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let candidates: Vec<SplitCandidate> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON list of candidates", args.input.display()))?;

    let service = ClassifierService::from_config(&config);
    let outcome = service.classify_batch(&candidates).await;
    let summary = outcome.summary();
    info!(
        status = ?outcome.status,
        resolved = summary.resolved,
        fallback = summary.fallback,
        unclear = summary.unclear,
        missing = summary.missing,
        "batch classified"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(match outcome.status {
        BatchStatus::Failed => DEGRADED,
        _ => SUCCESS,
    })
}
