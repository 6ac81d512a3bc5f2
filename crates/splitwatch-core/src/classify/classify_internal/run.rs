use super::parse::{parse_response, ParseSummary};
use super::prompt::build_prompt;
use crate::audit::AuditRecord;
use crate::classify::{BatchOutcome, BatchStatus, ClassifierService};
use crate::model::{ClassificationResult, SplitCandidate, Verdict};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

pub(crate) async fn classify_batch_impl(
    svc: &ClassifierService,
    candidates: &[SplitCandidate],
) -> BatchOutcome {
    let candidates = dedupe(candidates);
    if candidates.is_empty() {
        return BatchOutcome::skipped();
    }

    if !svc.is_enabled() {
        let reason = svc
            .disabled_reason
            .clone()
            .unwrap_or_else(|| "classification disabled".to_string());
        info!(count = candidates.len(), %reason, "classification disabled, skipping model call");
        return BatchOutcome {
            status: BatchStatus::Disabled,
            results: fill(&candidates, Verdict::Disabled, &reason),
            model: None,
        };
    }

    let Some(prompt) = build_prompt(&candidates, &svc.config.phrases) else {
        return BatchOutcome::skipped();
    };

    info!(
        count = prompt.tickers.len(),
        model = %svc.config.model,
        "sending batch classification request"
    );
    let requested_at = chrono::Utc::now().to_rfc3339();

    let response = match super::client::call_classifier_impl(svc, &prompt).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "classification call failed, marking batch as api error");
            let verdict = if e.is_not_configured() {
                Verdict::Disabled
            } else {
                Verdict::ApiError
            };
            let status = if e.is_not_configured() {
                BatchStatus::Disabled
            } else {
                BatchStatus::Failed
            };
            return BatchOutcome {
                status,
                results: fill(&candidates, verdict, &e.to_string()),
                model: Some(svc.config.model.clone()),
            };
        }
    };

    if let Some(audit) = &svc.audit {
        audit.record(&AuditRecord {
            timestamp: requested_at,
            model_used: response.model.clone(),
            tickers_requested: prompt.tickers.clone(),
            raw_response_text: response.text.clone(),
        });
    }

    let results = parse_response(&response.text, &prompt.tickers, &svc.config.phrases);
    let summary = ParseSummary::from_results(&results);
    if summary.missing > 0 {
        let missing: Vec<&str> = results
            .iter()
            .filter(|(_, r)| r.verdict == Verdict::ResponseMissing)
            .map(|(t, _)| t.as_str())
            .collect();
        warn!(?missing, "no answer for some requested tickers");
    }
    info!(
        resolved = summary.resolved,
        fallback = summary.fallback,
        unclear = summary.unclear,
        missing = summary.missing,
        total = prompt.tickers.len(),
        "parsed classification response"
    );

    BatchOutcome {
        status: BatchStatus::Classified,
        results,
        model: Some(response.model),
    }
}

/// Keep the first candidate per ticker.
fn dedupe(candidates: &[SplitCandidate]) -> Vec<SplitCandidate> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(candidate.ticker.as_str()) {
            unique.push(candidate.clone());
        } else {
            warn!(ticker = %candidate.ticker, "duplicate ticker in batch, keeping first");
        }
    }
    unique
}

fn fill(
    candidates: &[SplitCandidate],
    verdict: Verdict,
    reasoning: &str,
) -> BTreeMap<String, ClassificationResult> {
    candidates
        .iter()
        .map(|c| {
            (
                c.ticker.clone(),
                ClassificationResult::sentinel(verdict, reasoning),
            )
        })
        .collect()
}
