use crate::cli::args::RunArgs;
use crate::exit_codes::{CONFIG_ERROR, DEGRADED, SUCCESS};
use splitwatch_core::config::AppConfig;
use splitwatch_core::pipeline::{Pipeline, RunOptions, RunSummary};
use tracing::error;

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };

    let options = RunOptions {
        rows_file: args.rows_file,
        no_notify: args.no_notify,
    };
    let pipeline = match Pipeline::from_config(&config, &options) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };

    let summary = match pipeline.run().await {
        Ok(summary) => summary,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "could not fetch split rows");
            eprintln!("ingest failed: {message}");
            return Ok(CONFIG_ERROR);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(if summary.is_degraded() { DEGRADED } else { SUCCESS })
}

fn print_summary(summary: &RunSummary) {
    println!(
        "rows: {} seen, {} upcoming ({} reverse splits)",
        summary.ingest.rows_seen, summary.records, summary.reverse_splits
    );
    println!(
        "classification: {:?}, {} classified, {} unresolved",
        summary.batch_status, summary.classified, summary.sentinels
    );
    println!(
        "notifications: {} sent, {} already sent, {} failed",
        summary.notifications_sent, summary.notifications_skipped, summary.notifications_failed
    );
    if !summary.csv_written {
        println!("csv: not written");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn run_with_rows_file_and_fake_provider() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(
            dir.join("rows.json"),
            r#"[["ABCD", "NASDAQ", "Abcd Corp", "1:10", "2099-01-05"]]"#,
        )
        .unwrap();
        let yaml = format!(
            "source:\n  columns:\n    exchange: 1\nclassifier:\n  provider: fake\n  fake_response: \"ABCD: Round-up Likely | Reasoning: test\"\npaths:\n  csv: {csv}\n  history: {hist}\n  audit_log: {audit}\n",
            csv = dir.join("out.csv").display(),
            hist = dir.join("history.log").display(),
            audit = dir.join("audit.jsonl").display(),
        );
        let config_path = dir.join("splitwatch.yaml");
        std::fs::write(&config_path, yaml).unwrap();

        let code = run(RunArgs {
            config: Some(config_path),
            rows_file: Some(dir.join("rows.json")),
            no_notify: true,
            json: true,
        })
        .await
        .unwrap();
        assert_eq!(code, SUCCESS);

        let csv = std::fs::read_to_string(dir.join("out.csv")).unwrap();
        assert!(csv.contains("ABCD,NASDAQ,Abcd Corp,1:10,2099-01-05,round-up likely"));
    }

    #[tokio::test]
    async fn missing_config_is_config_error() {
        let tmp = tempdir().unwrap();
        let code = run(RunArgs {
            config: Some(tmp.path().join("missing.yaml")),
            rows_file: None,
            no_notify: true,
            json: false,
        })
        .await
        .unwrap();
        assert_eq!(code, CONFIG_ERROR);
    }
}
