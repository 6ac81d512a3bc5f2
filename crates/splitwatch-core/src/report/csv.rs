use super::ReportRow;
use crate::model::SplitRecord;
use anyhow::Context;
use std::path::Path;
use tracing::info;

pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Overwrite `path` with one row per record, all stamped with the same local
/// time. Returns `Ok(false)` without touching the file when there is nothing
/// to write.
pub fn write_csv(path: &Path, records: &[SplitRecord]) -> anyhow::Result<bool> {
    if records.is_empty() {
        info!("no records, CSV report not written");
        return Ok(false);
    }
    let timestamp = chrono::Local::now().format(CSV_TIMESTAMP_FORMAT).to_string();
    write_csv_at(path, records, &timestamp)?;
    info!(path = %path.display(), rows = records.len(), "wrote CSV report");
    Ok(true)
}

pub(crate) fn write_csv_at(path: &Path, records: &[SplitRecord], timestamp: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let mut writer = ::csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for record in records {
        writer.serialize(ReportRow::new(timestamp, record))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;
    use tempfile::tempdir;

    fn record(ticker: &str, company: &str, verdict: Verdict) -> SplitRecord {
        SplitRecord {
            ticker: ticker.into(),
            company_name: company.into(),
            ratio: "1:10".into(),
            ex_date: "2026-11-03".into(),
            exchange: "NASDAQ".into(),
            classification: verdict,
            reasoning: String::new(),
        }
    }

    #[test]
    fn header_and_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out").join("splits.csv");
        let records = vec![
            record("ABCD", "Abcd, Inc.", Verdict::RoundUpLikely),
            record("WXYZ", "Wxyz", Verdict::ApiError),
        ];
        write_csv_at(&path, &records, "2026-10-18 09:00:00").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(
            lines[0],
            "scrape_timestamp,Ticker,Exchange,CompanyName,Ratio,ExDate,fractional_share_handling"
        );
        assert_eq!(
            lines[1],
            "2026-10-18 09:00:00,ABCD,NASDAQ,\"Abcd, Inc.\",1:10,2026-11-03,round-up likely"
        );
        assert_eq!(lines[2], "2026-10-18 09:00:00,WXYZ,NASDAQ,Wxyz,1:10,2026-11-03,api error");
    }

    #[test]
    fn file_is_overwritten() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("splits.csv");
        std::fs::write(&path, "stale\nstale\nstale\nstale\n").unwrap();
        assert!(write_csv(&path, &[record("ABCD", "Co", Verdict::Pending)]).unwrap());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(!raw.contains("stale"));
    }

    #[test]
    fn empty_input_writes_nothing() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("splits.csv");
        assert!(!write_csv(&path, &[]).unwrap());
        assert!(!path.exists());
    }
}
