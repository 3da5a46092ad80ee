use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::EduError;
use crate::items::{Subscriber, SubscriberStatus, fill_missing_ids, parse_day};

pub const EXPORT_HEADER: [&str; 3] = ["Email", "Status", "Subscribed Date"];

pub fn export_file_name(today: NaiveDate) -> String {
    format!("subscribers_{}.csv", today.format("%Y-%m-%d"))
}

/// CSV text for every subscriber in `subs`, in order.
pub fn subscribers_csv(subs: &[Subscriber]) -> Result<String, EduError> {
    let emails: Vec<&str> = subs.iter().map(|s| s.email.as_str()).collect();
    let statuses: Vec<&str> = subs.iter().map(|s| s.status.as_str()).collect();
    let dates: Vec<String> = subs
        .iter()
        .map(|s| s.subscribed.format("%Y-%m-%d").to_string())
        .collect();
    let mut df = df!(
        EXPORT_HEADER[0] => emails,
        EXPORT_HEADER[1] => statuses,
        EXPORT_HEADER[2] => dates,
    )?;

    let mut buf: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)?;
    String::from_utf8(buf).map_err(|e| EduError::LoadingFailed(e.to_string()))
}

/// Writes `subscribers_{today}.csv` into `dir` and returns its path.
pub fn write_export(dir: &Path, subs: &[Subscriber], today: NaiveDate) -> Result<PathBuf, EduError> {
    let csv = subscribers_csv(subs)?;
    let path = dir.join(export_file_name(today));
    fs::write(&path, csv).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EduError::FileNotFound,
        ErrorKind::PermissionDenied => EduError::PermissionDenied,
        _ => EduError::IoError(e),
    })?;
    info!("Exported {} subscribers to {}", subs.len(), path.display());
    Ok(path)
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn column_values(df: &DataFrame, wanted: &str) -> Result<Option<Vec<Option<String>>>, PolarsError> {
    let Some(name) = df
        .get_column_names()
        .into_iter()
        .find(|n| normalize_header(n.as_str()) == wanted)
        .cloned()
    else {
        return Ok(None);
    };
    let col = df.column(name.as_str())?.cast(&DataType::String)?;
    let values = col.str()?.into_iter().map(|v| v.map(str::to_string)).collect();
    Ok(Some(values))
}

/// Reads a subscriber collection from a CSV with the export columns.
/// Rows without an `id` column get their position as id.
pub fn import_subscribers_csv(path: &Path) -> Result<Vec<Subscriber>, EduError> {
    if !path.is_file() {
        return Err(EduError::FileNotFound);
    }
    let df = load_csv(path)?.collect()?;
    let missing = |col: &str| EduError::LoadingFailed(format!("missing column '{col}'"));

    let emails = column_values(&df, "email")?.ok_or_else(|| missing("Email"))?;
    let statuses = column_values(&df, "status")?.ok_or_else(|| missing("Status"))?;
    let dates = column_values(&df, "subscribed_date")?.ok_or_else(|| missing("Subscribed Date"))?;
    let ids = column_values(&df, "id")?;

    let mut subs = Vec::with_capacity(emails.len());
    for (row, email) in emails.into_iter().enumerate() {
        let bad_row = |reason: String| EduError::LoadingFailed(format!("row {}: {reason}", row + 1));
        let email = email.ok_or_else(|| bad_row("empty email".into()))?;
        let status: SubscriberStatus = statuses[row]
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(bad_row)?;
        let subscribed = parse_day(dates[row].as_deref().unwrap_or_default()).map_err(bad_row)?;
        let id = ids
            .as_ref()
            .and_then(|ids| ids[row].clone())
            .unwrap_or_default();
        subs.push(Subscriber {
            id,
            email,
            status,
            subscribed,
        });
    }
    fill_missing_ids(&mut subs, |s| &mut s.id);
    debug!("Imported {} subscribers from {}", subs.len(), path.display());
    Ok(subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::mock_subscribers;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_subscriber() {
        let csv = subscribers_csv(&mock_subscribers()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Email,Status,Subscribed Date");
        assert_eq!(lines[1], "john.doe@example.com,active,2026-02-01");
        assert_eq!(lines[5], "charlie.davis@example.com,inactive,2026-01-28");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn file_name_carries_the_date() {
        assert_eq!(export_file_name(today()), "subscribers_2026-02-08.csv");
    }

    #[test]
    fn written_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(dir.path(), &mock_subscribers(), today()).unwrap();
        assert!(path.ends_with("subscribers_2026-02-08.csv"));

        let back = import_subscribers_csv(&path).unwrap();
        assert_eq!(back.len(), 5);
        assert_eq!(back[4].email, "charlie.davis@example.com");
        assert_eq!(back[4].status, SubscriberStatus::Inactive);
        assert_eq!(back[4].id, "5");
    }

    #[test]
    fn import_accepts_snake_case_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.csv");
        fs::write(
            &path,
            "id,email,status,subscribed_date\nx9,a@b.io,Active,2026-01-05T10:00:00\n",
        )
        .unwrap();
        let subs = import_subscribers_csv(&path).unwrap();
        assert_eq!(subs[0].id, "x9");
        assert_eq!(subs[0].status, SubscriberStatus::Active);
        assert_eq!(subs[0].subscribed, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    }

    #[test]
    fn import_reports_missing_columns_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "email,status\na@b.io,active\n").unwrap();
        assert!(matches!(
            import_subscribers_csv(&path),
            Err(EduError::LoadingFailed(msg)) if msg.contains("Subscribed Date")
        ));
        assert!(matches!(
            import_subscribers_csv(&dir.path().join("nope.csv")),
            Err(EduError::FileNotFound)
        ));
    }
}
