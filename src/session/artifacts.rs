//! Artifact persistence for stopped sessions.
//!
//! Each stop writes a human-readable summary and a structured-data JSON
//! file into the output directory, and optionally appends one row to a
//! CSV ledger tracking all meetings. The summary and JSON writes must
//! succeed; the CSV append is best-effort and never fails the stop.

use crate::error::Result;
use crate::report::ErrorReporter;
use crate::session::SessionConfig;
use crate::summarize::MeetingData;
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Paths of everything persisted for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub summary_path: PathBuf,
    pub data_path: PathBuf,
    /// `None` when the ledger is disabled or the append failed.
    pub csv_path: Option<PathBuf>,
}

/// Writes the summary text and structured data, then appends the CSV row
/// if enabled.
pub fn persist(
    config: &SessionConfig,
    final_summary: &str,
    data: &MeetingData,
    total_audio_duration: f64,
    audio_chunks_received: u64,
    reporter: &dyn ErrorReporter,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(&config.output_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let summary_path = config.output_dir.join(format!("summary_{}.txt", timestamp));
    let data_path = config.output_dir.join(format!("data_{}.json", timestamp));

    fs::write(&summary_path, final_summary)?;
    fs::write(&data_path, serde_json::to_string_pretty(data)?)?;

    let csv_path = if config.append_csv {
        match append_csv_row(
            &config.csv_path,
            &timestamp,
            &config.session_id,
            total_audio_duration,
            audio_chunks_received,
            data,
        ) {
            Ok(path) => Some(path),
            Err(e) => {
                reporter.report("artifacts", &format!("CSV append failed: {}", e));
                None
            }
        }
    } else {
        None
    };

    Ok(ArtifactPaths {
        summary_path,
        data_path,
        csv_path,
    })
}

const CSV_HEADER: &str = "timestamp,session_id,duration_seconds,audio_chunks,\
contact_name,contact_role,company_name,company_aum,ticket_size,\
total_contacts,total_companies,total_deals";

/// Appends one flattened row to the meeting ledger, writing the header
/// first when the file does not exist yet.
fn append_csv_row(
    csv_path: &Path,
    timestamp: &str,
    session_id: &str,
    duration_seconds: f64,
    audio_chunks: u64,
    data: &MeetingData,
) -> Result<PathBuf> {
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let first_contact = data.contacts.first();
    let first_company = data.companies.first();
    let first_deal = data.deals.first();

    let fields = [
        timestamp.to_string(),
        session_id.to_string(),
        format!("{:.2}", duration_seconds),
        audio_chunks.to_string(),
        opt_field(first_contact.and_then(|c| c.name.as_deref())),
        opt_field(first_contact.and_then(|c| c.role.as_deref())),
        opt_field(first_company.and_then(|c| c.name.as_deref())),
        opt_field(first_company.and_then(|c| c.aum.as_deref())),
        opt_field(first_deal.and_then(|d| d.ticket_size.as_deref())),
        data.contacts.len().to_string(),
        data.companies.len().to_string(),
        data.deals.len().to_string(),
    ];
    let row = fields
        .iter()
        .map(|f| escape_csv_field(f))
        .collect::<Vec<_>>()
        .join(",");

    let needs_header = fs::metadata(csv_path).map(|m| m.len() == 0).unwrap_or(true);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;
    if needs_header {
        writeln!(file, "{}", CSV_HEADER)?;
    }
    writeln!(file, "{}", row)?;

    Ok(csv_path.to_path_buf())
}

fn opt_field(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Quotes a field when it contains a delimiter, quote, or newline, with
/// embedded quotes doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use crate::summarize::{Company, Contact, Deal};
    use tempfile::tempdir;

    fn test_config(dir: &Path, append_csv: bool) -> SessionConfig {
        let mut config = SessionConfig::new("s1");
        config.output_dir = dir.join("out");
        config.csv_path = dir.join("ledger/meetings.csv");
        config.append_csv = append_csv;
        config
    }

    fn sample_data() -> MeetingData {
        MeetingData {
            contacts: vec![Contact {
                name: Some("Dana Reed".to_string()),
                role: Some("Portfolio Manager, Alternatives".to_string()),
                ..Contact::default()
            }],
            companies: vec![Company {
                name: Some("Northgate Capital".to_string()),
                aum: Some("$2.5B".to_string()),
                ..Company::default()
            }],
            deals: vec![Deal {
                ticket_size: Some("$5M".to_string()),
                ..Deal::default()
            }],
        }
    }

    #[test]
    fn test_persist_writes_summary_and_json() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), false);

        let paths = persist(
            &config,
            "the final summary",
            &sample_data(),
            12.5,
            25,
            &NullReporter,
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&paths.summary_path).unwrap(),
            "the final summary"
        );
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.data_path).unwrap()).unwrap();
        assert_eq!(json["contacts"][0]["name"], "Dana Reed");
        assert!(paths.csv_path.is_none());
    }

    #[test]
    fn test_csv_header_written_once() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), true);

        persist(&config, "s", &sample_data(), 1.0, 2, &NullReporter).unwrap();
        let paths = persist(&config, "s", &sample_data(), 1.0, 2, &NullReporter).unwrap();

        let csv = fs::read_to_string(paths.csv_path.unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,session_id"));
        assert!(lines[1].contains("Dana Reed"));
        assert!(lines[2].contains("Northgate Capital"));
    }

    #[test]
    fn test_csv_row_flattens_first_entries_and_counts() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), true);

        let mut data = sample_data();
        data.contacts.push(Contact::default());

        let paths = persist(&config, "s", &data, 63.2, 120, &NullReporter).unwrap();
        let csv = fs::read_to_string(paths.csv_path.unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.contains(",s1,63.20,120,"));
        assert!(row.ends_with(",2,1,1"));
        assert!(row.contains("$2.5B"));
        assert!(row.contains("$5M"));
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_row_quotes_commas_in_role() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), true);

        let paths = persist(&config, "s", &sample_data(), 1.0, 1, &NullReporter).unwrap();
        let csv = fs::read_to_string(paths.csv_path.unwrap()).unwrap();
        assert!(csv.contains("\"Portfolio Manager, Alternatives\""));
    }

    #[test]
    fn test_empty_data_produces_blank_fields() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), true);

        let paths = persist(&config, "s", &MeetingData::default(), 0.0, 0, &NullReporter)
            .unwrap();
        let csv = fs::read_to_string(paths.csv_path.unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",s1,0.00,0,,,,,,0,0,0"));
    }

    #[test]
    fn test_csv_failure_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path(), true);
        // A directory at the ledger path makes the append fail.
        config.csv_path = dir.path().to_path_buf();

        let paths = persist(&config, "s", &sample_data(), 1.0, 1, &NullReporter).unwrap();
        assert!(paths.csv_path.is_none());
        assert!(paths.summary_path.exists());
    }
}
