//! Append-only CSV run log.
//!
//! One row per completed run. The header is written only when the file is
//! created, so consecutive runs with the same population line up under the
//! same columns. Per-robot columns are suffixed with the robot label.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use empathy_core::report::{DockRecord, LogError, RunLogger, RunRecord};
use tracing::info;

/// Writes run records to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvRunLogger {
    path: PathBuf,
}

impl CsvRunLogger {
    /// Log to `path`, creating the file on the first completed run.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunLogger for CsvRunLogger {
    fn on_dock(&mut self, record: &DockRecord) -> Result<(), LogError> {
        let json = serde_json::to_string(record).map_err(|e| LogError::Format {
            message: e.to_string(),
        })?;
        info!(record = %json, "Dock record");
        Ok(())
    }

    fn on_run_complete(&mut self, record: &RunRecord) -> Result<(), LogError> {
        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if is_new {
            writeln!(file, "{}", csv_header(record))?;
        }
        writeln!(file, "{}", to_csv_row(record))?;
        info!(path = %self.path.display(), "Run record appended");
        Ok(())
    }
}

/// Column names for `record`'s population.
pub fn csv_header(record: &RunRecord) -> String {
    let mut columns = vec![
        String::from("recorded_at"),
        String::from("policy"),
        String::from("duration_seconds"),
        String::from("ticks"),
    ];
    let labels: Vec<String> = record.agents.iter().map(|a| escape(&a.label)).collect();
    columns.extend(labels.iter().map(|label| format!("battery_{label}")));
    columns.extend(labels.iter().map(|label| format!("dock_time_{label}")));
    columns.push(String::from("dock_order"));
    columns.extend(labels.iter().map(|label| format!("knowledge_{label}")));
    columns.extend(labels.iter().map(|label| format!("skipped_{label}")));
    columns.push(String::from("follow_events"));
    columns.push(String::from("first_sighting"));
    columns.join(",")
}

/// One CSV row. Times are in seconds with two decimals; a robot that never
/// docked has an empty dock time.
pub fn to_csv_row(record: &RunRecord) -> String {
    let mut fields = vec![
        record.recorded_at.to_rfc3339(),
        escape(&record.policy),
        format!("{:.2}", record.duration_seconds),
        record.ticks.to_string(),
    ];
    fields.extend(
        record
            .agents
            .iter()
            .map(|a| format!("{:.2}", a.final_battery)),
    );
    fields.extend(record.agents.iter().map(|a| {
        a.dock_time_seconds
            .map_or_else(String::new, |t| format!("{t:.2}"))
    }));
    fields.push(escape(&record.dock_order.join("|")));
    fields.extend(record.agents.iter().map(|a| a.knowledge_size.to_string()));
    fields.extend(record.agents.iter().map(|a| a.skipped.to_string()));
    fields.push(record.follow_events.to_string());
    fields.push(
        record
            .first_sighting
            .as_deref()
            .map(escape)
            .unwrap_or_default(),
    );
    fields.join(",")
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
