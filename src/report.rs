//! Report storage: renders overdue records into a workbook and keeps a single
//! report at a time in the report directory.
//!
//! The directory is shared between requests with no locking. Two reports
//! generated at once can race on purge-then-write.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::AppError;
use crate::pipeline::evaluate::OverdueRecord;

pub const SHEET_NAME: &str = "Overdue Companies";
pub const REPORT_PREFIX: &str = "OverDueReport_";
pub const REPORT_EXTENSION: &str = "xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `OverDueReport_2024-05-01T12-34-56-789Z.xlsx` for `2024-05-01T12:34:56.789Z`.
pub fn report_filename(created_at: DateTime<Utc>) -> String {
    let timestamp = created_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{REPORT_PREFIX}{timestamp}.{REPORT_EXTENSION}")
}

/// One sheet, a bold header row of `OverdueRecord::COLUMNS`, then one row per
/// record in the order given.
pub fn render_workbook(records: &[OverdueRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in OverdueRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in record.cells().iter().enumerate() {
            worksheet.write_string(row, col as u16, *value)?;
        }
    }

    worksheet.autofit();

    workbook.save_to_buffer()
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deletes every file in the report directory and returns how many went.
    ///
    /// Best-effort: a missing directory is nothing to purge, and a file that
    /// cannot be removed is logged and left behind.
    #[tracing::instrument(
        name = "reports.purge",
        skip(self),
        fields(reports.dir = %self.dir.display(), reports.removed)
    )]
    pub async fn purge_prior_reports(&self) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                tracing::warn!(error = %e, "Error reading reports directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Error listing reports directory");
                    break;
                }
            };

            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    removed += 1;
                    tracing::info!(file = %path.display(), "Deleted old report");
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Error deleting old report");
                }
            }
        }

        tracing::Span::current().record("reports.removed", removed);
        removed
    }

    /// Writes the records as a new report and returns its file name.
    #[tracing::instrument(
        name = "reports.write",
        skip(self, records),
        fields(
            reports.dir = %self.dir.display(),
            report.rows = records.len(),
            report.filename,
        )
    )]
    pub async fn write(&self, records: &[OverdueRecord]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = report_filename(Utc::now());
        let bytes = render_workbook(records)?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        tracing::Span::current().record("report.filename", filename.as_str());
        tracing::info!(
            filename = %filename,
            rows = records.len(),
            "Data exported to report"
        );

        Ok(filename)
    }

    /// Path of an existing report, or `None` for anything that is not a plain
    /// file name inside the report directory.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let is_plain_name = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\'])
            && Path::new(filename).file_name() == Some(OsStr::new(filename));
        if !is_plain_name {
            return None;
        }

        let path = self.dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Some(path),
            _ => None,
        }
    }
}
