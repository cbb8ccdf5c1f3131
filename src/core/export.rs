use crate::core::{ExportRow, MarksSnapshot, Storage};
use crate::domain::model::compare_roll_numbers;
use crate::utils::error::{MarksError, Result};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};
use std::sync::LazyLock;

const FILE_PREFIX: &str = "student_marks_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static ARTIFACT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^student_marks_\d{8}_\d{6}\.(xlsx|csv)$").expect("artifact name pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// A written export, ready to be streamed back.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub location: String,
    pub format: ExportFormat,
    pub data: Vec<u8>,
    pub row_count: usize,
}

/// Builds export rows from a snapshot, ordered by roll number.
pub fn build_rows(snapshot: &MarksSnapshot) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = snapshot
        .iter()
        .map(|(roll_number, record)| ExportRow::from_record(roll_number, record))
        .collect();
    rows.sort_by(|a, b| compare_roll_numbers(&a.roll_number, &b.roll_number));
    rows
}

pub fn artifact_name(format: ExportFormat, at: NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        FILE_PREFIX,
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

pub fn render_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in ExportRow::HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        worksheet.write_string(excel_row, 0, row.roll_number.as_str())?;
        // 未填寫的題目留空白儲存格
        for (j, score) in row.scores.iter().enumerate() {
            if let Some(score) = score {
                worksheet.write_number(excel_row, (j + 1) as u16, f64::from(*score))?;
            }
        }
        worksheet.write_number(excel_row, 5, f64::from(row.total))?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn render_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ExportRow::HEADERS)?;

    for row in rows {
        let mut record = Vec::with_capacity(ExportRow::HEADERS.len());
        record.push(row.roll_number.clone());
        record.extend(
            row.scores
                .iter()
                .map(|s| s.map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(row.total.to_string());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| MarksError::export(format!("Failed to flush CSV writer: {}", e)))
}

pub struct Exporter<S: Storage> {
    storage: S,
    keep_latest: Option<usize>,
}

impl<S: Storage> Exporter<S> {
    pub fn new(storage: S, keep_latest: Option<usize>) -> Self {
        Self {
            storage,
            keep_latest,
        }
    }

    pub async fn export(&self, snapshot: &MarksSnapshot, format: ExportFormat) -> Result<ExportArtifact> {
        self.export_at(snapshot, format, Local::now().naive_local()).await
    }

    pub async fn export_at(
        &self,
        snapshot: &MarksSnapshot,
        format: ExportFormat,
        at: NaiveDateTime,
    ) -> Result<ExportArtifact> {
        let rows = build_rows(snapshot);
        tracing::debug!("Rendering {} rows as {}", rows.len(), format.extension());

        let data = match format {
            ExportFormat::Xlsx => render_xlsx(&rows)?,
            ExportFormat::Csv => render_csv(&rows)?,
        };

        let file_name = artifact_name(format, at);
        self.storage.write_file(&file_name, &data).await?;
        let location = self.storage.location(&file_name);
        tracing::info!("📁 Export written to {} ({} bytes)", location, data.len());

        if let Some(keep) = self.keep_latest {
            if let Err(e) = self.prune(format, keep).await {
                tracing::warn!("Retention cleanup failed: {}", e);
            }
        }

        Ok(ExportArtifact {
            file_name,
            location,
            format,
            data,
            row_count: rows.len(),
        })
    }

    /// Deletes the oldest artifacts of `format` so at most `keep` remain.
    /// Returns the names that were removed.
    pub async fn prune(&self, format: ExportFormat, keep: usize) -> Result<Vec<String>> {
        let mut artifacts: Vec<String> = self
            .storage
            .list_files()
            .await?
            .into_iter()
            .filter(|name| {
                ARTIFACT_NAME
                    .captures(name)
                    .is_some_and(|caps| &caps[1] == format.extension())
            })
            .collect();

        // 時間戳記格式固定，字典序即時間順序
        artifacts.sort();

        let excess = artifacts.len().saturating_sub(keep);
        let stale: Vec<String> = artifacts.into_iter().take(excess).collect();
        for name in &stale {
            self.storage.remove_file(name).await?;
            tracing::debug!("Removed old export {}", name);
        }

        Ok(stale)
    }
}
