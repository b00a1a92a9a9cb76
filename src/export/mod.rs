// src/export/mod.rs
//! On-demand PDF export of the stored analysis table.

mod pdf;

use thiserror::Error;

use crate::store::AnalysisRow;
use pdf::ReportPdf;

pub const REPORT_TITLE: &str = "Employee Satisfaction Analysis Report";

/// ID / Name / Satisfaction column widths in points.
const COL_WIDTHS: [f32; 3] = [60.0, 220.0, 120.0];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no analysis data available to export")]
    NoData,
}

/// Render the result rows into a PDF byte buffer for download.
///
/// An empty result set is refused rather than producing a zero-row
/// document.
pub fn render_report(rows: &[AnalysisRow]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NoData);
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.name_of_employee.clone(),
                row.satisfaction.clone(),
            ]
        })
        .collect();

    let mut report = ReportPdf::new();
    report.write_table(
        REPORT_TITLE,
        &["ID", "Name", "Satisfaction"],
        &COL_WIDTHS,
        &table,
    );

    Ok(report.finish())
}
