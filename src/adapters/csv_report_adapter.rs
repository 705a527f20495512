//! Reporter that writes one CSV row per closed position.

use crate::domain::error::ReporterError;
use crate::domain::summary::{ClosedPositionSummary, format_percent};
use crate::ports::report_port::ReportPort;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 8] = [
    "figi",
    "operations",
    "income",
    "invested",
    "income_percent",
    "period_days",
    "income_per_year_percent",
    "currency",
];

pub struct CsvReportAdapter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportAdapter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReporterError> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvReportAdapter<W> {
    pub fn from_writer(inner: W) -> Result<Self, ReporterError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER).map_err(output_error)?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, ReporterError> {
        self.writer.into_inner().map_err(|e| ReporterError::ReportOutput {
            reason: e.to_string(),
        })
    }
}

fn output_error(e: csv::Error) -> ReporterError {
    ReporterError::ReportOutput {
        reason: e.to_string(),
    }
}

impl<W: Write> ReportPort for CsvReportAdapter<W> {
    fn emit(&mut self, summary: &ClosedPositionSummary) -> Result<(), ReporterError> {
        self.writer
            .write_record([
                summary.figi.clone(),
                summary.operation_count.to_string(),
                summary.income.to_string(),
                summary.invested.to_string(),
                format_percent(summary.income_percent),
                summary.period_days.to_string(),
                format_percent(summary.income_per_year),
                summary.currency.clone(),
            ])
            .map_err(output_error)
    }

    fn finish(&mut self) -> Result<(), ReporterError> {
        self.writer.flush()?;
        Ok(())
    }
}
