//! Reporter that writes each closed position as a log block.

use crate::domain::error::{ReporterError, SummaryError};
use crate::domain::summary::{ClosedPositionSummary, format_percent};
use crate::ports::report_port::ReportPort;

/// Multi-line, human readable block for one instrument.
pub fn render_summary(summary: &ClosedPositionSummary) -> String {
    format!(
        "FIGI: {figi}, {count} operations,\n \
         income: {income} {currency}\n \
         invested: {invested} {currency}\n \
         income(%): {percent} %\n \
         period: {days} days\n \
         income per year(%): {per_year} %",
        figi = summary.figi,
        count = summary.operation_count,
        income = summary.income,
        invested = summary.invested,
        currency = summary.currency,
        percent = format_percent(summary.income_percent),
        days = summary.period_days,
        per_year = format_percent(summary.income_per_year),
    )
}

#[derive(Debug, Default)]
pub struct LogReportAdapter {
    emitted: usize,
    skipped: usize,
}

impl LogReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}

impl ReportPort for LogReportAdapter {
    fn emit(&mut self, summary: &ClosedPositionSummary) -> Result<(), ReporterError> {
        tracing::info!("{}", render_summary(summary));
        self.emitted += 1;
        Ok(())
    }

    fn skipped(&mut self, error: &SummaryError) -> Result<(), ReporterError> {
        match error {
            // Dividend or fee only instruments have no buys in the window.
            SummaryError::ZeroInvested { figi } => {
                tracing::info!(figi = %figi, "skipping instrument without purchases: {error}")
            }
            _ => tracing::warn!(figi = error.figi(), "skipping closed position: {error}"),
        }
        self.skipped += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReporterError> {
        tracing::info!(
            reported = self.emitted,
            skipped = self.skipped,
            "report finished"
        );
        Ok(())
    }
}
