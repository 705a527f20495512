//! Report output port trait.

use crate::domain::error::{ReporterError, SummaryError};
use crate::domain::summary::ClosedPositionSummary;

/// Sink for per-instrument results, fed one value at a time.
pub trait ReportPort {
    fn emit(&mut self, summary: &ClosedPositionSummary) -> Result<(), ReporterError>;

    /// A closed instrument whose figures could not be computed.
    fn skipped(&mut self, _error: &SummaryError) -> Result<(), ReporterError> {
        Ok(())
    }

    /// Called once after the last instrument.
    fn finish(&mut self) -> Result<(), ReporterError> {
        Ok(())
    }
}
