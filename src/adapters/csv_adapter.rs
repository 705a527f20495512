//! CSV operation export adapter.
//!
//! Reads a flat export with one operation per row:
//!
//! ```text
//! account_id,account_type,id,status,operation_type,figi,quantity,payment,commission,currency,date
//! 2000123456,Tinkoff,17001,Done,Buy,BBG000B9XRY4,10,-1000.00,-5.00,USD,2020-01-10T10:00:00+03:00
//! ```
//!
//! Empty `figi`, `quantity` and `commission` cells are treated as absent.

use crate::domain::account::BrokerAccount;
use crate::domain::error::ReporterError;
use crate::domain::operation::{Money, Operation, OperationStatus, OperationType};
use crate::ports::operation_port::OperationPort;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct CsvRow {
    account_id: String,
    account_type: String,
    #[serde(default)]
    id: Option<String>,
    status: String,
    operation_type: String,
    figi: Option<String>,
    quantity: Option<i64>,
    payment: String,
    commission: Option<String>,
    currency: String,
    date: String,
}

pub struct CsvOperationAdapter {
    path: PathBuf,
}

impl CsvOperationAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn source_error(&self, reason: String) -> ReporterError {
        ReporterError::SourceData {
            source_name: self.path.display().to_string(),
            reason,
        }
    }

    fn read_rows(&self) -> Result<Vec<CsvRow>, ReporterError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.source_error(format!("failed to open: {e}")))?;

        rdr.deserialize::<CsvRow>()
            .map(|row| row.map_err(|e| self.source_error(format!("CSV parse error: {e}"))))
            .collect()
    }

    fn to_operation(&self, row: CsvRow, line: usize) -> Result<Operation, ReporterError> {
        let payment = parse_money(&row.payment)
            .map_err(|e| self.source_error(format!("row {line}: invalid payment: {e}")))?;
        let commission = row
            .commission
            .as_deref()
            .map(parse_money)
            .transpose()
            .map_err(|e| self.source_error(format!("row {line}: invalid commission: {e}")))?;
        let date = DateTime::parse_from_rfc3339(&row.date)
            .map_err(|e| self.source_error(format!("row {line}: invalid date: {e}")))?;

        Ok(Operation {
            id: row.id.unwrap_or_default(),
            figi: row.figi.filter(|f| !f.is_empty()),
            status: OperationStatus::from(row.status.as_str()),
            operation_type: OperationType::from(row.operation_type.as_str()),
            quantity: row.quantity,
            payment,
            commission,
            currency: row.currency,
            date,
        })
    }
}

fn parse_money(value: &str) -> Result<Money, rust_decimal::Error> {
    Decimal::from_str(value.trim())
}

impl OperationPort for CsvOperationAdapter {
    fn list_accounts(&self) -> Result<Vec<BrokerAccount>, ReporterError> {
        let mut accounts: Vec<BrokerAccount> = Vec::new();
        for row in self.read_rows()? {
            if !accounts.iter().any(|a| a.id == row.account_id) {
                accounts.push(BrokerAccount {
                    id: row.account_id,
                    account_type: row.account_type,
                });
            }
        }
        Ok(accounts)
    }

    fn fetch_operations(
        &self,
        account_id: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<Operation>, ReporterError> {
        let mut operations = Vec::new();
        for (i, row) in self.read_rows()?.into_iter().enumerate() {
            if row.account_id != account_id {
                continue;
            }
            // Header is line 1.
            let op = self.to_operation(row, i + 2)?;
            if op.date < from || op.date > to {
                continue;
            }
            operations.push(op);
        }
        Ok(operations)
    }
}
