#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tinvest_reporter::domain::account::BrokerAccount;
use tinvest_reporter::domain::error::{ReporterError, SummaryError};
pub use tinvest_reporter::domain::operation::{Money, Operation, OperationStatus, OperationType};
use tinvest_reporter::domain::summary::ClosedPositionSummary;
use tinvest_reporter::ports::operation_port::OperationPort;
use tinvest_reporter::ports::report_port::ReportPort;

pub fn day0() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2019-03-01T10:00:00+03:00").unwrap()
}

pub fn at(days: i64) -> DateTime<FixedOffset> {
    day0() + Duration::days(days)
}

/// Completed operation on `figi`, no commission, in USD.
pub fn make_op(
    figi: &str,
    operation_type: OperationType,
    quantity: Option<i64>,
    payment: Money,
    days: i64,
) -> Operation {
    Operation {
        id: String::new(),
        figi: Some(figi.to_string()),
        status: OperationStatus::Done,
        operation_type,
        quantity,
        payment,
        commission: None,
        currency: "USD".to_string(),
        date: at(days),
    }
}

pub fn buy(figi: &str, quantity: i64, payment: Money, days: i64) -> Operation {
    make_op(figi, OperationType::Buy, Some(quantity), payment, days)
}

pub fn sell(figi: &str, quantity: i64, payment: Money, days: i64) -> Operation {
    make_op(figi, OperationType::Sell, Some(quantity), payment, days)
}

pub fn with_commission(mut op: Operation, commission: Money) -> Operation {
    op.commission = Some(commission);
    op
}

pub fn account(id: &str, account_type: &str) -> BrokerAccount {
    BrokerAccount {
        id: id.to_string(),
        account_type: account_type.to_string(),
    }
}

pub struct MockOperationPort {
    pub accounts: Vec<BrokerAccount>,
    pub operations: HashMap<String, Vec<Operation>>,
    pub fetch_error: Option<String>,
}

impl MockOperationPort {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            operations: HashMap::new(),
            fetch_error: None,
        }
    }

    pub fn with_account(mut self, id: &str, account_type: &str, ops: Vec<Operation>) -> Self {
        self.accounts.push(account(id, account_type));
        self.operations.insert(id.to_string(), ops);
        self
    }

    pub fn with_fetch_error(mut self, reason: &str) -> Self {
        self.fetch_error = Some(reason.to_string());
        self
    }
}

impl OperationPort for MockOperationPort {
    fn list_accounts(&self) -> Result<Vec<BrokerAccount>, ReporterError> {
        Ok(self.accounts.clone())
    }

    fn fetch_operations(
        &self,
        account_id: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<Operation>, ReporterError> {
        if let Some(reason) = &self.fetch_error {
            return Err(ReporterError::Api {
                endpoint: "/operations".to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .operations
            .get(account_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|op| op.date >= from && op.date <= to)
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub emitted: Vec<ClosedPositionSummary>,
    pub skipped: Vec<SummaryError>,
    pub finished: bool,
}

impl ReportPort for RecordingReporter {
    fn emit(&mut self, summary: &ClosedPositionSummary) -> Result<(), ReporterError> {
        self.emitted.push(summary.clone());
        Ok(())
    }

    fn skipped(&mut self, error: &SummaryError) -> Result<(), ReporterError> {
        self.skipped.push(error.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReporterError> {
        self.finished = true;
        Ok(())
    }
}

pub fn zero() -> Money {
    Decimal::ZERO
}
