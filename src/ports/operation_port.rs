//! Operation source port trait.

use crate::domain::account::BrokerAccount;
use crate::domain::error::ReporterError;
use crate::domain::operation::Operation;
use chrono::{DateTime, FixedOffset};

/// Supplies broker accounts and their historical operations.
pub trait OperationPort {
    fn list_accounts(&self) -> Result<Vec<BrokerAccount>, ReporterError>;

    fn fetch_operations(
        &self,
        account_id: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<Operation>, ReporterError>;
}
