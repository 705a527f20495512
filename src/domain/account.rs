//! Broker accounts and selection of the account to report on.

use crate::domain::error::ReporterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAccount {
    pub id: String,
    pub account_type: String,
}

/// Pick the first account of the requested type.
pub fn resolve_account<'a>(
    accounts: &'a [BrokerAccount],
    account_type: &str,
) -> Result<&'a BrokerAccount, ReporterError> {
    accounts
        .iter()
        .find(|a| a.account_type == account_type)
        .ok_or_else(|| ReporterError::AccountNotFound {
            account_type: account_type.to_string(),
        })
}
