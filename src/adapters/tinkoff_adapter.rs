//! Tinkoff Invest REST OpenAPI adapter.
//!
//! # Endpoints
//!
//! - Accounts: `GET {base}/user/accounts`
//! - Operations: `GET {base}/operations?from={rfc3339}&to={rfc3339}&brokerAccountId={id}`
//!
//! Every response is wrapped in `{"trackingId": .., "status": "Ok", "payload": ..}`.
//! Failures carry `"status": "Error"` with a `message` in the payload.
//! Money values are JSON numbers and are read with full decimal precision.

use crate::domain::account::BrokerAccount;
use crate::domain::config_validation::ApiConfig;
use crate::domain::error::ReporterError;
use crate::domain::operation::{Operation, OperationStatus, OperationType};
use crate::ports::operation_port::OperationPort;
use chrono::{DateTime, FixedOffset};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const ACCOUNTS_PATH: &str = "/user/accounts";
const OPERATIONS_PATH: &str = "/operations";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    payload: T,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountsPayload {
    accounts: Vec<ApiAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAccount {
    broker_account_type: String,
    broker_account_id: String,
}

#[derive(Debug, Deserialize)]
struct OperationsPayload {
    operations: Vec<ApiOperation>,
}

#[derive(Debug, Deserialize)]
struct ApiMoney {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    value: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiOperation {
    id: String,
    status: String,
    #[serde(default)]
    commission: Option<ApiMoney>,
    currency: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    payment: Decimal,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    figi: Option<String>,
    date: String,
    #[serde(default)]
    operation_type: Option<String>,
}

impl ApiOperation {
    fn into_operation(self) -> Result<Operation, ReporterError> {
        let date = DateTime::parse_from_rfc3339(&self.date).map_err(|e| {
            ReporterError::SourceData {
                source_name: OPERATIONS_PATH.to_string(),
                reason: format!("operation {}: invalid date {:?}: {e}", self.id, self.date),
            }
        })?;
        Ok(Operation {
            status: OperationStatus::from(self.status.as_str()),
            operation_type: self
                .operation_type
                .as_deref()
                .map(OperationType::from)
                .unwrap_or_else(|| OperationType::Other(String::new())),
            figi: self.figi,
            quantity: self.quantity,
            payment: self.payment,
            commission: self.commission.map(|c| c.value),
            currency: self.currency,
            date,
            id: self.id,
        })
    }
}

/// Blocking client for one API token.
pub struct TinkoffApiAdapter {
    client: Client,
    base_url: String,
    token: String,
}

impl TinkoffApiAdapter {
    pub fn new(token: &str, api: &ApiConfig) -> Result<Self, ReporterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| ReporterError::Api {
                endpoint: api.endpoint().to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: api.endpoint().to_string(),
            token: token.to_string(),
        })
    }

    /// Body of a successful (2xx) response.
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, ReporterError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "requesting");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .map_err(|e| api_error(path, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| api_error(path, e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Envelope<ErrorPayload>>(&body)
                .map(|env| describe_error(&env.payload))
                .unwrap_or_default();
            return Err(api_error(path, format!("HTTP {status}{detail}")));
        }
        Ok(body)
    }
}

fn api_error(endpoint: &str, reason: String) -> ReporterError {
    ReporterError::Api {
        endpoint: endpoint.to_string(),
        reason,
    }
}

fn describe_error(payload: &ErrorPayload) -> String {
    match (&payload.code, &payload.message) {
        (Some(code), Some(message)) => format!(": {code}: {message}"),
        (None, Some(message)) => format!(": {message}"),
        (Some(code), None) => format!(": {code}"),
        (None, None) => String::new(),
    }
}

/// Unwrap a successful envelope, rejecting any status other than `Ok`.
fn decode_payload<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ReporterError> {
    let status = serde_json::from_str::<Envelope<serde::de::IgnoredAny>>(body)
        .map_err(|e| api_error(endpoint, format!("malformed response: {e}")))?
        .status;
    if status != "Ok" {
        let detail = serde_json::from_str::<Envelope<ErrorPayload>>(body)
            .map(|env| describe_error(&env.payload))
            .unwrap_or_default();
        return Err(api_error(endpoint, format!("status {status}{detail}")));
    }
    serde_json::from_str::<Envelope<T>>(body)
        .map(|env| env.payload)
        .map_err(|e| api_error(endpoint, format!("malformed payload: {e}")))
}

fn decode_accounts(body: &str) -> Result<Vec<BrokerAccount>, ReporterError> {
    let payload: AccountsPayload = decode_payload(ACCOUNTS_PATH, body)?;
    Ok(payload
        .accounts
        .into_iter()
        .map(|a| BrokerAccount {
            id: a.broker_account_id,
            account_type: a.broker_account_type,
        })
        .collect())
}

fn decode_operations(body: &str) -> Result<Vec<Operation>, ReporterError> {
    let payload: OperationsPayload = decode_payload(OPERATIONS_PATH, body)?;
    payload
        .operations
        .into_iter()
        .map(ApiOperation::into_operation)
        .collect()
}

impl OperationPort for TinkoffApiAdapter {
    fn list_accounts(&self) -> Result<Vec<BrokerAccount>, ReporterError> {
        decode_accounts(&self.get(ACCOUNTS_PATH, &[])?)
    }

    fn fetch_operations(
        &self,
        account_id: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<Operation>, ReporterError> {
        let query = [
            ("from", from.to_rfc3339()),
            ("to", to.to_rfc3339()),
            ("brokerAccountId", account_id.to_string()),
        ];
        let operations = decode_operations(&self.get(OPERATIONS_PATH, &query)?)?;
        tracing::debug!(count = operations.len(), "operations received");
        Ok(operations)
    }
}
