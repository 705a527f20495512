//! Broker operation records as delivered by an operation source.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use std::fmt;

/// Monetary amount. Always exact decimal, never binary floating point.
pub type Money = Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    Done,
    Decline,
    Progress,
    Unknown,
}

impl OperationStatus {
    pub fn is_done(self) -> bool {
        self == OperationStatus::Done
    }
}

impl From<&str> for OperationStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "Done" => OperationStatus::Done,
            "Decline" => OperationStatus::Decline,
            "Progress" => OperationStatus::Progress,
            _ => OperationStatus::Unknown,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationStatus::Done => "Done",
            OperationStatus::Decline => "Decline",
            OperationStatus::Progress => "Progress",
            OperationStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Kind of an operation. Only plain `Buy` and `Sell` move position quantity;
/// everything else (dividends, coupons, fees, card purchases) is `Other` and
/// keeps the source label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationType {
    Buy,
    Sell,
    Other(String),
}

impl From<&str> for OperationType {
    fn from(value: &str) -> Self {
        match value.trim() {
            "Buy" => OperationType::Buy,
            "Sell" => OperationType::Sell,
            other => OperationType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Buy => f.write_str("Buy"),
            OperationType::Sell => f.write_str("Sell"),
            OperationType::Other(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub id: String,
    pub figi: Option<String>,
    pub status: OperationStatus,
    pub operation_type: OperationType,
    pub quantity: Option<i64>,
    pub payment: Money,
    pub commission: Option<Money>,
    pub currency: String,
    pub date: DateTime<FixedOffset>,
}

impl Operation {
    pub fn is_buy(&self) -> bool {
        self.operation_type == OperationType::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.operation_type == OperationType::Sell
    }

    /// Units transacted, with a missing quantity counted as zero.
    pub fn quantity_or_zero(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }

    /// Payment plus commission, as recorded by the feed. The commission sign is
    /// taken as-is.
    pub fn net_amount(&self) -> Money {
        self.payment + self.commission.unwrap_or(Decimal::ZERO)
    }
}
