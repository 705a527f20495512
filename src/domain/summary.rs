//! Profitability of a closed position.
//!
//! All arithmetic is exact decimal. Percentages are kept at full precision in
//! [`ClosedPositionSummary`] and only rounded when rendered, half away from zero
//! to two places (see [`format_percent`]).

use crate::domain::aggregator::InstrumentGroup;
use crate::domain::error::SummaryError;
use crate::domain::operation::{Money, Operation};
use rust_decimal::{Decimal, RoundingStrategy};

const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedPositionSummary {
    pub figi: String,
    pub operation_count: usize,
    pub income: Money,
    pub invested: Money,
    pub income_percent: Decimal,
    pub period_days: i64,
    pub income_per_year: Decimal,
    pub currency: String,
}

impl ClosedPositionSummary {
    pub fn compute(group: &InstrumentGroup<'_>) -> Result<Self, SummaryError> {
        let ops = group.operations();
        let figi = group.figi();

        let income = income(figi, ops)?;
        let invested = invested(figi, ops)?;
        let income_percent = income_percent(figi, income, invested)?;
        let period_days = period_days(ops);
        let income_per_year = income_per_year(figi, income_percent, period_days)?;

        Ok(Self {
            figi: figi.to_string(),
            operation_count: ops.len(),
            income,
            invested,
            income_percent,
            period_days,
            income_per_year,
            currency: group.currency().to_string(),
        })
    }
}

/// Sum of payment plus commission over every operation of the group.
pub fn income(figi: &str, ops: &[&Operation]) -> Result<Money, SummaryError> {
    ops.iter()
        .try_fold(Decimal::ZERO, |acc, op| acc.checked_add(op.net_amount()))
        .ok_or_else(|| overflow(figi, "income"))
}

/// Cash spent on buys: the negated payments of `Buy` operations.
pub fn invested(figi: &str, ops: &[&Operation]) -> Result<Money, SummaryError> {
    ops.iter()
        .filter(|op| op.is_buy())
        .try_fold(Decimal::ZERO, |acc, op| acc.checked_sub(op.payment))
        .ok_or_else(|| overflow(figi, "invested"))
}

pub fn income_percent(figi: &str, income: Money, invested: Money) -> Result<Decimal, SummaryError> {
    if invested.is_zero() {
        return Err(SummaryError::ZeroInvested {
            figi: figi.to_string(),
        });
    }
    income
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(invested))
        .ok_or_else(|| overflow(figi, "income percent"))
}

/// Whole days between the earliest and latest operation, truncated.
pub fn period_days(ops: &[&Operation]) -> i64 {
    let first = ops.iter().map(|op| op.date).min();
    let last = ops.iter().map(|op| op.date).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    }
}

pub fn income_per_year(
    figi: &str,
    income_percent: Decimal,
    period_days: i64,
) -> Result<Decimal, SummaryError> {
    if period_days == 0 {
        return Err(SummaryError::ZeroPeriod {
            figi: figi.to_string(),
        });
    }
    income_percent
        .checked_mul(Decimal::from(DAYS_PER_YEAR))
        .and_then(|scaled| scaled.checked_div(Decimal::from(period_days)))
        .ok_or_else(|| overflow(figi, "income per year"))
}

/// Round to two places, half away from zero, always keeping two digits.
pub fn round_percent(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

pub fn format_percent(value: Decimal) -> String {
    round_percent(value).to_string()
}

fn overflow(figi: &str, quantity: &'static str) -> SummaryError {
    SummaryError::Overflow {
        figi: figi.to_string(),
        quantity,
    }
}
