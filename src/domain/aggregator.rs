//! Grouping of operations by instrument and selection of closed positions.

use crate::domain::error::SummaryError;
use crate::domain::operation::Operation;
use crate::domain::summary::ClosedPositionSummary;
use std::collections::HashMap;

/// All retained operations of one instrument. Never empty.
#[derive(Debug, Clone)]
pub struct InstrumentGroup<'a> {
    figi: &'a str,
    operations: Vec<&'a Operation>,
}

impl<'a> InstrumentGroup<'a> {
    fn new(figi: &'a str, first: &'a Operation) -> Self {
        Self {
            figi,
            operations: vec![first],
        }
    }

    pub fn figi(&self) -> &'a str {
        self.figi
    }

    pub fn operations(&self) -> &[&'a Operation] {
        &self.operations
    }

    /// Summed in `i128`: any number of `i64` quantities from the feed fits
    /// without wrapping.
    pub fn buy_quantity(&self) -> i128 {
        self.operations
            .iter()
            .filter(|op| op.is_buy())
            .map(|op| i128::from(op.quantity_or_zero()))
            .sum()
    }

    pub fn sell_quantity(&self) -> i128 {
        self.operations
            .iter()
            .filter(|op| op.is_sell())
            .map(|op| i128::from(op.quantity_or_zero()))
            .sum()
    }

    /// Bought and sold quantities match, so nothing is left open.
    pub fn is_closed(&self) -> bool {
        self.buy_quantity() == self.sell_quantity()
    }

    /// Currency of the first operation; groups are assumed single-currency.
    pub fn currency(&self) -> &'a str {
        let first: &'a Operation = self.operations[0];
        &first.currency
    }
}

/// Keep completed operations that name an instrument.
pub fn is_reportable(op: &Operation) -> bool {
    op.status.is_done() && op.figi.is_some()
}

/// Partition reportable operations by FIGI, in first-seen instrument order.
pub fn group_by_instrument(operations: &[Operation]) -> Vec<InstrumentGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<InstrumentGroup<'_>> = Vec::new();

    for op in operations.iter().filter(|op| is_reportable(op)) {
        let Some(figi) = op.figi.as_deref() else {
            continue;
        };
        match index.get(figi) {
            Some(&i) => groups[i].operations.push(op),
            None => {
                index.insert(figi, groups.len());
                groups.push(InstrumentGroup::new(figi, op));
            }
        }
    }

    groups
}

/// Summaries of every closed instrument, one entry per closed group.
///
/// A group whose figures cannot be computed yields an `Err` in its slot; the
/// other groups are unaffected.
pub fn summarize(operations: &[Operation]) -> Vec<Result<ClosedPositionSummary, SummaryError>> {
    group_by_instrument(operations)
        .iter()
        .filter(|group| group.is_closed())
        .map(ClosedPositionSummary::compute)
        .collect()
}
