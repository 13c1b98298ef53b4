//! Per-customer Recency / Frequency / Monetary aggregation

use crate::error::{Result, SegmentError};
use crate::records::{CleanedTransaction, CustomerId};
use chrono::{Duration, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// RFM metrics for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRfm {
    pub customer_id: String,
    /// Whole days between the snapshot and the last purchase
    pub recency: i64,
    /// Distinct invoices
    pub frequency: usize,
    /// Total spend
    pub monetary: f64,
}

/// Default snapshot: one day after the latest invoice.
///
/// An empty table has no latest invoice, so this is an error rather than a guess.
pub fn default_snapshot(transactions: &[CleanedTransaction]) -> Result<NaiveDateTime> {
    transactions
        .iter()
        .map(|row| row.invoice_date)
        .max()
        .map(|latest| latest + Duration::days(1))
        .ok_or_else(|| {
            SegmentError::InsufficientData(
                "no cleaned transactions to derive a snapshot date from".to_string(),
            )
        })
}

/// Floor of the elapsed days; negative when `later` precedes `earlier`
fn elapsed_days(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    let elapsed = later - earlier;
    let days = elapsed.num_days();
    // num_days truncates toward zero
    if elapsed < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    last_purchase: Option<NaiveDateTime>,
    invoices: HashSet<&'a str>,
    monetary: f64,
}

/// Aggregate cleaned transactions into one RFM row per customer, ordered by customer id.
///
/// `snapshot` defaults to one day after the latest invoice. An empty input is
/// an error in either case, since there are no customers to describe.
pub fn compute_rfm(
    transactions: &[CleanedTransaction],
    snapshot: Option<NaiveDateTime>,
) -> Result<Vec<CustomerRfm>> {
    if transactions.is_empty() {
        return Err(SegmentError::InsufficientData(
            "no cleaned transactions to aggregate".to_string(),
        ));
    }
    let snapshot = match snapshot {
        Some(snapshot) => snapshot,
        None => default_snapshot(transactions)?,
    };

    let mut groups: BTreeMap<&CustomerId, Accumulator> = BTreeMap::new();
    for row in transactions {
        let acc = groups.entry(&row.customer_id).or_default();
        acc.last_purchase = acc.last_purchase.max(Some(row.invoice_date));
        acc.invoices.insert(row.invoice.as_str());
        acc.monetary += row.total_price;
    }

    let rfm: Vec<CustomerRfm> = groups
        .into_iter()
        .filter_map(|(customer_id, acc)| {
            let last_purchase = acc.last_purchase?;
            Some(CustomerRfm {
                customer_id: customer_id.to_string(),
                recency: elapsed_days(snapshot, last_purchase),
                frequency: acc.invoices.len(),
                monetary: acc.monetary,
            })
        })
        .filter(|row| row.monetary > 0.0)
        .collect();

    info!(customers = rfm.len(), snapshot = %snapshot, "computed RFM table");
    Ok(rfm)
}
