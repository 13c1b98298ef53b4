//! Transaction cleaning: schema check, row filtering and line totals

use crate::columns::{self, COUNTRY, CUSTOMER_ID, INVOICE, INVOICE_DATE, PRICE, QUANTITY};
use crate::error::{Result, SegmentError};
use crate::ingest::Table;
use crate::records::{
    is_missing, parse_timestamp, CleanedTransaction, CustomerId, Numeric, TransactionRecord,
};
use tracing::info;

/// Invoices starting with this marker are cancellations
pub const CANCELLATION_PREFIX: char = 'C';

/// Normalize column names, check the schema and convert every row to a typed record
pub fn to_records(table: &Table) -> Result<Vec<TransactionRecord>> {
    let table = columns::normalize_columns(table)?;

    let missing = columns::missing_required(table.columns());
    if !missing.is_empty() {
        return Err(SegmentError::Schema { missing });
    }

    let index = |name: &str| {
        table.column_index(name).ok_or_else(|| SegmentError::Schema {
            missing: vec![name.to_string()],
        })
    };
    let invoice = index(INVOICE)?;
    let date = index(INVOICE_DATE)?;
    let quantity = index(QUANTITY)?;
    let price = index(PRICE)?;
    let customer = index(CUSTOMER_ID)?;
    let country = table.column_index(COUNTRY);

    let records = table
        .rows()
        .iter()
        .map(|row| TransactionRecord {
            // Untrimmed: the cancellation marker must lead the raw cell
            invoice: Some(row[invoice].as_str())
                .filter(|cell| !is_missing(cell))
                .map(str::to_string),
            invoice_date: parse_timestamp(&row[date]),
            quantity: Numeric::parse(&row[quantity]),
            price: Numeric::parse(&row[price]),
            customer_id: CustomerId::parse(&row[customer]),
            country: country
                .map(|c| row[c].trim())
                .filter(|cell| !is_missing(cell))
                .map(str::to_string),
        })
        .collect();

    Ok(records)
}

/// Apply the row-level cleaning policy to typed records.
///
/// Drops rows without a date, customer or invoice, drops cancellations,
/// coerces unparseable quantity/price to zero and keeps strictly positive
/// quantity and price. Returns an empty vector when nothing survives.
pub fn clean_records(records: &[TransactionRecord]) -> Vec<CleanedTransaction> {
    records
        .iter()
        .filter_map(|record| {
            let invoice_date = record.invoice_date?;
            let customer_id = record.customer_id.clone()?;
            let invoice = record.invoice.as_ref()?;
            if invoice.starts_with(CANCELLATION_PREFIX) {
                return None;
            }

            let quantity = record.quantity.or_zero();
            let price = record.price.or_zero();
            if quantity <= 0.0 || price <= 0.0 {
                return None;
            }

            Some(CleanedTransaction {
                invoice: invoice.clone(),
                invoice_date,
                quantity,
                price,
                customer_id,
                country: record.country.clone(),
                total_price: quantity * price,
            })
        })
        .collect()
}

/// Clean a raw transactions table
pub fn clean_transactions(table: &Table) -> Result<Vec<CleanedTransaction>> {
    let records = to_records(table)?;
    let cleaned = clean_records(&records);
    info!(
        input_rows = records.len(),
        kept_rows = cleaned.len(),
        "cleaned transactions"
    );
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::read_table;

    fn table(csv: &str) -> Table {
        read_table(csv.as_bytes()).unwrap()
    }

    fn scenario_a() -> Table {
        table(
            "Invoice,InvoiceDate,Quantity,Price,Customer ID,Country\n\
             A1,2023-01-01,2,5,1,UK\n\
             A2,2023-01-10,3,5,1,UK\n\
             C99,2023-01-05,2,5,1,UK\n",
        )
    }

    #[test]
    fn test_scenario_a_drops_cancellation() {
        let cleaned = clean_transactions(&scenario_a()).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert!(cleaned.iter().all(|row| !row.invoice.starts_with('C')));
        assert_eq!(cleaned[0].total_price, 10.0);
        assert_eq!(cleaned[1].total_price, 15.0);
        assert_eq!(cleaned[0].country.as_deref(), Some("UK"));
    }

    #[test]
    fn test_schema_error_lists_missing_columns() {
        let result = clean_transactions(&table("Invoice,Qty,Price\nA1,1,1\n"));
        match result {
            Err(SegmentError::Schema { missing }) => {
                assert_eq!(missing, vec!["InvoiceDate", "Quantity", "CustomerID"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let cleaned = clean_transactions(&table(
            "invoice,invoice date,quantity,unitprice,customerid\n\
             A1,not-a-date,1,1,1\n\
             A2,2023-01-01,1,1,\n\
             A3,2023-01-01,abc,1,1\n\
             A4,2023-01-01,1,0,1\n\
             A5,2023-01-01,-1,2,1\n\
             ,2023-01-01,1,2,1\n\
             c6,2023-01-01,1,2,1\n\
             A7,2023-01-01,1,2,1\n",
        ))
        .unwrap();

        // Lowercase "c" is not a cancellation marker
        let invoices: Vec<&str> = cleaned.iter().map(|row| row.invoice.as_str()).collect();
        assert_eq!(invoices, vec!["c6", "A7"]);
    }

    #[test]
    fn test_cancellation_prefix_checks_raw_cell() {
        let cleaned = clean_transactions(&table(
            "Invoice,InvoiceDate,Quantity,Price,CustomerID\n\
             \" C99\",2023-01-01,1,2,1\n\
             C98,2023-01-01,1,2,1\n\
             A1,2023-01-02,1,2,1\n",
        ))
        .unwrap();

        let invoices: Vec<&str> = cleaned.iter().map(|row| row.invoice.as_str()).collect();
        assert_eq!(invoices, vec![" C99", "A1"]);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let first = clean_transactions(&scenario_a()).unwrap();
        let records: Vec<TransactionRecord> = first.iter().map(TransactionRecord::from).collect();
        let second = clean_records(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_positivity_invariant() {
        let cleaned = clean_transactions(&table(
            "Invoice,InvoiceDate,Quantity,Price,CustomerID\n\
             1,2023-01-01,4,0.25,7\n\
             2,2023-01-02,0,3,7\n\
             3,2023-01-03,2,x,8\n\
             4,2023-01-04,6,1.5,8\n",
        ))
        .unwrap();

        assert_eq!(cleaned.len(), 2);
        for row in &cleaned {
            assert!(row.quantity > 0.0 && row.price > 0.0);
            assert_eq!(row.total_price, row.quantity * row.price);
        }
    }

    #[test]
    fn test_all_cancelled_is_empty_not_error() {
        let cleaned = clean_transactions(&table(
            "Invoice,InvoiceDate,Quantity,Price,CustomerID\n\
             C1,2023-01-01,1,1,1\n\
             C2,2023-01-02,1,1,2\n",
        ))
        .unwrap();
        assert!(cleaned.is_empty());
    }
}
