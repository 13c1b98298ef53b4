//! Canonical column naming for transaction tables

use crate::error::Result;
use crate::ingest::Table;

pub const INVOICE: &str = "Invoice";
pub const INVOICE_DATE: &str = "InvoiceDate";
pub const QUANTITY: &str = "Quantity";
pub const PRICE: &str = "Price";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const COUNTRY: &str = "Country";

/// Columns the cleaning stage cannot run without, in reporting order
pub const REQUIRED: [&str; 5] = [INVOICE, INVOICE_DATE, QUANTITY, PRICE, CUSTOMER_ID];

/// Map a single column name to its canonical spelling, if it is a known variant
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "customer id" | "customerid" | "customer_id" => Some(CUSTOMER_ID),
        "invoice date" | "invoicedate" => Some(INVOICE_DATE),
        "invoice" => Some(INVOICE),
        "quantity" => Some(QUANTITY),
        "price" | "unitprice" => Some(PRICE),
        "country" => Some(COUNTRY),
        _ => None,
    }
}

/// Rename known variants; unknown names pass through untouched
pub fn normalize_names(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| canonical_name(c).map_or_else(|| c.clone(), str::to_string))
        .collect()
}

/// Table with canonical column names, same order and cells
pub fn normalize_columns(table: &Table) -> Result<Table> {
    table.with_columns(normalize_names(table.columns()))
}

/// Required columns absent from `columns`
pub fn missing_required(columns: &[String]) -> Vec<String> {
    REQUIRED
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| required.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_variants_map_to_canonical() {
        let input = names(&[
            " Customer ID ",
            "INVOICEDATE",
            "invoice",
            "Quantity",
            "UnitPrice",
            "country",
        ]);
        assert_eq!(
            normalize_names(&input),
            names(&["CustomerID", "InvoiceDate", "Invoice", "Quantity", "Price", "Country"])
        );
    }

    #[test]
    fn test_unknown_columns_keep_name_and_order() {
        let input = names(&["StockCode", "customer_id", "Description"]);
        assert_eq!(
            normalize_names(&input),
            names(&["StockCode", "CustomerID", "Description"])
        );
    }

    #[test]
    fn test_invoice_no_is_not_renamed() {
        assert_eq!(canonical_name("InvoiceNo"), None);
    }

    #[test]
    fn test_missing_required_reports_all_in_order() {
        let columns = names(&["Invoice", "Quantity"]);
        assert_eq!(
            missing_required(&columns),
            names(&["InvoiceDate", "Price", "CustomerID"])
        );
    }

    #[test]
    fn test_normalize_table() {
        let table = Table::new(
            names(&["customer id", "Amount"]),
            vec![names(&["1", "9.5"])],
        )
        .unwrap();
        let normalized = normalize_columns(&table).unwrap();
        assert_eq!(normalized.columns(), names(&["CustomerID", "Amount"]).as_slice());
        assert_eq!(normalized.rows(), table.rows());
    }
}
