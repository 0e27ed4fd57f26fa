//! CSV export for the customers, orders, and inventory pages.
//!
//! Output follows RFC 4180: fields containing commas, quotes, or line
//! breaks are quoted, quotes are doubled. Money renders as dollars
//! (`189.00`) and statuses use their human labels, matching what the
//! dashboard tables show.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{Customer, Order, Product};

pub const CUSTOMER_COLUMNS: [&str; 7] =
    ["id", "name", "company", "email", "phone", "status", "created_at"];

pub const ORDER_COLUMNS: [&str; 6] =
    ["order_number", "customer", "status", "items", "total_usd", "placed_at"];

pub const INVENTORY_COLUMNS: [&str; 6] =
    ["sku", "name", "category", "price_usd", "stock", "stock_status"];

/// Incremental CSV writer.
struct CsvBuilder {
    out: String,
}

impl CsvBuilder {
    fn new(columns: &[&str]) -> Self {
        let mut builder = Self { out: String::new() };
        builder.row(columns.iter().map(ToString::to_string));
        builder
    }

    fn row<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.out.push(',');
            }
            first = false;
            self.push_escaped(&field);
        }
        self.out.push('\n');
    }

    fn push_escaped(&mut self, field: &str) {
        if field.contains(['"', ',', '\r', '\n']) {
            self.out.push('"');
            for c in field.chars() {
                if c == '"' {
                    self.out.push('"');
                }
                self.out.push(c);
            }
            self.out.push('"');
        } else {
            self.out.push_str(field);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `Content-Disposition` filename for an export taken at `at`, for example
/// `customers_export_20260805_143210.csv`.
#[must_use]
pub fn attachment_filename(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_export_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Render customers as CSV in the given order.
#[must_use]
pub fn customers_csv(customers: &[Customer]) -> String {
    let mut builder = CsvBuilder::new(&CUSTOMER_COLUMNS);
    for customer in customers {
        builder.row([
            customer.id.to_string(),
            customer.name.clone(),
            customer.company.clone(),
            customer.email.as_str().to_string(),
            customer.phone.clone(),
            customer.status.label().to_string(),
            timestamp(customer.created_at),
        ]);
    }
    builder.finish()
}

/// Render orders as CSV in the given order.
#[must_use]
pub fn orders_csv(orders: &[Order]) -> String {
    let mut builder = CsvBuilder::new(&ORDER_COLUMNS);
    for order in orders {
        builder.row([
            order.order_number.clone(),
            order.customer_name.clone(),
            order.status.label().to_string(),
            order.items_count.to_string(),
            order.total_cents.to_string(),
            timestamp(order.placed_at),
        ]);
    }
    builder.finish()
}

/// Render products as CSV in the given order.
#[must_use]
pub fn inventory_csv(products: &[Product]) -> String {
    let mut builder = CsvBuilder::new(&INVENTORY_COLUMNS);
    for product in products {
        builder.row([
            product.sku.clone(),
            product.name.clone(),
            product.category.clone(),
            product.price_cents.to_string(),
            product.stock.to_string(),
            product.stock_status.label().to_string(),
        ]);
    }
    builder.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cloudcrm_core::{CustomerId, CustomerStatus, Email, Money, ProductId, StockStatus};

    fn sample_customer(name: &str, company: &str) -> Customer {
        let at = Utc.with_ymd_and_hms(2026, 8, 5, 14, 32, 10).unwrap();
        Customer {
            id: CustomerId::new(7),
            name: name.to_string(),
            company: company.to_string(),
            email: Email::parse("zoe@example.com").unwrap(),
            phone: String::new(),
            status: CustomerStatus::Active,
            orders_count: 3,
            total_spent_cents: Money::from_cents(56_700),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_customers_csv_header_and_row() {
        let csv = customers_csv(&[sample_customer("Zoe Quinn", "Quinn Retail")]);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,name,company,email,phone,status,created_at"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7,Zoe Quinn,Quinn Retail,zoe@example.com,,Active,2026-08-05T14:32:10Z"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_escaped() {
        let csv = customers_csv(&[sample_customer("Quinn, Zoe", "The \"Q\" Company")]);
        let row = csv.lines().nth(1).unwrap();

        assert!(row.contains("\"Quinn, Zoe\""));
        assert!(row.contains("\"The \"\"Q\"\" Company\""));
    }

    #[test]
    fn test_field_with_newline_is_quoted() {
        let mut builder = CsvBuilder::new(&["a", "b"]);
        builder.row(["line1\nline2".to_string(), "plain".to_string()]);
        let csv = builder.finish();

        assert_eq!(csv, "a,b\n\"line1\nline2\",plain\n");
    }

    #[test]
    fn test_inventory_csv_prices_in_dollars() {
        let at = Utc::now();
        let csv = inventory_csv(&[Product {
            id: ProductId::new(1),
            name: "Wool Peacoat".to_string(),
            sku: "SKU-PC-01".to_string(),
            category: "Outerwear".to_string(),
            price_cents: Money::from_cents(18_900),
            stock: 4,
            low_stock_threshold: 10,
            supplier_id: None,
            stock_status: StockStatus::LowStock,
            created_at: at,
            updated_at: at,
        }]);

        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "SKU-PC-01,Wool Peacoat,Outerwear,189.00,4,Low Stock");
    }

    #[test]
    fn test_attachment_filename_format() {
        let at = Utc.with_ymd_and_hms(2026, 8, 5, 14, 32, 10).unwrap();
        assert_eq!(
            attachment_filename("customers", at),
            "customers_export_20260805_143210.csv"
        );
    }
}
