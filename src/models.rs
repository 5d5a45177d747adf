use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

pub const DATE_COLUMN: &str = "Date";
pub const REGION_COLUMN: &str = "Region";
pub const PRODUCT_COLUMN: &str = "Product";
pub const NET_SALES_COLUMN: &str = "Net_Sales";
pub const UNITS_SOLD_COLUMN: &str = "Units_Sold";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    REGION_COLUMN,
    PRODUCT_COLUMN,
    NET_SALES_COLUMN,
    UNITS_SOLD_COLUMN,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Empty,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    pub net_sales: Decimal,
    pub units_sold: i64,
    // every column in table order, passthrough included
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub records: Vec<SalesRecord>,
}

impl RecordTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthPeriod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summaries {
    pub by_region: Vec<AggregateRow<String>>,
    pub by_product: Vec<AggregateRow<String>>,
    pub by_month: Vec<AggregateRow<MonthPeriod>>,
    pub net_sales_total: Decimal,
    pub units_sold_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub rows: Vec<Vec<Field>>,
}
