use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::models::{
    Field, Preview, RecordTable, SalesRecord, DATE_COLUMN, NET_SALES_COLUMN, PRODUCT_COLUMN,
    REGION_COLUMN, UNITS_SOLD_COLUMN,
};

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

// Years a workbook date cell can hold.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    region: usize,
    product: usize,
    net_sales: usize,
    units_sold: usize,
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> Result<Self> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| ReportError::schema(name))
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            region: find(REGION_COLUMN)?,
            product: find(PRODUCT_COLUMN)?,
            net_sales: find(NET_SALES_COLUMN)?,
            units_sold: find(UNITS_SOLD_COLUMN)?,
        })
    }
}

/// Blank `Net_Sales`/`Units_Sold` cells count as zero.
pub fn load(bytes: &[u8]) -> Result<RecordTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|err| ReportError::parse(1, format!("header: {err}")))?
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').to_string())
        .collect();
    let index = ColumnIndex::resolve(&columns)?;
    debug!(columns = columns.len(), "resolved sales header");

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|err| {
            let line = err.position().map(|pos| pos.line()).unwrap_or_default();
            ReportError::parse(line, err.to_string())
        })?;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();
        records.push(parse_record(&row, &columns, index, line)?);
    }

    info!(rows = records.len(), "loaded sales records");
    Ok(RecordTable { columns, records })
}

pub fn preview(table: &RecordTable, limit: usize) -> Preview {
    Preview {
        columns: table.columns.clone(),
        total_rows: table.len(),
        rows: table
            .records
            .iter()
            .take(limit)
            .map(|record| record.fields.clone())
            .collect(),
    }
}

fn parse_record(
    row: &StringRecord,
    columns: &[String],
    index: ColumnIndex,
    line: u64,
) -> Result<SalesRecord> {
    let cell = |position: usize| row.get(position).unwrap_or_default();

    let raw_date = cell(index.date);
    let date = parse_date(raw_date).ok_or_else(|| {
        ReportError::parse(
            line,
            format!("column `{DATE_COLUMN}`: cannot parse `{raw_date}` as a date"),
        )
    })?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(ReportError::parse(
            line,
            format!(
                "column `{DATE_COLUMN}`: `{raw_date}` is outside the years {MIN_YEAR}-{MAX_YEAR}"
            ),
        ));
    }
    let net_sales = parse_amount(cell(index.net_sales)).ok_or_else(|| {
        ReportError::parse(
            line,
            format!(
                "column `{NET_SALES_COLUMN}`: `{}` is not a number",
                cell(index.net_sales)
            ),
        )
    })?;
    let units_sold = parse_count(cell(index.units_sold)).ok_or_else(|| {
        ReportError::parse(
            line,
            format!(
                "column `{UNITS_SOLD_COLUMN}`: `{}` is not a whole number",
                cell(index.units_sold)
            ),
        )
    })?;

    let fields = (0..columns.len())
        .map(|position| {
            if position == index.date {
                Field::Date(date)
            } else if position == index.net_sales {
                net_sales.to_f64().map_or(Field::Empty, Field::Number)
            } else if position == index.units_sold {
                Field::Number(units_sold as f64)
            } else {
                infer_field(cell(position))
            }
        })
        .collect();

    Ok(SalesRecord {
        date,
        region: cell(index.region).to_string(),
        product: cell(index.product).to_string(),
        net_sales,
        units_sold,
        fields,
    })
}

/// Accepts ISO, US month-first, textual month and date-time spellings.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

fn parse_amount(value: &str) -> Option<Decimal> {
    if value.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

fn parse_count(value: &str) -> Option<i64> {
    if value.is_empty() {
        return Some(0);
    }
    value.parse::<i64>().ok().or_else(|| {
        let amount = Decimal::from_str(value).ok()?;
        if amount.fract().is_zero() {
            amount.to_i64()
        } else {
            None
        }
    })
}

fn infer_field(value: &str) -> Field {
    if value.is_empty() {
        return Field::Empty;
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Field::Number(number),
        _ => Field::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::REQUIRED_COLUMNS;

    const HEADER: &str = "Date,Region,Product,Net_Sales,Units_Sold";

    #[test]
    fn loads_rows_in_input_order() {
        let input = format!("{HEADER}\n2024-01-15,East,Widget,100.50,3\n2024-02-01,West,Gadget,300,7\n");
        let table = load(input.as_bytes()).unwrap();

        assert_eq!(table.columns, REQUIRED_COLUMNS.map(String::from).to_vec());
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].region, "East");
        assert_eq!(table.records[0].net_sales, Decimal::from_str("100.50").unwrap());
        assert_eq!(table.records[1].units_sold, 7);
        assert_eq!(
            table.records[1].date,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn header_only_input_is_an_empty_table() {
        let table = load(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 5);
    }

    #[test]
    fn missing_region_column_is_a_schema_error() {
        let input = "Date,Product,Net_Sales,Units_Sold\n2024-01-15,Widget,10,1\n";
        match load(input.as_bytes()) {
            Err(ReportError::Schema { column }) => assert_eq!(column, "Region"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_a_schema_error() {
        assert!(matches!(load(b""), Err(ReportError::Schema { .. })));
    }

    #[test]
    fn unparseable_date_is_a_parse_error_with_line() {
        let input = format!("{HEADER}\n2024-01-15,East,Widget,10,1\nnot-a-date,West,Widget,10,1\n");
        match load(input.as_bytes()) {
            Err(ReportError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("not-a-date"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_year_is_a_parse_error() {
        let input = format!("{HEADER}\n1899-12-15,East,Widget,10,1\n");
        match load(input.as_bytes()) {
            Err(ReportError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("Date"), "{message}");
                assert!(message.contains("1899-12-15"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        let boundary = format!("{HEADER}\n1900-01-01,East,Widget,10,1\n");
        assert!(load(boundary.as_bytes()).is_ok());
    }

    #[test]
    fn invalid_utf8_header_is_a_parse_error() {
        let mut input = b"Date,Region,Product,Net_Sales,Units_Sold,Not".to_vec();
        input.extend_from_slice(&[0xff, 0xfe]);
        input.extend_from_slice(b"\n2024-01-15,East,Widget,10,1,x\n");
        assert!(matches!(
            load(&input),
            Err(ReportError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let input = format!("{HEADER}\n2024-01-15,East,Widget,10\n");
        assert!(matches!(
            load(input.as_bytes()),
            Err(ReportError::Parse { .. })
        ));
    }

    #[test]
    fn non_numeric_sales_is_a_parse_error() {
        let input = format!("{HEADER}\n2024-01-15,East,Widget,lots,1\n");
        assert!(matches!(
            load(input.as_bytes()),
            Err(ReportError::Parse { .. })
        ));
    }

    #[test]
    fn passthrough_columns_keep_their_position() {
        let input = "Order,Date,Region,Product,Net_Sales,Units_Sold,Rep\n\
                     A-1,2024-01-15,East,Widget,10,1,Dana\n\
                     7,2024-01-16,East,Widget,10,1,\n";
        let table = load(input.as_bytes()).unwrap();

        let first = &table.records[0].fields;
        assert_eq!(first[0], Field::Text("A-1".into()));
        assert_eq!(
            first[1],
            Field::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(first[6], Field::Text("Dana".into()));

        let second = &table.records[1].fields;
        assert_eq!(second[0], Field::Number(7.0));
        assert_eq!(second[6], Field::Empty);
    }

    #[test]
    fn blank_numbers_count_as_zero() {
        let input = format!("{HEADER}\n2024-01-15,East,Widget,,\n");
        let table = load(input.as_bytes()).unwrap();
        assert_eq!(table.records[0].net_sales, Decimal::ZERO);
        assert_eq!(table.records[0].units_sold, 0);
    }

    #[test]
    fn dates_are_parsed_leniently() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        for value in [
            "2024-01-15",
            "2024/01/15",
            "01/15/2024",
            "1/15/2024",
            "15 Jan 2024",
            "Jan 15, 2024",
            "January 15, 2024",
            "2024-01-15 08:30:00",
            "2024-01-15 08:30:00.123",
            "2024-01-15T08:30:00",
            "2024-01-15T08:30:00+02:00",
        ] {
            assert_eq!(parse_date(value), Some(expected), "{value}");
        }
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn whole_decimal_units_are_accepted() {
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
    }

    #[test]
    fn preview_is_bounded() {
        let mut input = String::from(HEADER);
        for day in 1..=9 {
            input.push_str(&format!("\n2024-01-0{day},East,Widget,10,1"));
        }
        let table = load(input.as_bytes()).unwrap();
        let preview = preview(&table, DEFAULT_PREVIEW_ROWS);

        assert_eq!(preview.total_rows, 9);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.columns, table.columns);
    }
}
