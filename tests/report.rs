use std::io::{Cursor, Read};

use chrono::NaiveDate;
use sales_report::{generate_at, load, ReportError, SHEET_NAMES};
use zip::ZipArchive;

const SALES_CSV: &str = "\
Date,Region,Product,Net_Sales,Units_Sold,Channel
2024-01-15,East,Widget,100,4,Online
2024-01-20,West,Gadget,300,9,Retail
2024-02-03,East,Gadget,50,2,Online
03/11/2024,North,Widget,75.25,3,Retail
";

fn generated_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open workbook archive");
    let mut part = archive.by_name(name).expect("workbook part");
    let mut xml = String::new();
    part.read_to_string(&mut xml).expect("read part");
    xml
}

fn sheet_names(bytes: &[u8]) -> Vec<String> {
    let workbook = read_part(bytes, "xl/workbook.xml");
    workbook
        .split("<sheet ")
        .skip(1)
        .filter_map(|tag| {
            let start = tag.find("name=\"")? + "name=\"".len();
            let end = start + tag[start..].find('"')?;
            Some(tag[start..end].to_string())
        })
        .collect()
}

fn chart_parts(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("open workbook archive");
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/charts/chart"))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

#[test]
fn report_has_five_sheets_in_order() {
    let table = load(SALES_CSV.as_bytes()).unwrap();
    let bytes = generate_at(&table, generated_at()).unwrap();

    assert_eq!(sheet_names(&bytes), SHEET_NAMES);
}

#[test]
fn report_contains_three_titled_charts() {
    let table = load(SALES_CSV.as_bytes()).unwrap();
    let bytes = generate_at(&table, generated_at()).unwrap();

    let charts = chart_parts(&bytes);
    assert_eq!(charts.len(), 3);

    let xml: String = charts.iter().map(|name| read_part(&bytes, name)).collect();
    for title in [
        "Net Sales by Region",
        "Market Share by Product",
        "Sales Trend by Month",
    ] {
        assert!(xml.contains(title), "missing chart title {title}");
    }
    assert!(xml.contains("<c:barChart>"));
    assert!(xml.contains("<c:pieChart>"));
    assert!(xml.contains("<c:lineChart>"));
}

#[test]
fn header_only_input_still_produces_full_report() {
    let table = load(b"Date,Region,Product,Net_Sales,Units_Sold\n").unwrap();
    assert!(table.is_empty());

    let bytes = generate_at(&table, generated_at()).unwrap();
    assert_eq!(sheet_names(&bytes), SHEET_NAMES);
    assert_eq!(chart_parts(&bytes).len(), 3);
}

#[test]
fn load_errors_name_the_problem() {
    let missing = load(b"Date,Product,Net_Sales,Units_Sold\n2024-01-01,Widget,1,1\n");
    assert!(matches!(missing, Err(ReportError::Schema { ref column }) if column == "Region"));

    let bad_date = load(b"Date,Region,Product,Net_Sales,Units_Sold\nnot-a-date,East,Widget,1,1\n")
        .unwrap_err();
    assert!(matches!(bad_date, ReportError::Parse { line: 2, .. }));
    assert!(bad_date.to_string().contains("not-a-date"));

    let early = load(b"Date,Region,Product,Net_Sales,Units_Sold\n1899-12-15,East,W,10,1\n")
        .unwrap_err();
    assert!(matches!(early, ReportError::Parse { line: 2, .. }));
    assert!(early.to_string().contains("Date"));
}

#[test]
fn overflowing_totals_produce_no_workbook() {
    let csv = "Date,Region,Product,Net_Sales,Units_Sold\n\
        2024-01-01,East,Widget,50000000000000000000000000000,1\n\
        2024-01-02,East,Widget,50000000000000000000000000000,1\n";
    let table = load(csv.as_bytes()).unwrap();
    assert!(matches!(
        generate_at(&table, generated_at()),
        Err(ReportError::Overflow { .. })
    ));
}

#[test]
fn summaries_partition_the_same_total() {
    let table = load(SALES_CSV.as_bytes()).unwrap();
    let summaries = sales_report::summarize(&table).unwrap();
    let total = summaries.net_sales_total;

    let region: rust_decimal::Decimal = summaries.by_region.iter().map(|row| row.total).sum();
    let product: rust_decimal::Decimal = summaries.by_product.iter().map(|row| row.total).sum();
    let monthly: rust_decimal::Decimal = summaries.by_month.iter().map(|row| row.total).sum();

    assert_eq!(region, total);
    assert_eq!(product, total);
    assert_eq!(monthly, total);
    assert_eq!(summaries.by_month[0].key.to_string(), "2024-01");
    assert_eq!(summaries.by_month[0].total, rust_decimal::Decimal::from(400));
}
