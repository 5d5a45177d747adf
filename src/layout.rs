use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::ReportError;
use crate::models::{
    AggregateRow, Field, RecordTable, Summaries, DATE_COLUMN, NET_SALES_COLUMN, PRODUCT_COLUMN,
    REGION_COLUMN,
};
use crate::styles::{ReportStyles, StyleKey};

pub const RAW_DATA_SHEET: &str = "Raw Data";
pub const REGION_SHEET: &str = "Region Summary";
pub const PRODUCT_SHEET: &str = "Product Summary";
pub const MONTHLY_SHEET: &str = "Monthly Trends";
pub const EXECUTIVE_SHEET: &str = "Executive Summary";

pub const SHEET_NAMES: [&str; 5] = [
    RAW_DATA_SHEET,
    REGION_SHEET,
    PRODUCT_SHEET,
    MONTHLY_SHEET,
    EXECUTIVE_SHEET,
];

pub const MISSING_VALUE: &str = "N/A";

const RAW_BANNER_LAST_COL: u16 = 13;
const RAW_COLUMN_WIDTH: f64 = 15.0;
const SUMMARY_COLUMN_WIDTH: f64 = 18.0;
const EXECUTIVE_COLUMN_WIDTH: f64 = 24.0;
const SUMMARY_FIRST_ROW: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Amount(Decimal),
    Count(i64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSpec {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub style: Option<StyleKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSpec {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
    pub text: String,
    pub style: StyleKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnWidth {
    pub first_col: u16,
    pub last_col: u16,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CueKind {
    ColorScale { low: u32, mid: u32, high: u32 },
    DataBar { color: u32, solid: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueSpec {
    pub kind: CueKind,
    pub first_row: u32,
    pub last_row: u32,
    pub col: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Column,
    Pie,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRef {
    pub sheet: String,
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub series_name: String,
    pub categories: RangeRef,
    pub values: RangeRef,
    pub color: Option<u32>,
    pub y_axis_title: Option<String>,
    pub anchor_row: u32,
    pub anchor_col: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSpec {
    pub name: String,
    pub cells: Vec<CellSpec>,
    pub merges: Vec<MergeSpec>,
    pub widths: Vec<ColumnWidth>,
    pub cues: Vec<CueSpec>,
    pub charts: Vec<ChartSpec>,
}

impl SheetSpec {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            merges: Vec::new(),
            widths: Vec::new(),
            cues: Vec::new(),
            charts: Vec::new(),
        }
    }

    fn put(&mut self, row: u32, col: u16, value: CellValue, style: Option<StyleKey>) {
        self.cells.push(CellSpec {
            row,
            col,
            value,
            style,
        });
    }

    fn banner(&mut self, last_col: u16, text: &str) {
        self.merges.push(MergeSpec {
            first_row: 0,
            first_col: 0,
            last_row: 0,
            last_col,
            text: text.to_string(),
            style: StyleKey::Title,
        });
    }

    fn width(&mut self, first_col: u16, last_col: u16, width: f64) {
        self.widths.push(ColumnWidth {
            first_col,
            last_col,
            width,
        });
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&CellSpec> {
        self.cells
            .iter()
            .find(|cell| cell.row == row && cell.col == col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub sheets: Vec<SheetSpec>,
    pub styles: ReportStyles,
}

impl ReportDocument {
    pub fn sheet(&self, name: &str) -> Option<&SheetSpec> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

/// Lays out the five report sheets. Row and column indices are zero-based.
pub fn assemble(
    table: &RecordTable,
    summaries: &Summaries,
    generated_at: NaiveDateTime,
    styles: &ReportStyles,
) -> ReportDocument {
    let region_rows = labelled(&summaries.by_region);
    let product_rows = labelled(&summaries.by_product);
    let monthly_rows: Vec<(String, Decimal)> = summaries
        .by_month
        .iter()
        .map(|row| (row.key.to_string(), row.total))
        .collect();

    let palette = &styles.palette;
    let sheets = vec![
        raw_data_sheet(table),
        summary_sheet(
            SummaryLayout {
                name: REGION_SHEET,
                title: "Total Sales by Region",
                banner_last_col: 2,
                key_header: REGION_COLUMN,
                cue: Some(CueKind::ColorScale {
                    low: palette.scale_low,
                    mid: palette.scale_mid,
                    high: palette.scale_high,
                }),
                chart: ChartLayout {
                    kind: ChartKind::Column,
                    title: "Net Sales by Region",
                    series_name: "Net Sales",
                    color: Some(palette.series),
                    y_axis_title: Some("Net Sales"),
                    anchor_col: 4,
                },
            },
            &region_rows,
        ),
        summary_sheet(
            SummaryLayout {
                name: PRODUCT_SHEET,
                title: "Market Share by Product",
                banner_last_col: 2,
                key_header: PRODUCT_COLUMN,
                cue: Some(CueKind::DataBar {
                    color: palette.data_bar,
                    solid: true,
                }),
                chart: ChartLayout {
                    kind: ChartKind::Pie,
                    title: "Market Share by Product",
                    series_name: "Market Share",
                    color: None,
                    y_axis_title: None,
                    anchor_col: 4,
                },
            },
            &product_rows,
        ),
        summary_sheet(
            SummaryLayout {
                name: MONTHLY_SHEET,
                title: "Monthly Sales Trends",
                banner_last_col: 1,
                key_header: DATE_COLUMN,
                cue: None,
                chart: ChartLayout {
                    kind: ChartKind::Line,
                    title: "Sales Trend by Month",
                    series_name: "Net Sales",
                    color: Some(palette.series),
                    y_axis_title: Some("Net Sales"),
                    anchor_col: 3,
                },
            },
            &monthly_rows,
        ),
        executive_sheet(summaries, generated_at),
    ];

    ReportDocument {
        sheets,
        styles: styles.clone(),
    }
}

fn labelled(rows: &[AggregateRow<String>]) -> Vec<(String, Decimal)> {
    rows.iter().map(|row| (row.key.clone(), row.total)).collect()
}

fn raw_data_sheet(table: &RecordTable) -> SheetSpec {
    let mut sheet = SheetSpec::new(RAW_DATA_SHEET);
    let column_count = table.columns.len().min(u16::MAX as usize) as u16;
    let last_col = column_count.saturating_sub(1);

    sheet.banner(last_col.max(RAW_BANNER_LAST_COL), "Raw Sales Data");
    for (col, name) in table.columns.iter().enumerate().take(column_count as usize) {
        sheet.put(1, col as u16, CellValue::Text(name.clone()), Some(StyleKey::Header));
    }
    if column_count > 0 {
        sheet.width(0, last_col, RAW_COLUMN_WIDTH);
    }

    for (offset, record) in table.records.iter().enumerate() {
        let row = 2 + offset as u32;
        for (col, field) in record.fields.iter().enumerate().take(column_count as usize) {
            let col = col as u16;
            match field {
                Field::Empty => {}
                Field::Number(number) => sheet.put(row, col, CellValue::Number(*number), None),
                Field::Date(date) => {
                    sheet.put(row, col, CellValue::Date(*date), Some(StyleKey::Date))
                }
                Field::Text(text) => sheet.put(row, col, CellValue::Text(text.clone()), None),
            }
        }
    }
    sheet
}

struct ChartLayout {
    kind: ChartKind,
    title: &'static str,
    series_name: &'static str,
    color: Option<u32>,
    y_axis_title: Option<&'static str>,
    anchor_col: u16,
}

struct SummaryLayout {
    name: &'static str,
    title: &'static str,
    banner_last_col: u16,
    key_header: &'static str,
    cue: Option<CueKind>,
    chart: ChartLayout,
}

fn summary_sheet(layout: SummaryLayout, rows: &[(String, Decimal)]) -> SheetSpec {
    let mut sheet = SheetSpec::new(layout.name);
    sheet.banner(layout.banner_last_col, layout.title);

    let header_row = SUMMARY_FIRST_ROW - 1;
    sheet.put(
        header_row,
        0,
        CellValue::Text(layout.key_header.to_string()),
        Some(StyleKey::Header),
    );
    sheet.put(
        header_row,
        1,
        CellValue::Text(NET_SALES_COLUMN.to_string()),
        Some(StyleKey::Header),
    );
    sheet.width(0, 1, SUMMARY_COLUMN_WIDTH);

    for (offset, (label, total)) in rows.iter().enumerate() {
        let row = SUMMARY_FIRST_ROW + offset as u32;
        sheet.put(row, 0, CellValue::Text(label.clone()), None);
        sheet.put(row, 1, CellValue::Amount(*total), Some(StyleKey::Currency));
    }

    // An empty summary still gets its chart, pointed at the blank first data row.
    let last_row = SUMMARY_FIRST_ROW + (rows.len() as u32).saturating_sub(1);
    if let (Some(kind), false) = (layout.cue, rows.is_empty()) {
        sheet.cues.push(CueSpec {
            kind,
            first_row: SUMMARY_FIRST_ROW,
            last_row,
            col: 1,
        });
    }

    let range = |col: u16| RangeRef {
        sheet: layout.name.to_string(),
        first_row: SUMMARY_FIRST_ROW,
        first_col: col,
        last_row,
        last_col: col,
    };
    sheet.charts.push(ChartSpec {
        kind: layout.chart.kind,
        title: layout.chart.title.to_string(),
        series_name: layout.chart.series_name.to_string(),
        categories: range(0),
        values: range(1),
        color: layout.chart.color,
        y_axis_title: layout.chart.y_axis_title.map(str::to_string),
        anchor_row: header_row,
        anchor_col: layout.chart.anchor_col,
    });
    sheet
}

fn executive_sheet(summaries: &Summaries, generated_at: NaiveDateTime) -> SheetSpec {
    let mut sheet = SheetSpec::new(EXECUTIVE_SHEET);
    sheet.banner(3, "Sales Executive Summary");

    let label = |text: &str| CellValue::Text(text.to_string());
    sheet.put(1, 0, label("Generated:"), Some(StyleKey::Header));
    sheet.put(
        1,
        1,
        CellValue::Text(generated_at.format("%Y-%m-%d %H:%M").to_string()),
        None,
    );

    sheet.put(3, 0, label("Total Net Sales"), Some(StyleKey::Header));
    sheet.put(
        3,
        1,
        CellValue::Amount(summaries.net_sales_total),
        Some(StyleKey::Currency),
    );
    sheet.put(4, 0, label("Total Units Sold"), Some(StyleKey::Header));
    sheet.put(
        4,
        1,
        CellValue::Count(summaries.units_sold_total),
        Some(StyleKey::Count),
    );

    sheet.put(5, 0, label("Top Region"), Some(StyleKey::Header));
    sheet.put(5, 1, top_label(summaries.top_region()), None);
    sheet.put(6, 0, label("Top Product"), Some(StyleKey::Header));
    sheet.put(6, 1, top_label(summaries.top_product()), None);

    sheet.width(0, 1, EXECUTIVE_COLUMN_WIDTH);
    sheet
}

fn top_label(top: Result<&AggregateRow<String>, ReportError>) -> CellValue {
    match top {
        Ok(row) => CellValue::Text(row.key.clone()),
        Err(err) => {
            warn!(error = %err, "writing placeholder in executive summary");
            CellValue::Text(MISSING_VALUE.to_string())
        }
    }
}
