use std::collections::HashMap;

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
    Chart, ChartFormat, ChartLine, ChartSolidFill, ChartType, Color, ConditionalFormat3ColorScale,
    ConditionalFormatDataBar, ExcelDateTime, Format, FormatAlign, Workbook, Worksheet,
};
use tracing::{debug, info};

use crate::error::Result;
use crate::layout::{
    CellSpec, CellValue, ChartKind, ChartSpec, CueKind, CueSpec, ReportDocument, SheetSpec,
};
use crate::styles::{Align, CellStyle, ReportStyles, StyleKey};

const STYLE_KEYS: [StyleKey; 5] = [
    StyleKey::Title,
    StyleKey::Header,
    StyleKey::Currency,
    StyleKey::Count,
    StyleKey::Date,
];

pub fn encode(document: &ReportDocument) -> Result<Vec<u8>> {
    let formats = build_formats(&document.styles);
    let mut workbook = Workbook::new();

    for spec in &document.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, spec, &formats)?;
        debug!(
            sheet = %spec.name,
            cells = spec.cells.len(),
            charts = spec.charts.len(),
            "wrote worksheet"
        );
    }

    let buffer = workbook.save_to_buffer()?;
    info!(bytes = buffer.len(), sheets = document.sheets.len(), "encoded workbook");
    Ok(buffer)
}

fn build_formats(styles: &ReportStyles) -> HashMap<StyleKey, Format> {
    STYLE_KEYS
        .into_iter()
        .map(|key| (key, build_format(styles.get(key))))
        .collect()
}

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if style.bold {
        format = format.set_bold();
    }
    format = match style.align {
        None => format,
        Some(Align::Left) => format.set_align(FormatAlign::Left),
        Some(Align::Center) => format.set_align(FormatAlign::Center),
        Some(Align::Right) => format.set_align(FormatAlign::Right),
    };
    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color));
    }
    if let Some(color) = style.bg_color {
        format = format.set_background_color(Color::RGB(color));
    }
    if let Some(num_format) = &style.num_format {
        format = format.set_num_format(num_format);
    }

    format
}

fn write_sheet(
    worksheet: &mut Worksheet,
    spec: &SheetSpec,
    formats: &HashMap<StyleKey, Format>,
) -> Result<()> {
    worksheet.set_name(&spec.name)?;

    for width in &spec.widths {
        for col in width.first_col..=width.last_col {
            worksheet.set_column_width(col, width.width)?;
        }
    }

    for merge in &spec.merges {
        worksheet.merge_range(
            merge.first_row,
            merge.first_col,
            merge.last_row,
            merge.last_col,
            &merge.text,
            &formats[&merge.style],
        )?;
    }

    for cell in &spec.cells {
        write_cell(worksheet, cell, cell.style.map(|key| &formats[&key]))?;
    }

    for cue in &spec.cues {
        write_cue(worksheet, cue)?;
    }

    for chart in &spec.charts {
        worksheet.insert_chart(chart.anchor_row, chart.anchor_col, &build_chart(chart))?;
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, cell: &CellSpec, format: Option<&Format>) -> Result<()> {
    let default_format = Format::new();
    let format = format.unwrap_or(&default_format);
    let (row, col) = (cell.row, cell.col);

    match &cell.value {
        CellValue::Text(text) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        CellValue::Number(number) => {
            worksheet.write_number_with_format(row, col, *number, format)?;
        }
        CellValue::Amount(amount) => {
            let amount = amount.to_f64().unwrap_or_default();
            worksheet.write_number_with_format(row, col, amount, format)?;
        }
        CellValue::Count(count) => {
            worksheet.write_number_with_format(row, col, *count as f64, format)?;
        }
        CellValue::Date(date) => match u16::try_from(date.year()) {
            Ok(year) => {
                let datetime =
                    ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)?;
                worksheet.write_datetime_with_format(row, col, &datetime, format)?;
            }
            Err(_) => {
                worksheet.write_string(row, col, date.to_string())?;
            }
        },
    }
    Ok(())
}

fn write_cue(worksheet: &mut Worksheet, cue: &CueSpec) -> Result<()> {
    match cue.kind {
        CueKind::ColorScale { low, mid, high } => {
            let scale = ConditionalFormat3ColorScale::new()
                .set_minimum_color(Color::RGB(low))
                .set_midpoint_color(Color::RGB(mid))
                .set_maximum_color(Color::RGB(high));
            worksheet.add_conditional_format(
                cue.first_row,
                cue.col,
                cue.last_row,
                cue.col,
                &scale,
            )?;
        }
        CueKind::DataBar { color, solid } => {
            let bar = ConditionalFormatDataBar::new()
                .set_fill_color(Color::RGB(color))
                .set_solid_fill(solid);
            worksheet.add_conditional_format(cue.first_row, cue.col, cue.last_row, cue.col, &bar)?;
        }
    }
    Ok(())
}

fn build_chart(spec: &ChartSpec) -> Chart {
    let chart_type = match spec.kind {
        ChartKind::Column => ChartType::Column,
        ChartKind::Pie => ChartType::Pie,
        ChartKind::Line => ChartType::Line,
    };
    let mut chart = Chart::new(chart_type);

    let categories = &spec.categories;
    let values = &spec.values;
    let series = chart
        .add_series()
        .set_name(spec.series_name.as_str())
        .set_categories((
            categories.sheet.as_str(),
            categories.first_row,
            categories.first_col,
            categories.last_row,
            categories.last_col,
        ))
        .set_values((
            values.sheet.as_str(),
            values.first_row,
            values.first_col,
            values.last_row,
            values.last_col,
        ));

    if let Some(color) = spec.color {
        match spec.kind {
            ChartKind::Line => {
                let line = ChartLine::new().set_color(Color::RGB(color)).clone();
                series.set_format(ChartFormat::new().set_line(&line));
            }
            ChartKind::Column | ChartKind::Pie => {
                let fill = ChartSolidFill::new().set_color(Color::RGB(color)).clone();
                series.set_format(ChartFormat::new().set_solid_fill(&fill));
            }
        }
    }

    chart.title().set_name(spec.title.as_str());
    if let Some(y_axis_title) = &spec.y_axis_title {
        chart.y_axis().set_name(y_axis_title.as_str());
    }
    chart
}
