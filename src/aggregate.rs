use std::fmt::Display;
use std::hash::Hash;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::models::{AggregateRow, MonthPeriod, RecordTable, SalesRecord, Summaries};

/// Region, product and monthly Net_Sales totals plus the table-wide totals.
///
/// Fails with [`ReportError::Overflow`] when a sum leaves the range of its type.
pub fn summarize(table: &RecordTable) -> Result<Summaries> {
    let records = &table.records;
    let summaries = Summaries {
        by_region: ranked_totals(records, "region", |record| record.region.clone())?,
        by_product: ranked_totals(records, "product", |record| record.product.clone())?,
        by_month: monthly_totals(records)?,
        net_sales_total: net_sales_total(records)?,
        units_sold_total: units_sold_total(records)?,
    };

    debug!(
        regions = summaries.by_region.len(),
        products = summaries.by_product.len(),
        months = summaries.by_month.len(),
        "summarized sales"
    );
    Ok(summaries)
}

fn group_totals<K, F>(
    records: &[SalesRecord],
    dimension: &str,
    key_of: F,
) -> Result<IndexMap<K, Decimal>>
where
    K: Hash + Eq + Display,
    F: Fn(&SalesRecord) -> K,
{
    let mut totals: IndexMap<K, Decimal> = IndexMap::new();
    for record in records {
        let key = key_of(record);
        let total = totals.get(&key).copied().unwrap_or(Decimal::ZERO);
        let total = total
            .checked_add(record.net_sales)
            .ok_or_else(|| ReportError::overflow(format!("{dimension} `{key}` Net_Sales")))?;
        totals.insert(key, total);
    }
    Ok(totals)
}

/// Totals sorted largest first. Equal totals keep first-seen order.
pub fn ranked_totals<K, F>(
    records: &[SalesRecord],
    dimension: &str,
    key_of: F,
) -> Result<Vec<AggregateRow<K>>>
where
    K: Hash + Eq + Display,
    F: Fn(&SalesRecord) -> K,
{
    let mut rows: Vec<AggregateRow<K>> = group_totals(records, dimension, key_of)?
        .into_iter()
        .map(|(key, total)| AggregateRow { key, total })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    Ok(rows)
}

pub fn monthly_totals(records: &[SalesRecord]) -> Result<Vec<AggregateRow<MonthPeriod>>> {
    let mut rows: Vec<AggregateRow<MonthPeriod>> =
        group_totals(records, "month", |record| MonthPeriod::of(record.date))?
            .into_iter()
            .map(|(key, total)| AggregateRow { key, total })
            .collect();
    rows.sort_by_key(|row| row.key);
    Ok(rows)
}

fn net_sales_total(records: &[SalesRecord]) -> Result<Decimal> {
    records.iter().try_fold(Decimal::ZERO, |total, record| {
        total
            .checked_add(record.net_sales)
            .ok_or_else(|| ReportError::overflow("Net_Sales"))
    })
}

fn units_sold_total(records: &[SalesRecord]) -> Result<i64> {
    records.iter().try_fold(0i64, |total, record| {
        total
            .checked_add(record.units_sold)
            .ok_or_else(|| ReportError::overflow("Units_Sold"))
    })
}

impl Summaries {
    pub fn top_region(&self) -> Result<&AggregateRow<String>> {
        self.by_region
            .first()
            .ok_or(ReportError::EmptyAggregate { summary: "region" })
    }

    pub fn top_product(&self) -> Result<&AggregateRow<String>> {
        self.by_product
            .first()
            .ok_or(ReportError::EmptyAggregate { summary: "product" })
    }
}
