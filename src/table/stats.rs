//! Per-column statistics for the column summary popup

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

use crate::core::row::Row;
use crate::core::value::value_to_string;

/// Smallest or largest value of a column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (StatValue::Number(a), StatValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (a, b) => a.as_text().cmp(&b.as_text()),
        }
    }

    fn as_text(&self) -> String {
        match self {
            StatValue::Number(n) => crate::expr::ast::format_number(*n),
            StatValue::Text(s) => s.clone(),
        }
    }
}

/// Summary of one column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub total: usize,
    pub min: Option<StatValue>,
    pub max: Option<StatValue>,
    pub sum: f64,
    pub avg: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    /// `value → count`, most frequent first; ties keep first appearance
    pub value_counts: IndexMap<String, usize>,
}

impl ColumnStatistics {
    /// `(value, count, share of total)` in descending count order
    pub fn value_counts_sorted(&self) -> Vec<(&str, usize, f64)> {
        self.value_counts
            .iter()
            .map(|(value, count)| {
                let share = if self.total == 0 {
                    0.0
                } else {
                    *count as f64 / self.total as f64
                };
                (value.as_str(), *count, share)
            })
            .collect()
    }
}

fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let idx = (sorted.len() as f64 * fraction).floor() as usize;
    sorted.get(idx).copied().unwrap_or(0.0)
}

/// Statistics of every listed column over `rows`
///
/// Absent cells count as empty text. Sums and percentiles only consider
/// numeric cells; percentiles are left at zero unless the average is positive.
pub fn collect_column_statistics(rows: &[Row], columns: &[String]) -> IndexMap<String, ColumnStatistics> {
    let mut result = IndexMap::new();

    for column in columns {
        let mut stat = ColumnStatistics::default();
        let mut numbers: Vec<f64> = Vec::new();
        let mut counts: IndexMap<String, usize> = IndexMap::new();

        for row in rows {
            stat.total += 1;
            let cell = row.get(column);
            let value = match cell.and_then(|c| c.as_f64()) {
                Some(n) => {
                    numbers.push(n);
                    stat.sum += n;
                    StatValue::Number(n)
                }
                None => StatValue::Text(cell.map(value_to_string).unwrap_or_default()),
            };

            if stat.min.as_ref().map_or(true, |m| value.compare(m) == Ordering::Less) {
                stat.min = Some(value.clone());
            }
            if stat.max.as_ref().map_or(true, |m| value.compare(m) == Ordering::Greater) {
                stat.max = Some(value.clone());
            }
            *counts.entry(value.as_text()).or_insert(0) += 1;
        }

        if !rows.is_empty() {
            stat.avg = stat.sum / rows.len() as f64;
        }
        if stat.avg > 0.0 {
            numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            stat.p50 = percentile(&numbers, 0.5);
            stat.p90 = percentile(&numbers, 0.9);
            stat.p99 = percentile(&numbers, 0.99);
        }

        // stable: equal counts keep first appearance
        counts.sort_by(|_, a, _, b| b.cmp(a));
        stat.value_counts = counts;
        result.insert(column.clone(), stat);
    }

    result
}
