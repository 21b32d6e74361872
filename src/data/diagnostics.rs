use std::fmt;

use super::model::{RecordTable, Value};

/// Rows shown at the head and tail of a summary.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Table summary (the "describe" panel)
// ---------------------------------------------------------------------------

/// What kind of values a column holds, ignoring nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Empty,
    Numeric,
    Text,
    Bool,
    Mixed,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Empty => "vacía",
            ColumnKind::Numeric => "numérica",
            ColumnKind::Text => "texto",
            ColumnKind::Bool => "booleana",
            ColumnKind::Mixed => "mixta",
        };
        f.write_str(s)
    }
}

/// `describe()`-style statistics of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `NaN` with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub stats: Option<NumericStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub head: RecordTable,
    pub tail: RecordTable,
}

impl TableSummary {
    pub fn describe(table: &RecordTable) -> Self {
        let columns = table
            .column_names()
            .iter()
            .map(|name| summarize_column(table, name))
            .collect();

        let n = table.len();
        let head = table.with_rows(table.rows()[..n.min(PREVIEW_ROWS)].to_vec());
        let tail = table.with_rows(table.rows()[n.saturating_sub(PREVIEW_ROWS)..].to_vec());

        TableSummary {
            rows: n,
            columns,
            head,
            tail,
        }
    }
}

fn summarize_column(table: &RecordTable, name: &str) -> ColumnSummary {
    let values: Vec<&Value> = table
        .column(name)
        .map(|c| c.filter(|v| !v.is_null()).collect())
        .unwrap_or_default();

    let kind = values.iter().fold(ColumnKind::Empty, |kind, v| {
        let this = match v {
            Value::Integer(_) | Value::Float(_) => ColumnKind::Numeric,
            Value::Text(_) => ColumnKind::Text,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Null => return kind,
        };
        match kind {
            ColumnKind::Empty => this,
            k if k == this => k,
            _ => ColumnKind::Mixed,
        }
    });

    let stats = match kind {
        ColumnKind::Numeric => {
            let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
            numeric_stats(nums)
        }
        _ => None,
    };

    ColumnSummary {
        name: name.to_string(),
        kind,
        non_null: values.len(),
        stats,
    }
}

fn numeric_stats(mut values: Vec<f64>) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    } else {
        f64::NAN
    };
    Some(NumericStats {
        count,
        mean,
        std,
        min: values[0],
        p25: percentile(&values, 0.25),
        p50: percentile(&values, 0.50),
        p75: percentile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolated percentile of sorted, non-empty `values`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    #[test]
    fn describe_numeric_column() {
        let t = table(&[
            &[("v", Value::from(1))],
            &[("v", Value::from(2))],
            &[("v", Value::from(3.0))],
            &[("v", Value::from(4))],
            &[("v", Value::Null)],
        ]);
        let summary = TableSummary::describe(&t);
        let col = &summary.columns[0];
        assert_eq!(col.kind, ColumnKind::Numeric);
        assert_eq!(col.non_null, 4);
        let stats = col.stats.as_ref().expect("stats");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.p50, 2.5);
        assert_eq!(stats.p75, 3.25);
        assert_eq!(stats.max, 4.0);
        assert!((stats.std - 1.290_994).abs() < 1e-6);
    }

    #[test]
    fn kinds_and_previews() {
        let rows: Vec<Vec<(&str, Value)>> = (0..8)
            .map(|i| {
                vec![
                    ("id", Value::from(i)),
                    ("nombre", Value::from("x")),
                    ("mixta", if i % 2 == 0 { Value::from(1) } else { Value::from("a") }),
                    ("vacia", Value::Null),
                ]
            })
            .collect();
        let slices: Vec<&[(&str, Value)]> = rows.iter().map(Vec::as_slice).collect();
        let summary = TableSummary::describe(&table(&slices));
        let kinds: Vec<_> = summary.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Numeric, ColumnKind::Text, ColumnKind::Mixed, ColumnKind::Empty]
        );
        assert_eq!(summary.rows, 8);
        assert_eq!(summary.head.len(), PREVIEW_ROWS);
        assert_eq!(summary.tail.value(0, "id"), Some(&Value::from(3)));
        assert!(summary.columns[1].stats.is_none());
    }

    #[test]
    fn single_value_has_no_std() {
        let t = table(&[&[("v", Value::from(7))]]);
        let stats = TableSummary::describe(&t).columns[0].stats.clone().expect("stats");
        assert!(stats.std.is_nan());
        assert_eq!(stats.p50, 7.0);
    }
}
