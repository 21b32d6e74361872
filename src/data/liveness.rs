use super::columns::{is_geographic, is_registered, CategoricalField, Column, NumericField};
use super::model::RecordTable;

// ---------------------------------------------------------------------------
// Live columns: which filters are worth offering for a given table
// ---------------------------------------------------------------------------

/// Columns offered as filter controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveColumns {
    /// Registry categorical columns present in the table, in registry order.
    pub categorical: Vec<CategoricalField>,
    /// Unregistered, non-geographic columns with at least one value, sorted by label.
    pub other: Vec<Column>,
    /// Numeric columns with at least one value and a non-degenerate range,
    /// in registry order.
    pub numeric: Vec<NumericField>,
}

impl LiveColumns {
    /// Classify the columns of `table`.
    ///
    /// * Registry categorical columns are offered whenever the table has them;
    ///   no value check is applied.
    /// * An "other" column is live when some row has a non-null value.
    /// * A numeric column is live when some row has a numeric value and the
    ///   column min differs from its max.
    pub fn classify(table: &RecordTable) -> Self {
        let categorical = CategoricalField::ALL
            .into_iter()
            .filter(|f| table.schema().contains(f.field_id()))
            .collect();

        let mut other: Vec<Column> = table
            .column_names()
            .iter()
            .filter(|id| !is_registered(id) && !is_geographic(id))
            .filter(|id| table.has_non_null(id))
            .map(|id| Column::Other(id.clone()))
            .collect();
        other.sort_by(|a, b| a.label().cmp(&b.label()));

        let numeric = NumericField::ALL
            .into_iter()
            .filter(|f| {
                table
                    .extent(f.field_id())
                    .is_some_and(|extent| !extent.is_degenerate())
            })
            .collect();

        let live = LiveColumns {
            categorical,
            other,
            numeric,
        };
        log::debug!(
            "live columns: {} categorical, {} other, {} numeric",
            live.categorical.len(),
            live.other.len(),
            live.numeric.len()
        );
        live
    }

    pub fn is_live(&self, column: &Column) -> bool {
        match column {
            Column::Categorical(f) => self.categorical.contains(f),
            Column::Numeric(f) => self.numeric.contains(f),
            Column::Other(_) => self.other.contains(column),
        }
    }
}
