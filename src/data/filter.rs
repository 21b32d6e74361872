use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::columns::Column;
use super::model::{Record, RecordTable, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid range: minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },
    #[error("invalid range: bound {0} is not a finite number")]
    NonFiniteBound(f64),
}

// ---------------------------------------------------------------------------
// Filter specifications
// ---------------------------------------------------------------------------

/// A predicate over a single cell value.
pub trait CellPredicate {
    /// Whether the predicate accepts every row regardless of value.
    fn is_pass_through(&self) -> bool {
        false
    }

    fn matches(&self, value: &Value) -> bool;
}

/// Allowed values for one categorical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoricalSpec {
    /// The "Todos" sentinel: the field is unconstrained.
    All,
    /// The cell must equal one of these values. `Null` may be listed to keep nulls.
    AnyOf(BTreeSet<Value>),
}

impl CategoricalSpec {
    pub fn any_of(values: impl IntoIterator<Item = Value>) -> Self {
        CategoricalSpec::AnyOf(values.into_iter().collect())
    }
}

impl CellPredicate for CategoricalSpec {
    fn is_pass_through(&self) -> bool {
        matches!(self, CategoricalSpec::All)
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            CategoricalSpec::All => true,
            CategoricalSpec::AnyOf(allowed) => allowed.contains(value),
        }
    }
}

/// Inclusive numeric bounds, `min <= max`, both finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    min: f64,
    max: f64,
}

impl RangeSpec {
    pub fn new(min: f64, max: f64) -> Result<Self, FilterError> {
        if !min.is_finite() {
            return Err(FilterError::NonFiniteBound(min));
        }
        if !max.is_finite() {
            return Err(FilterError::NonFiniteBound(max));
        }
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(RangeSpec { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl CellPredicate for RangeSpec {
    /// Nulls and non-numeric cells never fall inside a range.
    fn matches(&self, value: &Value) -> bool {
        value
            .as_f64()
            .is_some_and(|v| self.min <= v && v <= self.max)
    }
}

// ---------------------------------------------------------------------------
// Filter sets
// ---------------------------------------------------------------------------

/// How the specifications of one set combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombinationMode {
    /// Union: a row passes if any specification accepts it.
    Inclusive,
    /// Intersection: a row passes only if every specification accepts it.
    #[default]
    Exclusive,
}

impl fmt::Display for CombinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationMode::Inclusive => write!(f, "Inclusivo (O)"),
            CombinationMode::Exclusive => write!(f, "Exclusivo (Y)"),
        }
    }
}

/// Specifications keyed by distinct columns, plus the set-wide mode.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet<S> {
    mode: CombinationMode,
    specs: Vec<(Column, S)>,
}

pub type CategoricalFilterSet = FilterSet<CategoricalSpec>;
pub type NumericFilterSet = FilterSet<RangeSpec>;

impl<S> FilterSet<S> {
    pub fn new(mode: CombinationMode) -> Self {
        FilterSet {
            mode,
            specs: Vec::new(),
        }
    }

    /// Add a specification; an existing one for the same column is replaced.
    pub fn insert(&mut self, column: Column, spec: S) {
        match self.specs.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = spec,
            None => self.specs.push((column, spec)),
        }
    }

    pub fn with(mut self, column: Column, spec: S) -> Self {
        self.insert(column, spec);
        self
    }

    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    pub fn specs(&self) -> &[(Column, S)] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Keep rows matching at least one `(column, spec)` pair, then drop exact
/// duplicate rows. Empty `specs` returns the table unchanged.
pub fn inclusive_categorical_search(
    table: &RecordTable,
    specs: &[(Column, CategoricalSpec)],
) -> Result<RecordTable, FilterError> {
    inclusive_search(table, specs)
}

/// Keep rows matching every `(column, spec)` pair. The "Todos" sentinel
/// leaves its field unconstrained. Empty `specs` returns the table unchanged.
pub fn exclusive_categorical_search(
    table: &RecordTable,
    specs: &[(Column, CategoricalSpec)],
) -> Result<RecordTable, FilterError> {
    exclusive_search(table, specs)
}

/// Keep rows inside at least one range, then drop exact duplicates.
pub fn inclusive_numeric_search(
    table: &RecordTable,
    specs: &[(Column, RangeSpec)],
) -> Result<RecordTable, FilterError> {
    inclusive_search(table, specs)
}

/// Keep rows inside every range.
pub fn exclusive_numeric_search(
    table: &RecordTable,
    specs: &[(Column, RangeSpec)],
) -> Result<RecordTable, FilterError> {
    exclusive_search(table, specs)
}

/// Apply a filter set according to its combination mode.
pub fn apply<S: CellPredicate>(
    table: &RecordTable,
    set: &FilterSet<S>,
) -> Result<RecordTable, FilterError> {
    match set.mode {
        CombinationMode::Inclusive => inclusive_search(table, &set.specs),
        CombinationMode::Exclusive => exclusive_search(table, &set.specs),
    }
}

/// Map each column to its position in the table, failing on the first one
/// the table doesn't have.
fn bind<'a, S>(
    table: &RecordTable,
    specs: &'a [(Column, S)],
) -> Result<Vec<(usize, &'a S)>, FilterError> {
    specs
        .iter()
        .map(|(column, spec)| {
            table
                .schema()
                .index_of(column.field_id())
                .map(|idx| (idx, spec))
                .ok_or_else(|| FilterError::UnknownField(column.field_id().to_string()))
        })
        .collect()
}

fn inclusive_search<S: CellPredicate>(
    table: &RecordTable,
    specs: &[(Column, S)],
) -> Result<RecordTable, FilterError> {
    if specs.is_empty() {
        return Ok(table.clone());
    }
    let bound = bind(table, specs)?;

    let mut seen: HashSet<&Record> = HashSet::new();
    let mut rows: Vec<Arc<Record>> = Vec::new();
    for row in table.rows() {
        let keep = bound
            .iter()
            .any(|(idx, spec)| spec.is_pass_through() || spec.matches(row.get(*idx)));
        if keep && seen.insert(&**row) {
            rows.push(Arc::clone(row));
        }
    }
    log::debug!(
        "inclusive search over {} specs: {} -> {} rows",
        specs.len(),
        table.len(),
        rows.len()
    );
    Ok(table.with_rows(rows))
}

fn exclusive_search<S: CellPredicate>(
    table: &RecordTable,
    specs: &[(Column, S)],
) -> Result<RecordTable, FilterError> {
    let bound: Vec<_> = bind(table, specs)?
        .into_iter()
        .filter(|(_, spec)| !spec.is_pass_through())
        .collect();
    if bound.is_empty() {
        return Ok(table.clone());
    }

    let rows: Vec<Arc<Record>> = table
        .rows()
        .iter()
        .filter(|row| bound.iter().all(|(idx, spec)| spec.matches(row.get(*idx))))
        .cloned()
        .collect();
    log::debug!(
        "exclusive search over {} specs: {} -> {} rows",
        specs.len(),
        table.len(),
        rows.len()
    );
    Ok(table.with_rows(rows))
}
