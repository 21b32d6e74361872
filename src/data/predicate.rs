use std::collections::BTreeMap;
use std::fmt;

use super::columns::{Column, NumericField};
use super::filter::{
    CategoricalFilterSet, CategoricalSpec, CombinationMode, FilterError, NumericFilterSet,
    RangeSpec,
};
use super::model::{Extent, RecordTable, Value};

/// Label of the sentinel choice that disables a categorical filter.
pub const ALL_LABEL: &str = "Todos";

// ---------------------------------------------------------------------------
// Categorical choices
// ---------------------------------------------------------------------------

/// One entry of a categorical value selector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Choice {
    /// The leading "Todos" entry.
    All,
    Value(Value),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str(ALL_LABEL),
            Choice::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Choices offered for a column: the sentinel first, then the distinct
/// values of the column in sorted order.
pub fn value_domain(table: &RecordTable, column: &Column) -> Result<Vec<Choice>, FilterError> {
    let values = table
        .unique_values(column.field_id())
        .ok_or_else(|| FilterError::UnknownField(column.field_id().to_string()))?;
    Ok(std::iter::once(Choice::All)
        .chain(values.into_iter().map(Choice::Value))
        .collect())
}

/// Turn the chosen entries of a selector into a specification.
///
/// Nothing chosen means the field is not filtered at all (`None`). If the
/// sentinel is among the choices the field is unconstrained.
pub fn categorical_spec(choices: &[Choice]) -> Option<CategoricalSpec> {
    if choices.is_empty() {
        return None;
    }
    if choices.contains(&Choice::All) {
        return Some(CategoricalSpec::All);
    }
    Some(CategoricalSpec::any_of(choices.iter().filter_map(|c| match c {
        Choice::Value(v) => Some(v.clone()),
        Choice::All => None,
    })))
}

/// Build the categorical filter set from per-column selections.
pub fn build_categorical_set<'a>(
    mode: CombinationMode,
    selections: impl IntoIterator<Item = (&'a Column, &'a [Choice])>,
) -> CategoricalFilterSet {
    let mut set = CategoricalFilterSet::new(mode);
    for (column, choices) in selections {
        if let Some(spec) = categorical_spec(choices) {
            set.insert(column.clone(), spec);
        }
    }
    set
}

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// How the user bounds a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeMode {
    /// `[lower, column max]`
    GreaterThan,
    /// `[column min, upper]`
    LessThan,
    /// `[lower, upper]`
    #[default]
    Between,
}

impl RangeMode {
    pub const ALL: [RangeMode; 3] = [RangeMode::GreaterThan, RangeMode::LessThan, RangeMode::Between];

    pub fn label(self) -> &'static str {
        match self {
            RangeMode::GreaterThan => "Mayor que",
            RangeMode::LessThan => "Menor que",
            RangeMode::Between => "Entre",
        }
    }
}

/// Slider state for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSelection {
    pub mode: RangeMode,
    pub lower: f64,
    pub upper: f64,
}

impl RangeSelection {
    /// Sliders seeded at the column extrema.
    pub fn seeded(extent: Extent) -> Self {
        RangeSelection {
            mode: RangeMode::default(),
            lower: extent.min,
            upper: extent.max,
        }
    }
}

/// Resolve a selection against the column extent into explicit bounds.
/// Chosen values are clamped into the extent first.
pub fn range_spec(selection: RangeSelection, extent: Extent) -> Result<RangeSpec, FilterError> {
    let lower = extent.clamp(selection.lower);
    let upper = extent.clamp(selection.upper);
    match selection.mode {
        RangeMode::GreaterThan => RangeSpec::new(lower, extent.max),
        RangeMode::LessThan => RangeSpec::new(extent.min, upper),
        RangeMode::Between => RangeSpec::new(lower, upper),
    }
}

/// Build the numeric filter set. Columns without numeric values in `table`
/// fail with `UnknownField`, since no range can be resolved for them.
pub fn build_numeric_set(
    table: &RecordTable,
    mode: CombinationMode,
    selections: &BTreeMap<NumericField, RangeSelection>,
) -> Result<NumericFilterSet, FilterError> {
    let mut set = NumericFilterSet::new(mode);
    for (field, selection) in selections {
        let extent = table
            .extent(field.field_id())
            .ok_or_else(|| FilterError::UnknownField(field.field_id().to_string()))?;
        set.insert(Column::Numeric(*field), range_spec(*selection, extent)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::CategoricalField;
    use crate::data::model::tests::table;

    const EXTENT: Extent = Extent { min: 0.0, max: 100.0 };

    #[test]
    fn domain_starts_with_sentinel_then_sorted_values() {
        let t = table(&[
            &[("municipio", Value::from("B"))],
            &[("municipio", Value::from("A"))],
            &[("municipio", Value::from("B"))],
        ]);
        let domain = value_domain(&t, &Column::Categorical(CategoricalField::Municipio))
            .expect("domain");
        assert_eq!(
            domain,
            vec![
                Choice::All,
                Choice::Value(Value::from("A")),
                Choice::Value(Value::from("B"))
            ]
        );
        assert_eq!(domain[0].to_string(), "Todos");
        assert!(value_domain(&t, &Column::Other("x".into())).is_err());
    }

    #[test]
    fn sentinel_choice_disables_the_field() {
        let spec = categorical_spec(&[Choice::Value(Value::from("A")), Choice::All]);
        assert_eq!(spec, Some(CategoricalSpec::All));
        assert_eq!(categorical_spec(&[]), None);
        assert_eq!(
            categorical_spec(&[Choice::Value(Value::from("A"))]),
            Some(CategoricalSpec::any_of([Value::from("A")]))
        );
    }

    #[test]
    fn empty_selections_are_left_out_of_the_set() {
        let municipio = Column::Categorical(CategoricalField::Municipio);
        let estado = Column::Categorical(CategoricalField::Estado);
        let chosen = vec![Choice::All];
        let set = build_categorical_set(
            CombinationMode::Inclusive,
            [(&municipio, &[][..]), (&estado, chosen.as_slice())],
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.specs()[0], (estado, CategoricalSpec::All));
        assert_eq!(set.mode(), CombinationMode::Inclusive);
    }

    #[test]
    fn range_modes_fill_the_open_side_from_the_extent() {
        let sel = |mode| RangeSelection {
            mode,
            lower: 20.0,
            upper: 60.0,
        };
        let gt = range_spec(sel(RangeMode::GreaterThan), EXTENT).expect("gt");
        assert_eq!((gt.min(), gt.max()), (20.0, 100.0));
        let lt = range_spec(sel(RangeMode::LessThan), EXTENT).expect("lt");
        assert_eq!((lt.min(), lt.max()), (0.0, 60.0));
        let between = range_spec(sel(RangeMode::Between), EXTENT).expect("between");
        assert_eq!((between.min(), between.max()), (20.0, 60.0));
    }

    #[test]
    fn chosen_bounds_are_clamped_into_the_extent() {
        let spec = range_spec(
            RangeSelection {
                mode: RangeMode::Between,
                lower: -50.0,
                upper: 500.0,
            },
            EXTENT,
        )
        .expect("clamped");
        assert_eq!((spec.min(), spec.max()), (0.0, 100.0));
    }

    #[test]
    fn reversed_between_bounds_fail() {
        let err = range_spec(
            RangeSelection {
                mode: RangeMode::Between,
                lower: 80.0,
                upper: 10.0,
            },
            EXTENT,
        )
        .unwrap_err();
        assert_eq!(err, FilterError::InvertedRange { min: 80.0, max: 10.0 });
    }

    #[test]
    fn numeric_set_uses_table_extent() {
        let t = table(&[
            &[("volumen", Value::from(10))],
            &[("volumen", Value::from(40))],
        ]);
        let mut selections = BTreeMap::new();
        selections.insert(
            NumericField::Volumen,
            RangeSelection {
                mode: RangeMode::GreaterThan,
                lower: 25.0,
                upper: 0.0,
            },
        );
        let set = build_numeric_set(&t, CombinationMode::Exclusive, &selections).expect("set");
        let (column, spec) = &set.specs()[0];
        assert_eq!(column, &Column::Numeric(NumericField::Volumen));
        assert_eq!((spec.min(), spec.max()), (25.0, 40.0));

        selections.insert(NumericField::Superficie, RangeSelection::seeded(EXTENT));
        assert_eq!(
            build_numeric_set(&t, CombinationMode::Exclusive, &selections).unwrap_err(),
            FilterError::UnknownField("superficie".into())
        );
    }

    #[test]
    fn seeded_selection_covers_the_whole_column() {
        let sel = RangeSelection::seeded(EXTENT);
        let spec = range_spec(sel, EXTENT).expect("seeded");
        assert_eq!((spec.min(), spec.max()), (0.0, 100.0));
    }
}
