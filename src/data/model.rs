use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Field holding the latitude of every record.
pub const LAT: &str = "lat";
/// Field holding the longitude of every record.
pub const LON: &str = "lon";

// ---------------------------------------------------------------------------
// Value – a single cell of the registry table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used in `BTreeSet`s and for whole-row equality, so `Value` must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats get a total order --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            // `{:?}` keeps the fraction (`2.0`) so the text reads back as a float.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for range filtering and statistics.
    /// Text, bools and nulls have no numeric reading.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null) || matches!(self, Value::Float(v) if v.is_nan())
    }

    /// Render for tables and CSV: nulls become empty strings.
    pub fn to_cell(&self) -> String {
        if self.is_null() {
            String::new()
        } else {
            self.to_string()
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

// ---------------------------------------------------------------------------
// Schema – ordered field identifiers shared by every row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    positions: BTreeMap<String, usize>,
}

impl Schema {
    pub fn new(fields: Vec<String>) -> Self {
        let positions = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.clone(), i))
            .collect();
        Schema { fields, positions }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

static NULL: Value = Value::Null;

// ---------------------------------------------------------------------------
// Record – one row of the registry
// ---------------------------------------------------------------------------

/// One row: a value per schema field, in schema order.
/// Equality and hashing cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// RecordTable – an immutable view over shared rows
// ---------------------------------------------------------------------------

/// Min/max of a numeric column over its non-null values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// The registry table. Rows are reference-counted so every filtered view
/// shares them with the base table; deriving a view never touches the input.
#[derive(Debug, Clone)]
pub struct RecordTable {
    schema: Arc<Schema>,
    rows: Vec<Arc<Record>>,
}

impl PartialEq for RecordTable {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| a == b)
    }
}

impl RecordTable {
    /// Build a table from a schema and rows of schema-ordered values.
    /// Short rows are padded with nulls, long rows truncated.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        let width = schema.len();
        let rows = rows
            .into_iter()
            .map(|mut values| {
                values.resize(width, Value::Null);
                Arc::new(Record::new(values))
            })
            .collect();
        RecordTable {
            schema: Arc::new(schema),
            rows,
        }
    }

    /// Build a table from field→value maps. The schema is the union of all
    /// keys in first-seen order; absent keys become nulls.
    pub fn from_maps(maps: Vec<Vec<(String, Value)>>) -> Self {
        RecordTable::from_maps_with_fields(Vec::new(), maps)
    }

    /// Like [`RecordTable::from_maps`], but `fields` come first in the schema
    /// even when no row mentions them.
    pub fn from_maps_with_fields(fields: Vec<String>, maps: Vec<Vec<(String, Value)>>) -> Self {
        let mut seen: HashSet<String> = fields.iter().cloned().collect();
        let mut fields = fields;
        for map in &maps {
            for (key, _) in map {
                if seen.insert(key.clone()) {
                    fields.push(key.clone());
                }
            }
        }
        let schema = Schema::new(fields);
        let rows = maps
            .into_iter()
            .map(|map| {
                let mut values = vec![Value::Null; schema.len()];
                for (key, value) in map {
                    if let Some(i) = schema.index_of(&key) {
                        values[i] = value;
                    }
                }
                values
            })
            .collect();
        RecordTable::new(schema, rows)
    }

    /// A new table over the same schema holding the given rows.
    pub fn with_rows(&self, rows: Vec<Arc<Record>>) -> Self {
        RecordTable {
            schema: Arc::clone(&self.schema),
            rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> &[String] {
        self.schema.fields()
    }

    pub fn rows(&self) -> &[Arc<Record>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `field` in row `row`, `None` if the field is not in the schema.
    pub fn value(&self, row: usize, field: &str) -> Option<&Value> {
        let idx = self.schema.index_of(field)?;
        self.rows.get(row).map(|r| r.get(idx))
    }

    /// Iterate the values of one column.
    pub fn column(&self, field: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.schema.index_of(field)?;
        Some(self.rows.iter().map(move |r| r.get(idx)))
    }

    /// Sorted set of distinct values of a column.
    pub fn unique_values(&self, field: &str) -> Option<BTreeSet<Value>> {
        Some(self.column(field)?.cloned().collect())
    }

    /// Whether at least one row has a non-null value for `field`.
    pub fn has_non_null(&self, field: &str) -> bool {
        self.column(field)
            .map(|mut values| values.any(|v| !v.is_null()))
            .unwrap_or(false)
    }

    /// Min/max over the numeric values of a column, `None` if it has none.
    pub fn extent(&self, field: &str) -> Option<Extent> {
        self.column(field)?
            .filter_map(Value::as_f64)
            .fold(None, |acc: Option<Extent>, v| match acc {
                None => Some(Extent { min: v, max: v }),
                Some(e) => Some(Extent {
                    min: e.min.min(v),
                    max: e.max.max(v),
                }),
            })
    }

    /// Drop exact-duplicate rows, keeping the first occurrence.
    pub fn drop_duplicates(&self) -> Self {
        let mut seen: HashSet<&Record> = HashSet::with_capacity(self.rows.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if seen.insert(&**row) {
                rows.push(Arc::clone(row));
            }
        }
        self.with_rows(rows)
    }

    /// Promote integers to floats in every column that also holds floats,
    /// so `10` and `10.0` become one value.
    pub fn unify_numeric_columns(&self) -> Self {
        let mixed: Vec<usize> = (0..self.schema.len())
            .filter(|&i| {
                let (mut ints, mut floats) = (false, false);
                for row in &self.rows {
                    match row.get(i) {
                        Value::Integer(_) => ints = true,
                        Value::Float(_) => floats = true,
                        _ => {}
                    }
                }
                ints && floats
            })
            .collect();
        if mixed.is_empty() {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                if !mixed.iter().any(|&i| matches!(row.get(i), Value::Integer(_))) {
                    return Arc::clone(row);
                }
                let mut values = row.values().to_vec();
                for &i in &mixed {
                    if let Value::Integer(n) = values[i] {
                        values[i] = Value::Float(n as f64);
                    }
                }
                Arc::new(Record::new(values))
            })
            .collect();
        self.with_rows(rows)
    }

    /// Longitude/latitude of a row, when both are numeric.
    pub fn point(&self, row: usize) -> Option<[f64; 2]> {
        let lon = self.value(row, LON)?.as_f64()?;
        let lat = self.value(row, LAT)?.as_f64()?;
        Some([lon, lat])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table from `(field, value)` literals, one slice per row.
    pub(crate) fn table(rows: &[&[(&str, Value)]]) -> RecordTable {
        RecordTable::from_maps(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|(k, v)| (k.to_string(), v.clone()))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn from_maps_fills_missing_fields_with_null() {
        let t = table(&[
            &[("a", Value::from(1)), ("b", Value::from("x"))],
            &[("a", Value::from(2)), ("c", Value::from(3.5))],
        ]);
        assert_eq!(t.column_names(), ["a", "b", "c"]);
        assert_eq!(t.value(0, "c"), Some(&Value::Null));
        assert_eq!(t.value(1, "b"), Some(&Value::Null));
        assert_eq!(t.value(1, "missing"), None);
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence_order() {
        let t = table(&[
            &[("a", Value::from(1))],
            &[("a", Value::from(2))],
            &[("a", Value::from(1))],
            &[("a", Value::from(3))],
        ]);
        let d = t.drop_duplicates();
        let values: Vec<_> = d.column("a").unwrap().cloned().collect();
        assert_eq!(values, vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn extent_ignores_nulls_and_text() {
        let t = table(&[
            &[("v", Value::from(10))],
            &[("v", Value::Null)],
            &[("v", Value::from("n/a"))],
            &[("v", Value::from(2.5))],
        ]);
        assert_eq!(t.extent("v"), Some(Extent { min: 2.5, max: 10.0 }));
        let empty = table(&[&[("v", Value::Null)]]);
        assert_eq!(empty.extent("v"), None);
    }

    #[test]
    fn mixed_integer_and_float_columns_become_float() {
        let t = table(&[
            &[("municipio", Value::from(7)), ("volumen", Value::from(10)), ("n", Value::from(1))],
            &[("municipio", Value::from(7.0)), ("volumen", Value::from(10.0)), ("n", Value::from(1))],
            &[("municipio", Value::from("A")), ("volumen", Value::Null), ("n", Value::Null)],
        ]);
        let u = t.unify_numeric_columns();
        assert_eq!(u.value(0, "volumen"), Some(&Value::Float(10.0)));
        assert_eq!(u.value(0, "municipio"), Some(&Value::Float(7.0)));
        assert_eq!(u.value(2, "municipio"), Some(&Value::from("A")));
        assert_eq!(u.value(0, "n"), Some(&Value::Integer(1)));
        assert_eq!(u.drop_duplicates().len(), 2);
        assert_eq!(
            u.unique_values("municipio").expect("municipio").len(),
            2,
            "7 and 7.0 are one value"
        );
    }

    #[test]
    fn floats_keep_their_fraction_when_rendered() {
        assert_eq!(Value::Float(2.0).to_cell(), "2.0");
        assert_eq!(Value::Float(-99.25).to_cell(), "-99.25");
        assert_eq!(Value::Integer(2).to_cell(), "2");
    }

    #[test]
    fn nan_is_treated_as_null() {
        assert!(Value::Float(f64::NAN).is_null());
        assert_eq!(Value::Float(f64::NAN).as_f64(), None);
        assert_eq!(Value::Float(f64::NAN).to_cell(), "");
    }
}
