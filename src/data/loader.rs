use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RecordTable, Value, LAT, LON};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the registry from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "titular": "...", "lat": 19.4, "lon": -99.1, ... }, ...]`
/// * `.csv`     – header row, one record per line
/// * `.parquet` – flat scalar columns
///
/// Columns mixing integers and floats are read as floats. Exact duplicate
/// records are then dropped, and every record must carry numeric `lat` and
/// `lon`.
pub fn load_file(path: &Path) -> Result<RecordTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?
    .unify_numeric_columns();

    check_coordinates(&table)?;
    let deduped = table.drop_duplicates();
    if deduped.len() != table.len() {
        log::info!(
            "Dropped {} duplicate records from {}",
            table.len() - deduped.len(),
            path.display()
        );
    }
    Ok(deduped)
}

fn check_coordinates(table: &RecordTable) -> Result<()> {
    for field in [LAT, LON] {
        if !table.schema().contains(field) {
            bail!("Dataset missing '{field}' column");
        }
    }
    for row in 0..table.len() {
        if table.point(row).is_none() {
            bail!("Row {row}: '{LAT}' and '{LON}' must both be numbers");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "titular": "MUNICIPIO DE TLALNEPANTLA",
///     "tipo_de_anexo": "subterraneo",
///     "volumen": 125000.0,
///     "lat": 19.54,
///     "lon": -99.19
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RecordTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub(crate) fn parse_json(text: &str) -> Result<RecordTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        rows.push(
            obj.iter()
                .map(|(key, val)| (key.clone(), json_to_value(val)))
                .collect(),
        );
    }

    Ok(RecordTable::from_maps(rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with field identifiers, one record per line.
/// Cell types are guessed; empty cells are null.
fn load_csv(path: &Path) -> Result<RecordTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

pub(crate) fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RecordTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), guess_value_type(record.get(i).unwrap_or(""))))
                .collect(),
        );
    }

    Ok(RecordTable::from_maps_with_fields(headers, rows))
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one record per row.
///
/// Any flat column is read (strings, ints, floats, bools); nested columns are
/// rendered as their type name. Works with files written by **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RecordTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut fields: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        if fields.is_empty() {
            fields = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(schema.fields().len());
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_value(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{}'", field.name()))?;
                values.push((field.name().clone(), value));
            }
            rows.push(values);
        }
    }

    Ok(RecordTable::from_maps_with_fields(fields, rows))
}

// -- Parquet / Arrow helpers --

/// Downcast a column to a concrete array type.
fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type for {:?}", col.data_type()))
}

/// Extract a single value from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(i64::from(downcast::<Int32Array>(col)?.value(row))),
        DataType::Int64 => Value::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Value::Float(f64::from(downcast::<Float32Array>(col)?.value(row))),
        DataType::Float64 => Value::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => Value::Text(format!("{other:?}")),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(ext)
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn json_records_load_and_drop_duplicates() {
        let file = write_temp(
            ".json",
            r#"[
                {"titular": "A", "volumen": 10, "lat": 19.5, "lon": -99.1},
                {"titular": "A", "volumen": 10, "lat": 19.5, "lon": -99.1},
                {"titular": "B", "volumen": 2.5, "lat": 20, "lon": -98, "extra": null}
            ]"#,
        );
        let table = load_file(file.path()).expect("load");
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names(), ["titular", "volumen", "lat", "lon", "extra"]);
        assert_eq!(table.value(1, "volumen"), Some(&Value::Float(2.5)));
        assert_eq!(table.value(0, "extra"), Some(&Value::Null));
        assert_eq!(table.point(1), Some([-98.0, 20.0]));
    }

    #[test]
    fn integer_and_float_spellings_are_one_value() {
        let file = write_temp(
            ".json",
            r#"[
                {"municipio": "A", "volumen": 10, "lat": 19.5, "lon": -99.1},
                {"municipio": "A", "volumen": 10.0, "lat": 19.5, "lon": -99.1},
                {"municipio": 7, "volumen": 3, "lat": 19.5, "lon": -99.1},
                {"municipio": 7.0, "volumen": 3, "lat": 19.5, "lon": -99.1}
            ]"#,
        );
        let table = load_file(file.path()).expect("load");
        assert_eq!(table.len(), 3);
        assert_eq!(table.value(0, "volumen"), Some(&Value::Float(10.0)));

        let domain = crate::data::predicate::value_domain(
            &table,
            &crate::data::columns::Column::Categorical(
                crate::data::columns::CategoricalField::Municipio,
            ),
        )
        .expect("domain");
        let labels: Vec<String> = domain.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["Todos", "7.0", "A"]);
    }

    #[test]
    fn csv_guesses_types_and_nulls() {
        let file = write_temp(
            ".csv",
            "titular,volumen,activo,lat,lon\nA,10,true,19.5,-99.1\nB,,false,20,-98\n",
        );
        let table = load_file(file.path()).expect("load");
        assert_eq!(table.value(0, "volumen"), Some(&Value::Integer(10)));
        assert_eq!(table.value(1, "volumen"), Some(&Value::Null));
        assert_eq!(table.value(1, "activo"), Some(&Value::Bool(false)));
        assert_eq!(table.value(0, "titular"), Some(&Value::from("A")));
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        let file = write_temp(".json", r#"[{"titular": "A", "lat": 1.0}]"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("'lon'"), "{err:#}");

        let file = write_temp(".json", r#"[{"lat": 1.0, "lon": 2.0}, {"lat": "x", "lon": 2.0}]"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Row 1"), "{err:#}");
    }

    #[test]
    fn unsupported_extension_fails() {
        let file = write_temp(".xlsx", "");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn non_array_json_fails() {
        assert!(parse_json(r#"{"lat": 1}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }
}
