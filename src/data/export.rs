use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{RecordTable, Value};

/// Write `table` as CSV: a header row of field identifiers, then one line
/// per record with nulls as empty cells.
pub fn write_csv<W: Write>(table: &RecordTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for (i, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.values().iter().map(Value::to_cell))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Export `table` to a CSV file at `path`.
pub fn save_csv(table: &RecordTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, std::io::BufWriter::new(file))?;
    log::info!("Exported {} records to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    #[test]
    fn csv_has_header_and_empty_nulls() {
        let t = table(&[
            &[("titular", Value::from("A, S.A.")), ("volumen", Value::from(10))],
            &[("titular", Value::from("B")), ("volumen", Value::Null)],
        ]);
        let mut out = Vec::new();
        write_csv(&t, &mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "titular,volumen\n\"A, S.A.\",10\nB,\n");
    }

    #[test]
    fn saved_file_loads_back() {
        let t = table(&[
            &[("lat", Value::from(19.5)), ("lon", Value::from(-99.25)), ("titular", Value::from("A"))],
        ]);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        save_csv(&t, &path).expect("save");
        let loaded = crate::data::loader::load_file(&path).expect("load");
        assert_eq!(loaded, t);
    }

    #[test]
    fn whole_floats_stay_floats_across_a_round_trip() {
        let t = table(&[
            &[("volumen", Value::from(2.0)), ("lat", Value::from(19.0)), ("lon", Value::from(-99.0))],
        ]);
        let mut out = Vec::new();
        write_csv(&t, &mut out).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "volumen,lat,lon\n2.0,19.0,-99.0\n");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        save_csv(&t, &path).expect("save");
        let loaded = crate::data::loader::load_file(&path).expect("load");
        assert_eq!(loaded.value(0, "volumen"), Some(&Value::Float(2.0)));
        assert_eq!(loaded, t);
    }
}
