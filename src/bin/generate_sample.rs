use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::Value as JsonValue;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (estado, municipio, lat, lon, region hidrologica, cuenca, acuifero)
const SITES: [(&str, &str, f64, f64, &str, &str, &str); 5] = [
    ("CIUDAD DE MEXICO", "TLALPAN", 19.29, -99.17, "PANUCO", "RIO MOCTEZUMA", "ZONA METROPOLITANA DE LA CDMX"),
    ("JALISCO", "ZAPOPAN", 20.72, -103.39, "LERMA-SANTIAGO", "RIO SANTIAGO", "ATEMAJAC"),
    ("NUEVO LEON", "APODACA", 25.78, -100.19, "BRAVO-CONCHOS", "RIO SAN JUAN", "AREA METROPOLITANA DE MONTERREY"),
    ("SONORA", "HERMOSILLO", 29.07, -110.95, "SONORA SUR", "RIO SONORA", "COSTA DE HERMOSILLO"),
    ("YUCATAN", "MERIDA", 20.97, -89.62, "YUCATAN NORTE", "YUCATAN", "PENINSULA DE YUCATAN"),
];

const USOS: [&str; 5] = ["AGRICOLA", "PUBLICO URBANO", "INDUSTRIAL", "PECUARIO", "SERVICIOS"];
const ANEXOS: [&str; 3] = ["subterraneo", "superficial", "descarga"];
const TITULARES: [&str; 4] = [
    "COMISION ESTATAL DE AGUAS",
    "EJIDO SAN JOSE",
    "INDUSTRIAS DEL NORTE S.A. DE C.V.",
    "JUAN PEREZ LOPEZ",
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut records: Vec<JsonValue> = Vec::new();

    for i in 0..500 {
        let (estado, municipio, lat, lon, region, cuenca, acuifero) =
            SITES[(rng.next_u64() % SITES.len() as u64) as usize];
        let anexo = rng.pick(&ANEXOS);
        let volumen = rng.gauss(50_000.0, 20_000.0).abs().round();
        let (sub, sup, desc) = match anexo {
            "subterraneo" => (1, 0, 0),
            "superficial" => (0, 1, 0),
            _ => (0, 0, 1),
        };

        let opt = |present: bool, v: f64| {
            if present {
                JsonValue::from(v)
            } else {
                JsonValue::Null
            }
        };
        let anotacion = if i % 7 == 0 {
            JsonValue::from("PRORROGA")
        } else {
            JsonValue::Null
        };
        let fields: Vec<(&str, JsonValue)> = vec![
            ("titular", rng.pick(&TITULARES).into()),
            ("titulo", format!("{:02}ABC{:06}/12HMGE{:02}", i % 32, i, i % 20).into()),
            ("uso_amparado", rng.pick(&USOS).into()),
            ("anotaciones_marginales", anotacion),
            ("tipo_de_anexo", anexo.into()),
            ("estado", estado.into()),
            ("municipio", municipio.into()),
            ("region_hidrologica", region.into()),
            ("cuenca", cuenca.into()),
            ("acuifero", acuifero.into()),
            ("acuifero_homologado", acuifero.into()),
            ("volumen_total_de_aguas_nacionales", (volumen * 1.5).into()),
            ("volumen_total_de_aguas_superficiales", opt(sup == 1, volumen)),
            ("volumen_total_de_aguas_subterraneas", opt(sub == 1, volumen)),
            ("volumen_total_de_descargas", opt(desc == 1, volumen)),
            ("anexos_descargas", desc.into()),
            ("anexos_subterraneos", sub.into()),
            ("anexos_superficiales", sup.into()),
            ("anexos_zonas_federales", 0.into()),
            ("volumen", volumen.into()),
            ("superficie", JsonValue::Null),
            ("volumen_de_descarga_diario", opt(desc == 1, (volumen / 365.0).round())),
            ("volumen_de_descarga_anual", opt(desc == 1, volumen)),
            ("fecha_de_registro", format!("20{:02}-{:02}-15", 10 + i % 14, 1 + i % 12).into()),
            ("lat", (lat + rng.gauss(0.0, 0.25)).into()),
            ("lon", (lon + rng.gauss(0.0, 0.25)).into()),
        ];
        records.push(JsonValue::Object(
            fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        ));
    }

    // Write JSON (records-oriented, what the dashboard loads at startup)
    let json_path = "data.json";
    let text = serde_json::to_string_pretty(&records).context("serializing records")?;
    std::fs::write(json_path, text).with_context(|| format!("writing {json_path}"))?;

    // Write Parquet with a subset of columns
    let column_str = |key: &str| -> ArrayRef {
        Arc::new(StringArray::from(
            records
                .iter()
                .map(|r| r[key].as_str().map(str::to_string))
                .collect::<Vec<_>>(),
        ))
    };
    let column_f64 = |key: &str| -> ArrayRef {
        Arc::new(Float64Array::from(
            records.iter().map(|r| r[key].as_f64()).collect::<Vec<_>>(),
        ))
    };
    let column_i64 = |key: &str| -> ArrayRef {
        Arc::new(Int64Array::from(
            records.iter().map(|r| r[key].as_i64()).collect::<Vec<_>>(),
        ))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("titular", DataType::Utf8, true),
        Field::new("tipo_de_anexo", DataType::Utf8, true),
        Field::new("estado", DataType::Utf8, true),
        Field::new("municipio", DataType::Utf8, true),
        Field::new("volumen", DataType::Float64, true),
        Field::new("anexos_subterraneos", DataType::Int64, true),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column_str("titular"),
            column_str("tipo_de_anexo"),
            column_str("estado"),
            column_str("municipio"),
            column_f64("volumen"),
            column_i64("anexos_subterraneos"),
            column_f64("lat"),
            column_f64("lon"),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!(
        "Wrote {} records to {json_path} and {parquet_path}",
        records.len()
    );
    Ok(())
}
