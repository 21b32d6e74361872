use std::borrow::Cow;
use std::fmt;

use super::model::{LAT, LON};

// ---------------------------------------------------------------------------
// Registry of known REPDA columns
// ---------------------------------------------------------------------------

/// Categorical columns of the registry, offered for value filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalField {
    Titular,
    Titulo,
    UsoAmparado,
    AnotacionesMarginales,
    TipoDeAnexo,
    Estado,
    Municipio,
    RegionHidrologica,
    Cuenca,
    Acuifero,
    AcuiferoHomologado,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 11] = [
        CategoricalField::Titular,
        CategoricalField::Titulo,
        CategoricalField::UsoAmparado,
        CategoricalField::AnotacionesMarginales,
        CategoricalField::TipoDeAnexo,
        CategoricalField::Estado,
        CategoricalField::Municipio,
        CategoricalField::RegionHidrologica,
        CategoricalField::Cuenca,
        CategoricalField::Acuifero,
        CategoricalField::AcuiferoHomologado,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::Titular => "Titular",
            CategoricalField::Titulo => "Título",
            CategoricalField::UsoAmparado => "Uso amparado",
            CategoricalField::AnotacionesMarginales => "Anotaciones marginales",
            CategoricalField::TipoDeAnexo => "Tipo de anexo",
            CategoricalField::Estado => "Estado",
            CategoricalField::Municipio => "Municipio",
            CategoricalField::RegionHidrologica => "Región hidrológica",
            CategoricalField::Cuenca => "Cuenca",
            CategoricalField::Acuifero => "Acuífero",
            CategoricalField::AcuiferoHomologado => "Acuifero homologado",
        }
    }

    pub fn field_id(self) -> &'static str {
        match self {
            CategoricalField::Titular => "titular",
            CategoricalField::Titulo => "titulo",
            CategoricalField::UsoAmparado => "uso_amparado",
            CategoricalField::AnotacionesMarginales => "anotaciones_marginales",
            CategoricalField::TipoDeAnexo => "tipo_de_anexo",
            CategoricalField::Estado => "estado",
            CategoricalField::Municipio => "municipio",
            CategoricalField::RegionHidrologica => "region_hidrologica",
            CategoricalField::Cuenca => "cuenca",
            CategoricalField::Acuifero => "acuifero",
            CategoricalField::AcuiferoHomologado => "acuifero_homologado",
        }
    }
}

/// Numeric columns of the registry, offered for range filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericField {
    VolumenTotalAguasNacionales,
    VolumenTotalAguasSuperficiales,
    VolumenTotalAguasSubterraneas,
    VolumenTotalDescargas,
    AnexosDescargas,
    AnexosSubterraneos,
    AnexosSuperficiales,
    AnexosZonasFederales,
    Volumen,
    Superficie,
    VolumenDescargaDiario,
    VolumenDescargaAnual,
}

impl NumericField {
    pub const ALL: [NumericField; 12] = [
        NumericField::VolumenTotalAguasNacionales,
        NumericField::VolumenTotalAguasSuperficiales,
        NumericField::VolumenTotalAguasSubterraneas,
        NumericField::VolumenTotalDescargas,
        NumericField::AnexosDescargas,
        NumericField::AnexosSubterraneos,
        NumericField::AnexosSuperficiales,
        NumericField::AnexosZonasFederales,
        NumericField::Volumen,
        NumericField::Superficie,
        NumericField::VolumenDescargaDiario,
        NumericField::VolumenDescargaAnual,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericField::VolumenTotalAguasNacionales => "Volumen total de aguas nacionales",
            NumericField::VolumenTotalAguasSuperficiales => "Volumen total de aguas superficiales",
            NumericField::VolumenTotalAguasSubterraneas => "Volumen total de aguas subterráneas",
            NumericField::VolumenTotalDescargas => "Volumen total de descargas",
            NumericField::AnexosDescargas => "Número de descargas en el título",
            NumericField::AnexosSubterraneos => "Número de tomas subterráneas en el título",
            NumericField::AnexosSuperficiales => "Número de tomas superficiales en el título",
            NumericField::AnexosZonasFederales => {
                "Número de tomas en zonas federales en el título"
            }
            NumericField::Volumen => "Volumen individual",
            NumericField::Superficie => "Superficie",
            NumericField::VolumenDescargaDiario => "Volumen de descarga diario",
            NumericField::VolumenDescargaAnual => "Volumen de descarga anual",
        }
    }

    pub fn field_id(self) -> &'static str {
        match self {
            NumericField::VolumenTotalAguasNacionales => "volumen_total_de_aguas_nacionales",
            NumericField::VolumenTotalAguasSuperficiales => "volumen_total_de_aguas_superficiales",
            NumericField::VolumenTotalAguasSubterraneas => "volumen_total_de_aguas_subterraneas",
            NumericField::VolumenTotalDescargas => "volumen_total_de_descargas",
            NumericField::AnexosDescargas => "anexos_descargas",
            NumericField::AnexosSubterraneos => "anexos_subterraneos",
            NumericField::AnexosSuperficiales => "anexos_superficiales",
            NumericField::AnexosZonasFederales => "anexos_zonas_federales",
            NumericField::Volumen => "volumen",
            NumericField::Superficie => "superficie",
            NumericField::VolumenDescargaDiario => "volumen_de_descarga_diario",
            NumericField::VolumenDescargaAnual => "volumen_de_descarga_anual",
        }
    }
}

// ---------------------------------------------------------------------------
// Column – any filterable field of the table
// ---------------------------------------------------------------------------

/// A filterable column: a registry entry or an "other" column discovered in
/// the loaded table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Categorical(CategoricalField),
    Numeric(NumericField),
    Other(String),
}

impl Column {
    pub fn field_id(&self) -> &str {
        match self {
            Column::Categorical(f) => f.field_id(),
            Column::Numeric(f) => f.field_id(),
            Column::Other(id) => id,
        }
    }

    pub fn label(&self) -> Cow<'static, str> {
        match self {
            Column::Categorical(f) => Cow::Borrowed(f.label()),
            Column::Numeric(f) => Cow::Borrowed(f.label()),
            Column::Other(id) => Cow::Owned(humanize(id)),
        }
    }

    /// Look a field identifier up in the registries, falling back to `Other`
    /// for anything that isn't registered.
    pub fn from_field_id(id: &str) -> Column {
        if let Some(f) = CategoricalField::ALL.iter().find(|f| f.field_id() == id) {
            return Column::Categorical(*f);
        }
        if let Some(f) = NumericField::ALL.iter().find(|f| f.field_id() == id) {
            return Column::Numeric(*f);
        }
        Column::Other(id.to_string())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Resolve a display label to its registry column.
///
/// The categorical registry is searched first, then the numeric one. An
/// unknown label yields `None`; callers treat that as "no such filter".
pub fn resolve(label: &str) -> Option<Column> {
    CategoricalField::ALL
        .iter()
        .find(|f| f.label() == label)
        .map(|f| Column::Categorical(*f))
        .or_else(|| {
            NumericField::ALL
                .iter()
                .find(|f| f.label() == label)
                .map(|f| Column::Numeric(*f))
        })
}

/// Whether a field is one of the coordinate fields.
pub fn is_geographic(field_id: &str) -> bool {
    field_id == LAT || field_id == LON
}

/// Whether a field belongs to either registry.
pub fn is_registered(field_id: &str) -> bool {
    !matches!(Column::from_field_id(field_id), Column::Other(_))
}

/// Turn a field identifier into a display label: `fecha_de_registro` →
/// `Fecha de registro`.
pub fn humanize(field_id: &str) -> String {
    let mut out = String::with_capacity(field_id.len());
    for (i, c) in field_id.chars().enumerate() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
