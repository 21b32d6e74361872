/// Data layer: core types, loading, column classification and filtering.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordTable (deduplicated)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  spatial  │  optional GeoJSON mask → rows inside the polygon
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌───────────┐
///   │ liveness  │ ──▶ │ predicate  │  widget selections → FilterSets
///   └──────────┘      └───────────┘
///        │                  │
///        ▼                  ▼
///   ┌──────────┐
///   │  filter   │  inclusive / exclusive search → filtered RecordTable
///   └──────────┘
///        │
///        ▼
///   map · table · export · diagnostics
/// ```

pub mod columns;
pub mod diagnostics;
pub mod export;
pub mod filter;
pub mod liveness;
pub mod loader;
pub mod model;
pub mod predicate;
pub mod spatial;
