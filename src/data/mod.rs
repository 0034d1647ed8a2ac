/// Data layer: core table types and CSV loading.
///
/// Architecture:
/// ```text
///  uploaded .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Dataset, infer column types
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Column>, each Numeric(Vec<f64>) or
///   └──────────┘  Categorical(Vec<String>), row-aligned
/// ```
pub mod loader;
pub mod model;
