/// Data layer: core types, loading, filtering, aggregation, and export.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate columns, coerce year, clamp inflation
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ WeoDataset  │  Vec<Observation>, widget option lists (immutable)
///   └────────────┘
///        │
///        ├──────────────► filter     AND of predicates → index view
///        ├──────────────► aggregate  per-group means for one year
///        └──────────────► export     filtered view → CSV text
/// ```
pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
