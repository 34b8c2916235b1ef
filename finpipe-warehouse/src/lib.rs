//! finpipe-warehouse: destination schema discovery, row materialization and
//! parameterized bulk insertion.

pub mod load;
pub mod materialize;
pub mod schema;

pub use load::{load_rows, load_snapshot};
pub use materialize::{EXTRACTED_AT, materialize_row};
pub use schema::discover_columns;
