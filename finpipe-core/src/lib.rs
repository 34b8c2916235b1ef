//! finpipe-core: transaction record model, typed field reconstruction and
//! snapshot persistence for the financial extraction pipeline.

pub mod reconstruct;
pub mod record;
pub mod snapshot;
pub mod value;

pub use reconstruct::{reconstruct, reconstruct_joined};
pub use record::TransactionRecord;
pub use snapshot::{RawSnapshot, latest_simplified, read_simplified};
pub use value::FieldValue;
