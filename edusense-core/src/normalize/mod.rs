//! Turning free-form model output into schema-conformant JSON.

pub mod extract;
pub mod schema;

pub use extract::{extract_json_block, Shape, MAX_SCAN_BYTES};
pub use schema::{FieldPolicy, FieldSpec, ResponseSchema};
