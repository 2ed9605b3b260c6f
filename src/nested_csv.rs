//! CSV output for flattened records. The csv crate refuses nested values, so
//! records go through [`crate::flatten_json_value::flatten`] first.

pub mod write;
