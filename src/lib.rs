pub mod config;
pub mod flatten_json_value;
pub mod json_to_csv;
pub mod nested_csv;

pub use json_to_csv::{JsonInput, json_to_csv, json_to_csv_with, serialize_to_csv};
