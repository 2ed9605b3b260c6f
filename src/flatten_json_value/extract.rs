use {serde_json::Value, tap::Tap, tracing::instrument};

/// Key of the wrapper list most API responses put their records under.
pub const RESULTS_KEY: &str = "results";

/// Picks the list of records out of an arbitrary response:
/// 1. an object whose `results` entry is an array yields that array,
/// 2. an array is the list itself,
/// 3. anything else becomes a list of one.
///
/// Elements are passed through untouched, whatever their kind.
#[instrument(skip_all)]
pub fn extract_records(value: Value) -> Vec<Value> {
    (match value {
        Value::Object(map) if map.get(RESULTS_KEY).is_some_and(Value::is_array) => map
            .into_iter()
            .find_map(|(key, value)| match value {
                Value::Array(records) if key == RESULTS_KEY => Some(records),
                _ => None,
            })
            .unwrap_or_default(),
        Value::Array(records) => records,
        single => vec![single],
    })
    .tap(|records| tracing::debug!(records = records.len(), "extracted records"))
}
