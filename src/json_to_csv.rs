use {
    crate::{
        flatten_json_value::{
            FlatRecord,
            extract::extract_records,
            flatten::{self, Flattener},
        },
        nested_csv::write::{self, write_flat_csv},
    },
    serde::Serialize,
    serde_json::Value,
    std::borrow::Cow,
    tracing::instrument,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Parsing json input: {text}")]
    ParsingJson {
        #[source]
        source: serde_json::Error,
        text: Box<str>,
    },
    #[error("Could not serialize the value to json")]
    SerializingToValue(#[source] serde_json::Error),
    #[error("Flattening record #{idx}")]
    Flattening {
        idx: usize,
        #[source]
        source: flatten::Error,
    },
    #[error("Writing csv")]
    Writing(#[from] write::Error),
}

type Result<T> = std::result::Result<T, self::Error>;

/// Either raw json text or an already parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonInput<'a> {
    Text(Cow<'a, str>),
    Value(Value),
}

impl<'a> From<&'a str> for JsonInput<'a> {
    fn from(text: &'a str) -> Self {
        JsonInput::Text(Cow::Borrowed(text))
    }
}

impl From<String> for JsonInput<'_> {
    fn from(text: String) -> Self {
        JsonInput::Text(Cow::Owned(text))
    }
}

impl From<Value> for JsonInput<'_> {
    fn from(value: Value) -> Self {
        JsonInput::Value(value)
    }
}

impl JsonInput<'_> {
    pub fn into_value(self) -> Result<Value> {
        match self {
            JsonInput::Text(text) => {
                serde_json::from_str(&text).map_err(|source| self::Error::ParsingJson {
                    source,
                    text: text.as_ref().into(),
                })
            }
            JsonInput::Value(value) => Ok(value),
        }
    }
}

/// Flattens every extracted record with `flattener`, in order.
pub fn flatten_records(flattener: &Flattener, value: Value) -> Result<Vec<FlatRecord>> {
    extract_records(value)
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            flattener
                .flatten(record)
                .map_err(|source| self::Error::Flattening { idx, source })
        })
        .collect()
}

/// [`json_to_csv`] with a custom [`Flattener`].
#[instrument(skip_all)]
pub fn json_to_csv_with<'a>(flattener: &Flattener, input: impl Into<JsonInput<'a>>) -> Result<String> {
    input
        .into()
        .into_value()
        .and_then(|value| flatten_records(flattener, value))
        .and_then(|records| write_flat_csv(&records).map_err(self::Error::from))
}

/// Converts a json response into CSV text: the records are picked with
/// [`extract_records`], flattened with `_` between nested keys and written
/// with a header of every key in first-seen order.
///
/// ```
/// let csv = json_flatten_csv::json_to_csv(r#"{"results": [{"a": 1, "b": {"c": 2}}]}"#).unwrap();
/// assert_eq!(csv, "a,b_c\n1,2\n");
/// ```
pub fn json_to_csv<'a>(input: impl Into<JsonInput<'a>>) -> Result<String> {
    json_to_csv_with(&Flattener::default(), input)
}

/// [`json_to_csv`] for any serializable value.
pub fn serialize_to_csv<T: Serialize + ?Sized>(item: &T) -> Result<String> {
    serde_json::to_value(item)
        .map_err(self::Error::SerializingToValue)
        .and_then(|value| json_to_csv(value))
}
