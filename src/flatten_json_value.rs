use {
    indexmap::IndexMap,
    serde_json::Number,
    std::{borrow::Cow, fmt},
};

/// Default separator placed between nested key names.
pub const JOIN_TAG: &str = "_";

/// A single flattened value. Every nested structure has been resolved by the
/// time a value ends up here: objects become more keys, arrays become
/// [`Leaf::Sequence`] text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// An array rendered wholesale, see [`render::render_sequence`].
    Sequence(String),
}

impl Leaf {
    /// Text of the CSV cell for this value. `Null` is an empty cell.
    ///
    /// Spelling is JSON's on purpose (`true`/`false`, arrays as `["a", "b"]`),
    /// not `True`/`False` or single-quoted lists.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Leaf::Null => Cow::Borrowed(""),
            Leaf::Bool(true) => Cow::Borrowed("true"),
            Leaf::Bool(false) => Cow::Borrowed("false"),
            Leaf::Number(number) => number.to_string().into(),
            Leaf::String(text) | Leaf::Sequence(text) => Cow::Borrowed(text),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field())
    }
}

/// One record with every key being a synthetic path, in traversal order.
pub type FlatRecord = IndexMap<String, Leaf>;

/// Name of the JSON kind, used in error messages.
pub fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "Value::Null",
        Value::Bool(_) => "Value::Bool",
        Value::Number(_) => "Value::Number",
        Value::String(_) => "Value::String",
        Value::Array(_) => "Value::Array",
        Value::Object(_) => "Value::Object",
    }
}

pub(crate) fn boxed_iter<'a, T, I>(iter: I) -> Box<dyn Iterator<Item = T> + 'a>
where
    T: 'a,
    I: Iterator<Item = T> + 'a,
{
    Box::new(iter)
}

pub mod extract;
pub mod flatten;
pub mod render;
