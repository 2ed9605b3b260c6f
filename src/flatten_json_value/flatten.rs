use {
    super::{FlatRecord, JOIN_TAG, Leaf, boxed_iter, kind_of, render},
    indexmap::map::Entry,
    serde_json::{Map, Value},
    std::{borrow::Cow, iter::once},
    tap::{Pipe, Tap},
    tracing::instrument,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported record, expected a Map<String, Value>, found {found}")]
    UnsupportedRecord { found: &'static str },
    #[error("key '{key}' is produced by more than one path")]
    KeyCollision { key: String },
    #[error("Rendering sequence at '{key}'")]
    RenderingSequence {
        key: String,
        #[source]
        source: render::Error,
    },
}

type Result<T> = std::result::Result<T, self::Error>;

/// What happens when two paths join into the same key,
/// e.g. `{"a_b": 1, "a": {"b": 2}}` with the `_` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collision {
    /// The later path wins. The key keeps the position it was first seen at.
    #[default]
    Overwrite,
    /// Fail with [`Error::KeyCollision`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    separator: Cow<'static, str>,
    on_collision: Collision,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            separator: Cow::Borrowed(JOIN_TAG),
            on_collision: Collision::default(),
        }
    }
}

fn child_key(parent: &str, key: &str, separator: &str) -> String {
    match parent.is_empty() {
        true => key.to_owned(),
        false => format!("{parent}{separator}{key}"),
    }
}

fn flattened_iter<'a>(
    parent: String,
    map: Map<String, Value>,
    separator: &'a str,
) -> Box<dyn Iterator<Item = Result<(String, Leaf)>> + 'a> {
    map.into_iter()
        .flat_map(move |(key, value)| {
            let key = child_key(&parent, &key, separator);
            match value {
                Value::Object(nested) => flattened_iter(key, nested, separator),
                Value::Array(items) => render::render_sequence(&items)
                    .map(Leaf::Sequence)
                    .map_err(|source| self::Error::RenderingSequence {
                        key: key.clone(),
                        source,
                    })
                    .map(|leaf| (key, leaf))
                    .pipe(once)
                    .pipe(boxed_iter),
                Value::Null => once(Ok((key, Leaf::Null))).pipe(boxed_iter),
                Value::Bool(b) => once(Ok((key, Leaf::Bool(b)))).pipe(boxed_iter),
                Value::Number(n) => once(Ok((key, Leaf::Number(n)))).pipe(boxed_iter),
                Value::String(s) => once(Ok((key, Leaf::String(s)))).pipe(boxed_iter),
            }
        })
        .pipe(boxed_iter)
}

impl Flattener {
    pub fn with_separator(self, separator: impl Into<Cow<'static, str>>) -> Self {
        self.tap_mut(|f| f.separator = separator.into())
    }

    pub fn with_collision(self, on_collision: Collision) -> Self {
        self.tap_mut(|f| f.on_collision = on_collision)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Flattens one record. Nested objects become `parent_child` keys, arrays
    /// are rendered into a single [`Leaf::Sequence`], an empty nested object
    /// adds no key at all.
    #[instrument(skip_all)]
    pub fn flatten(&self, record: Value) -> Result<FlatRecord> {
        (match record {
            Value::Object(map) => Ok(map),
            other => Err(self::Error::UnsupportedRecord {
                found: kind_of(&other),
            }),
        })
        .and_then(|map| {
            flattened_iter(String::new(), map, &self.separator).try_fold(
                FlatRecord::default(),
                |mut record, next| {
                    let (key, leaf) = next?;
                    match record.entry(key) {
                        Entry::Vacant(vacant) => {
                            vacant.insert(leaf);
                        }
                        Entry::Occupied(mut occupied) => match self.on_collision {
                            Collision::Overwrite => {
                                tracing::debug!(key = %occupied.key(), "overwriting colliding key");
                                occupied.insert(leaf);
                            }
                            Collision::Reject => {
                                return Err(self::Error::KeyCollision {
                                    key: occupied.key().clone(),
                                });
                            }
                        },
                    }
                    Ok(record)
                },
            )
        })
    }
}

/// [`Flattener::flatten`] with the default separator and collision policy.
pub fn flattened(record: Value) -> Result<FlatRecord> {
    Flattener::default().flatten(record)
}
