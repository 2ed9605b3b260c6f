use {
    serde::Serialize,
    serde_json::{Value, ser::Formatter},
    std::io,
    tap::Pipe,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serializing a sequence")]
    Serializing(#[source] serde_json::Error),
    #[error("Rendered sequence is not valid utf-8")]
    NotUtf8(#[source] std::string::FromUtf8Error),
}

type Result<T> = std::result::Result<T, self::Error>;

/// Compact JSON with a space after every `,` and `:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadableFormatter;

impl Formatter for ReadableFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match first {
            true => Ok(()),
            false => writer.write_all(b", "),
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match first {
            true => Ok(()),
            false => writer.write_all(b", "),
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Renders an array as a single line of text, e.g. `[1, 2, 3]` or
/// `[{"name": "tag1"}, {"name": "tag2"}]`.
pub fn render_sequence(items: &[Value]) -> Result<String> {
    let mut buffer = Vec::new();
    serde_json::Serializer::with_formatter(&mut buffer, ReadableFormatter)
        .pipe(|mut serializer| items.serialize(&mut serializer))
        .map_err(self::Error::Serializing)?;
    String::from_utf8(buffer).map_err(self::Error::NotUtf8)
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn render(value: Value) -> String {
        match value {
            Value::Array(items) => render_sequence(&items).expect("rendering"),
            other => panic!("not an array: {other}"),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render(json!([1, 2, 3])), "[1, 2, 3]");
        assert_eq!(render(json!(["alice", "bob"])), r#"["alice", "bob"]"#);
        assert_eq!(render(json!([null, true, 1.5])), "[null, true, 1.5]");
        assert_eq!(render(json!([])), "[]");
    }

    #[test]
    fn test_nested_structures_stay_inline() {
        assert_eq!(
            render(json!([{"name": "tag1", "id": 1}, {"name": "tag2"}])),
            r#"[{"name": "tag1", "id": 1}, {"name": "tag2"}]"#
        );
        assert_eq!(render(json!([[1, 2], []])), "[[1, 2], []]");
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(render(json!(["a\"b", "c,d"])), r#"["a\"b", "c,d"]"#);
    }
}
