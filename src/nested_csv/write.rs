use {
    crate::flatten_json_value::FlatRecord,
    itertools::Itertools,
    std::io::Write,
    tap::{Pipe, Tap},
    tracing::instrument,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not convert into inner error:\n{0}")]
    IntoInner(Box<str>),
    #[error("Could not write headers")]
    WritingHeaders(#[source] csv::Error),
    #[error("Writing record #{idx}")]
    WritingRecord {
        idx: usize,
        #[source]
        source: csv::Error,
    },
    #[error("Writing blank lines")]
    WritingBlankLines(#[source] std::io::Error),
    #[error("Written csv is not valid utf-8")]
    NotUtf8(#[source] std::string::FromUtf8Error),
}

type Result<T> = std::result::Result<T, self::Error>;

/// Every key of every record, in the order it is first seen.
pub fn column_header(records: &[FlatRecord]) -> Vec<&str> {
    records
        .iter()
        .flat_map(|record| record.keys())
        .map(String::as_str)
        .unique()
        .collect()
}

/// Builder for the writer used by [`write_flat_csv`]: `,` delimited, fields
/// quoted only when needed, lines ending in a single `\n`.
pub fn writer_builder() -> csv::WriterBuilder {
    csv::WriterBuilder::new().tap_mut(|builder| {
        builder
            .delimiter(b',')
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'));
    })
}

#[extension_traits::extension(pub trait CsvWriterFlatRecordsExt)]
impl<W: Write> csv::Writer<W> {
    /// Writes the header line followed by one row per record, an absent key
    /// becoming an empty cell. Records without any key still get a (blank)
    /// header line and one blank line each, no records writes nothing. Returns the number of rows written.
    fn write_flat_records(&mut self, records: &[FlatRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let header = column_header(records);
        if header.is_empty() {
            // csv quotes a record without bytes as `""`, blank lines go out raw
            return self
                .flush()
                .and_then(|()| self.get_mut().write_all(&b"\n".repeat(records.len() + 1)))
                .map_err(self::Error::WritingBlankLines)
                .map(|()| records.len());
        }
        self.write_record(&header)
            .map_err(self::Error::WritingHeaders)?;
        records
            .iter()
            .enumerate()
            .try_for_each(|(idx, record)| {
                header
                    .iter()
                    .map(|column| {
                        record
                            .get(*column)
                            .map(|leaf| leaf.to_field())
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>()
                    .pipe(|row| self.write_record(row.iter().map(|field| field.as_bytes())))
                    .map_err(|source| self::Error::WritingRecord { idx, source })
            })
            .map(|()| records.len())
    }
}

/// Encodes flattened records as CSV text. Only an empty slice gives an empty
/// string.
#[instrument(skip_all, fields(records = records.len()))]
pub fn write_flat_csv(records: &[FlatRecord]) -> Result<String> {
    writer_builder()
        .from_writer(Vec::new())
        .pipe(|mut writer| {
            writer
                .write_flat_records(records)
                .and_then(|rows| {
                    writer
                        .into_inner()
                        .map_err(|e| self::Error::IntoInner(e.error().to_string().pipe(Box::from)))
                        .map(|buffer| (rows, buffer))
                })
        })
        .and_then(|(rows, buffer)| {
            tracing::debug!(rows, bytes = buffer.len(), "wrote csv");
            String::from_utf8(buffer).map_err(self::Error::NotUtf8)
        })
}
