use std::io::Read;

use log::warn;
use serde::de::DeserializeOwned;

use crate::Error;

/// Reads every row of a headed CSV table.
///
/// Lines starting with `#` are comments. Rows that do not match the record
/// type are logged and skipped; I/O and encoding failures abort the read.
///
/// # Errors
///
/// Returns [`Error::CsvError`] if the underlying reader fails.
pub fn read_records<T, R>(reader: R, table: &str) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.deserialize() {
        match result {
            Ok(record) => records.push(record),
            Err(err) if is_row_error(&err) => {
                let line = err.position().map_or(0, csv::Position::line);
                warn!("Skipping malformed row in {table} (line {line}): {err}");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if skipped > 0 {
        warn!("{skipped} rows of {table} were skipped");
    }
    Ok(records)
}

fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Deserialize { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}
