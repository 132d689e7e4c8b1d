use std::path::Path;

use crate::error::{AppError, Result};

/// One row of the currency list: `(code, name)`.
#[derive(Debug, Clone)]
pub struct SymbolRow {
    pub code: String,
    pub name: String,
}

/// Read the full currency list, header row included.
///
/// The first row is the CSV header; it stays at index 0 so that checkpoint
/// indices line up with the file, and the run loops skip it.
pub fn read_currency_list(path: impl AsRef<Path>) -> Result<Vec<SymbolRow>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|_| {
            AppError::message(format!(
                "Error while reading the currency list file {}",
                path.display()
            ))
        })?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|_| AppError::message("Error while processing the currency list file"))?;
        rows.push(SymbolRow {
            code: record.get(0).unwrap_or("").trim().to_string(),
            name: record.get(1).unwrap_or("").trim().to_string(),
        });
    }

    Ok(rows)
}
