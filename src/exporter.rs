use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct PriceEntry {
    #[serde(rename = "year.week")]
    pub year_week: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct SymbolExport {
    pub code: String,
    pub prices: Vec<PriceEntry>,
    pub category: String,
    pub mode: String,
}

/// `YYYY-MM-DD` -> `year.WW` with the ISO week number, e.g. `2023.15`.
fn timestamp_to_year_week(timestamp: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")?;
    Ok(format!("{}.{:02}", date.year(), date.iso_week().week()))
}

/// Dump every stored price as a JSON document grouped by symbol.
pub fn export_to_json(store: &Store, output_path: impl AsRef<Path>) -> Result<()> {
    let mut grouped: BTreeMap<String, SymbolExport> = BTreeMap::new();

    for row in store.all_prices()? {
        let entry = grouped
            .entry(row.symbol.clone())
            .or_insert_with(|| SymbolExport {
                code: row.symbol.clone(),
                prices: Vec::new(),
                category: "crypto".to_string(),
                mode: "year.week".to_string(),
            });
        entry.prices.push(PriceEntry {
            year_week: timestamp_to_year_week(&row.timestamp)?,
            value: row.value,
        });
    }

    let outputs: Vec<&SymbolExport> = grouped.values().collect();
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &outputs)?;
    // Flush explicitly; the error would vanish in BufWriter::drop.
    writer.flush()?;
    Ok(())
}
