//! CSV loaders for source URLs and keyword/target pairs.

use crate::error::{FinderError, Result};
use crate::filter::{KeywordTarget, standardize_source_url};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read source URLs from the `source_url` column of a CSV file.
///
/// Invalid URLs are logged and dropped; `www.` URLs get an `https://` scheme.
pub fn load_source_urls<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    read_source_urls(File::open(path)?)
}

/// Read keyword/target pairs from the `keyword` and `target_url` columns of a CSV file.
///
/// Rows where either value is empty are dropped.
pub fn load_keyword_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<KeywordTarget>> {
    read_keyword_pairs(File::open(path)?)
}

pub fn read_source_urls<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut rdr = csv_reader(reader);
    let column = column_index(&mut rdr, "source_url")?;

    let mut urls = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let Some(raw) = record.get(column).filter(|v| !v.is_empty()) else {
            continue;
        };
        match standardize_source_url(raw) {
            Ok(url) => urls.push(url),
            Err(e) => ::log::warn!("Dropping row {}: {}", position(&record), e),
        }
    }

    ::log::info!("Loaded {} source URLs", urls.len());
    Ok(urls)
}

pub fn read_keyword_pairs<R: Read>(reader: R) -> Result<Vec<KeywordTarget>> {
    let mut rdr = csv_reader(reader);
    let keyword_column = column_index(&mut rdr, "keyword")?;
    let target_column = column_index(&mut rdr, "target_url")?;

    let mut pairs = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let keyword = record.get(keyword_column).unwrap_or_default();
        let target = record.get(target_column).unwrap_or_default();
        match KeywordTarget::new(keyword, target) {
            Ok(pair) => pairs.push(pair),
            Err(e) => ::log::warn!("Dropping row {}: {}", position(&record), e),
        }
    }

    ::log::info!("Loaded {} keyword-target pairs", pairs.len());
    Ok(pairs)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Position of `name` in the header row, ignoring case and surrounding space
fn column_index<R: Read>(rdr: &mut csv::Reader<R>, name: &str) -> Result<usize> {
    rdr.headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| FinderError::MissingColumn(name.to_string()))
}

fn position(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}
