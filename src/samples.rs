use std::fs;
use std::path::Path;

use crate::calibrate::Sample;
use crate::error::{Error, Result};

/// Reads a historical duration sample from a one-column CSV of minutes.
/// No header row is expected; blank lines are skipped.
pub fn read_sample(path: &Path, label: &str) -> Result<Sample> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| {
            Error::SampleIo(format!(
                "failed to open sample '{}': {}",
                path.display(),
                err
            ))
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| {
            Error::SampleParse(format!(
                "failed to read sample '{}': {}",
                path.display(),
                err
            ))
        })?;
        let field = match record.get(0) {
            Some(field) => field.trim(),
            None => continue,
        };
        if field.is_empty() {
            continue;
        }
        let value: f64 = field.parse().map_err(|_| {
            let line = record.position().map_or(0, |position| position.line());
            Error::SampleParse(format!(
                "sample '{}' line {}: '{}' is not a duration",
                path.display(),
                line,
                field
            ))
        })?;
        values.push(value);
    }
    Sample::from_values(label, values)
}

/// Reads one call narrative per line. Blank interior lines are kept: they
/// reach the classifier and are counted as dropped calls.
pub fn read_call_texts(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::SampleIo(format!(
            "failed to read call texts '{}': {}",
            path.display(),
            err
        ))
    })?;
    Ok(contents.lines().map(|line| line.to_string()).collect())
}
