//! CSV export of the retained history, and reading it back for replay.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::MemfoError;
use crate::sample::Sample;
use crate::store::SampleStore;

const WALL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Write every stored sample, oldest first, as CSV rows of
/// `time_key,wall_time,synthetic,<fields...>`. Returns the number of rows.
pub fn dump_csv<W: Write>(store: &SampleStore, writer: W) -> Result<usize, MemfoError> {
    let mut names: Vec<&str> = Vec::new();
    for sample in store.iter().rev() {
        for name in sample.field_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["time_key", "wall_time", "synthetic"];
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;

    let mut rows = 0;
    for sample in store.iter().rev() {
        let mut record = Vec::with_capacity(names.len() + 3);
        record.push(sample.time_key.to_string());
        record.push(
            sample
                .wall_clock
                .map(|w| w.format(WALL_TIME_FORMAT).to_string())
                .unwrap_or_default(),
        );
        record.push(sample.synthetic.to_string());
        for name in &names {
            record.push(sample.get(name).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

/// [`dump_csv`] into a new file at `path`.
pub fn dump_csv_to_path(store: &SampleStore, path: &Path) -> Result<usize, MemfoError> {
    let file = File::create(path).map_err(|e| MemfoError::file("creating csv", path, e))?;
    dump_csv(store, file)
}

/// Read samples from CSV with a `time_key` column followed by counters.
///
/// Accepts the output of [`dump_csv`]: `wall_time` is ignored, `synthetic`
/// is kept, and empty cells are skipped.
pub fn read_samples_csv<R: Read>(reader: R) -> Result<Vec<Sample>, MemfoError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let time_col = headers
        .iter()
        .position(|h| h == "time_key")
        .ok_or_else(|| MemfoError::Parse("missing time_key column".into()))?;

    let mut samples = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let bad = |what: &str, text: &str| {
            MemfoError::Parse(format!("row {}: invalid {} '{}'", line + 1, what, text))
        };
        let text = record.get(time_col).unwrap_or_default();
        let time_key = text.trim().parse().map_err(|_| bad("time_key", text))?;
        let mut sample = Sample::new(time_key);
        for (i, (name, cell)) in headers.iter().zip(record.iter()).enumerate() {
            let cell = cell.trim();
            match name {
                _ if i == time_col || cell.is_empty() => {}
                "wall_time" => {}
                "synthetic" => sample.synthetic = cell == "true",
                _ => sample.set(name, cell.parse().map_err(|_| bad(name, cell))?),
            }
        }
        samples.push(sample);
    }
    Ok(samples)
}
