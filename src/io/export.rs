//! CSV export of a state matrix timeline.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::StateMatrix;
use crate::sim::clock::{self, MINUTES_PER_DAY};

/// Fixed leading columns; one column per appliance follows.
const HEADER: &[&str] = &["minute", "time", "total_w"];

/// Exports the day timeline of `matrix` to a CSV file at the given path.
///
/// Writes a header row followed by one row per minute of the day. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `matrix` - Projected day
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(matrix: &StateMatrix, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(matrix, buf)
}

/// Writes the day timeline as CSV to any writer.
///
/// Appliance columns are headed by the device name and hold the active mode id.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(matrix: &StateMatrix, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let devices = matrix.appliances().iter().map(|a| a.device.as_str());
    wtr.write_record(HEADER.iter().copied().chain(devices))?;

    for minute in 0..MINUTES_PER_DAY {
        let mut record = vec![
            minute.to_string(),
            clock::time_of_minute(minute).format("%H:%M").to_string(),
            format!("{:.1}", matrix.total_at(minute)),
        ];
        record.extend(matrix.row(minute).iter().map(ToString::to_string));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
