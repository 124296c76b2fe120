//! CSV snapshot output.

use std::fs::File;
use std::io;
use std::path::Path;

use rangesim_domain::{PositionSnapshot, SnapshotSink};

const HEADER: [&str; 11] = [
    "block",
    "tickLower",
    "tickUpper",
    "tick",
    "price",
    "liquidity",
    "amount0",
    "amount1",
    "inRange",
    "IL0",
    "IL1",
];

/// Writes one CSV row per snapshot, flushed through to disk so an
/// interrupted run keeps everything emitted so far.
#[derive(Debug)]
pub struct CsvSnapshotWriter {
    writer: csv::Writer<File>,
    file: File,
}

impl CsvSnapshotWriter {
    /// Creates (or truncates) the output file and writes the header row.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        let handle = file.try_clone()?;
        let mut writer = csv::Writer::from_writer(handle);
        writer.write_record(HEADER).map_err(io::Error::other)?;
        writer.flush()?;
        file.sync_data()?;
        Ok(Self { writer, file })
    }
}

impl SnapshotSink for CsvSnapshotWriter {
    fn record(&mut self, snapshot: &PositionSnapshot) -> io::Result<()> {
        self.writer
            .write_record(&[
                snapshot.block.to_string(),
                snapshot.tick_lower.to_string(),
                snapshot.tick_upper.to_string(),
                snapshot.tick.to_string(),
                snapshot.price.normalize().to_string(),
                snapshot.liquidity.normalize().to_string(),
                snapshot.amount0.normalize().to_string(),
                snapshot.amount1.normalize().to_string(),
                snapshot.in_range_pct.normalize().to_string(),
                snapshot.il0_pct.normalize().to_string(),
                snapshot.il1_pct.normalize().to_string(),
            ])
            .map_err(io::Error::other)?;
        self.writer.flush()?;
        self.file.sync_data()
    }
}
