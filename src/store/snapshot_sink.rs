use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use tracing::info;

use crate::{error::ProcessorError, model::structures::snapshot::SnapshotExport};

/// Destination for finished rating snapshots.
pub trait SnapshotSink {
    fn write(&mut self, export: &SnapshotExport) -> Result<(), ProcessorError>;
}

/// Writes the export as pretty-printed JSON, replacing any existing file.
pub struct JsonFileSink {
    path: PathBuf
}

impl JsonFileSink {
    pub fn new(path: &Path) -> JsonFileSink {
        JsonFileSink {
            path: path.to_path_buf()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ProcessorError {
        ProcessorError::Io {
            path: self.path.clone(),
            source
        }
    }
}

impl SnapshotSink for JsonFileSink {
    fn write(&mut self, export: &SnapshotExport) -> Result<(), ProcessorError> {
        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, export)?;
        writer.flush().map_err(|e| self.io_error(e))?;

        info!(
            path = %self.path.display(),
            drivers = export.drivers.len(),
            lineages = export.lineages.len(),
            "Wrote rating snapshot"
        );

        Ok(())
    }
}

/// Keeps every export in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub exports: Vec<SnapshotExport>
}

impl MemorySink {
    pub fn last(&self) -> Option<&SnapshotExport> {
        self.exports.last()
    }
}

impl SnapshotSink for MemorySink {
    fn write(&mut self, export: &SnapshotExport) -> Result<(), ProcessorError> {
        self.exports.push(export.clone());
        Ok(())
    }
}
