//! On-disk registry snapshot.
//!
//! Written with bincode on shutdown and read back at startup. Writes go to
//! a sibling temp file first and are renamed into place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use match_core::SessionSnapshot;

use crate::error::BotError;

pub type SnapshotEntries = Vec<(String, SessionSnapshot)>;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved sessions. A missing file is an empty registry.
    pub fn load(&self) -> Result<SnapshotEntries, BotError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let entries: SnapshotEntries = bincode::deserialize_from(BufReader::new(file))?;
        tracing::info!("Loaded {} sessions from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    pub fn save(&self, entries: &[(String, SessionSnapshot)]) -> Result<(), BotError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(&mut writer, entries)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::info!("Saved {} sessions to {}", entries.len(), self.path.display());
        Ok(())
    }
}
