use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{MemoryStore, SheetRange, StoreError, TableStore};

/// A grid persisted as a JSON array of rows. Every mutation is written
/// back to disk before it returns.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    grid: MemoryStore,
}

impl JsonFileStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let rows: Vec<Vec<String>> = if path.exists() {
            let bytes = fs::read(&path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Vec::new()
        };
        debug!("opened {} with {} row(s)", path.display(), rows.len());
        Ok(Self {
            path,
            grid: MemoryStore::from_rows(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[Vec<String>] {
        self.grid.rows()
    }

    /// Applies `change` to a copy of the grid and keeps it only once the
    /// copy is on disk.
    fn commit(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut next = self.grid.clone();
        change(&mut next)?;
        self.save(next.rows())?;
        self.grid = next;
        Ok(())
    }

    fn save(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(rows).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl TableStore for JsonFileStore {
    fn read_all(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>, StoreError> {
        self.grid.read_all(range)
    }

    fn write_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        self.commit(|grid| grid.write_row(range, row))
    }

    fn append_row(&mut self, range: &SheetRange, row: &[String]) -> Result<(), StoreError> {
        self.commit(|grid| grid.append_row(range, row))
    }
}
