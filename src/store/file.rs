//! FileRecordStore - durable local store with a write-through snapshot file.
//!
//! Every successful write re-encodes the whole collection with bitcode and
//! replaces the snapshot atomically (temp file + rename). The in-memory rows
//! only change after the snapshot hit disk, so a failed write leaves both
//! sides untouched.
//!
//! Write cost grows linearly with the number of rows. That is fine for a
//! single till's ledger; a store that outgrows it needs an append log.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{error, info};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::{RawRecord, RecordStore, Selector, StoreError, StoredRecord};

const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Deserialize)]
struct SnapshotFile {
    format: u32,
    rows: Vec<StoredRecord>,
}

/// Encodes to the same bytes as `SnapshotFile`, over borrowed rows.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    format: u32,
    rows: Vec<&'a StoredRecord>,
}

/// File-backed record store. Clones share the same rows and file.
#[derive(Clone)]
pub struct FileRecordStore {
    path: PathBuf,
    storage: Arc<RwLock<Collection>>,
}

impl FileRecordStore {
    /// Opens the snapshot at `path`, or starts empty when it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!(
            "event=store_open module=store status=start path={}",
            path.display()
        );

        let collection = match fs::read(&path) {
            Ok(bytes) => decode_snapshot(&bytes).map_err(|err| {
                error!(
                    "event=store_open module=store status=error path={} error={}",
                    path.display(),
                    err
                );
                err
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collection::default(),
            Err(err) => {
                error!(
                    "event=store_open module=store status=error path={} error={}",
                    path.display(),
                    err
                );
                return Err(StoreError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        info!(
            "event=store_open module=store status=ok path={} rows={} duration_ms={}",
            path.display(),
            collection.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            path,
            storage: Arc::new(RwLock::new(collection)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, rows: Vec<&StoredRecord>) -> Result<(), StoreError> {
        let snapshot = SnapshotRef {
            format: SNAPSHOT_FORMAT,
            rows,
        };
        let bytes =
            bitcode::serialize(&snapshot).map_err(|e| StoreError::Serde(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StoreError::Storage(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    fn write_row(&self, row: StoredRecord, storage: &mut Collection) -> Result<(), StoreError> {
        if let Err(err) = self.persist(storage.rows_with(&row)) {
            error!(
                "event=store_persist module=store status=error path={} error={}",
                self.path.display(),
                err
            );
            return Err(err);
        }
        storage.commit(row);
        Ok(())
    }
}

fn decode_snapshot(bytes: &[u8]) -> Result<Collection, StoreError> {
    let snapshot: SnapshotFile =
        bitcode::deserialize(bytes).map_err(|e| StoreError::Serde(e.to_string()))?;
    if snapshot.format != SNAPSHOT_FORMAT {
        return Err(StoreError::Storage(format!(
            "unsupported snapshot format {} (expected {})",
            snapshot.format, SNAPSHOT_FORMAT
        )));
    }
    Ok(Collection::from_rows(snapshot.rows))
}

impl RecordStore for FileRecordStore {
    fn get_raw(&self, id: &str) -> Result<Option<StoredRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.get(id).cloned())
    }

    fn insert_raw(&self, record: RawRecord) -> Result<StoredRecord, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let row = storage.prepare_insert(record)?;
        self.write_row(row.clone(), &mut storage)?;
        Ok(row)
    }

    fn compare_and_swap_raw(
        &self,
        record: RawRecord,
        expected_version: u64,
    ) -> Result<StoredRecord, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let row = storage.prepare_swap(record, expected_version)?;
        self.write_row(row.clone(), &mut storage)?;
        Ok(row)
    }

    fn select_raw(&self, selector: &Selector) -> Result<Vec<StoredRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.select(selector))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.len())
    }
}
