//! Batch registry service
//!
//! Holds batches in memory and guards every write with a per-batch revision
//! so two submissions made against the same observed state cannot both win.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use shared::{
    validate_inspection, Batch, BatchStatus, GradingResult, InspectionRecord, RawMaterial,
};

use crate::error::{AppError, AppResult};

/// A batch together with its write revision
#[derive(Debug, Clone, Serialize)]
pub struct StoredBatch {
    pub revision: u64,
    pub batch: Batch,
}

/// Batch service for managing batches and their lifecycle
#[derive(Clone, Default)]
pub struct BatchService {
    batches: Arc<RwLock<HashMap<String, StoredBatch>>>,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new batch in `raw`
    pub fn register(&self, batch_number: &str, raw_material: RawMaterial) -> AppResult<StoredBatch> {
        let batch = Batch::new(batch_number, raw_material)?;

        let mut batches = self.write()?;
        if batches.contains_key(batch_number) {
            return Err(AppError::DuplicateEntry("batch_number".to_string()));
        }

        let stored = StoredBatch { revision: 1, batch };
        batches.insert(batch_number.to_string(), stored.clone());

        tracing::info!(
            batch_number,
            mass_grams = %stored.batch.raw_material.total_mass_grams,
            "Registered batch"
        );
        Ok(stored)
    }

    /// Get a batch by number
    pub fn get(&self, batch_number: &str) -> AppResult<StoredBatch> {
        self.read()?
            .get(batch_number)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", batch_number)))
    }

    /// List batches, optionally filtered by status, ordered by batch number
    pub fn list(&self, status: Option<BatchStatus>) -> AppResult<Vec<StoredBatch>> {
        let mut batches: Vec<StoredBatch> = self
            .read()?
            .values()
            .filter(|s| status.map_or(true, |wanted| s.batch.status == wanted))
            .cloned()
            .collect();
        batches.sort_by(|a, b| a.batch.batch_number.cmp(&b.batch.batch_number));
        Ok(batches)
    }

    /// Attach an inspection record and move the batch to `inspecting`
    pub fn begin_inspection(
        &self,
        batch_number: &str,
        expected_revision: Option<u64>,
        record: InspectionRecord,
    ) -> AppResult<StoredBatch> {
        validate_inspection(&record)?;
        let (stored, ()) = self.update(batch_number, expected_revision, |batch| {
            batch.begin_inspection(record)
        })?;
        tracing::info!(batch_number, "Inspection started");
        Ok(stored)
    }

    /// Replace the measurements of an inspection in progress
    pub fn update_inspection(
        &self,
        batch_number: &str,
        expected_revision: Option<u64>,
        record: InspectionRecord,
    ) -> AppResult<StoredBatch> {
        validate_inspection(&record)?;
        let (stored, ()) = self.update(batch_number, expected_revision, |batch| {
            batch.update_inspection(record)
        })?;
        Ok(stored)
    }

    /// External approval of a segregated batch
    pub fn approve(&self, batch_number: &str, expected_revision: Option<u64>) -> AppResult<StoredBatch> {
        let (stored, ()) = self.update(batch_number, expected_revision, Batch::approve)?;
        tracing::info!(batch_number, "Batch approved");
        Ok(stored)
    }

    /// External rejection of a segregated batch
    pub fn reject(&self, batch_number: &str, expected_revision: Option<u64>) -> AppResult<StoredBatch> {
        let (stored, ()) = self.update(batch_number, expected_revision, Batch::reject)?;
        tracing::info!(batch_number, "Batch rejected");
        Ok(stored)
    }

    /// Apply `f` to the batch under the write lock.
    ///
    /// The batch is committed and its revision bumped only when `f` succeeds
    /// and actually modified it; on error the stored batch is untouched.
    pub(crate) fn update<T, F>(
        &self,
        batch_number: &str,
        expected_revision: Option<u64>,
        f: F,
    ) -> AppResult<(StoredBatch, T)>
    where
        F: FnOnce(&mut Batch) -> GradingResult<T>,
    {
        let mut batches = self.write()?;
        let stored = batches
            .get_mut(batch_number)
            .ok_or_else(|| AppError::NotFound(format!("Batch {}", batch_number)))?;

        if let Some(expected) = expected_revision {
            if expected != stored.revision {
                tracing::warn!(
                    batch_number,
                    expected,
                    actual = stored.revision,
                    "Stale batch revision"
                );
                return Err(AppError::Conflict {
                    resource: batch_number.to_string(),
                    message: format!(
                        "Batch {} changed (revision {} != {})",
                        batch_number, stored.revision, expected
                    ),
                });
            }
        }

        let mut working = stored.batch.clone();
        let value = f(&mut working)?;
        if working != stored.batch {
            stored.batch = working;
            stored.revision += 1;
        }
        Ok((stored.clone(), value))
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, HashMap<String, StoredBatch>>> {
        self.batches
            .read()
            .map_err(|_| AppError::Internal("batch registry lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, HashMap<String, StoredBatch>>> {
        self.batches
            .write()
            .map_err(|_| AppError::Internal("batch registry lock poisoned".to_string()))
    }
}
