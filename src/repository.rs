//! Record Repository
//!
//! Owns the in-memory collection. Every mutation builds the next collection,
//! persists it, and only then replaces the in-memory state, so a failed write
//! leaves both copies as they were.

use thiserror::Error;
use tracing::info;

use crate::{
    effects::{Clock, IdGenerator, SystemClock, UuidIdGenerator},
    merge::merge,
    records::{Record, RecordFields, RecordId, ValidationError},
    search::matches,
    store::{BlobSlot, Store, StoreError},
    transfer::{ExportError, ExportFormat, ImportError, ImportFormat, export, parse_import},
};

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Input failed validation; nothing changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Import file could not be read; nothing changed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Export could not be produced.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Persisting the collection failed; nothing changed.
    #[error("failed to save records")]
    Storage(#[from] StoreError),
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records added or replaced
    pub imported: usize,

    /// Rows that could not be turned into records
    pub rejected: usize,

    /// Collection size after the merge
    pub total: usize,
}

/// Client records with CRUD operations backed by a [`Store`].
#[derive(Debug)]
pub struct RecordRepository<S> {
    store: Store<S>,
    records: Vec<Record>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<S: BlobSlot> RecordRepository<S> {
    /// Load the collection from a slot, using the wall clock and UUID ids.
    pub fn open(slot: S) -> Self {
        Self::with_sources(slot, Box::new(SystemClock), Box::new(UuidIdGenerator))
    }

    /// Load the collection from a slot with explicit time and id sources.
    pub fn with_sources(slot: S, clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> Self {
        let store = Store::new(slot);
        let records = store.load();

        Self {
            store,
            records,
            clock,
            ids,
        }
    }

    /// All records, newest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Underlying store.
    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Find a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Records matching `query`, in collection order.
    pub fn list(&self, query: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| matches(record, query))
            .collect()
    }

    /// Validate and prepend a new record, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Validation`] for invalid fields and
    /// [`RepositoryError::Storage`] when the collection cannot be saved.
    pub fn add(&mut self, fields: &RecordFields) -> Result<Record, RepositoryError> {
        let valid = fields.validate()?;

        let record = Record {
            id: self.ids.generate(),
            created_at: self.clock.now(),
            name: valid.name,
            phone: valid.phone,
            price: valid.price,
            car: valid.car,
            reg: valid.reg,
            updated_at: None,
        };

        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend(self.records.iter().cloned());

        self.commit(next)?;

        Ok(record)
    }

    /// Replace the editable fields of an existing record.
    ///
    /// Unknown ids are a no-op returning `Ok(None)`. The id and creation time
    /// never change; `updated_at` is set to now.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Validation`] for invalid fields and
    /// [`RepositoryError::Storage`] when the collection cannot be saved.
    pub fn update(
        &mut self,
        id: &RecordId,
        fields: &RecordFields,
    ) -> Result<Option<&Record>, RepositoryError> {
        let valid = fields.validate()?;

        let Some(position) = self.records.iter().position(|record| &record.id == id) else {
            return Ok(None);
        };

        let mut next = self.records.clone();

        if let Some(record) = next.get_mut(position) {
            record.name = valid.name;
            record.phone = valid.phone;
            record.price = valid.price;
            record.car = valid.car;
            record.reg = valid.reg;
            record.updated_at = Some(self.clock.now());
        }

        self.commit(next)?;

        Ok(self.records.get(position))
    }

    /// Delete a record, returning it when it existed.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] when the collection cannot be saved.
    pub fn remove(&mut self, id: &RecordId) -> Result<Option<Record>, RepositoryError> {
        let Some(position) = self.records.iter().position(|record| &record.id == id) else {
            self.store.save(&self.records)?;
            return Ok(None);
        };

        let mut next = self.records.clone();
        let removed = next.remove(position);

        self.commit(next)?;

        Ok(Some(removed))
    }

    /// Parse an import file, merge it into the collection and persist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Import`] for unreadable input and
    /// [`RepositoryError::Storage`] when the merged collection cannot be
    /// saved. Either way the existing collection is untouched.
    pub fn import(
        &mut self,
        format: ImportFormat,
        text: &str,
    ) -> Result<ImportSummary, RepositoryError> {
        let parsed = parse_import(format, text, self.clock.as_ref(), self.ids.as_ref())?;
        let imported = parsed.records.len();

        let next = merge(self.records.clone(), parsed.records);

        self.commit(next)?;

        let summary = ImportSummary {
            imported,
            rejected: parsed.rejected,
            total: self.records.len(),
        };

        info!(
            imported = summary.imported,
            rejected = summary.rejected,
            total = summary.total,
            "imported records"
        );

        Ok(summary)
    }

    /// Render the whole collection in an export format.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Export`] when encoding fails.
    pub fn export(&self, format: ExportFormat) -> Result<String, RepositoryError> {
        Ok(export(&self.records, format)?)
    }

    fn commit(&mut self, next: Vec<Record>) -> Result<(), StoreError> {
        self.store.save(&next)?;
        self.records = next;

        Ok(())
    }
}
