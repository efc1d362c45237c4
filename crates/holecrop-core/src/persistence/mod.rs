//! Saving and restoring the edit transform.
//!
//! Transforms are stored as six-scalar [`TransformRecord`]s under a
//! [`SessionKey`]. Loading applies a [`PartialRecordPolicy`] to records that
//! lack some fields and discards records that do not describe an
//! invertible matrix.

mod record;
mod store;

pub use record::{PartialRecordPolicy, TransformRecord, RECORD_FIELDS};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

use std::fmt;

use thiserror::Error;

use crate::transform::AffineTransform;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored transform is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other backend failure, such as a browser storage exception.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Identifies which session's transform a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub const DEFAULT: &'static str = "transform";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// A key scoped to one image, e.g. `transform.avatar-42`.
    pub fn for_image(image_id: &str) -> Self {
        Self(format!("{}.{}", Self::DEFAULT, image_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads and writes transforms through a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct TransformPersistence<S> {
    store: S,
    policy: PartialRecordPolicy,
}

impl<S: KeyValueStore> TransformPersistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, PartialRecordPolicy::default())
    }

    pub fn with_policy(store: S, policy: PartialRecordPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> PartialRecordPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PartialRecordPolicy) {
        self.policy = policy;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Store `transform` under `key`, returning the record written.
    pub fn save(
        &mut self,
        key: &SessionKey,
        transform: &AffineTransform,
    ) -> Result<TransformRecord, PersistenceError> {
        let record = TransformRecord::from_transform(transform);
        self.store.set(key.as_str(), &record)?;
        Ok(record)
    }

    /// The transform stored under `key`, resolved with the current policy.
    pub fn load(&self, key: &SessionKey) -> Result<Option<AffineTransform>, PersistenceError> {
        Ok(self
            .store
            .get(key.as_str())?
            .and_then(|record| record.resolve(self.policy)))
    }

    pub fn clear(&mut self, key: &SessionKey) -> Result<(), PersistenceError> {
        self.store.remove(key.as_str())
    }
}
