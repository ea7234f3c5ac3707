use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use fa_core::{Error, NewsStore, Result};

pub mod backends;

pub use backends::*;

/// A persistence backend the CLI can open by name.
pub trait StorageBackend: NewsStore {
    fn get_error_message() -> &'static str
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    SQLite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::SQLite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::SQLite => f.write_str("sqlite"),
        }
    }
}

/// Opens the requested backend. `db_path` is only read by SQLite.
pub async fn create_storage(kind: StorageKind, db_path: Option<PathBuf>) -> Result<Arc<dyn NewsStore>> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageKind::SQLite => open_sqlite(db_path).await,
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(db_path: Option<PathBuf>) -> Result<Arc<dyn NewsStore>> {
    let storage = match db_path {
        Some(path) => SQLiteStorage::new_with_path(&path).await,
        None => SQLiteStorage::new().await,
    }
    .map_err(|e| Error::Storage(format!("{} ({})", e, SQLiteStorage::get_error_message())))?;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_db_path: Option<PathBuf>) -> Result<Arc<dyn NewsStore>> {
    Err(Error::Config(
        "SQLite storage requires building fa_storage with the `sqlite` feature".to_string(),
    ))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StorageKind};
}
