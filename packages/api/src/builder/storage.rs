use std::path::PathBuf;

use cachegate_client::cache::{CacheStore, FileBackend};
use cachegate_client::Result;

use crate::builder::core::CacheGateBuilder;

/// Where cached responses live
#[derive(Debug, Clone, Default)]
pub enum StoreChoice {
    #[default]
    Memory,
    /// One subdirectory per namespace under this root
    Directory(PathBuf),
    /// A store shared with other gates
    Shared(CacheStore),
}

impl StoreChoice {
    pub(crate) async fn open(self) -> Result<CacheStore> {
        match self {
            Self::Memory => Ok(CacheStore::memory()),
            Self::Directory(root) => Ok(CacheStore::new(FileBackend::open(root).await?)),
            Self::Shared(store) => Ok(store),
        }
    }
}

impl CacheGateBuilder {
    /// Keep cached responses in memory (default)
    #[must_use]
    pub fn memory_store(mut self) -> Self {
        self.store = StoreChoice::Memory;
        self
    }

    /// Persist cached responses under `root`
    #[must_use]
    pub fn directory(mut self, root: impl Into<PathBuf>) -> Self {
        self.store = StoreChoice::Directory(root.into());
        self
    }

    #[must_use]
    pub fn store(mut self, store: CacheStore) -> Self {
        self.store = StoreChoice::Shared(store);
        self
    }
}
