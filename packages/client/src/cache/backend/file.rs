//! Directory-backed persistent backend
//!
//! Layout: `{root}/{namespace}/{sha256(request id)}.json`. Each document
//! carries the request identity, response parts, base64 body and the
//! insertion sequence. Writes go to a temporary file that is renamed into
//! place, so readers see either the old or the new document.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use super::super::{cache_entry::CacheEntry, cache_key::RequestId};
use super::StorageBackend;
use crate::error::{self, Result};

const ENTRY_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Backend that survives process restarts
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    sequence: AtomicU64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    request: RequestId,
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    sequence: u64,
    stored_at: DateTime<Utc>,
}

impl PersistedEntry {
    fn from_entry(id: &RequestId, entry: &CacheEntry) -> Self {
        let headers = entry
            .headers
            .iter()
            .filter_map(|(name, value)| match value.to_str() {
                Ok(value) => Some((name.as_str().to_string(), value.to_string())),
                Err(_) => {
                    tracing::debug!(
                        target: "cachegate::store",
                        header = %name,
                        "Skipping non-text header value"
                    );
                    None
                }
            })
            .collect();

        Self {
            request: id.clone(),
            status: entry.status.as_u16(),
            headers,
            body: STANDARD.encode(&entry.body),
            sequence: entry.sequence,
            stored_at: entry.stored_at,
        }
    }

    fn into_entry(self) -> Result<CacheEntry> {
        let status = StatusCode::from_u16(self.status).map_err(error::store)?;
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(error::store)?;
            let value = HeaderValue::from_str(&value).map_err(error::store)?;
            headers.append(name, value);
        }
        let body = STANDARD.decode(self.body.as_bytes()).map_err(error::store)?;

        Ok(CacheEntry {
            status,
            headers,
            body: Bytes::from(body),
            sequence: self.sequence,
            stored_at: self.stored_at,
        })
    }
}

impl FileBackend {
    /// Open (creating if needed) a backend rooted at `root`
    ///
    /// Existing entries are scanned once so new insertions always sort after
    /// everything already on disk.
    ///
    /// # Errors
    ///
    /// Returns `Kind::StoreUnavailable` if the root cannot be created or read.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(error::store)?;

        let backend = Self {
            root,
            sequence: AtomicU64::new(0),
        };

        let mut highest = 0;
        for namespace in backend.namespaces().await? {
            let dir = backend.namespace_dir(&namespace)?;
            for (sequence, _) in scan_namespace(&dir).await? {
                highest = highest.max(sequence);
            }
        }
        backend.sequence.store(highest, Ordering::Relaxed);

        tracing::debug!(
            target: "cachegate::store",
            root = %backend.root.display(),
            highest_sequence = highest,
            "File backend opened"
        );
        Ok(backend)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn namespace_dir(&self, namespace: &str) -> Result<PathBuf> {
        let valid = !namespace.is_empty()
            && !namespace.starts_with('.')
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(error::store(format!("invalid namespace name {namespace:?}")));
        }
        Ok(self.root.join(namespace))
    }

    fn entry_path(dir: &Path, id: &RequestId) -> PathBuf {
        dir.join(format!("{}.{ENTRY_EXTENSION}", id.digest_hex()))
    }
}

async fn read_entry(path: &Path) -> Result<Option<PersistedEntry>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(error::store),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(error::store(e)),
    }
}

/// Every readable entry in `dir` as (sequence, id), oldest first
async fn scan_namespace(dir: &Path) -> Result<Vec<(u64, RequestId)>> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(error::store(e)),
    };

    let mut found = Vec::new();
    while let Some(dirent) = read_dir.next_entry().await.map_err(error::store)? {
        let path = dirent.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }
        match read_entry(&path).await {
            Ok(Some(persisted)) => found.push((persisted.sequence, persisted.request)),
            // Deleted between listing and reading
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    target: "cachegate::store",
                    path = %path.display(),
                    error = %e,
                    "Skipping unreadable cache entry"
                );
            }
        }
    }

    found.sort_by_key(|(sequence, _)| *sequence);
    Ok(found)
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn lookup(&self, namespace: &str, id: &RequestId) -> Result<Option<CacheEntry>> {
        let dir = self.namespace_dir(namespace)?;
        match read_entry(&Self::entry_path(&dir, id)).await? {
            Some(persisted) if &persisted.request == id => persisted.into_entry().map(Some),
            _ => Ok(None),
        }
    }

    async fn insert(&self, namespace: &str, id: &RequestId, mut entry: CacheEntry) -> Result<u64> {
        let dir = self.namespace_dir(namespace)?;
        tokio::fs::create_dir_all(&dir).await.map_err(error::store)?;

        let sequence = self.next_sequence();
        entry.sequence = sequence;

        let document = serde_json::to_vec(&PersistedEntry::from_entry(id, &entry))
            .map_err(error::store)?;
        let path = Self::entry_path(&dir, id);
        let temp = path.with_extension(TEMP_EXTENSION);

        tokio::fs::write(&temp, &document).await.map_err(error::store)?;
        tokio::fs::rename(&temp, &path).await.map_err(error::store)?;

        Ok(sequence)
    }

    async fn remove(&self, namespace: &str, id: &RequestId) -> Result<bool> {
        let dir = self.namespace_dir(namespace)?;
        match tokio::fs::remove_file(Self::entry_path(&dir, id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(error::store(e)),
        }
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<RequestId>> {
        let dir = self.namespace_dir(namespace)?;
        Ok(scan_namespace(&dir)
            .await?
            .into_iter()
            .map(|(_, id)| id)
            .collect())
    }

    async fn namespaces(&self) -> Result<Vec<String>> {
        let mut read_dir = tokio::fs::read_dir(&self.root).await.map_err(error::store)?;
        let mut names = Vec::new();

        while let Some(dirent) = read_dir.next_entry().await.map_err(error::store)? {
            let is_dir = dirent.file_type().await.map_err(error::store)?.is_dir();
            if let (true, Some(name)) = (is_dir, dirent.file_name().to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn contains_namespace(&self, namespace: &str) -> Result<bool> {
        let dir = self.namespace_dir(namespace)?;
        tokio::fs::try_exists(&dir).await.map_err(error::store)
    }

    async fn drop_namespace(&self, namespace: &str) -> Result<bool> {
        let dir = self.namespace_dir(namespace)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(error::store(e)),
        }
    }
}
