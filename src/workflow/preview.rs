//! Preview handles.
//!
//! A preview is a URL that renders some bytes: the original right after
//! selection, the WebP once processing completes. Each one is acquired from
//! a [`PreviewStore`] and must be handed back exactly once. Handles are not
//! `Clone`, so a handle that has been released cannot be used again.

use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreviewError {
    #[error("preview {0} was already released")]
    AlreadyReleased(u64),
    #[error("preview {0} does not belong to this store")]
    Unknown(u64),
}

/// Ownership of one live preview.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    url: String,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub trait PreviewStore: Send {
    /// Make `bytes` viewable and return the handle that owns the preview.
    fn create(&mut self, mime: &str, bytes: Bytes) -> PreviewHandle;

    /// Revoke a preview.
    fn release(&mut self, handle: PreviewHandle) -> Result<(), PreviewError>;
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    live: HashMap<u64, (String, Bytes)>,
    released: HashSet<u64>,
    created: usize,
}

/// In-memory previews addressed as `preview://<id>`.
///
/// Clones share one ledger, so a caller can keep a clone to inspect the
/// counts after handing the store to a processor.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreviews {
    ledger: Arc<Mutex<Ledger>>,
}

impl MemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        // A poisoned ledger is still consistent: every mutation is a single
        // insert or remove.
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Previews created so far.
    pub fn created(&self) -> usize {
        self.ledger().created
    }

    /// Previews released so far.
    pub fn released(&self) -> usize {
        self.ledger().released.len()
    }

    /// Previews created and not yet released.
    pub fn live(&self) -> usize {
        self.ledger().live.len()
    }

    /// MIME type and bytes behind a live preview URL.
    pub fn get(&self, url: &str) -> Option<(String, Bytes)> {
        let id = url.strip_prefix("preview://")?.parse::<u64>().ok()?;
        self.ledger().live.get(&id).cloned()
    }
}

impl PreviewStore for MemoryPreviews {
    fn create(&mut self, mime: &str, bytes: Bytes) -> PreviewHandle {
        let mut ledger = self.ledger();
        ledger.next_id += 1;
        let id = ledger.next_id;
        ledger.live.insert(id, (mime.to_string(), bytes));
        ledger.created += 1;
        PreviewHandle {
            id,
            url: format!("preview://{id}"),
        }
    }

    fn release(&mut self, handle: PreviewHandle) -> Result<(), PreviewError> {
        let mut ledger = self.ledger();
        if ledger.live.remove(&handle.id).is_some() {
            ledger.released.insert(handle.id);
            Ok(())
        } else if ledger.released.contains(&handle.id) {
            Err(PreviewError::AlreadyReleased(handle.id))
        } else {
            Err(PreviewError::Unknown(handle.id))
        }
    }
}
