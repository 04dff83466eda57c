//! InMemoryIndex - HashMap-backed index for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use super::{Document, IndexCore, IndexError, IndexProvider, IndexQuery, QueryResponse};

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    sequence: u64,
}

enum Pending {
    Add(String, Vec<u8>),
    Delete(String),
}

/// One in-memory core. Writes are buffered until `commit`.
pub struct InMemoryCore {
    name: String,
    committed: RwLock<HashMap<String, StoredDocument>>,
    pending: Mutex<Vec<Pending>>,
    sequence: AtomicU64,
}

impl InMemoryCore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            committed: RwLock::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of committed documents.
    pub fn len(&self) -> Result<usize, IndexError> {
        let committed = self
            .committed
            .read()
            .map_err(|_| IndexError::LockPoisoned("read"))?;
        Ok(committed.len())
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }

    fn push(&self, operation: Pending) -> Result<(), IndexError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| IndexError::LockPoisoned("pending write"))?;
        pending.push(operation);
        Ok(())
    }
}

impl IndexCore for InMemoryCore {
    fn add(&self, document: Document) -> Result<(), IndexError> {
        let bytes = serde_json::to_vec(&document).map_err(|e| IndexError::Serde(e.to_string()))?;
        self.push(Pending::Add(document.id, bytes))
    }

    fn delete_by_id(&self, id: &str) -> Result<(), IndexError> {
        self.push(Pending::Delete(id.to_string()))
    }

    fn commit(&self) -> Result<(), IndexError> {
        let operations: Vec<Pending> = {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| IndexError::LockPoisoned("pending drain"))?;
            pending.drain(..).collect()
        };
        if operations.is_empty() {
            return Ok(());
        }

        let mut committed = self
            .committed
            .write()
            .map_err(|_| IndexError::LockPoisoned("commit"))?;
        let count = operations.len();
        for operation in operations {
            match operation {
                Pending::Add(id, bytes) => {
                    // Upserts keep their original position for tie-breaking.
                    let sequence = committed
                        .get(&id)
                        .map(|stored| stored.sequence)
                        .unwrap_or_else(|| self.sequence.fetch_add(1, Ordering::Relaxed));
                    committed.insert(id, StoredDocument { bytes, sequence });
                }
                Pending::Delete(id) => {
                    committed.remove(&id);
                }
            }
        }
        debug!(core = %self.name, operations = count, "committed index operations");
        Ok(())
    }

    fn query(&self, query: &IndexQuery) -> Result<QueryResponse, IndexError> {
        let committed = self
            .committed
            .read()
            .map_err(|_| IndexError::LockPoisoned("query"))?;

        let mut matches = Vec::new();
        for stored in committed.values() {
            let document: Document = serde_json::from_slice(&stored.bytes)
                .map_err(|e| IndexError::Serde(e.to_string()))?;
            if query.matches(&document) {
                matches.push((stored.sequence, document));
            }
        }
        drop(committed);

        matches.sort_by(|(left_seq, left), (right_seq, right)| {
            query
                .compare(left, right)
                .then_with(|| left_seq.cmp(right_seq))
        });

        let num_found = matches.len() as u64;
        let documents = matches
            .into_iter()
            .skip(query.start)
            .take(query.rows)
            .map(|(_, document)| document)
            .collect();

        Ok(QueryResponse {
            documents,
            num_found,
        })
    }
}

/// In-memory index made of lazily created named cores.
///
/// Clone-friendly via Arc: clones share the same cores.
#[derive(Clone, Default)]
pub struct InMemoryIndex {
    cores: Arc<RwLock<HashMap<String, Arc<InMemoryCore>>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the cores created so far.
    pub fn core_names(&self) -> Result<Vec<String>, IndexError> {
        let cores = self
            .cores
            .read()
            .map_err(|_| IndexError::LockPoisoned("core listing"))?;
        let mut names: Vec<String> = cores.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl IndexProvider for InMemoryIndex {
    type Core = InMemoryCore;

    fn core(&self, name: &str) -> Result<Arc<InMemoryCore>, IndexError> {
        if name.is_empty() {
            return Err(IndexError::UnknownCore(name.to_string()));
        }
        {
            let cores = self
                .cores
                .read()
                .map_err(|_| IndexError::LockPoisoned("core lookup"))?;
            if let Some(core) = cores.get(name) {
                return Ok(core.clone());
            }
        }
        let mut cores = self
            .cores
            .write()
            .map_err(|_| IndexError::LockPoisoned("core creation"))?;
        Ok(cores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCore::new(name)))
            .clone())
    }
}
