use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ranking_rust::index::{
    Document, IndexCore, IndexError, IndexProvider, IndexQuery, InMemoryCore, InMemoryIndex,
    QueryResponse,
};

/// An in-memory index whose writes or queries can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyIndex {
    inner: InMemoryIndex,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    failing_queries: Arc<AtomicBool>,
}

impl FlakyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryIndex {
        &self.inner
    }

    /// Make every `add`/`delete_by_id`/`commit` on `core` fail.
    pub fn fail_writes_on(&self, core: &str) {
        self.failing_writes.lock().unwrap().insert(core.to_string());
    }

    pub fn fail_queries(&self, fail: bool) {
        self.failing_queries.store(fail, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.failing_writes.lock().unwrap().clear();
        self.fail_queries(false);
    }
}

pub struct FlakyCore {
    name: String,
    inner: Arc<InMemoryCore>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    failing_queries: Arc<AtomicBool>,
}

impl FlakyCore {
    fn check_write(&self) -> Result<(), IndexError> {
        if self.failing_writes.lock().unwrap().contains(&self.name) {
            return Err(IndexError::Storage(format!("core [{}] is read-only", self.name)));
        }
        Ok(())
    }
}

impl IndexCore for FlakyCore {
    fn add(&self, document: Document) -> Result<(), IndexError> {
        self.check_write()?;
        self.inner.add(document)
    }

    fn delete_by_id(&self, id: &str) -> Result<(), IndexError> {
        self.check_write()?;
        self.inner.delete_by_id(id)
    }

    fn commit(&self) -> Result<(), IndexError> {
        self.check_write()?;
        self.inner.commit()
    }

    fn query(&self, query: &IndexQuery) -> Result<QueryResponse, IndexError> {
        if self.failing_queries.load(Ordering::SeqCst) {
            return Err(IndexError::Storage("connection refused".into()));
        }
        self.inner.query(query)
    }
}

impl IndexProvider for FlakyIndex {
    type Core = FlakyCore;

    fn core(&self, name: &str) -> Result<Arc<FlakyCore>, IndexError> {
        Ok(Arc::new(FlakyCore {
            name: name.to_string(),
            inner: self.inner.core(name)?,
            failing_writes: self.failing_writes.clone(),
            failing_queries: self.failing_queries.clone(),
        }))
    }
}
