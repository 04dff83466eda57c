//! Store contracts consumed by the ranking managers.

use std::sync::Arc;

use super::{Document, IndexError, IndexQuery, QueryResponse};

/// One partition of the index.
pub trait IndexCore: Send + Sync {
    /// Upsert a document by id. Visible to queries after `commit`.
    fn add(&self, document: Document) -> Result<(), IndexError>;

    /// Delete a document by id. Visible to queries after `commit`.
    /// Deleting a missing id is not an error.
    fn delete_by_id(&self, id: &str) -> Result<(), IndexError>;

    /// Make every pending `add`/`delete_by_id` visible.
    fn commit(&self) -> Result<(), IndexError>;

    /// Run a filtered, sorted, paginated query over committed documents.
    fn query(&self, query: &IndexQuery) -> Result<QueryResponse, IndexError>;
}

/// Factory for index cores, selected by name.
///
/// Repeated calls with the same name must return the same logical core.
pub trait IndexProvider: Send + Sync {
    /// The concrete core type returned by this provider.
    type Core: IndexCore;

    fn core(&self, name: &str) -> Result<Arc<Self::Core>, IndexError>;
}
