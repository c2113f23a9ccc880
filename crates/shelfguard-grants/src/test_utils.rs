//! test doubles for the index query collaborator.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::index::{IndexDocument, IndexQuery};

/// an in-memory [`IndexQuery`] answering from fixed tables.
///
/// every query is recorded so tests can assert on what was asked.
///
/// # example
/// ```
/// use shelfguard_grants::IndexQuery;
/// use shelfguard_grants::test_utils::StaticIndex;
///
/// # tokio_test_block(async {
/// let index = StaticIndex::new().with_hits("PI:\"R1\"", 1);
/// assert_eq!(index.hit_count("PI:\"R1\"").await.unwrap(), 1);
/// assert_eq!(index.hit_count("PI:\"R2\"").await.unwrap(), 0);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StaticIndex {
    hits: HashMap<String, u64>,
    documents: HashMap<String, Vec<IndexDocument>>,
    default_hits: u64,
    unavailable: bool,
    queries: Mutex<Vec<String>>,
}

impl StaticIndex {
    /// an index with no documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// an index whose every call fails with [`Error::IndexUnavailable`].
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// answer `count` for hit count queries equal to `query`.
    pub fn with_hits(mut self, query: &str, count: u64) -> Self {
        self.hits.insert(query.to_string(), count);
        self
    }

    /// answer `documents` for searches equal to `query`.
    ///
    /// hit counts for the same query default to the number of documents.
    pub fn with_documents(mut self, query: &str, documents: Vec<IndexDocument>) -> Self {
        self.documents.insert(query.to_string(), documents);
        self
    }

    /// answer `count` for every hit count query without an explicit entry.
    pub fn with_default_hits(mut self, count: u64) -> Self {
        self.default_hits = count;
        self
    }

    /// every query asked so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn record(&self, query: &str) -> Result<()> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        if self.unavailable {
            return Err(Error::IndexUnavailable("static index offline".to_string()));
        }
        Ok(())
    }
}

impl IndexQuery for StaticIndex {
    fn search(
        &self,
        query: &str,
        _fields: &[&str],
    ) -> impl Future<Output = Result<Vec<IndexDocument>>> + Send {
        let result = self
            .record(query)
            .map(|()| self.documents.get(query).cloned().unwrap_or_default());
        async move { result }
    }

    fn hit_count(&self, query: &str) -> impl Future<Output = Result<u64>> + Send {
        let result = self.record(query).map(|()| {
            self.hits.get(query).copied().unwrap_or_else(|| {
                self.documents
                    .get(query)
                    .map(|docs| docs.len() as u64)
                    .unwrap_or(self.default_hits)
            })
        });
        async move { result }
    }
}
