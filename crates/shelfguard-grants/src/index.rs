//! index query abstraction and query composition helpers.
//!
//! the engine never talks to solr directly; it asks an [`IndexQuery`]
//! implementation for documents and hit counts.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// index field names used by the access layer.
pub mod fields {
    /// persistent identifier of a record document.
    pub const PI: &str = "PI";
    /// persistent identifier of the record a page belongs to.
    pub const PI_TOPSTRUCT: &str = "PI_TOPSTRUCT";
    /// access conditions of a document (multi-valued).
    pub const ACCESSCONDITION: &str = "ACCESSCONDITION";
    /// file name of a page document.
    pub const FILENAME: &str = "FILENAME";
    /// document type (`DOCSTRCT`, `PAGE`, ...).
    pub const DOCTYPE: &str = "DOCTYPE";
    /// doctype value of page documents.
    pub const DOCTYPE_PAGE: &str = "PAGE";
}

/// a search result: field name to (possibly multi-valued) string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument(HashMap<String, Vec<String>>);

impl IndexDocument {
    /// create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style field setter.
    pub fn with_field<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(field, values);
        self
    }

    /// set all values of a field.
    pub fn insert<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(field.to_string(), values.into_iter().map(Into::into).collect());
    }

    /// first value of a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// all values of a field (empty if absent).
    pub fn values(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// the index query collaborator.
///
/// implementations map transport failures to
/// [`Error::IndexUnavailable`](crate::Error::IndexUnavailable); they must
/// never answer "no hits" when the index could not be asked.
pub trait IndexQuery: Send + Sync {
    /// run `query`, returning the requested `fields` of every hit.
    fn search(
        &self,
        query: &str,
        fields: &[&str],
    ) -> impl Future<Output = Result<Vec<IndexDocument>>> + Send;

    /// number of documents matching `query`.
    fn hit_count(&self, query: &str) -> impl Future<Output = Result<u64>> + Send;
}

impl<T: IndexQuery> IndexQuery for Arc<T> {
    fn search(
        &self,
        query: &str,
        fields: &[&str],
    ) -> impl Future<Output = Result<Vec<IndexDocument>>> + Send {
        (**self).search(query, fields)
    }

    fn hit_count(&self, query: &str) -> impl Future<Output = Result<u64>> + Send {
        (**self).hit_count(query)
    }
}

/// quote a value for use inside a field query.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// query matching the record document with persistent identifier `pi`.
pub fn record_query(pi: &str) -> String {
    format!("{}:{}", fields::PI, quote(pi))
}

/// query matching every page document of record `pi`.
pub fn pages_query(pi: &str) -> String {
    format!(
        "+{}:{} +{}:{}",
        fields::PI_TOPSTRUCT,
        quote(pi),
        fields::DOCTYPE,
        fields::DOCTYPE_PAGE
    )
}

/// query matching the page document of record `pi` holding `file_name`.
pub fn file_query(pi: &str, file_name: &str) -> String {
    format!(
        "{} +{}:{}",
        pages_query(pi),
        fields::FILENAME,
        quote(file_name)
    )
}

/// and-combine a resource query with a scope condition.
///
/// the resource query becomes a required clause. a negated condition
/// (leading `-`) is appended without a group so it stays a prohibition.
pub fn combine_scope_query(resource_query: &str, condition: &str) -> String {
    let condition = condition.trim();
    if condition.starts_with('-') {
        format!("+({}) {}", resource_query, condition)
    } else {
        format!("+({}) +({})", resource_query, condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_positive_condition() {
        assert_eq!(
            combine_scope_query("PI:R1", "YEAR:[* TO 1900]"),
            "+(PI:R1) +(YEAR:[* TO 1900])"
        );
    }

    #[test]
    fn combine_negated_condition_is_not_wrapped() {
        assert_eq!(
            combine_scope_query("PI:R1", " -DOCSTRCT:map"),
            "+(PI:R1) -DOCSTRCT:map"
        );
    }

    #[test]
    fn quoting_escapes_specials() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(record_query("PPN123"), r#"PI:"PPN123""#);
    }

    #[test]
    fn page_and_file_queries() {
        assert_eq!(
            pages_query("R1"),
            r#"+PI_TOPSTRUCT:"R1" +DOCTYPE:PAGE"#
        );
        assert_eq!(
            file_query("R1", "00000001.tif"),
            r#"+PI_TOPSTRUCT:"R1" +DOCTYPE:PAGE +FILENAME:"00000001.tif""#
        );
    }

    #[test]
    fn document_accessors() {
        let doc = IndexDocument::new()
            .with_field(fields::FILENAME, ["00000001.tif"])
            .with_field(fields::ACCESSCONDITION, ["restricted", "embargoed"]);
        assert_eq!(doc.first(fields::FILENAME), Some("00000001.tif"));
        assert_eq!(doc.values(fields::ACCESSCONDITION).len(), 2);
        assert!(doc.values("MISSING").is_empty());
        assert_eq!(doc.first("MISSING"), None);
    }
}
