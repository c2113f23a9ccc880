//! solr-backed [`IndexQuery`] implementation.
//!
//! talks to the `select` handler of one solr core. hit counts ask for
//! `rows=0` so solr only reports `numFound`. searches page through the
//! result set until every hit is fetched.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use shelfguard_grants::{Error, IndexDocument, IndexQuery, Result};
use shelfguard_types::IndexConfig;
use tracing::{debug, warn};

/// documents fetched per search request.
const PAGE_SIZE: u64 = 10_000;

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: ResultSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSet {
    num_found: u64,
    #[serde(default)]
    docs: Vec<serde_json::Map<String, Value>>,
}

/// a solr core queried over http.
#[derive(Debug, Clone)]
pub struct SolrIndex {
    client: reqwest::Client,
    select_url: String,
    page_size: u64,
}

impl SolrIndex {
    /// create a client for the core at `config.solr_url`.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::IndexUnavailable(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            select_url: format!("{}/select", config.solr_url.trim_end_matches('/')),
            page_size: PAGE_SIZE,
        })
    }

    /// fetch at most `page_size` documents per search request.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    async fn select(&self, query: &str, fields: &str, start: u64, rows: u64) -> Result<ResultSet> {
        let start = start.to_string();
        let rows = rows.to_string();
        let response = self
            .client
            .get(&self.select_url)
            .query(&[
                ("q", query),
                ("fl", fields),
                ("start", start.as_str()),
                ("rows", rows.as_str()),
                ("wt", "json"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::IndexUnavailable(format!("solr request failed: {}", e)))?;

        let body: SelectResponse = response
            .json()
            .await
            .map_err(|e| Error::IndexUnavailable(format!("invalid solr response: {}", e)))?;

        debug!(query, hits = body.response.num_found, "solr select");
        Ok(body.response)
    }
}

/// flatten a solr document into string values.
fn to_document(doc: serde_json::Map<String, Value>) -> IndexDocument {
    let mut document = IndexDocument::new();
    for (field, value) in doc {
        let values: Vec<String> = match value {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            other => scalar(other).into_iter().collect(),
        };
        document.insert(&field, values);
    }
    document
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl IndexQuery for SolrIndex {
    async fn search(&self, query: &str, fields: &[&str]) -> Result<Vec<IndexDocument>> {
        let fields = fields.join(",");
        let mut documents = Vec::new();
        loop {
            let start = documents.len() as u64;
            let page = self.select(query, &fields, start, self.page_size).await?;
            let fetched = page.docs.len();
            documents.extend(page.docs.into_iter().map(to_document));

            let total = documents.len() as u64;
            if total >= page.num_found {
                break;
            }
            if fetched == 0 {
                // the result set shrank between pages
                warn!(
                    query,
                    num_found = page.num_found,
                    fetched = total,
                    "solr returned fewer documents than found"
                );
                break;
            }
        }
        Ok(documents)
    }

    async fn hit_count(&self, query: &str) -> Result<u64> {
        let result = self.select(query, "PI", 0, 0).await?;
        Ok(result.num_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_flatten_to_strings() {
        let raw = json!({
            "PI": "PPN123",
            "ACCESSCONDITION": ["restricted", "embargoed"],
            "ORDER": 4,
            "THUMB": null
        });
        let Value::Object(map) = raw else {
            unreachable!()
        };
        let doc = to_document(map);

        assert_eq!(doc.first("PI"), Some("PPN123"));
        assert_eq!(doc.values("ACCESSCONDITION"), ["restricted", "embargoed"]);
        assert_eq!(doc.first("ORDER"), Some("4"));
        assert!(doc.values("THUMB").is_empty());
    }

    #[test]
    fn select_url_ignores_trailing_slash() {
        let index = SolrIndex::new(&IndexConfig {
            solr_url: "http://solr:8983/solr/viewer/".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(index.select_url, "http://solr:8983/solr/viewer/select");
    }
}
