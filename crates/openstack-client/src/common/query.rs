//! Query utilities for the OpenStack APIs
//!
//! Provides helpers for building filtered listings that walk every page.

use crate::common::HttpClient;
use crate::error::OpenStackError;
use serde::de::DeserializeOwned;

/// List a collection with optional filtering, enumerating all pages
///
/// `path` is relative to the service endpoint (e.g. `/networks`) and
/// `collection` is the JSON key holding each page's items.
pub async fn query_resources<T: DeserializeOwned + Send>(
    http: &HttpClient,
    path: &str,
    collection: &str,
    filters: &[(&str, &str)],
) -> Result<Vec<T>, OpenStackError> {
    let mut url = path.to_string();

    let query_string = http.build_query_string(filters);
    if !query_string.is_empty() {
        url = format!("{}?{}", url, query_string);
    }

    http.fetch_all_pages(http.build_url(&url), collection).await
}
