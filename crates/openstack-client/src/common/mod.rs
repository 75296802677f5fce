//! Common utilities for the OpenStack API client
//!
//! Provides the authenticated HTTP wrapper shared by the identity and
//! network service clients.

pub mod query;

use crate::error::OpenStackError;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Signal returned by a page visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// Fetch the next page, if any
    Continue,
    /// Stop enumerating; remaining pages are not fetched
    Stop,
}

/// Pagination link as returned in `<collection>_links`
#[derive(Debug, Clone, Deserialize)]
pub struct PageLink {
    pub href: String,
    pub rel: String,
}

/// HTTP client wrapper bound to one service endpoint and a token
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Walk every page of a collection, handing each page to `visit`.
    ///
    /// Neutron and Keystone both return `{"<collection>": [...],
    /// "<collection>_links": [{"rel": "next", "href": ...}]}`; the walk
    /// follows `next` links until there are none or the visitor stops it.
    pub async fn each_page<T, F>(
        &self,
        mut url: String,
        collection: &str,
        mut visit: F,
    ) -> Result<(), OpenStackError>
    where
        T: DeserializeOwned + Send,
        F: FnMut(Vec<T>) -> Result<PageControl, OpenStackError> + Send,
    {
        loop {
            debug!("Fetching page: {}", url);

            let response = self.client
                .get(&url)
                .header("X-Auth-Token", &self.token)
                .header("Accept", "application/json")
                .send()
                .await?;
            let page = Self::read_json(response, &url).await?;

            let items: Vec<T> = page_items(&page, &url, collection)?;

            if visit(items)? == PageControl::Stop {
                break;
            }

            match next_page_link(&page, collection) {
                Some(next_url) => {
                    url = self.build_url(&next_url);
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Fetch all pages of a paginated collection
    pub async fn fetch_all_pages<T: DeserializeOwned + Send>(
        &self,
        url: String,
        collection: &str,
    ) -> Result<Vec<T>, OpenStackError> {
        let mut all_results = Vec::new();
        self.each_page(url, collection, |page: Vec<T>| {
            all_results.extend(page);
            Ok(PageControl::Continue)
        })
        .await?;
        Ok(all_results)
    }

    /// Make a GET request and unwrap the `key` element of the response
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<T, OpenStackError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.client
            .get(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let body = Self::read_json(response, path).await?;
        unwrap_resource(body, key)
    }

    /// Make a POST request with `body` wrapped in `key`
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpenStackError> {
        let url = self.build_url(path);
        debug!("POST {} ({})", url, key);

        let response = self.client
            .post(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .json(&wrap(key, body))
            .send()
            .await?;

        let body = Self::read_json(response, path).await?;
        unwrap_resource(body, key)
    }

    /// Make a PUT request with `body` wrapped in `key`
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpenStackError> {
        let url = self.build_url(path);
        debug!("PUT {} ({})", url, key);

        let response = self.client
            .put(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .json(&wrap(key, body))
            .send()
            .await?;

        let body = Self::read_json(response, path).await?;
        unwrap_resource(body, key)
    }

    /// Make a PUT request whose body is sent as-is and whose response is not wrapped
    ///
    /// Router interface actions use this shape.
    pub async fn put_raw<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpenStackError> {
        let url = self.build_url(path);
        debug!("PUT {}", url);

        let response = self.client
            .put(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let body = Self::read_json(response, path).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), OpenStackError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.client
            .delete(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        check_status(response, path).await.map(|_| ())
    }

    /// Build query string from filters
    ///
    /// Filters with an empty value are left out.
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn read_json(response: Response, what: &str) -> Result<serde_json::Value, OpenStackError> {
        let response = check_status(response, what).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            OpenStackError::InvalidResponse(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }
}

/// Map non-success statuses onto `OpenStackError`
async fn check_status(response: Response, what: &str) -> Result<Response, OpenStackError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == 404 {
        return Err(OpenStackError::NotFound(format!("{} - {}", what, body)));
    }
    Err(OpenStackError::UnexpectedResponse {
        status: status.as_u16(),
        body,
    })
}

/// Wrap a request body in its resource key
pub fn wrap(key: &str, body: &serde_json::Value) -> serde_json::Value {
    let mut wrapped = serde_json::Map::new();
    wrapped.insert(key.to_string(), body.clone());
    serde_json::Value::Object(wrapped)
}

/// Extract the `key` element of a wrapped response body
pub fn unwrap_resource<T: DeserializeOwned>(
    mut body: serde_json::Value,
    key: &str,
) -> Result<T, OpenStackError> {
    match body.get_mut(key) {
        Some(inner) => Ok(serde_json::from_value(inner.take())?),
        None => Err(OpenStackError::InvalidResponse(format!(
            "response has no '{}' element",
            key
        ))),
    }
}

/// Find the `next` link of a collection page
pub fn next_page_link(page: &serde_json::Value, collection: &str) -> Option<String> {
    let links = page.get(format!("{}_links", collection))?;
    let links: Vec<PageLink> = serde_json::from_value(links.clone()).ok()?;
    links.into_iter().find(|l| l.rel == "next").map(|l| l.href)
}

/// Items of one listing page
///
/// A single-resource body such as Keystone's `{"tenant": {...}}` is not a
/// page and is rejected.
fn page_items<T: DeserializeOwned>(
    page: &serde_json::Value,
    url: &str,
    collection: &str,
) -> Result<Vec<T>, OpenStackError> {
    match page.get(collection) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Err(OpenStackError::InvalidResponse(format!(
            "page from {} has no '{}' collection",
            url, collection
        ))),
    }
}
