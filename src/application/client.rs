//! WordPress REST client with response caching and request de-duplication.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use reqwest::header::{ACCEPT, HeaderMap};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    cache::{CacheConfig, CacheKey, CachedResponse, InFlight, ResponseCache},
    config::Settings,
    domain::{
        entities::{Category, Post, Tag},
        transform::{normalize_category, normalize_tag, transform_post, transform_posts},
    },
};

use super::{
    error::{ApiError, ErrorKind},
    query::{PostQuery, RequestOptions, endpoint},
};

pub const DEFAULT_BASE_URL: &str = "https://app.dataengineerhub.blog/wp-json/wp/v2";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(8_000);

pub(crate) const METRIC_REQUEST: &str = "presswire_request_total";
pub(crate) const METRIC_REQUEST_DURATION: &str = "presswire_request_duration_ms";

const TAXONOMY_QUERY: &[(&str, &str)] = &[("per_page", "100"), ("hide_empty", "false")];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://example.com/wp-json/wp/v2`.
    pub base_url: String,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub cache_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: cache.ttl,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_capacity: cache.capacity,
        }
    }
}

impl From<&Settings> for ClientConfig {
    fn from(settings: &Settings) -> Self {
        let cache = CacheConfig::from(&settings.cache);
        Self {
            base_url: settings.wordpress.base_url.to_string(),
            cache_ttl: cache.ttl,
            request_timeout: settings.wordpress.timeout,
            cache_capacity: cache.capacity,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: self.cache_ttl,
            capacity: self.cache_capacity,
        }
    }
}

/// One page of posts plus the totals WordPress reported for the whole query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_pages: u64,
    pub total_posts: u64,
}

impl PostPage {
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            total_pages: 1,
            total_posts: 0,
        }
    }
}

/// Read-only WordPress client.
///
/// Clones share the response cache and the in-flight request map.
#[derive(Clone)]
pub struct WordPressClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: ResponseCache,
    inflight: InFlight<Arc<CachedResponse>, ApiError>,
}

impl WordPressClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url).map_err(|err| {
            ApiError::invalid_input(format!("Invalid base URL `{}`: {err}", config.base_url))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("presswire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::invalid_input(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: parsed.as_str().trim_end_matches('/').to_string(),
                timeout: config.request_timeout,
                cache: ResponseCache::new(&config.cache_config()),
                inflight: InFlight::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Cached, de-duplicated GET of `endpoint` (path plus query, relative to
    /// the base URL).
    pub async fn fetch(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Arc<CachedResponse>, ApiError> {
        let key = CacheKey::new(endpoint, options);
        if let Some(hit) = self.inner.cache.get(&key) {
            debug!(key = %key, "Serving WordPress response from cache");
            return Ok(hit);
        }

        let inner = Arc::clone(&self.inner);
        let endpoint = endpoint.to_string();
        let options = options.clone();
        let cache_key = key.clone();
        self.inner
            .inflight
            .join_or_start(&key, move || async move {
                let response = Arc::new(inner.execute(&endpoint, &options).await?);
                inner.cache.insert(cache_key, Arc::clone(&response));
                Ok::<_, ApiError>(response)
            })
            .await
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post, ApiError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(ApiError::invalid_input("Invalid post slug provided"));
        }

        let endpoint = endpoint(
            "/posts",
            &[("slug", slug), ("_embed", "true"), ("status", "publish")],
        );
        let response = self.fetch(&endpoint, &RequestOptions::default()).await?;
        let Some(items) = response.data.as_array() else {
            return Err(ApiError::malformed("Invalid response format from server"));
        };
        let first = items
            .first()
            .ok_or_else(|| ApiError::not_found(format!("Post with slug \"{slug}\" not found")))?;
        Ok(transform_post(first))
    }

    pub async fn get_posts(&self, query: &PostQuery) -> Result<PostPage, ApiError> {
        let endpoint = query.endpoint();
        let response = recover_malformed(
            self.fetch(&endpoint, &RequestOptions::default()).await,
            &endpoint,
        )?;
        Ok(response.map_or_else(PostPage::empty, |response| page_from(&response, &endpoint)))
    }

    pub async fn get_posts_by_category(
        &self,
        category_id: u64,
        query: &PostQuery,
    ) -> Result<PostPage, ApiError> {
        let query = PostQuery {
            category_id: Some(category_id),
            ..query.clone()
        };
        self.get_posts(&query).await
    }

    pub async fn get_posts_by_tag(&self, tag_id: u64, query: &PostQuery) -> Result<PostPage, ApiError> {
        let query = PostQuery {
            tag_id: Some(tag_id),
            ..query.clone()
        };
        self.get_posts(&query).await
    }

    pub async fn get_posts_by_category_slug(
        &self,
        slug: &str,
        query: &PostQuery,
    ) -> Result<PostPage, ApiError> {
        let category_id = self.get_category_id_by_slug(slug).await?;
        self.get_posts_by_category(category_id, query).await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let items = self.taxonomy("/categories").await?;
        Ok(items.iter().map(normalize_category).collect())
    }

    pub async fn get_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let items = self.taxonomy("/tags").await?;
        Ok(items.iter().map(normalize_tag).collect())
    }

    pub async fn get_category_id_by_slug(&self, slug: &str) -> Result<u64, ApiError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(ApiError::invalid_input("Invalid category slug provided"));
        }
        let categories = self.get_categories().await?;
        categories
            .iter()
            .find(|category| term_matches(&category.slug, &category.name, slug))
            .map(|category| category.id)
            .ok_or_else(|| ApiError::not_found(format!("Category \"{slug}\" not found")))
    }

    pub async fn get_tag_id_by_slug(&self, slug: &str) -> Result<u64, ApiError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(ApiError::invalid_input("Invalid tag slug provided"));
        }
        let tags = self.get_tags().await?;
        tags.iter()
            .find(|tag| term_matches(&tag.slug, &tag.name, slug))
            .map(|tag| tag.id)
            .ok_or_else(|| ApiError::not_found(format!("Tag \"{slug}\" not found")))
    }

    /// Posts the site considers related to `post_id`. Never fails.
    pub async fn get_related_posts(&self, post_id: u64) -> Vec<Post> {
        if post_id == 0 {
            return Vec::new();
        }

        let endpoint = format!("/posts/{post_id}/related");
        match self.fetch(&endpoint, &RequestOptions::default()).await {
            Ok(response) => match response.data.as_array() {
                Some(items) => transform_posts(items),
                None => {
                    warn!(
                        target = "presswire::client",
                        post_id,
                        "Related posts response was not a list"
                    );
                    Vec::new()
                }
            },
            Err(error) => {
                warn!(
                    target = "presswire::client",
                    post_id,
                    kind = %error.kind(),
                    error = %error,
                    "Failed to load related posts"
                );
                Vec::new()
            }
        }
    }

    /// Drop every cached response, or only those whose key contains `pattern`.
    pub fn clear_cache(&self, pattern: Option<&str>) -> usize {
        let removed = self.inner.cache.clear(pattern);
        info!(pattern = pattern.unwrap_or("*"), removed, "Cleared response cache");
        removed
    }

    pub async fn health_check(&self) -> bool {
        let endpoint = endpoint("/posts", &[("per_page", "1")]);
        match self.fetch(&endpoint, &RequestOptions::default()).await {
            Ok(_) => true,
            Err(error) => {
                debug!(kind = %error.kind(), error = %error, "Health check failed");
                false
            }
        }
    }

    async fn taxonomy(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        let endpoint = endpoint(path, TAXONOMY_QUERY);
        let Some(response) = recover_malformed(
            self.fetch(&endpoint, &RequestOptions::default()).await,
            &endpoint,
        )?
        else {
            return Ok(Vec::new());
        };
        match &response.data {
            Value::Array(items) => Ok(items.clone()),
            other => {
                warn!(
                    target = "presswire::client",
                    endpoint = %endpoint,
                    found = crate::domain::error::json_kind(other),
                    "Expected a list of terms"
                );
                Ok(Vec::new())
            }
        }
    }
}

impl Inner {
    async fn execute(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<CachedResponse, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(url = %url, "Issuing WordPress request");

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let total_posts = header_u64(response.headers(), "x-wp-total").unwrap_or(0);
            let total_pages = header_u64(response.headers(), "x-wp-totalpages").unwrap_or(1);
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, total_posts, total_pages, body))
        })
        .await;
        histogram!(METRIC_REQUEST_DURATION).record(started.elapsed().as_secs_f64() * 1_000.0);

        let (status, total_posts, total_pages, body) = match outcome {
            Err(_) => {
                record_outcome("timeout");
                warn!(
                    url = %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "WordPress request timed out"
                );
                return Err(ApiError::timeout());
            }
            Ok(Err(error)) => {
                let failure = ApiError::from_transport(&error);
                record_outcome(outcome_label(failure.kind()));
                warn!(url = %url, error = %error, "WordPress request failed");
                return Err(failure);
            }
            Ok(Ok(parts)) => parts,
        };

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16());
            record_outcome(outcome_label(error.kind()));
            debug!(url = %url, status = status.as_u16(), "WordPress returned an error status");
            return Err(error);
        }

        let data: Value = serde_json::from_slice(&body).map_err(|error| {
            record_outcome("malformed");
            warn!(url = %url, error = %error, "WordPress response was not valid JSON");
            ApiError::malformed("Invalid response format from server")
        })?;
        if data.is_null() {
            record_outcome("malformed");
            return Err(ApiError::malformed("No data received from server"));
        }

        record_outcome("ok");
        Ok(CachedResponse::new(data, total_posts, total_pages).sent_at(started))
    }
}

fn record_outcome(outcome: &'static str) {
    counter!(METRIC_REQUEST, "outcome" => outcome).increment(1);
}

fn outcome_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Timeout => "timeout",
        ErrorKind::Network => "network",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Server => "server",
        ErrorKind::Status(_) => "status",
        ErrorKind::MalformedResponse => "malformed",
        ErrorKind::InvalidInput => "invalid",
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// List endpoints treat an unusable 200 body as "nothing to show".
fn recover_malformed<T>(result: Result<T, ApiError>, endpoint: &str) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.kind() == ErrorKind::MalformedResponse => {
            warn!(
                target = "presswire::client",
                endpoint = %endpoint,
                error = %error,
                "Treating malformed list response as empty"
            );
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn page_from(response: &CachedResponse, endpoint: &str) -> PostPage {
    match &response.data {
        Value::Array(items) => PostPage {
            posts: transform_posts(items),
            total_pages: response.total_pages.max(1),
            total_posts: response.total_posts,
        },
        Value::Object(map) => match map.get("posts").and_then(Value::as_array) {
            Some(items) => PostPage {
                posts: transform_posts(items),
                total_pages: map
                    .get("totalPages")
                    .and_then(Value::as_u64)
                    .unwrap_or(response.total_pages)
                    .max(1),
                total_posts: map
                    .get("totalPosts")
                    .and_then(Value::as_u64)
                    .unwrap_or(response.total_posts),
            },
            None => malformed_page(endpoint, &response.data),
        },
        other => malformed_page(endpoint, other),
    }
}

fn malformed_page(endpoint: &str, data: &Value) -> PostPage {
    warn!(
        target = "presswire::client",
        endpoint = %endpoint,
        found = crate::domain::error::json_kind(data),
        "Expected a list of posts"
    );
    PostPage::empty()
}

fn term_matches(slug: &str, name: &str, wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    slug.to_lowercase() == wanted || name.to_lowercase() == wanted
}
