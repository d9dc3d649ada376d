//! Stateless HTTP request builder and response parser for the posts API.
//!
//! # Design
//! `PostsClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that turns a `RequestConfig` snapshot into an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The verb is fixed per operation; every other option comes from the
//! config. `build_request` is the escape hatch that sends the config
//! verbatim.

use serde::{Deserialize, Serialize};

use crate::config::RequestConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Post, PostDraft};

/// Decoded body of a raw call.
///
/// A successful call whose body is not a post or a list of posts still
/// succeeds: DELETE answers `{}` and HEAD answers nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fetched {
    Many(Vec<Post>),
    One(Post),
    /// Empty or whitespace-only body.
    Empty,
    /// Any other JSON value.
    Other(serde_json::Value),
}

impl Fetched {
    /// Posts carried by the body; none for `Empty` and `Other`.
    pub fn into_vec(self) -> Vec<Post> {
        match self {
            Fetched::Many(posts) => posts,
            Fetched::One(post) => vec![post],
            Fetched::Empty | Fetched::Other(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostsClient {
    base_url: String,
}

impl PostsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    pub fn post_url(&self, id: u64) -> String {
        format!("{}/posts/{id}", self.base_url)
    }

    /// Request for `url` matching `config` exactly, body included.
    pub fn build_request(&self, url: &str, config: &RequestConfig) -> HttpRequest {
        let mut headers = Vec::new();
        if config.body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers.push(("sec-fetch-mode".to_string(), config.mode.as_str().to_string()));
        headers.extend(config.cache.request_headers());

        HttpRequest {
            method: config.method,
            url: url.to_string(),
            headers,
            body: config.body.clone(),
            options: config.options(),
        }
    }

    pub fn build_list_posts(&self, limit: usize, config: &RequestConfig) -> HttpRequest {
        let url = format!("{}?_limit={limit}", self.posts_url());
        self.build_request(&url, &config.with_call(HttpMethod::Get, None))
    }

    pub fn build_get_post(&self, id: u64, config: &RequestConfig) -> HttpRequest {
        self.build_request(&self.post_url(id), &config.with_call(HttpMethod::Get, None))
    }

    pub fn build_create_post(
        &self,
        draft: &PostDraft,
        config: &RequestConfig,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(draft)?;
        Ok(self.build_request(&self.posts_url(), &config.with_call(HttpMethod::Post, Some(body))))
    }

    pub fn build_update_post(
        &self,
        post: &Post,
        config: &RequestConfig,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(post)?;
        Ok(self.build_request(&self.post_url(post.id), &config.with_call(HttpMethod::Put, Some(body))))
    }

    pub fn build_delete_post(&self, id: u64, config: &RequestConfig) -> HttpRequest {
        self.build_request(&self.post_url(id), &config.with_call(HttpMethod::Delete, None))
    }

    pub fn parse_fetched(&self, response: HttpResponse) -> Result<Fetched, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Fetched::Empty);
        }
        serde_json::from_str(&response.body).map_err(ApiError::decode)
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(ApiError::decode)
    }

    pub fn parse_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(ApiError::decode)
    }

    /// The body of a successful delete is ignored.
    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Any 2xx passes; everything else is an `Http` error and the body is left
/// undecoded.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
