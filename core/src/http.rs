//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! client builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; a `Transport` performs the round trip.
//!
//! The option enums carry the fetch-standard spellings (`"no-cors"`,
//! `"force-cache"`, ...) both on the wire and in `as_str`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Whether a request body may be sent with this verb. Browsers reject a
    /// body on GET and HEAD.
    pub fn permits_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// Request mode. Sent to the server as `sec-fetch-mode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    #[default]
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

impl RequestMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMode::Cors => "cors",
            RequestMode::NoCors => "no-cors",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::Navigate => "navigate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    #[default]
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

impl CachePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::Default => "default",
            CachePolicy::NoStore => "no-store",
            CachePolicy::Reload => "reload",
            CachePolicy::NoCache => "no-cache",
            CachePolicy::ForceCache => "force-cache",
            CachePolicy::OnlyIfCached => "only-if-cached",
        }
    }

    /// Request headers that ask intermediaries for this cache behavior.
    pub fn request_headers(self) -> Vec<(String, String)> {
        let cache_control = |value: &str| ("cache-control".to_string(), value.to_string());
        match self {
            CachePolicy::Default => Vec::new(),
            CachePolicy::NoStore => vec![cache_control("no-store")],
            CachePolicy::Reload | CachePolicy::NoCache => vec![
                cache_control("no-cache"),
                ("pragma".to_string(), "no-cache".to_string()),
            ],
            CachePolicy::ForceCache => vec![cache_control("max-stale")],
            CachePolicy::OnlyIfCached => vec![cache_control("only-if-cached")],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsPolicy {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

impl CredentialsPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialsPolicy::Omit => "omit",
            CredentialsPolicy::SameOrigin => "same-origin",
            CredentialsPolicy::Include => "include",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectPolicy {
    /// Follow up to `MAX_REDIRECTS` hops.
    #[default]
    Follow,
    /// Treat any redirect as a transport failure.
    Error,
    /// Hand the 3xx response back to the caller unfollowed.
    Manual,
}

impl RedirectPolicy {
    pub const MAX_REDIRECTS: u32 = 10;

    pub fn as_str(self) -> &'static str {
        match self {
            RedirectPolicy::Follow => "follow",
            RedirectPolicy::Error => "error",
            RedirectPolicy::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    #[default]
    NoReferrer,
    NoReferrerWhenDowngrade,
    Origin,
    OriginWhenCrossOrigin,
    SameOrigin,
    StrictOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

impl ReferrerPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferrerPolicy::NoReferrer => "no-referrer",
            ReferrerPolicy::NoReferrerWhenDowngrade => "no-referrer-when-downgrade",
            ReferrerPolicy::Origin => "origin",
            ReferrerPolicy::OriginWhenCrossOrigin => "origin-when-cross-origin",
            ReferrerPolicy::SameOrigin => "same-origin",
            ReferrerPolicy::StrictOrigin => "strict-origin",
            ReferrerPolicy::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
            ReferrerPolicy::UnsafeUrl => "unsafe-url",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(
    HttpMethod,
    RequestMode,
    CachePolicy,
    CredentialsPolicy,
    RedirectPolicy,
    ReferrerPolicy
);

/// Per-request fetch options other than method and body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub mode: RequestMode,
    pub cache: CachePolicy,
    pub credentials: CredentialsPolicy,
    pub redirect: RedirectPolicy,
    pub referrer_policy: ReferrerPolicy,
}

/// An HTTP request described as plain data.
///
/// Built by `PostsClient::build_*` methods. A `Transport` executes it and
/// returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub options: RequestOptions,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
