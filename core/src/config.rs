//! User-selected fetch options.
//!
//! `FetchConfigStore` owns exactly one `RequestConfig`. Callers read a
//! snapshot with `current` and change it with `update`, which merges only
//! the fields present in the patch.

use serde::{Deserialize, Serialize};

use crate::http::{
    CachePolicy, CredentialsPolicy, HttpMethod, RedirectPolicy, ReferrerPolicy, RequestMode,
    RequestOptions,
};

/// Parameters of an outbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub mode: RequestMode,
    pub cache: CachePolicy,
    pub credentials: CredentialsPolicy,
    pub redirect: RedirectPolicy,
    pub referrer_policy: ReferrerPolicy,
    /// Sent verbatim as JSON. Where a browser would refuse the call
    /// outright, a body on GET or HEAD is dropped with a warning and the
    /// request goes out without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestConfig {
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            mode: self.mode,
            cache: self.cache,
            credentials: self.credentials,
            redirect: self.redirect,
            referrer_policy: self.referrer_policy,
        }
    }

    /// Same options with a different verb and body.
    pub fn with_call(&self, method: HttpMethod, body: Option<String>) -> Self {
        Self {
            method,
            body,
            ..self.clone()
        }
    }
}

/// Partial `RequestConfig`. `None` leaves a field unchanged; for `body`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfigPatch {
    pub method: Option<HttpMethod>,
    pub mode: Option<RequestMode>,
    pub cache: Option<CachePolicy>,
    pub credentials: Option<CredentialsPolicy>,
    pub redirect: Option<RedirectPolicy>,
    pub referrer_policy: Option<ReferrerPolicy>,
    #[serde(default, deserialize_with = "deserialize_body_patch")]
    pub body: Option<Option<String>>,
}

// A present `"body": null` means "clear", which plain `Option<Option<_>>`
// would collapse into "unchanged".
fn deserialize_body_patch<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl RequestConfigPatch {
    pub fn method(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchConfigStore {
    config: RequestConfig,
}

impl FetchConfigStore {
    pub fn new(config: RequestConfig) -> Self {
        Self { config }
    }

    pub fn current(&self) -> RequestConfig {
        self.config.clone()
    }

    pub fn update(&mut self, patch: RequestConfigPatch) {
        let config = &mut self.config;
        if let Some(method) = patch.method {
            config.method = method;
        }
        if let Some(mode) = patch.mode {
            config.mode = mode;
        }
        if let Some(cache) = patch.cache {
            config.cache = cache;
        }
        if let Some(credentials) = patch.credentials {
            config.credentials = credentials;
        }
        if let Some(redirect) = patch.redirect {
            config.redirect = redirect;
        }
        if let Some(referrer_policy) = patch.referrer_policy {
            config.referrer_policy = referrer_policy;
        }
        if let Some(body) = patch.body {
            config.body = body;
        }
    }

    pub fn reset(&mut self) {
        self.config = RequestConfig::default();
    }
}
