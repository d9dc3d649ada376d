//! The single network call behind every operation.
//!
//! # Design
//! `Transport` is the I/O seam of the host-does-IO split: it takes an
//! `HttpRequest` value and returns an `HttpResponse` value. Status codes are
//! returned as data, never as errors; only a failed round trip is an `Err`.
//! There is no retry and no cache.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy};
use crate::settings::Settings;

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    settings: Settings,
}

impl UreqTransport {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // Redirect handling is agent configuration in ureq, so the agent follows
    // the per-request policy.
    fn agent(&self, redirect: RedirectPolicy) -> ureq::Agent {
        let max_redirects = match redirect {
            RedirectPolicy::Follow => RedirectPolicy::MAX_REDIRECTS,
            RedirectPolicy::Error | RedirectPolicy::Manual => 0,
        };
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(max_redirects)
            .timeout_global(Some(self.settings.timeout))
            .build()
            .new_agent()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        if request.url.trim().is_empty() {
            return Err(ApiError::transport("request url is empty"));
        }
        debug!(method = %request.method, url = %request.url, "sending request");

        let agent = self.agent(request.options.redirect);
        let mut headers = request.headers.clone();
        headers.push(("user-agent".to_string(), self.settings.user_agent.clone()));
        let url = request.url.as_str();

        let with_body = |builder: ureq::RequestBuilder<ureq::typestate::WithBody>| {
            let builder = with_headers(builder, &headers);
            match &request.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        };
        let without_body = |builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>| {
            if request.body.is_some() {
                if request.method.permits_body() {
                    return with_body(builder.force_send_body());
                }
                warn!(method = %request.method, url = %request.url, "body not allowed for this verb, sending without it");
            }
            with_headers(builder, &headers).call()
        };

        let result = match request.method {
            HttpMethod::Get => without_body(agent.get(url)),
            HttpMethod::Delete => without_body(agent.delete(url)),
            HttpMethod::Head => without_body(agent.head(url)),
            HttpMethod::Options => without_body(agent.options(url)),
            HttpMethod::Post => with_body(agent.post(url)),
            HttpMethod::Put => with_body(agent.put(url)),
            HttpMethod::Patch => with_body(agent.patch(url)),
        };
        let mut response = result.map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        if request.options.redirect == RedirectPolicy::Error && (300..400).contains(&status) {
            return Err(ApiError::transport(format!(
                "redirect refused: {} answered {status}",
                request.url
            )));
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::transport(format!("failed to read response body: {e}")))?;

        debug!(status, url = %request.url, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
