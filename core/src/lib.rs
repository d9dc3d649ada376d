//! Fetch-configuration-driven CRUD state manager for a JSON posts API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values as plain
//! data (host-does-IO), with a `Transport` performing the one network call
//! per operation. Successful calls are mirrored into a local
//! `PostCollection`, and `view` derives the filtered, sorted list from it.
//!
//! # Design
//! - `PostsClient` is stateless — it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `FetchConfigStore` holds the user's fetch options; every request is
//!   built from a snapshot of it.
//! - `PostsSession` ties the pieces together: remote call first, local
//!   mutation only on success, no retry.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod settings;
pub mod transport;
pub mod types;
pub mod view;

pub use client::{Fetched, PostsClient};
pub use collection::PostCollection;
pub use config::{FetchConfigStore, RequestConfig, RequestConfigPatch};
pub use error::ApiError;
pub use http::{
    CachePolicy, CredentialsPolicy, HttpMethod, HttpRequest, HttpResponse, RedirectPolicy,
    ReferrerPolicy, RequestMode, RequestOptions,
};
pub use session::{PostsSession, DEFAULT_LIMIT};
pub use settings::Settings;
pub use transport::{Transport, UreqTransport};
pub use types::{Post, PostDraft};
pub use view::{view, SortDirection, SortKey, ViewState};
