//! Caller-facing operations: remote call first, local mutation on success.
//!
//! # Design
//! `PostsSession` owns the collection and the config store, so every
//! mutation runs to completion under `&mut self`. It performs no ordering
//! across calls: two updates of the same post land in the order they
//! complete. A failed call leaves the collection untouched, records its
//! message as `last_error`, and is returned to the caller unchanged.

use tracing::{debug, info, warn};

use crate::client::{Fetched, PostsClient};
use crate::collection::PostCollection;
use crate::config::{FetchConfigStore, RequestConfig, RequestConfigPatch};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Post, PostDraft};
use crate::view::{view, ViewState};

/// Page size the demo list loads with.
pub const DEFAULT_LIMIT: usize = 10;

pub struct PostsSession<T = UreqTransport> {
    client: PostsClient,
    transport: T,
    posts: PostCollection,
    config: FetchConfigStore,
    last_error: Option<String>,
}

impl PostsSession<UreqTransport> {
    pub fn from_settings(settings: Settings) -> Self {
        let client = PostsClient::new(&settings.base_url);
        Self::new(client, UreqTransport::new(settings))
    }

    pub fn from_env() -> Self {
        Self::from_settings(Settings::from_env())
    }
}

impl<T: Transport> PostsSession<T> {
    pub fn new(client: PostsClient, transport: T) -> Self {
        Self {
            client,
            transport,
            posts: PostCollection::new(),
            config: FetchConfigStore::default(),
            last_error: None,
        }
    }

    pub fn client(&self) -> &PostsClient {
        &self.client
    }

    pub fn posts(&self) -> &PostCollection {
        &self.posts
    }

    /// Message of the most recent failed call; cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn get_config(&self) -> RequestConfig {
        self.config.current()
    }

    pub fn set_config(&mut self, patch: RequestConfigPatch) {
        self.config.update(patch);
        debug!(config = ?self.config.current(), "fetch config updated");
    }

    pub fn get_view(&self, state: &ViewState) -> Vec<Post> {
        view(&self.posts, state)
    }

    /// One call to `url` with the current config exactly as configured.
    /// The collection is not touched.
    pub fn execute(&mut self, url: &str) -> Result<Fetched, ApiError> {
        let request = self.client.build_request(url, &self.config.current());
        let result = self
            .send(&request)
            .and_then(|response| self.client.parse_fetched(response));
        self.record(result)
    }

    /// Fetch up to `limit` posts and make them the whole collection.
    pub fn load_all(&mut self, limit: usize) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_list_posts(limit, &self.config.current());
        let result = self
            .send(&request)
            .and_then(|response| self.client.parse_list_posts(response));
        let posts = self.record(result)?;
        self.posts.replace_all(posts.clone());
        info!(count = self.posts.len(), "loaded posts");
        Ok(posts)
    }

    /// Create `draft` remotely, then append the server's echo under a local
    /// id of `max(ids) + 1`.
    pub fn add_record(&mut self, draft: PostDraft) -> Result<Post, ApiError> {
        let result = self
            .client
            .build_create_post(&draft, &self.config.current())
            .and_then(|request| self.send(&request))
            .and_then(|response| self.client.parse_post(response));
        let created = self.record(result)?;
        let server_id = created.id;
        let post = self.posts.insert_optimistic(PostDraft::from(created));
        debug!(server_id, local_id = post.id, "added post");
        Ok(post)
    }

    /// Send `post` as a full replacement, then store it locally.
    pub fn update_record(&mut self, post: Post) -> Result<(), ApiError> {
        let result = self
            .client
            .build_update_post(&post, &self.config.current())
            .and_then(|request| self.send(&request))
            .and_then(|response| self.client.parse_post(response));
        self.record(result)?;
        let id = post.id;
        let replaced = self.posts.replace(id, post);
        self.record(replaced)
    }

    /// Delete remotely, then drop the post locally if present.
    pub fn delete_record(&mut self, id: u64) -> Result<(), ApiError> {
        let request = self.client.build_delete_post(id, &self.config.current());
        let result = self
            .send(&request)
            .and_then(|response| self.client.parse_delete_post(response));
        self.record(result)?;
        if !self.posts.remove(id) {
            debug!(id, "deleted post was not held locally");
        }
        Ok(())
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request)
    }

    fn record<R>(&mut self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "posts call failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::http::{CachePolicy, HttpMethod};

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, cause: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::transport(cause)));
            self
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::transport("no scripted response")))
        }
    }

    const TWO_POSTS: &str = r#"[
        {"id":1,"title":"first","body":"one","userId":1},
        {"id":2,"title":"second","body":"two","userId":2}
    ]"#;

    fn session(transport: ScriptedTransport) -> PostsSession<ScriptedTransport> {
        PostsSession::new(PostsClient::new("http://api.test"), transport)
    }

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            body: "b".to_string(),
            author_id: 1,
        }
    }

    #[test]
    fn load_all_replaces_collection() {
        let mut s = session(ScriptedTransport::default().respond(200, TWO_POSTS));
        let loaded = s.load_all(DEFAULT_LIMIT).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(s.posts().ids(), vec![1, 2]);

        let seen = s.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "http://api.test/posts?_limit=10");
    }

    #[test]
    fn add_record_uses_local_id_over_server_id() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, TWO_POSTS)
                .respond(201, r#"{"id":101,"title":"new","body":"b","userId":3}"#)
                .respond(201, r#"{"id":101,"title":"newer","body":"b","userId":3}"#),
        );
        s.load_all(DEFAULT_LIMIT).unwrap();

        let added = s.add_record(PostDraft::new("new", "b", 3)).unwrap();
        assert_eq!(added.id, 3);
        assert_eq!(added.author_id, 3);

        let again = s.add_record(PostDraft::new("newer", "b", 3)).unwrap();
        assert_eq!(again.id, 4);
        assert_eq!(s.posts().ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn add_record_into_empty_session_gets_id_one() {
        let mut s = session(
            ScriptedTransport::default().respond(201, r#"{"id":101,"title":"A","body":"B","userId":2}"#),
        );
        let added = s.add_record(PostDraft::new("A", "B", 2)).unwrap();
        assert_eq!(added.id, 1);
    }

    #[test]
    fn http_404_leaves_collection_unchanged() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, TWO_POSTS)
                .respond(404, "{}"),
        );
        s.load_all(DEFAULT_LIMIT).unwrap();
        let before = s.posts().clone();

        let err = s.delete_record(1).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
        assert_eq!(s.posts(), &before);
        assert_eq!(s.last_error(), Some("HTTP error! status: 404"));
    }

    #[test]
    fn update_record_replaces_in_place() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, TWO_POSTS)
                .respond(200, r#"{"id":1,"title":"edited","body":"b","userId":1}"#),
        );
        s.load_all(DEFAULT_LIMIT).unwrap();
        s.update_record(post(1, "edited")).unwrap();
        assert_eq!(s.posts().ids(), vec![1, 2]);
        assert_eq!(s.posts().get(1).unwrap().title, "edited");
        assert_eq!(s.transport.seen.borrow()[1].method, HttpMethod::Put);
    }

    #[test]
    fn update_of_unknown_id_is_not_found_after_remote_success() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, TWO_POSTS)
                .respond(200, r#"{"id":99,"title":"x","body":"b","userId":1}"#),
        );
        s.load_all(DEFAULT_LIMIT).unwrap();
        let before = s.posts().clone();
        let err = s.update_record(post(99, "x")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { id: 99 }));
        assert_eq!(s.posts(), &before);
        assert!(s.last_error().is_some());
    }

    #[test]
    fn delete_of_absent_id_is_not_an_error() {
        let mut s = session(ScriptedTransport::default().respond(200, "{}"));
        s.delete_record(42).unwrap();
        assert!(s.posts().is_empty());
    }

    #[test]
    fn last_error_clears_on_next_success() {
        let mut s = session(
            ScriptedTransport::default()
                .fail("connection reset")
                .respond(200, TWO_POSTS),
        );
        let err = s.load_all(DEFAULT_LIMIT).unwrap_err();
        assert!(err.is_transport());
        assert!(s.posts().is_empty());
        assert_eq!(s.last_error(), Some("transport error: connection reset"));

        s.load_all(DEFAULT_LIMIT).unwrap();
        assert!(s.last_error().is_none());
        assert_eq!(s.posts().len(), 2);
    }

    #[test]
    fn malformed_body_is_transport_class_and_unchanged() {
        let mut s = session(ScriptedTransport::default().respond(200, "<html>"));
        let err = s.load_all(DEFAULT_LIMIT).unwrap_err();
        assert!(err.is_transport());
        assert!(s.posts().is_empty());
    }

    #[test]
    fn config_options_flow_into_every_request() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, "[]")
                .respond(201, r#"{"id":1,"title":"A","body":"B","userId":1}"#),
        );
        s.set_config(RequestConfigPatch {
            method: Some(HttpMethod::Head),
            cache: Some(CachePolicy::NoStore),
            ..RequestConfigPatch::default()
        });
        s.load_all(5).unwrap();
        s.add_record(PostDraft::new("A", "B", 1)).unwrap();

        let seen = s.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[1].method, HttpMethod::Post);
        for request in seen.iter() {
            assert_eq!(request.options.cache, CachePolicy::NoStore);
        }
        assert_eq!(s.get_config().method, HttpMethod::Head);
    }

    #[test]
    fn execute_sends_config_verbatim_without_mutating() {
        let mut s = session(
            ScriptedTransport::default().respond(200, r#"{"id":5,"title":"t","body":"b","userId":1}"#),
        );
        s.set_config(RequestConfigPatch {
            method: Some(HttpMethod::Patch),
            body: Some(Some(r#"{"title":"t"}"#.to_string())),
            ..RequestConfigPatch::default()
        });
        let fetched = s.execute("http://api.test/posts/5").unwrap();
        assert_eq!(fetched.into_vec()[0].id, 5);
        assert!(s.posts().is_empty());

        let seen = s.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"title":"t"}"#));
    }

    #[test]
    fn execute_delete_with_ignorable_body_succeeds() {
        let mut s = session(
            ScriptedTransport::default()
                .respond(200, TWO_POSTS)
                .respond(500, "boom")
                .respond(200, "{}"),
        );
        s.load_all(DEFAULT_LIMIT).unwrap();
        s.set_config(RequestConfigPatch::method(HttpMethod::Delete));

        assert!(s.execute("http://api.test/posts/1").is_err());
        assert!(s.last_error().is_some());

        let fetched = s.execute("http://api.test/posts/1").unwrap();
        assert_eq!(fetched, Fetched::Other(serde_json::json!({})));
        assert!(s.last_error().is_none());
        assert_eq!(s.posts().ids(), vec![1, 2]);
        assert_eq!(s.transport.seen.borrow()[2].method, HttpMethod::Delete);
    }

    #[test]
    fn execute_head_with_empty_body_succeeds() {
        let mut s = session(ScriptedTransport::default().respond(200, ""));
        s.set_config(RequestConfigPatch::method(HttpMethod::Head));

        let fetched = s.execute("http://api.test/posts").unwrap();
        assert_eq!(fetched, Fetched::Empty);
        assert!(s.last_error().is_none());
    }

    #[test]
    fn get_view_reads_current_collection() {
        let mut s = session(ScriptedTransport::default().respond(200, TWO_POSTS));
        s.load_all(DEFAULT_LIMIT).unwrap();
        let state = ViewState {
            filter_text: "SEC".to_string(),
            ..ViewState::default()
        };
        let shown = s.get_view(&state);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 2);
    }
}
