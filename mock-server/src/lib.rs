use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Body of `POST /posts` and `PUT /posts/{id}`. An `id` in the body is ignored.
#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "userId", default)]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct PatchPost {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

/// Query string of `GET /posts`. Both the JSONPlaceholder spelling `_limit`
/// and plain `limit` are accepted; `_limit` wins when both are present.
#[derive(Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_limit")]
    pub underscore_limit: Option<usize>,
    pub limit: Option<usize>,
}

impl ListParams {
    fn effective_limit(&self) -> Option<usize> {
        self.underscore_limit.or(self.limit)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    posts: BTreeMap<u64, Post>,
    next_id: u64,
}

impl Store {
    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let posts: BTreeMap<u64, Post> = posts.into_iter().map(|p| (p.id, p)).collect();
        let next_id = posts.keys().next_back().map_or(1, |max| max + 1);
        Self { posts, next_id }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_posts(Vec::new())
}

/// Router seeded with `posts`. New posts get ids above the highest seeded id.
pub fn app_with_posts(posts: Vec<Post>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::with_posts(posts)));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(replace_post).patch(patch_post).delete(delete_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_app(listener, app()).await
}

pub async fn run_app(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn list_posts(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Post>> {
    let store = db.read().await;
    let limit = params.effective_limit().unwrap_or(usize::MAX);
    Json(store.posts.values().take(limit).cloned().collect())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    let post = Post {
        id: store.allocate_id(),
        title: input.title,
        body: input.body,
        user_id: input.user_id,
    };
    store.posts.insert(post.id, post.clone());
    tracing::debug!(id = post.id, "created post");
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, StatusCode> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<CreatePost>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.title = input.title;
    post.body = input.body;
    post.user_id = input.user_id;
    Ok(Json(post.clone()))
}

async fn patch_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<PatchPost>,
) -> Result<Json<Post>, StatusCode> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut store = db.write().await;
    store
        .posts
        .remove(&id)
        .map(|_| Json(serde_json::json!({})))
        .ok_or(StatusCode::NOT_FOUND)
}
