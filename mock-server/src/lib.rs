use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
const RECENT_LIMIT: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct CommentInput {
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Failures rendered as `{"message": ...}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Unauthenticated.")]
    Unauthenticated,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("The email has already been taken.")]
    EmailTaken,
    #[error("{0}")]
    Invalid(String),
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match self {
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::Unauthenticated | BackendError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            BackendError::EmailTaken => StatusCode::CONFLICT,
            BackendError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    posts: BTreeMap<u64, Post>,
    comments: BTreeMap<u64, Comment>,
    users: BTreeMap<u64, (User, String)>,
    sessions: HashMap<String, u64>,
}

impl Store {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn session_user(&self, jar: &CookieJar) -> Option<u64> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.sessions.get(cookie.value()).copied())
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/recent", get(recent_posts))
        .route("/posts/search", get(search_posts))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/comments", get(list_comments).post(add_comment))
        .route("/comments/{id}", put(edit_comment).delete(delete_comment))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/posts", get(posts_for_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(store.posts.values().cloned().collect())
}

async fn recent_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(store.posts.values().rev().take(RECENT_LIMIT).cloned().collect())
}

async fn search_posts(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Post>>, BackendError> {
    let needle = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| BackendError::Invalid("The query field is required.".to_string()))?
        .to_lowercase();
    let store = db.read().await;
    Ok(Json(
        store
            .posts
            .values()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle) || p.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect(),
    ))
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, BackendError> {
    let store = db.read().await;
    store
        .posts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(BackendError::NotFound("Post"))
}

async fn create_post(
    State(db): State<Db>,
    jar: CookieJar,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    let user_id = store.session_user(&jar).or(input.user_id);
    let post = Post {
        id: store.allocate_id(),
        title: input.title,
        content: input.content,
        user_id,
        extra: input.extra,
    };
    store.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, BackendError> {
    let mut store = db.write().await;
    store.posts.remove(&id).ok_or(BackendError::NotFound("Post"))?;
    store.comments.retain(|_, c| c.post_id != id);
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}

async fn list_comments(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let store = db.read().await;
    if !store.posts.contains_key(&id) {
        return Err(BackendError::NotFound("Post"));
    }
    Ok(Json(
        store
            .comments
            .values()
            .filter(|c| c.post_id == id)
            .cloned()
            .collect(),
    ))
}

async fn add_comment(
    State(db): State<Db>,
    Path(id): Path<u64>,
    jar: CookieJar,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<Comment>), BackendError> {
    let mut store = db.write().await;
    let user_id = store
        .session_user(&jar)
        .ok_or(BackendError::Unauthenticated)?;
    if !store.posts.contains_key(&id) {
        return Err(BackendError::NotFound("Post"));
    }
    let comment = Comment {
        id: store.allocate_id(),
        post_id: id,
        content: input.content,
        user_id: Some(user_id),
        extra: input.extra,
    };
    store.comments.insert(comment.id, comment.clone());
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn edit_comment(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<CommentInput>,
) -> Result<Json<Comment>, BackendError> {
    let mut store = db.write().await;
    let comment = store
        .comments
        .get_mut(&id)
        .ok_or(BackendError::NotFound("Comment"))?;
    comment.content = input.content;
    comment.extra.extend(input.extra);
    Ok(Json(comment.clone()))
}

async fn delete_comment(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, BackendError> {
    let mut store = db.write().await;
    store
        .comments
        .remove(&id)
        .ok_or(BackendError::NotFound("Comment"))?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

async fn login(
    State(db): State<Db>,
    jar: CookieJar,
    Json(input): Json<Login>,
) -> Result<impl IntoResponse, BackendError> {
    let mut store = db.write().await;
    let user = store
        .users
        .values()
        .find(|(user, password)| {
            user.email.eq_ignore_ascii_case(&input.email) && *password == input.password
        })
        .map(|(user, _)| user.clone())
        .ok_or(BackendError::InvalidCredentials)?;

    let token = Uuid::new_v4().to_string();
    store.sessions.insert(token.clone(), user.id);
    info!(user_id = user.id, "user logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true);
    Ok((
        jar.add(cookie),
        Json(json!({ "message": "Login successful", "user": user })),
    ))
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Registration>,
) -> Result<(StatusCode, Json<Value>), BackendError> {
    for (field, value) in [
        ("name", &input.name),
        ("email", &input.email),
        ("password", &input.password),
    ] {
        if value.trim().is_empty() {
            return Err(BackendError::Invalid(format!("The {field} field is required.")));
        }
    }

    let mut store = db.write().await;
    if store
        .users
        .values()
        .any(|(user, _)| user.email.eq_ignore_ascii_case(&input.email))
    {
        return Err(BackendError::EmailTaken);
    }
    let user = User {
        id: store.allocate_id(),
        name: input.name,
        email: input.email,
    };
    store.users.insert(user.id, (user.clone(), input.password));
    info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    ))
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.users.values().map(|(user, _)| user.clone()).collect())
}

async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, BackendError> {
    let mut store = db.write().await;
    store.users.remove(&id).ok_or(BackendError::NotFound("User"))?;
    store.sessions.retain(|_, user_id| *user_id != id);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn posts_for_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Post>>, BackendError> {
    let store = db.read().await;
    if !store.users.contains_key(&id) {
        return Err(BackendError::NotFound("User"));
    }
    Ok(Json(
        store
            .posts
            .values()
            .filter(|p| p.user_id == Some(id))
            .cloned()
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap};

    use super::*;

    #[test]
    fn post_serializes_extra_fields_inline() {
        let mut extra = Map::new();
        extra.insert("tags".to_string(), json!(["a"]));
        let post = Post {
            id: 1,
            title: "Test".to_string(),
            content: "Body".to_string(),
            user_id: None,
            extra,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json, json!({"id": 1, "title": "Test", "content": "Body", "tags": ["a"]}));
    }

    #[test]
    fn new_post_rejects_missing_title() {
        let result: Result<NewPost, _> = serde_json::from_str(r#"{"content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn registration_fields_default_to_empty() {
        let input: Registration = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_empty());
        assert!(input.email.is_empty());
    }

    #[test]
    fn backend_error_statuses() {
        assert_eq!(
            BackendError::EmailTaken.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BackendError::NotFound("Post").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(BackendError::NotFound("Post").to_string(), "Post not found");
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut store = Store::default();
        store.sessions.insert("abc".to_string(), 7);
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; session=abc".parse().unwrap());
        assert_eq!(store.session_user(&CookieJar::from_headers(&headers)), Some(7));

        headers.insert(header::COOKIE, "session=unknown".parse().unwrap());
        assert_eq!(store.session_user(&CookieJar::from_headers(&headers)), None);

        assert_eq!(store.session_user(&CookieJar::new()), None);
    }
}
