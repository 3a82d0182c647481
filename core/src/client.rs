//! Async blog API client.
//!
//! # Design
//! `BlogApiClient` pairs the sans-IO `Endpoints` with a `Transport`. Every
//! operation is one request with no retry or caching. All failures pass
//! through `Failure::normalize` with an operation-specific fallback message;
//! `register` maps 409 first and `get_post` validates its id before any I/O.
//! `list_posts` is the one best-effort operation and never fails;
//! `try_list_posts` is its strict counterpart.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoints::{parse_json, Endpoints, RequestOptions};
use crate::error::{ApiError, Failure};
use crate::http::HttpRequest;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Comment, CommentInput, Credentials, NewPost, NewUser, Post, User};

pub const LIST_POSTS_FAILED: &str = "Failed to fetch posts";
pub const RECENT_POSTS_FAILED: &str = "Failed to fetch recent posts";
pub const SEARCH_FAILED: &str = "An unexpected error occurred while searching posts.";
pub const GET_POST_FAILED: &str = "Failed to fetch post";
pub const CREATE_POST_FAILED: &str = "Failed to create post";
pub const DELETE_POST_FAILED: &str = "Failed to delete post";
pub const LIST_COMMENTS_FAILED: &str = "Failed to fetch comments";
pub const ADD_COMMENT_FAILED: &str = "An unexpected error occurred.";
pub const EDIT_COMMENT_FAILED: &str = "Failed to edit comment";
pub const DELETE_COMMENT_FAILED: &str = "Failed to delete comment";
pub const LOGIN_FAILED: &str = "Login failed";
pub const USER_EXISTS: &str = "A user with this email already exists.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
pub const USER_POSTS_FAILED: &str = "Failed to fetch posts for user";
pub const LIST_USERS_FAILED: &str = "Failed to fetch users";
pub const DELETE_USER_FAILED: &str = "Failed to delete user";

pub struct BlogApiClient<T = ReqwestTransport> {
    config: ClientConfig,
    endpoints: Endpoints,
    transport: Arc<T>,
}

impl<T> Clone for BlogApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            endpoints: self.endpoints.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for BlogApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlogApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BlogApiClient<ReqwestTransport> {
    /// Client backed by reqwest with a private cookie jar.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new().map_err(|e| ApiError::Transport {
            message: e.to_string(),
        })?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> BlogApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            endpoints: Endpoints::new(&config),
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn exchange<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, Failure>,
    ) -> Result<R, Failure> {
        let request = request?;
        debug!(
            operation,
            method = request.method.as_str(),
            url = %request.url,
            credentialed = request.credentialed,
            "sending request"
        );
        let response = self.transport.execute(request).await?;
        parse_json(response)
    }

    async fn call<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, Failure>,
        fallback: &str,
    ) -> Result<R, ApiError> {
        self.exchange(operation, request)
            .await
            .map_err(|failure| {
                log_failure(operation, &failure);
                failure.normalize(fallback)
            })
    }

    /// All posts. Best-effort: any failure is logged and yields an empty list.
    pub async fn list_posts(&self) -> Vec<Post> {
        self.try_list_posts().await.unwrap_or_default()
    }

    pub async fn try_list_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.call("list_posts", Ok(self.endpoints.build_list_posts()), LIST_POSTS_FAILED)
            .await
    }

    pub async fn recent_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.call(
            "recent_posts",
            Ok(self.endpoints.build_recent_posts()),
            RECENT_POSTS_FAILED,
        )
        .await
    }

    pub async fn search_posts(&self, query: &str) -> Result<Vec<Post>, ApiError> {
        self.call(
            "search_posts",
            Ok(self.endpoints.build_search_posts(query)),
            SEARCH_FAILED,
        )
        .await
    }

    /// Fails with `ApiError::Validation` and sends nothing when `post_id` is
    /// `None`, empty or zero.
    pub async fn get_post<I: Display>(&self, post_id: Option<I>) -> Result<Post, ApiError> {
        let request = self.endpoints.build_get_post(post_id)?;
        self.call("get_post", Ok(request), GET_POST_FAILED).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.call(
            "create_post",
            self.endpoints.build_create_post(post),
            CREATE_POST_FAILED,
        )
        .await
    }

    pub async fn delete_post(&self, post_id: impl Display) -> Result<Value, ApiError> {
        self.call(
            "delete_post",
            Ok(self.endpoints.build_delete_post(post_id)),
            DELETE_POST_FAILED,
        )
        .await
    }

    pub async fn list_comments(&self, post_id: impl Display) -> Result<Vec<Comment>, ApiError> {
        self.call(
            "list_comments",
            Ok(self.endpoints.build_list_comments(post_id)),
            LIST_COMMENTS_FAILED,
        )
        .await
    }

    pub async fn add_comment(
        &self,
        post_id: impl Display,
        comment: &CommentInput,
    ) -> Result<Comment, ApiError> {
        self.call(
            "add_comment",
            self.endpoints.build_add_comment(post_id, comment),
            ADD_COMMENT_FAILED,
        )
        .await
    }

    pub async fn edit_comment(
        &self,
        comment_id: impl Display,
        comment: &CommentInput,
        options: &RequestOptions,
    ) -> Result<Comment, ApiError> {
        self.call(
            "edit_comment",
            self.endpoints.build_edit_comment(comment_id, comment, options),
            EDIT_COMMENT_FAILED,
        )
        .await
    }

    pub async fn delete_comment(
        &self,
        comment_id: impl Display,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        self.call(
            "delete_comment",
            Ok(self.endpoints.build_delete_comment(comment_id, options)),
            DELETE_COMMENT_FAILED,
        )
        .await
    }

    /// On success the session cookie is kept for later credentialed calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call("login", self.endpoints.build_login(&credentials), LOGIN_FAILED)
            .await
    }

    pub async fn register(&self, user: &NewUser) -> Result<Value, ApiError> {
        self.exchange("register", self.endpoints.build_register(user))
            .await
            .map_err(|failure| {
                log_failure("register", &failure);
                match failure.status() {
                    Some(409) => ApiError::Server {
                        status: 409,
                        message: USER_EXISTS.to_string(),
                    },
                    _ => failure.normalize(REGISTRATION_FAILED),
                }
            })
    }

    pub async fn posts_for_user(&self, user_id: impl Display) -> Result<Vec<Post>, ApiError> {
        self.call(
            "posts_for_user",
            Ok(self.endpoints.build_posts_for_user(user_id)),
            USER_POSTS_FAILED,
        )
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.call("list_users", Ok(self.endpoints.build_list_users()), LIST_USERS_FAILED)
            .await
    }

    pub async fn delete_user(&self, user_id: impl Display) -> Result<Value, ApiError> {
        self.call(
            "delete_user",
            Ok(self.endpoints.build_delete_user(user_id)),
            DELETE_USER_FAILED,
        )
        .await
    }
}

fn log_failure(operation: &'static str, failure: &Failure) {
    warn!(operation, status = ?failure.status(), error = %failure, "request failed");
}
