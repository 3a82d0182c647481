//! Stateless request builders and response parser for the blog API.
//!
//! # Design
//! `Endpoints` holds only the base URL and credential policy. Each backend
//! operation has a `build_*` method that produces an `HttpRequest`; every
//! response goes through the single `parse_json`. No method here performs
//! I/O, so URL layout, credential flags and body encoding are all checked
//! in plain unit tests.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ApiError, Failure};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CommentInput, Credentials, NewPost, NewUser};

pub const MISSING_POST_ID: &str = "Post ID is undefined";

/// Per-call options for the comment edit/delete operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the client's credential policy for this call.
    pub credentialed: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn credentialed() -> Self {
        Self {
            credentialed: Some(true),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    with_credentials: bool,
}

impl Endpoints {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            with_credentials: config.with_credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, credentialed: bool) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            credentialed: credentialed || self.with_credentials,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
        credentialed: bool,
    ) -> Result<HttpRequest, Failure> {
        let body = serde_json::to_string(body).map_err(Failure::Encode)?;
        let mut req = self.request(method, path, credentialed);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    fn with_options(&self, mut req: HttpRequest, options: &RequestOptions) -> HttpRequest {
        req.credentialed = options.credentialed.unwrap_or(self.with_credentials);
        req.headers.extend(options.headers.iter().cloned());
        req
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/posts", false)
    }

    pub fn build_recent_posts(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/posts/recent", false)
    }

    pub fn build_search_posts(&self, query: &str) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/posts/search", false);
        req.query.push(("query".to_string(), query.to_string()));
        req
    }

    /// Fails with `ApiError::Validation` when `post_id` is absent or renders
    /// as `""` or `"0"`.
    pub fn build_get_post<I: Display>(&self, post_id: Option<I>) -> Result<HttpRequest, ApiError> {
        let post_id = post_id
            .map(|id| id.to_string())
            .filter(|id| !id.is_empty() && id != "0")
            .ok_or_else(|| ApiError::Validation(MISSING_POST_ID.to_string()))?;
        Ok(self.request(HttpMethod::Get, &format!("/posts/{post_id}"), false))
    }

    pub fn build_create_post(&self, post: &NewPost) -> Result<HttpRequest, Failure> {
        self.json_request(HttpMethod::Post, "/posts", post, false)
    }

    pub fn build_delete_post(&self, post_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/posts/{post_id}"), false)
    }

    pub fn build_list_comments(&self, post_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/posts/{post_id}/comments"), false)
    }

    pub fn build_add_comment(
        &self,
        post_id: impl Display,
        comment: &CommentInput,
    ) -> Result<HttpRequest, Failure> {
        self.json_request(
            HttpMethod::Post,
            &format!("/posts/{post_id}/comments"),
            comment,
            true,
        )
    }

    pub fn build_edit_comment(
        &self,
        comment_id: impl Display,
        comment: &CommentInput,
        options: &RequestOptions,
    ) -> Result<HttpRequest, Failure> {
        let req = self.json_request(
            HttpMethod::Put,
            &format!("/comments/{comment_id}"),
            comment,
            false,
        )?;
        Ok(self.with_options(req, options))
    }

    pub fn build_delete_comment(
        &self,
        comment_id: impl Display,
        options: &RequestOptions,
    ) -> HttpRequest {
        let req = self.request(HttpMethod::Delete, &format!("/comments/{comment_id}"), false);
        self.with_options(req, options)
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, Failure> {
        self.json_request(HttpMethod::Post, "/login", credentials, true)
    }

    pub fn build_register(&self, user: &NewUser) -> Result<HttpRequest, Failure> {
        self.json_request(HttpMethod::Post, "/register", user, false)
    }

    pub fn build_posts_for_user(&self, user_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/users/{user_id}/posts"), false)
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/users", false)
    }

    pub fn build_delete_user(&self, user_id: impl Display) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/users/{user_id}"), false)
    }
}

/// Decode a 2xx body, or report the status and raw body as a `Failure`.
///
/// An empty body decodes as JSON `null`, which covers `204 No Content`
/// acknowledgements.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, Failure> {
    if !response.is_success() {
        return Err(Failure::Status {
            status: response.status,
            body: response.body,
        });
    }
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(Failure::Decode)
}
