//! Typed async client for the blog platform's REST backend.
//!
//! # Overview
//! Binds the backend's fixed endpoint set (posts, comments, users, auth)
//! and turns every failure into an `ApiError` carrying a readable message.
//!
//! # Design
//! - `Endpoints` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_json` consumes an `HttpResponse`.
//! - `Transport` is the only I/O seam; `ReqwestTransport` is the default and
//!   tests plug in fakes.
//! - `BlogApiClient` holds an immutable `ClientConfig`; there is no
//!   process-wide state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::BlogApiClient;
pub use config::ClientConfig;
pub use endpoints::{parse_json, Endpoints, RequestOptions};
pub use error::{ApiError, Failure, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Comment, CommentInput, Credentials, NewPost, NewUser, Post, User};
