//! HTTP transport types shared by the request builders and the transports.
//!
//! # Design
//! Requests and responses are plain data. `Endpoints` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! `Transport` performs the round-trip in between. Keeping the two apart lets
//! every endpoint binding be tested without sockets.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `credentialed` requests carry the session cookie jar; all others are sent
/// without cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentialed: bool,
}

/// An HTTP response described as plain data. Non-2xx statuses are carried
/// here rather than reported as transport errors.
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
