//! Async execution of `HttpRequest` values.
//!
//! `ReqwestTransport` keeps two reqwest clients that share one cookie jar.
//! Credentialed requests go through the jar-backed client, so the session
//! cookie set by `/login` is sent back on later credentialed calls only.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. Non-2xx statuses are returned as
/// `HttpResponse` data; `Err` means no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    plain: reqwest::Client,
    credentialed: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let plain = reqwest::Client::builder().build()?;
        let credentialed = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(Self {
            plain,
            credentialed,
            jar,
        })
    }

    /// The session cookie store shared by all credentialed requests.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = if request.credentialed {
            &self.credentialed
        } else {
            &self.plain
        };

        let mut builder = client.request(method(request.method), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
