//! Authenticated request/response plumbing to the study backend.
//!
//! Every call carries the configured session cookie (plus any cookie the
//! server sets during the session) and comes back as a status flag and a
//! JSON payload. Anything short of that is a `TransportError`: the caller
//! must treat the outcome as unknown. Nothing here retries.

use reqwest::blocking::{Client, Request};
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid server URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid session cookie")]
    InvalidCookie,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server replied {status} with a non-JSON body: {source}")]
    InvalidBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request body. Structured payloads go out as JSON, raw text as `text/plain`.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub ok: bool,
    pub payload: Value,
}

impl Response {
    pub fn new(status: u16, payload: Value) -> Self {
        Self {
            status,
            ok: (200..300).contains(&status),
            payload,
        }
    }
}

pub trait Transport {
    fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
    ) -> Result<Response, TransportError>;
}

/// Blocking HTTP transport. Calls are made from a worker thread so the UI
/// keeps drawing while a request is outstanding.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    session_cookie: Option<HeaderValue>,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        session_cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        // Normalize URL - no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(TransportError::InvalidUrl {
                url: base_url,
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        let session_cookie = session_cookie
            .map(|cookie| {
                let mut value =
                    HeaderValue::from_str(cookie).map_err(|_| TransportError::InvalidCookie)?;
                value.set_sensitive(true);
                Ok::<_, TransportError>(value)
            })
            .transpose()?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session_cookie,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/api/study/due`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn build_request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
    ) -> Result<Request, TransportError> {
        let mut builder = self
            .client
            .request(method.into(), self.url(endpoint))
            .header(ACCEPT, "application/json");

        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(COOKIE, cookie.clone());
        }

        builder = match body {
            Some(Body::Json(value)) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            Some(Body::Text(text)) => builder.header(CONTENT_TYPE, "text/plain").body(text),
            None => builder,
        };

        Ok(builder.build()?)
    }
}

impl Transport for HttpTransport {
    fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
    ) -> Result<Response, TransportError> {
        let request = self.build_request(endpoint, method, body)?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).map_err(|e| {
            error!(endpoint, error = %e, "request failed");
            e
        })?;

        let status = response.status().as_u16();
        let text = response.text()?;
        let payload = serde_json::from_str(&text).map_err(|source| {
            error!(endpoint, status, "response body is not JSON");
            TransportError::InvalidBody { status, source }
        })?;

        debug!(endpoint, status, "response received");
        Ok(Response::new(status, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(cookie: Option<&str>) -> HttpTransport {
        HttpTransport::new("http://127.0.0.1:5000/", cookie, Duration::from_secs(5)).unwrap()
    }

    fn body_text(request: &Request) -> String {
        let bytes = request
            .body()
            .and_then(|b| b.as_bytes())
            .unwrap_or_default();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport = transport(None);
        assert_eq!(transport.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            transport.url("/api/study/due"),
            "http://127.0.0.1:5000/api/study/due"
        );
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = HttpTransport::new("ftp://example.com", None, Duration::from_secs(5));
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));

        let result = HttpTransport::new("not a url", None, Duration::from_secs(5));
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }

    #[test]
    fn test_rejects_cookie_with_newline() {
        let result = HttpTransport::new(
            "http://localhost",
            Some("session=abc\nX-Evil: 1"),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(TransportError::InvalidCookie)));
    }

    #[test]
    fn test_session_cookie_on_every_request() {
        let transport = transport(Some("session=abc123"));

        for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
            let request = transport.build_request("/api/user", method, None).unwrap();
            assert_eq!(request.headers()[COOKIE], "session=abc123");
            assert_eq!(request.headers()[ACCEPT], "application/json");
        }
    }

    #[test]
    fn test_json_body() {
        let transport = transport(None);
        let request = transport
            .build_request(
                "/api/study/review/3",
                Method::Post,
                Some(Body::Json(json!({ "quality": 4 }))),
            )
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(&request), r#"{"quality":4}"#);
        assert!(request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn test_text_body() {
        let transport = transport(None);
        let request = transport
            .build_request(
                "/api/import/mnemosyne",
                Method::Post,
                Some(Body::Text("q\ta".to_string())),
            )
            .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(&request), "q\ta");
    }

    #[test]
    fn test_get_has_no_content_type() {
        let transport = transport(None);
        let request = transport
            .build_request("/api/study/due", Method::Get, None)
            .unwrap();

        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_response_ok_flag() {
        assert!(Response::new(200, json!({})).ok);
        assert!(Response::new(204, json!(null)).ok);
        assert!(!Response::new(400, json!({})).ok);
        assert!(!Response::new(500, json!({})).ok);
    }
}
