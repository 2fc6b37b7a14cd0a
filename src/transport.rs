//! HTTP transport shared by all service clients.
//!
//! Service clients build an [`HttpRequest`], hand it to an [`HttpTransport`] and interpret the
//! [`HttpResponse`] themselves. The transport has no business logic: it does not look at status
//! codes and it never retries.
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{error::TransportError, Error, Result};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request with the standard JSON headers and, if `api_key` is non-empty, the
    /// `x-api-key` header.
    pub fn new(method: Method, url: impl Into<String>, api_key: &str) -> Self {
        HttpRequest {
            method,
            url: url.into(),
            headers: standard_headers(api_key),
            body: None,
        }
    }

    /// Serialize `body` as JSON and attach it to the request.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let body =
            serde_json::to_vec(body).map_err(|err| Error::Serialization(err.into()))?;
        self.body = Some(body);
        Ok(self)
    }
}

/// A response as received from the server. The body is fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Status line in the `"<code> <reason>"` form, e.g. `"404 Not Found"`.
    pub fn status_text(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }

    /// Fail with [`Error::UnexpectedStatus`] unless the status equals `expected`.
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(Error::UnexpectedStatus {
                status: self.status.as_u16(),
                status_text: self.status_text(),
            })
        }
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|err| Error::MalformedResponse(err.into()))
    }
}

/// Executes HTTP requests.
///
/// The default implementation is [`ReqwestTransport`]. Implementations must be safe to call
/// concurrently and should enforce their own per-request timeout.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the response, whatever its status code.
    ///
    /// An error means no response was received.
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    // Client holds a connection pool internally, so it is reused between requests.
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hyphen-rust/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| Error::HttpClient(err.into()))?;
        Ok(ReqwestTransport { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Standard JSON headers plus `x-api-key` when `api_key` is non-empty.
pub fn standard_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if !api_key.is_empty() {
        match HeaderValue::from_str(api_key) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
            }
            Err(_) => {
                log::warn!(target: "hyphen", "API key contains characters not allowed in a header, sending request without it");
            }
        }
    }
    headers
}

/// In-process transport used by the service clients' tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use reqwest::{header::HeaderMap, StatusCode};

    use super::{HttpRequest, HttpResponse, HttpTransport};
    use crate::error::TransportError;

    type Handler =
        Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

    /// Answers every request with `handler` and records what was sent.
    pub(crate) struct FakeTransport {
        handler: Handler,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn new(
            handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError>
                + Send
                + Sync
                + 'static,
        ) -> Arc<Self> {
            Arc::new(FakeTransport {
                handler: Box::new(handler),
                requests: Mutex::new(Vec::new()),
            })
        }

        /// Always responds with `status` and `body`.
        pub(crate) fn json(status: u16, body: serde_json::Value) -> Arc<Self> {
            Self::new(move |_| Ok(response(status, &body)))
        }

        /// Always fails as if the server were unreachable.
        pub(crate) fn unreachable() -> Arc<Self> {
            Self::new(|_| Err("connection refused".into()))
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("no request was sent")
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let result = (self.handler)(&request);
            self.requests.lock().unwrap().push(request);
            result
        }
    }

    pub(crate) fn response(status: u16, body: &serde_json::Value) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: if body.is_null() {
                Vec::new()
            } else {
                serde_json::to_vec(body).unwrap()
            },
        }
    }

    impl HttpRequest {
        pub(crate) fn body_json(&self) -> serde_json::Value {
            serde_json::from_slice(self.body.as_deref().expect("request has no body")).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[test]
    fn standard_headers_include_api_key() {
        let headers = standard_headers("theKey");

        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
        assert_eq!(headers.get("x-api-key").unwrap(), "theKey");
    }

    #[test]
    fn standard_headers_skip_empty_api_key() {
        let headers = standard_headers("");

        assert!(headers.get("x-api-key").is_none());
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn status_text_includes_reason() {
        let response = HttpResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };

        assert_eq!(response.status_text(), "500 Internal Server Error");
        assert!(matches!(
            response.expect_status(StatusCode::OK),
            Err(Error::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[test]
    fn malformed_body_is_reported() {
        let response = HttpResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"not json".to_vec(),
        };

        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn reqwest_transport_sends_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("x-api-key", "theKey"))
            .and(body_json(serde_json::json!({"hello": "world"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let request = HttpRequest::new(Method::POST, format!("{}/echo", server.uri()), "theKey")
            .json(&serde_json::json!({"hello": "world"}))
            .unwrap();

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn reqwest_transport_reports_connection_failure() {
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let request = HttpRequest::new(Method::GET, "http://127.0.0.1:1/unreachable", "");

        assert!(transport.send(request).await.is_err());
    }
}
