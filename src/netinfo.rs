//! Hyphen NetInfo: IP geolocation lookups.
use std::{sync::Arc, time::Duration};

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error_handler::{ErrorHandler, ErrorHandlerSlot, SharedErrorHandler},
    toggle::PUBLIC_KEY_PREFIX,
    transport::{HttpRequest, HttpTransport, ReqwestTransport, DEFAULT_TIMEOUT},
    Error, Result,
};

/// Geographic location of an IP address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Location {
    pub country: String,
    pub region: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub postal_code: String,
    pub timezone: String,
    pub geoname_id: i64,
}

/// Information about a single IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[allow(missing_docs)]
    pub ip: String,
    /// Address family, e.g. `ipv4`.
    #[serde(rename = "type", default)]
    pub ip_type: String,
    #[allow(missing_docs)]
    pub location: Location,
}

/// Lookup failure for a single IP address in a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpInfoError {
    #[allow(missing_docs)]
    pub ip: String,
    #[serde(rename = "type", default)]
    #[allow(missing_docs)]
    pub ip_type: String,
    #[allow(missing_docs)]
    pub error_message: String,
}

/// One entry of a bulk lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpInfoResult {
    /// The server could not resolve this address.
    Error(IpInfoError),
    #[allow(missing_docs)]
    Info(IpInfo),
}

#[derive(Deserialize)]
struct IpInfosResponse {
    data: Vec<IpInfoResult>,
}

/// Configuration for [`NetInfo`].
///
/// # Examples
/// ```
/// # use hyphen::NetInfoConfig;
/// let netinfo = NetInfoConfig::from_api_key("secret-key").to_client().unwrap();
/// ```
pub struct NetInfoConfig {
    pub(crate) api_key: String,
    pub(crate) base_uri: String,
    pub(crate) timeout: Duration,
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    pub(crate) error_handler: Option<SharedErrorHandler>,
}

impl NetInfoConfig {
    /// Default NetInfo service URI.
    pub const DEFAULT_BASE_URI: &'static str = "https://net.info";

    /// Create a default configuration using the specified (non-public) API key.
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        NetInfoConfig {
            api_key: api_key.into(),
            base_uri: Self::DEFAULT_BASE_URI.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            error_handler: None,
        }
    }

    /// Override the service URI. An empty URI means the default.
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        self.base_uri = if base_uri.is_empty() {
            Self::DEFAULT_BASE_URI.to_owned()
        } else {
            base_uri
        };
        self
    }

    /// Per-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the handler notified of every failed lookup.
    pub fn error_handler(mut self, handler: impl ErrorHandler + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Create a new [`NetInfo`] client using this configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the API key is empty or public, [`Error::InvalidUrl`] if the
    /// base URI does not parse.
    pub fn to_client(self) -> Result<NetInfo> {
        NetInfo::new(self)
    }
}

/// A client for Hyphen NetInfo.
pub struct NetInfo {
    api_key: String,
    base_uri: String,
    transport: Arc<dyn HttpTransport>,
    pub(crate) error_handler: ErrorHandlerSlot,
}

impl NetInfo {
    /// Create a new `NetInfo` client using the specified configuration.
    pub fn new(config: NetInfoConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::validation("API key is required"));
        }
        if config.api_key.starts_with(PUBLIC_KEY_PREFIX) {
            return Err(Error::validation(
                "the provided API key is a public API key, a non-public API key is required",
            ));
        }
        Url::parse(&config.base_uri).map_err(|source| Error::InvalidUrl {
            url: config.base_uri.clone(),
            source,
        })?;

        let transport: Arc<dyn HttpTransport> = match config.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };

        Ok(NetInfo {
            api_key: config.api_key,
            base_uri: config
                .base_uri
                .strip_suffix('/')
                .unwrap_or(&config.base_uri)
                .to_owned(),
            transport,
            error_handler: match config.error_handler {
                Some(handler) => ErrorHandlerSlot::new(handler),
                None => ErrorHandlerSlot::noop(),
            },
        })
    }

    /// Replace the error handler.
    pub fn set_error_handler(&self, handler: impl ErrorHandler + Send + Sync + 'static) {
        self.error_handler.set(Arc::new(handler));
    }

    /// Look up a single IP address.
    pub async fn get_ip_info(&self, ip: &str) -> Result<IpInfo> {
        let url = format!("{}/ip/{}", self.base_uri, ip);
        let request = HttpRequest::new(Method::GET, url, &self.api_key);
        let result = self.send(request).await;
        self.report(result)
    }

    /// Look up several IP addresses in one request.
    ///
    /// Addresses the server cannot resolve come back as [`IpInfoResult::Error`] entries; the
    /// call itself only fails if the request does.
    pub async fn get_ip_infos(&self, ips: &[&str]) -> Result<Vec<IpInfoResult>> {
        if ips.is_empty() {
            return self.report(Err(Error::validation(
                "the provided IPs array is invalid, it should be a non-empty array of strings",
            )));
        }

        let url = format!("{}/ip", self.base_uri);
        let result = match HttpRequest::new(Method::POST, url, &self.api_key).json(ips) {
            Ok(request) => self
                .send::<IpInfosResponse>(request)
                .await
                .map(|response| response.data),
            Err(err) => Err(err),
        };
        self.report(result)
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let url = request.url.clone();
        log::debug!(target: "hyphen", url:display = url; "sending netinfo request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| Error::transport(url, err))?;
        response.expect_status(StatusCode::OK)?.json()
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::warn!(target: "hyphen", "netinfo request failed: {}", err);
            self.error_handler.emit(err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::transport::testing::FakeTransport;

    fn location() -> serde_json::Value {
        json!({
            "country": "US",
            "region": "California",
            "city": "Mountain View",
            "lat": 37.386,
            "lng": -122.0838,
            "postalCode": "94035",
            "timezone": "America/Los_Angeles",
            "geonameId": 5375480
        })
    }

    #[test]
    fn rejects_missing_or_public_api_key() {
        assert!(matches!(
            NetInfoConfig::from_api_key("").to_client(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NetInfoConfig::from_api_key("public_abc").to_client(),
            Err(Error::Validation(message)) if message.contains("public API key")
        ));
        assert!(matches!(
            NetInfoConfig::from_api_key("key").base_uri("not a uri").to_client(),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn get_ip_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip/8.8.8.8"))
            .and(header("x-api-key", "theKey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "8.8.8.8",
                "type": "ipv4",
                "location": location()
            })))
            .expect(1)
            .mount(&server)
            .await;

        let netinfo = NetInfoConfig::from_api_key("theKey")
            .base_uri(format!("{}/", server.uri()))
            .to_client()
            .unwrap();

        let info = netinfo.get_ip_info("8.8.8.8").await.unwrap();

        assert_eq!(info.ip, "8.8.8.8");
        assert_eq!(info.ip_type, "ipv4");
        assert_eq!(info.location.city, "Mountain View");
        assert_eq!(info.location.geoname_id, 5375480);
    }

    #[tokio::test]
    async fn get_ip_infos_mixes_results_and_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ip"))
            .and(body_json(json!(["8.8.8.8", "bogus"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"ip": "8.8.8.8", "type": "ipv4", "location": location()},
                    {"ip": "bogus", "type": "error", "errorMessage": "invalid ip"}
                ]
            })))
            .mount(&server)
            .await;

        let netinfo = NetInfoConfig::from_api_key("theKey")
            .base_uri(server.uri())
            .to_client()
            .unwrap();

        let results = netinfo.get_ip_infos(&["8.8.8.8", "bogus"]).await.unwrap();

        assert!(matches!(&results[0], IpInfoResult::Info(info) if info.location.country == "US"));
        assert!(matches!(
            &results[1],
            IpInfoResult::Error(err) if err.error_message == "invalid ip"
        ));
    }

    #[tokio::test]
    async fn empty_ip_list_is_rejected_without_request() {
        let transport = FakeTransport::json(200, json!({"data": []}));
        let calls = Arc::new(AtomicUsize::new(0));
        let netinfo = {
            let calls = calls.clone();
            NetInfoConfig::from_api_key("theKey")
                .transport(transport.clone())
                .error_handler(move |_: &Error| {
                    calls.fetch_add(1, Ordering::SeqCst);
                })
                .to_client()
                .unwrap()
        };

        assert!(matches!(
            netinfo.get_ip_infos(&[]).await,
            Err(Error::Validation(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failures_are_reported_and_returned() {
        let transport = FakeTransport::json(404, json!({"message": "not found"}));
        let calls = Arc::new(AtomicUsize::new(0));
        let netinfo = NetInfoConfig::from_api_key("theKey")
            .transport(transport.clone())
            .to_client()
            .unwrap();
        {
            let calls = calls.clone();
            netinfo.set_error_handler(move |_: &Error| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        let result = netinfo.get_ip_info("1.1.1.1").await;

        assert!(matches!(result, Err(Error::UnexpectedStatus { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.last_request().url, "https://net.info/ip/1.1.1.1");
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let netinfo = NetInfoConfig::from_api_key("theKey")
            .transport(FakeTransport::json(200, json!({"data": "nope"})))
            .to_client()
            .unwrap();

        assert!(matches!(
            netinfo.get_ip_infos(&["8.8.8.8"]).await,
            Err(Error::MalformedResponse(_))
        ));
    }
}
