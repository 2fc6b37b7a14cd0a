//! Hyphen Link: short codes and QR codes.
use std::{sync::Arc, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::{form_urlencoded, Url};

use crate::{
    error_handler::{ErrorHandler, ErrorHandlerSlot, SharedErrorHandler},
    toggle::PUBLIC_KEY_PREFIX,
    transport::{HttpRequest, HttpTransport, ReqwestTransport, DEFAULT_TIMEOUT},
    Error, Result,
};

mod models;

use models::CreateShortCodeBody;
pub use models::{
    ClickStats, CodeStats, CreateQrCodeOptions, CreateShortCodeOptions, DailyClicks,
    OrganizationRef, Page, Pagination, QrCode, QrSize, ShortCode, ShortCodeQuery,
    UpdateShortCodeOptions,
};

const ORGANIZATION_PLACEHOLDER: &str = "{organizationId}";

/// Configuration for [`Link`].
///
/// # Examples
/// ```
/// # use hyphen::LinkConfig;
/// let link = LinkConfig::from_api_key("secret-key")
///     .organization_id("org_123")
///     .to_client()
///     .unwrap();
/// ```
pub struct LinkConfig {
    pub(crate) api_key: String,
    pub(crate) organization_id: String,
    pub(crate) uris: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    pub(crate) error_handler: Option<SharedErrorHandler>,
}

impl LinkConfig {
    /// Default URI template. `{organizationId}` is replaced on every request.
    pub const DEFAULT_URI: &'static str =
        "https://api.hyphen.ai/api/organizations/{organizationId}/link/codes/";

    /// Create a default configuration using the specified (non-public) API key.
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        LinkConfig {
            api_key: api_key.into(),
            organization_id: String::new(),
            uris: vec![Self::DEFAULT_URI.to_owned()],
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            error_handler: None,
        }
    }

    /// Organization owning the short codes. Every operation fails without it.
    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = organization_id.into();
        self
    }

    /// Override the URI templates. Only the first one is used; an empty list means the default.
    pub fn uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let uris: Vec<String> = uris.into_iter().map(Into::into).collect();
        self.uris = if uris.is_empty() {
            vec![Self::DEFAULT_URI.to_owned()]
        } else {
            uris
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

    /// Set the handler notified of every failed operation.
    pub fn error_handler(mut self, handler: impl ErrorHandler + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Create a new [`Link`] client using this configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the API key is public, [`Error::InvalidUrl`] if a URI template
    /// does not parse.
    pub fn to_client(self) -> Result<Link> {
        Link::new(self)
    }
}

/// A client for Hyphen Link.
///
/// Every operation passes its error to the error handler before returning it.
pub struct Link {
    api_key: String,
    organization_id: String,
    uri_template: String,
    transport: Arc<dyn HttpTransport>,
    pub(crate) error_handler: ErrorHandlerSlot,
}

impl Link {
    /// Create a new `Link` client using the specified configuration.
    pub fn new(config: LinkConfig) -> Result<Self> {
        if config.api_key.starts_with(PUBLIC_KEY_PREFIX) {
            return Err(Error::validation(
                "API key cannot start with \"public_\"",
            ));
        }
        for uri in &config.uris {
            let probe = uri.replace(ORGANIZATION_PLACEHOLDER, "organization");
            Url::parse(&probe).map_err(|source| Error::InvalidUrl {
                url: uri.clone(),
                source,
            })?;
        }

        let transport: Arc<dyn HttpTransport> = match config.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };

        Ok(Link {
            api_key: config.api_key,
            organization_id: config.organization_id,
            uri_template: config
                .uris
                .into_iter()
                .next()
                .unwrap_or_else(|| LinkConfig::DEFAULT_URI.to_owned()),
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

    /// Create a short code pointing at `long_url` on `domain`.
    pub async fn create_short_code(
        &self,
        long_url: &str,
        domain: &str,
        options: &CreateShortCodeOptions,
    ) -> Result<ShortCode> {
        let body = CreateShortCodeBody {
            long_url,
            domain,
            options,
        };
        let result = self
            .call(Method::POST, &[], &[], Some(&body), StatusCode::CREATED)
            .await;
        self.report("create_short_code", result)
    }

    #[allow(missing_docs)]
    pub async fn get_short_code(&self, code: &str) -> Result<ShortCode> {
        let result = self.get(&[code], &[]).await;
        self.report("get_short_code", result)
    }

    /// List the organization's short codes.
    pub async fn get_short_codes(&self, query: &ShortCodeQuery) -> Result<Page<ShortCode>> {
        let result = self.get(&[], &query.to_pairs()).await;
        self.report("get_short_codes", result)
    }

    /// All tags used by the organization's short codes.
    pub async fn get_tags(&self) -> Result<Vec<String>> {
        let result = self.get(&["tags"], &[]).await;
        self.report("get_tags", result)
    }

    /// Click statistics of `code` between `start` and `end`.
    pub async fn get_code_stats(
        &self,
        code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CodeStats> {
        let query = [
            ("startDate", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("endDate", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        let result = self.get(&[code, "stats"], &query).await;
        self.report("get_code_stats", result)
    }

    #[allow(missing_docs)]
    pub async fn update_short_code(
        &self,
        code: &str,
        options: &UpdateShortCodeOptions,
    ) -> Result<ShortCode> {
        let result = self
            .call(Method::PATCH, &[code], &[], Some(options), StatusCode::OK)
            .await;
        self.report("update_short_code", result)
    }

    #[allow(missing_docs)]
    pub async fn delete_short_code(&self, code: &str) -> Result<()> {
        let result = self.delete(&[code]).await;
        self.report("delete_short_code", result)
    }

    /// Create a QR code for `code`.
    pub async fn create_qr_code(
        &self,
        code: &str,
        options: &CreateQrCodeOptions,
    ) -> Result<QrCode> {
        let result = self
            .call(
                Method::POST,
                &[code, "qrs"],
                &[],
                Some(options),
                StatusCode::CREATED,
            )
            .await;
        self.report("create_qr_code", result)
    }

    #[allow(missing_docs)]
    pub async fn get_qr_code(&self, code: &str, qr_id: &str) -> Result<QrCode> {
        let result = self.get(&[code, "qrs", qr_id], &[]).await;
        self.report("get_qr_code", result)
    }

    /// List the QR codes of `code`.
    pub async fn get_qr_codes(&self, code: &str, pagination: Pagination) -> Result<Page<QrCode>> {
        let mut query = Vec::new();
        pagination.append_to(&mut query);
        let result = self.get(&[code, "qrs"], &query).await;
        self.report("get_qr_codes", result)
    }

    #[allow(missing_docs)]
    pub async fn delete_qr_code(&self, code: &str, qr_id: &str) -> Result<()> {
        let result = self.delete(&[code, "qrs", qr_id]).await;
        self.report("delete_qr_code", result)
    }

    /// Request URI for `segments` below the organization's codes collection.
    ///
    /// Empty segments are skipped and the result never ends with `/`.
    pub(crate) fn uri(&self, segments: &[&str]) -> Result<String> {
        if self.organization_id.is_empty() {
            return Err(Error::validation("organization ID is required"));
        }

        let mut uri = self
            .uri_template
            .replacen(ORGANIZATION_PLACEHOLDER, &self.organization_id, 1);
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            if uri.ends_with('/') {
                uri.push_str(segment);
                uri.push('/');
            } else {
                uri.push('/');
                uri.push_str(segment);
            }
        }
        if uri.ends_with('/') {
            uri.pop();
        }
        Ok(uri)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        self.call::<T, ()>(Method::GET, segments, query, None, StatusCode::OK)
            .await
    }

    async fn delete(&self, segments: &[&str]) -> Result<()> {
        let request = self.request::<()>(Method::DELETE, segments, &[], None)?;
        self.send(request, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<T> {
        let request = self.request(method, segments, query, body)?;
        self.send(request, expected).await?.json()
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<HttpRequest> {
        let mut uri = self.uri(segments)?;
        if !query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            uri.push('?');
            uri.push_str(&query);
        }

        let request = HttpRequest::new(method, uri, &self.api_key);
        match body {
            Some(body) => request.json(body),
            None => Ok(request),
        }
    }

    async fn send(
        &self,
        request: HttpRequest,
        expected: StatusCode,
    ) -> Result<crate::transport::HttpResponse> {
        let url = request.url.clone();
        log::debug!(target: "hyphen", method:display = request.method, url:display = url; "sending link request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| Error::transport(url, err))?;
        response.expect_status(expected)
    }

    fn report<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::warn!(target: "hyphen", operation; "link operation failed: {}", err);
            self.error_handler.emit(err);
        }
        result
    }
}
