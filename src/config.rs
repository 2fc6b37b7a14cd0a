use std::{sync::Arc, time::Duration};

use crate::{
    error_handler::{ErrorHandler, SharedErrorHandler},
    toggle::EvaluationContext,
    transport::{HttpTransport, DEFAULT_TIMEOUT},
    EnvConfig, Hyphen, Result,
};

/// Configuration for [`Hyphen`], covering all three services.
///
/// A service is only created when its credential is present: Toggle needs the public API key,
/// NetInfo and Link need the (secret) API key.
///
/// # Examples
/// ```
/// # use hyphen::HyphenConfig;
/// let hyphen = HyphenConfig::new()
///     .public_api_key("public_dGVzdC1vcmc6c2VjcmV0")
///     .application_id("my-app")
///     .to_client()
///     .unwrap();
/// assert!(hyphen.toggle().is_some());
/// assert!(hyphen.netinfo().is_none());
/// ```
#[derive(Default)]
pub struct HyphenConfig {
    pub(crate) public_api_key: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) application_id: Option<String>,
    pub(crate) environment: Option<String>,
    pub(crate) default_context: Option<EvaluationContext>,
    pub(crate) horizon_urls: Vec<String>,
    pub(crate) default_targeting_key: Option<String>,
    pub(crate) netinfo_base_uri: Option<String>,
    pub(crate) organization_id: Option<String>,
    pub(crate) link_uris: Vec<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    pub(crate) error_handler: Option<SharedErrorHandler>,
}

impl HyphenConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from the `HYPHEN_*` environment variables.
    ///
    /// See [`EnvConfig`] for the variables that are read.
    pub fn from_env() -> Self {
        EnvConfig::from_env().apply(Self::new())
    }

    /// Public API key, used by Toggle.
    pub fn public_api_key(mut self, public_api_key: impl Into<String>) -> Self {
        self.public_api_key = Some(public_api_key.into());
        self
    }

    /// Secret API key, used by NetInfo and Link.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Toggle application id.
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// Toggle environment. Defaults to `development`.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Default Toggle evaluation context.
    pub fn default_context(mut self, context: EvaluationContext) -> Self {
        self.default_context = Some(context);
        self
    }

    /// Override the Toggle Horizon URLs.
    pub fn horizon_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.horizon_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Toggle targeting key used when an evaluation has no context.
    pub fn default_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
        self.default_targeting_key = Some(targeting_key.into());
        self
    }

    /// Override the NetInfo service URI.
    pub fn netinfo_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.netinfo_base_uri = Some(base_uri.into());
        self
    }

    /// Organization id, used by Link.
    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Override the Link URI templates.
    pub fn link_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    /// Per-request timeout of every service. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Transport shared by every service.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Error handler shared by every service.
    pub fn error_handler(mut self, handler: impl ErrorHandler + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Create a new [`Hyphen`] client using this configuration.
    ///
    /// # Errors
    ///
    /// Returns the Toggle client's construction error. NetInfo and Link construction errors
    /// are logged and leave the corresponding service absent.
    pub fn to_client(self) -> Result<Hyphen> {
        Hyphen::new(self)
    }

    pub(crate) fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::HyphenConfig;

    #[test]
    fn setters_fill_fields() {
        let config = HyphenConfig::new()
            .public_api_key("public_key")
            .api_key("secret")
            .environment("production")
            .horizon_urls(["https://a.example.com"])
            .link_uris(Vec::<String>::new());

        assert_eq!(config.public_api_key.as_deref(), Some("public_key"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.environment.as_deref(), Some("production"));
        assert_eq!(config.horizon_urls, ["https://a.example.com"]);
        assert!(config.link_uris.is_empty());
        assert_eq!(config.timeout_or_default(), std::time::Duration::from_secs(30));
    }
}
