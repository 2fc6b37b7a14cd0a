use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    error_handler::{ErrorHandler, SharedErrorHandler},
    transport::{HttpTransport, DEFAULT_TIMEOUT},
    Error, Result,
};

use super::{EvaluationContext, Toggle};

/// Configuration for [`Toggle`].
///
/// Only the public API key is required. Everything else has a default that is resolved once,
/// when the client is built.
///
/// # Examples
/// ```
/// # use hyphen::{Error, ToggleConfig, toggle::EvaluationContext};
/// let toggle = ToggleConfig::from_public_api_key("public_dGVzdC1vcmc6c2VjcmV0")
///     .application_id("my-app")
///     .environment("production")
///     .default_context(EvaluationContext::with_targeting_key("user-123"))
///     .error_handler(|err: &Error| eprintln!("toggle error: {err}"))
///     .to_client()
///     .unwrap();
/// ```
pub struct ToggleConfig {
    pub(crate) public_api_key: String,
    pub(crate) application_id: String,
    pub(crate) environment: String,
    pub(crate) default_context: Option<EvaluationContext>,
    pub(crate) horizon_urls: Vec<String>,
    pub(crate) default_targeting_key: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    pub(crate) error_handler: Option<SharedErrorHandler>,
}

impl ToggleConfig {
    /// Default environment name.
    pub const DEFAULT_ENVIRONMENT: &'static str = "development";

    /// Create a default configuration using the specified public API key.
    ///
    /// ```
    /// # use hyphen::ToggleConfig;
    /// ToggleConfig::from_public_api_key("public_key");
    /// ```
    pub fn from_public_api_key(public_api_key: impl Into<String>) -> Self {
        ToggleConfig {
            public_api_key: public_api_key.into(),
            application_id: String::new(),
            environment: Self::DEFAULT_ENVIRONMENT.to_owned(),
            default_context: None,
            horizon_urls: Vec::new(),
            default_targeting_key: None,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            error_handler: None,
        }
    }

    /// Application the toggles belong to.
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }

    /// Environment name. Defaults to [`ToggleConfig::DEFAULT_ENVIRONMENT`]; an empty name also
    /// means the default.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        self.environment = if environment.is_empty() {
            Self::DEFAULT_ENVIRONMENT.to_owned()
        } else {
            environment
        };
        self
    }

    /// Context used by evaluations that do not pass their own.
    pub fn default_context(mut self, context: EvaluationContext) -> Self {
        self.default_context = Some(context);
        self
    }

    /// Override the Horizon URLs. They are tried in order. Clients should use the default
    /// (derived from the public API key) in most cases.
    pub fn horizon_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.horizon_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Targeting key used when an evaluation has no context at all. Generated when not set.
    pub fn default_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
        self.default_targeting_key = Some(targeting_key.into());
        self
    }

    /// Timeout of a single request to a single Horizon URL. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one. The timeout setting is then
    /// the transport's responsibility.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the handler notified when an evaluation falls back to the default value because
    /// every Horizon URL failed.
    pub fn error_handler(mut self, handler: impl ErrorHandler + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Create a new [`Toggle`] client using this configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if an explicit Horizon URL does not parse.
    /// - [`Error::HttpClient`] if the default HTTP client cannot be created.
    pub fn to_client(self) -> Result<Toggle> {
        Toggle::new(self)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for url in &self.horizon_urls {
            Url::parse(url).map_err(|source| Error::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ToggleConfig;
    use crate::Error;

    #[test]
    fn defaults() {
        let config = ToggleConfig::from_public_api_key("public_key");

        assert_eq!(config.environment, "development");
        assert!(config.horizon_urls.is_empty());
        assert_eq!(config.timeout, std::time::Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_environment_means_default() {
        let config = ToggleConfig::from_public_api_key("public_key").environment("");
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn rejects_unparsable_horizon_url() {
        let config = ToggleConfig::from_public_api_key("public_key")
            .horizon_urls(["https://ok.example.com", "not a url"]);

        assert!(matches!(
            config.validate(),
            Err(Error::InvalidUrl { url, .. }) if url == "not a url"
        ));
    }
}
