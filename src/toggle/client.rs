use std::sync::Arc;

use reqwest::{Method, StatusCode};

use crate::{
    error_handler::{ErrorHandler, ErrorHandlerSlot},
    transport::{HttpRequest, HttpTransport, ReqwestTransport},
    Error, Result,
};

use super::{
    context::EvaluationDefaults, endpoints, Evaluation, EvaluationContext, EvaluationResponse,
    ToggleConfig, ToggleValue,
};

const EVALUATE_ENDPOINT: &str = "/toggle/evaluate";

/// A client for Hyphen Toggle.
///
/// In order to create a client instance, first create [`ToggleConfig`].
///
/// Every evaluation is a request to the Toggle service. Horizon URLs are tried one after another
/// until one of them answers; if none does, the caller's default value is used.
///
/// The client is `Send + Sync` and can be shared between tasks. Dropping an evaluation future
/// cancels the request in flight without trying the remaining URLs.
///
/// # Examples
/// ```no_run
/// # async fn test() {
/// # use hyphen::ToggleConfig;
/// let toggle = ToggleConfig::from_public_api_key("public_key")
///     .application_id("my-app")
///     .to_client()
///     .unwrap();
/// let enabled = toggle.get_boolean("new-checkout", false, None).await;
/// # }
/// ```
pub struct Toggle {
    public_api_key: String,
    organization_id: Option<String>,
    horizon_urls: Vec<String>,
    defaults: EvaluationDefaults,
    transport: Arc<dyn HttpTransport>,
    pub(crate) error_handler: ErrorHandlerSlot,
}

/// Result of [`Toggle::get`]: the value to use, and the error that forced a fallback, if any.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    /// The toggle's value, or the caller's default.
    pub value: ToggleValue,
    /// Set when every Horizon URL failed. `value` is then the default.
    pub error: Option<Error>,
}

impl ToggleOutcome {
    /// Convert into a `Result`, dropping the default value on error.
    pub fn into_result(self) -> Result<ToggleValue> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

impl Toggle {
    /// Create a new `Toggle` client using the specified configuration.
    ///
    /// Resolves the organization id, the Horizon URLs and the default targeting key once.
    pub fn new(config: ToggleConfig) -> Result<Self> {
        config.validate()?;

        let transport: Arc<dyn HttpTransport> = match config.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };

        let organization_id = endpoints::organization_id_from_public_key(&config.public_api_key);
        let horizon_urls =
            endpoints::resolve_horizon_urls(&config.public_api_key, &config.horizon_urls);
        let defaults = EvaluationDefaults::new(
            config.application_id,
            config.environment,
            config.default_context,
            config.default_targeting_key,
        );

        log::debug!(target: "hyphen",
                    organization_id:? = organization_id,
                    horizon_urls:? = horizon_urls;
                    "created toggle client");

        Ok(Toggle {
            public_api_key: config.public_api_key,
            organization_id,
            horizon_urls,
            defaults,
            transport,
            error_handler: match config.error_handler {
                Some(handler) => ErrorHandlerSlot::new(handler),
                None => ErrorHandlerSlot::noop(),
            },
        })
    }

    /// Organization id decoded from the public API key, if any.
    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    /// Application id sent with every evaluation.
    pub fn application_id(&self) -> &str {
        &self.defaults.application_id
    }

    /// Environment sent with every evaluation.
    pub fn environment(&self) -> &str {
        &self.defaults.environment
    }

    /// Horizon URLs, in the order they are tried.
    pub fn horizon_urls(&self) -> &[String] {
        &self.horizon_urls
    }

    /// Targeting key used by evaluations without any context.
    pub fn default_targeting_key(&self) -> &str {
        &self.defaults.default_targeting_key
    }

    /// Replace the error handler. Safe to call while evaluations are running; each evaluation
    /// reports to whichever handler is installed when it fails.
    pub fn set_error_handler(&self, handler: impl ErrorHandler + Send + Sync + 'static) {
        self.error_handler.set(Arc::new(handler));
    }

    /// Evaluate `toggle_key` and return the server's full evaluation entry.
    ///
    /// Returns `Ok(None)` if the server does not know the toggle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllEndpointsFailed`] if no Horizon URL produced a valid response. The
    /// error is also passed to the error handler.
    pub async fn evaluate(
        &self,
        toggle_key: &str,
        context: Option<&EvaluationContext>,
    ) -> Result<Option<Evaluation>> {
        let request = self.defaults.build_request(context);
        log::trace!(target: "hyphen",
                    toggle_key,
                    targeting_key:display = request.targeting_key;
                    "evaluating toggle");

        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(err) => {
                let err = Error::Serialization(err.into());
                self.error_handler.emit(&err);
                return Err(err);
            }
        };

        let mut last_error = None;
        for base_url in &self.horizon_urls {
            let url = format!(
                "{}{}",
                base_url.strip_suffix('/').unwrap_or(base_url),
                EVALUATE_ENDPOINT
            );

            match self.send_evaluation(&url, body.clone()).await {
                Ok(mut response) => {
                    let evaluation = response.toggles.remove(toggle_key);
                    log::debug!(target: "hyphen",
                                toggle_key,
                                url:display = url,
                                found = evaluation.is_some();
                                "evaluated toggle");
                    return Ok(evaluation);
                }
                Err(err) => {
                    log::warn!(target: "hyphen",
                               toggle_key,
                               url:display = url;
                               "toggle evaluation request failed: {}", err);
                    last_error = Some(err);
                }
            }
        }

        let last_error =
            last_error.unwrap_or_else(|| Error::validation("no horizon URLs configured"));
        let err = Error::AllEndpointsFailed(Box::new(last_error));
        log::warn!(target: "hyphen", toggle_key; "{}", err);
        self.error_handler.emit(&err);
        Err(err)
    }

    async fn send_evaluation(&self, url: &str, body: Vec<u8>) -> Result<EvaluationResponse> {
        let mut request = HttpRequest::new(Method::POST, url, &self.public_api_key);
        request.body = Some(body);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| Error::transport(url, err))?;

        response.expect_status(StatusCode::OK)?.json()
    }

    /// Get the value of `toggle_key`, falling back to `default_value`.
    ///
    /// The default is used when the toggle is unknown to the server, when its value does not
    /// match its declared type, and when every Horizon URL failed. Only the last case sets
    /// [`ToggleOutcome::error`].
    pub async fn get(
        &self,
        toggle_key: &str,
        default_value: impl Into<ToggleValue>,
        context: Option<&EvaluationContext>,
    ) -> ToggleOutcome {
        let default_value = default_value.into();
        let outcome = match self.evaluate(toggle_key, context).await {
            Ok(evaluation) => ToggleOutcome {
                value: evaluation
                    .and_then(|evaluation| evaluation.toggle_value())
                    .unwrap_or(default_value),
                error: None,
            },
            Err(error) => ToggleOutcome {
                value: default_value,
                error: Some(error),
            },
        };
        log::trace!(target: "hyphen", toggle_key, value:? = outcome.value; "resolved toggle value");
        outcome
    }

    /// Get a boolean toggle. Never fails: any problem yields `default_value`.
    ///
    /// # Examples
    /// ```no_run
    /// # async fn test(toggle: &hyphen::Toggle) {
    /// # use hyphen::toggle::EvaluationContext;
    /// let context = EvaluationContext::with_targeting_key("user-123");
    /// if toggle.get_boolean("new-checkout", false, Some(&context)).await {
    ///     // ...
    /// }
    /// # }
    /// ```
    pub async fn get_boolean(
        &self,
        toggle_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
    ) -> bool {
        self.get(toggle_key, default_value, context)
            .await
            .value
            .as_boolean()
            .unwrap_or(default_value)
    }

    /// Get a string toggle. Never fails: any problem yields `default_value`.
    pub async fn get_string(
        &self,
        toggle_key: &str,
        default_value: &str,
        context: Option<&EvaluationContext>,
    ) -> String {
        self.get(toggle_key, default_value, context)
            .await
            .value
            .into_string()
            .unwrap_or_else(|| default_value.to_owned())
    }

    /// Get a number toggle. Never fails: any problem yields `default_value`.
    pub async fn get_number(
        &self,
        toggle_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
    ) -> f64 {
        self.get(toggle_key, default_value, context)
            .await
            .value
            .as_number()
            .unwrap_or(default_value)
    }

    /// Get an object toggle. Never fails: any problem yields `default_value`.
    pub async fn get_object(
        &self,
        toggle_key: &str,
        default_value: serde_json::Map<String, serde_json::Value>,
        context: Option<&EvaluationContext>,
    ) -> serde_json::Map<String, serde_json::Value> {
        self.get(toggle_key, default_value.clone(), context)
            .await
            .value
            .into_object()
            .unwrap_or(default_value)
    }
}
