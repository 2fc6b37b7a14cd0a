use std::sync::Arc;

use crate::{
    error_handler::{ErrorHandler, SharedErrorHandler},
    link::{Link, LinkConfig},
    netinfo::{NetInfo, NetInfoConfig},
    toggle::{Toggle, ToggleConfig},
    HyphenConfig, Result,
};

/// Entry point to all Hyphen services.
///
/// In order to create a client instance, first create [`HyphenConfig`]. Each service is present
/// only if its credential was configured.
///
/// # Examples
/// ```no_run
/// # async fn test() {
/// # use hyphen::HyphenConfig;
/// let hyphen = HyphenConfig::from_env().to_client().unwrap();
/// if let Some(toggle) = hyphen.toggle() {
///     let enabled = toggle.get_boolean("new-checkout", false, None).await;
/// }
/// # }
/// ```
pub struct Hyphen {
    toggle: Option<Toggle>,
    netinfo: Option<NetInfo>,
    link: Option<Link>,
}

impl Hyphen {
    /// Create the configured services.
    pub fn new(config: HyphenConfig) -> Result<Self> {
        let timeout = config.timeout_or_default();

        let toggle = match config.public_api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(public_api_key) => {
                let mut toggle_config = ToggleConfig::from_public_api_key(public_api_key)
                    .horizon_urls(config.horizon_urls.iter().cloned())
                    .timeout(timeout);
                if let Some(application_id) = &config.application_id {
                    toggle_config = toggle_config.application_id(application_id.clone());
                }
                if let Some(environment) = &config.environment {
                    toggle_config = toggle_config.environment(environment.clone());
                }
                if let Some(context) = &config.default_context {
                    toggle_config = toggle_config.default_context(context.clone());
                }
                if let Some(targeting_key) = &config.default_targeting_key {
                    toggle_config = toggle_config.default_targeting_key(targeting_key.clone());
                }
                toggle_config.transport = config.transport.clone();
                toggle_config.error_handler = config.error_handler.clone();
                Some(toggle_config.to_client()?)
            }
            None => None,
        };

        let api_key = config.api_key.as_deref().filter(|k| !k.is_empty());

        let netinfo = api_key.and_then(|api_key| {
            let mut netinfo_config = NetInfoConfig::from_api_key(api_key).timeout(timeout);
            if let Some(base_uri) = &config.netinfo_base_uri {
                netinfo_config = netinfo_config.base_uri(base_uri.clone());
            }
            netinfo_config.transport = config.transport.clone();
            netinfo_config.error_handler = config.error_handler.clone();
            match netinfo_config.to_client() {
                Ok(netinfo) => Some(netinfo),
                Err(err) => {
                    log::warn!(target: "hyphen", "netinfo is unavailable: {}", err);
                    None
                }
            }
        });

        let link = api_key.and_then(|api_key| {
            let mut link_config = LinkConfig::from_api_key(api_key)
                .uris(config.link_uris.iter().cloned())
                .timeout(timeout);
            if let Some(organization_id) = &config.organization_id {
                link_config = link_config.organization_id(organization_id.clone());
            }
            link_config.transport = config.transport.clone();
            link_config.error_handler = config.error_handler.clone();
            match link_config.to_client() {
                Ok(link) => Some(link),
                Err(err) => {
                    log::warn!(target: "hyphen", "link is unavailable: {}", err);
                    None
                }
            }
        });

        log::debug!(target: "hyphen",
                    toggle = toggle.is_some(),
                    netinfo = netinfo.is_some(),
                    link = link.is_some();
                    "created hyphen client");

        Ok(Hyphen {
            toggle,
            netinfo,
            link,
        })
    }

    /// Toggle client, present when a public API key was configured.
    pub fn toggle(&self) -> Option<&Toggle> {
        self.toggle.as_ref()
    }

    /// NetInfo client, present when an API key was configured.
    pub fn netinfo(&self) -> Option<&NetInfo> {
        self.netinfo.as_ref()
    }

    /// Link client, present when an API key was configured.
    pub fn link(&self) -> Option<&Link> {
        self.link.as_ref()
    }

    /// Replace the error handler of every present service.
    pub fn set_error_handler(&self, handler: impl ErrorHandler + Send + Sync + 'static) {
        let handler: SharedErrorHandler = Arc::new(handler);
        if let Some(toggle) = &self.toggle {
            toggle.error_handler.set(handler.clone());
        }
        if let Some(netinfo) = &self.netinfo {
            netinfo.error_handler.set(handler.clone());
        }
        if let Some(link) = &self.link {
            link.error_handler.set(handler);
        }
    }
}
