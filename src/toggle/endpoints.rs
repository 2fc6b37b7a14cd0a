//! Organization id extraction from public API keys and Horizon URL resolution.
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Prefix of public (client-safe) API keys.
pub const PUBLIC_KEY_PREFIX: &str = "public_";

/// Global Horizon URL, used when no organization-scoped URL can be derived.
pub const DEFAULT_HORIZON_URL: &str = "https://toggle.hyphen.cloud";

/// Extract the organization id embedded in a public API key.
///
/// A public key is `public_` followed by base64 of `"<organization id>:<secret>"`. Returns `None`
/// for anything else; this is an expected outcome, not an error. A payload that is not valid
/// UTF-8 also yields `None` rather than a lossily decoded id.
///
/// ```
/// # use hyphen::toggle::organization_id_from_public_key;
/// assert_eq!(
///     organization_id_from_public_key("public_dGVzdC1vcmc6c2VjcmV0").as_deref(),
///     Some("test-org")
/// );
/// assert_eq!(organization_id_from_public_key("secret_key"), None);
/// ```
pub fn organization_id_from_public_key(public_key: &str) -> Option<String> {
    let encoded = public_key.strip_prefix(PUBLIC_KEY_PREFIX)?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let organization_id = decoded.split(':').next()?;
    if organization_id.is_empty() {
        return None;
    }
    Some(organization_id.to_owned())
}

/// Organization-scoped Horizon URL.
pub fn organization_horizon_url(organization_id: &str) -> String {
    format!("https://{organization_id}.toggle.hyphen.cloud")
}

/// Default Horizon URLs for `public_key`: the organization-scoped URL first (when the key
/// carries an organization id), then the global URL.
pub fn default_horizon_urls(public_key: &str) -> Vec<String> {
    match organization_id_from_public_key(public_key) {
        Some(organization_id) => vec![
            organization_horizon_url(&organization_id),
            DEFAULT_HORIZON_URL.to_owned(),
        ],
        None => vec![DEFAULT_HORIZON_URL.to_owned()],
    }
}

/// Horizon URLs to try, in order. A non-empty `explicit` list wins unchanged.
pub fn resolve_horizon_urls(public_key: &str, explicit: &[String]) -> Vec<String> {
    if explicit.is_empty() {
        default_horizon_urls(public_key)
    } else {
        explicit.to_vec()
    }
}
