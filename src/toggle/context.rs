use std::collections::HashMap;

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

/// Free-form attributes attached to a context or a user.
///
/// # Examples
/// ```
/// # use hyphen::toggle::CustomAttributes;
/// let attributes: CustomAttributes = [
///     ("plan".to_owned(), "premium".into()),
///     ("age".to_owned(), 42.into()),
/// ].into_iter().collect();
/// ```
pub type CustomAttributes = HashMap<String, serde_json::Value>;

/// User information sent along with an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id. Used as the targeting key when the context has none.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    #[allow(missing_docs)]
    pub custom_attributes: CustomAttributes,
}

impl User {
    /// Create a user with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a custom attribute.
    pub fn custom_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.custom_attributes.insert(key.into(), value.into());
        self
    }
}

/// The subject of a toggle evaluation.
///
/// Either configured once as the client's default context, or passed per call to override it.
///
/// # Examples
/// ```
/// # use hyphen::toggle::{EvaluationContext, User};
/// let context = EvaluationContext::with_targeting_key("user-123")
///     .ip_address("203.0.113.7")
///     .custom_attribute("plan", "premium")
///     .user(User::new("user-123").email("user@example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    /// Stable identifier of the subject. An empty string is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    #[allow(missing_docs)]
    pub custom_attributes: CustomAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub user: Option<User>,
}

impl EvaluationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given targeting key.
    pub fn with_targeting_key(targeting_key: impl Into<String>) -> Self {
        EvaluationContext {
            targeting_key: Some(targeting_key.into()),
            ..Default::default()
        }
    }

    /// Set the IP address.
    pub fn ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Add a custom attribute.
    pub fn custom_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.custom_attributes.insert(key.into(), value.into());
        self
    }

    /// Set the user.
    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

/// Body of `POST /toggle/evaluate`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest<'a> {
    #[allow(missing_docs)]
    pub application: &'a str,
    #[allow(missing_docs)]
    pub environment: &'a str,
    /// Never empty.
    pub targeting_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub ip_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub custom_attributes: Option<&'a CustomAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub user: Option<&'a User>,
}

/// Generate a pseudo-random targeting key: the non-empty members of `[application_id,
/// environment, <random integer>]` joined with `-`.
///
/// The random part only has to avoid accidental collisions between anonymous subjects, so a
/// non-cryptographic generator is fine.
pub fn generate_targeting_key(application_id: &str, environment: &str) -> String {
    let suffix = thread_rng().gen_range(0..i64::MAX).to_string();
    [application_id, environment, suffix.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Targeting key for `context`: its own targeting key, else its user's id, else a generated key.
/// The result is never empty.
pub fn resolve_targeting_key(
    context: Option<&EvaluationContext>,
    application_id: &str,
    environment: &str,
) -> String {
    if let Some(context) = context {
        if let Some(targeting_key) = context.targeting_key.as_deref().filter(|k| !k.is_empty()) {
            return targeting_key.to_owned();
        }
        if let Some(user_id) = context
            .user
            .as_ref()
            .map(|user| user.id.as_str())
            .filter(|id| !id.is_empty())
        {
            return user_id.to_owned();
        }
    }
    generate_targeting_key(application_id, environment)
}

/// Per-client values that every evaluation request is built from.
#[derive(Debug, Clone)]
pub(crate) struct EvaluationDefaults {
    pub application_id: String,
    pub environment: String,
    pub default_context: Option<EvaluationContext>,
    /// Computed at construction. Used only when there is no active context at all.
    pub default_targeting_key: String,
}

impl EvaluationDefaults {
    pub(crate) fn new(
        application_id: String,
        environment: String,
        default_context: Option<EvaluationContext>,
        default_targeting_key: Option<String>,
    ) -> Self {
        let default_targeting_key = default_targeting_key
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| {
                resolve_targeting_key(default_context.as_ref(), &application_id, &environment)
            });
        EvaluationDefaults {
            application_id,
            environment,
            default_context,
            default_targeting_key,
        }
    }

    /// Build the request body. `override_context` replaces the default context entirely.
    pub(crate) fn build_request<'a>(
        &'a self,
        override_context: Option<&'a EvaluationContext>,
    ) -> EvaluationRequest<'a> {
        let active = override_context.or(self.default_context.as_ref());

        let mut request = EvaluationRequest {
            application: &self.application_id,
            environment: &self.environment,
            targeting_key: String::new(),
            ip_address: None,
            custom_attributes: None,
            user: None,
        };

        if let Some(context) = active {
            request.targeting_key = context.targeting_key.clone().unwrap_or_default();
            request.ip_address = context.ip_address.as_deref().filter(|ip| !ip.is_empty());
            request.custom_attributes =
                Some(&context.custom_attributes).filter(|attributes| !attributes.is_empty());
            request.user = context.user.as_ref();
        }

        if request.targeting_key.is_empty() {
            // Context-specific resolution wins over the key cached at construction.
            request.targeting_key = match active {
                Some(context) => {
                    resolve_targeting_key(Some(context), &self.application_id, &self.environment)
                }
                None => self.default_targeting_key.clone(),
            };
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(default_context: Option<EvaluationContext>) -> EvaluationDefaults {
        EvaluationDefaults::new("app".to_owned(), "production".to_owned(), default_context, None)
    }

    #[test]
    fn generated_key_joins_non_empty_parts() {
        let key = generate_targeting_key("theApp", "theEnv");
        let suffix = key.strip_prefix("theApp-theEnv-").unwrap();
        assert!(suffix.parse::<i64>().unwrap() >= 0);

        let key = generate_targeting_key("", "theEnv");
        assert!(key.starts_with("theEnv-"));

        let key = generate_targeting_key("", "");
        assert!(!key.is_empty());
        assert!(!key.contains('-'));
    }

    #[test]
    fn targeting_key_beats_user_id() {
        let context = EvaluationContext::with_targeting_key("theKey").user(User::new("theUser"));
        assert_eq!(resolve_targeting_key(Some(&context), "app", "env"), "theKey");
    }

    #[test]
    fn user_id_beats_generated_key() {
        let context = EvaluationContext::new().user(User::new("theUser"));
        assert_eq!(resolve_targeting_key(Some(&context), "app", "env"), "theUser");

        let context = EvaluationContext::with_targeting_key("").user(User::new("theUser"));
        assert_eq!(resolve_targeting_key(Some(&context), "app", "env"), "theUser");
    }

    #[test]
    fn falls_back_to_generated_key() {
        let context = EvaluationContext::new().user(User::new(""));
        assert!(resolve_targeting_key(Some(&context), "app", "env").starts_with("app-env-"));
        assert!(resolve_targeting_key(None, "app", "env").starts_with("app-env-"));
    }

    #[test]
    fn configured_default_targeting_key_is_kept() {
        let defaults = EvaluationDefaults::new(
            "app".to_owned(),
            "env".to_owned(),
            None,
            Some("configured".to_owned()),
        );
        assert_eq!(defaults.default_targeting_key, "configured");
        assert_eq!(defaults.build_request(None).targeting_key, "configured");
    }

    #[test]
    fn default_targeting_key_comes_from_default_context() {
        let defaults = defaults(Some(EvaluationContext::new().user(User::new("theUser"))));
        assert_eq!(defaults.default_targeting_key, "theUser");
    }

    #[test]
    fn override_context_replaces_default_context() {
        let defaults = defaults(Some(
            EvaluationContext::with_targeting_key("default-key")
                .ip_address("10.0.0.1")
                .custom_attribute("plan", "free"),
        ));
        let override_context = EvaluationContext::with_targeting_key("override-key");

        let request = defaults.build_request(Some(&override_context));

        assert_eq!(request.application, "app");
        assert_eq!(request.environment, "production");
        assert_eq!(request.targeting_key, "override-key");
        assert_eq!(request.ip_address, None);
        assert_eq!(request.custom_attributes, None);
    }

    #[test]
    fn default_context_is_copied_into_request() {
        let defaults = defaults(Some(
            EvaluationContext::with_targeting_key("default-key")
                .ip_address("10.0.0.1")
                .custom_attribute("plan", "free")
                .user(User::new("u1").email("u1@example.com")),
        ));

        let request = defaults.build_request(None);

        assert_eq!(request.targeting_key, "default-key");
        assert_eq!(request.ip_address, Some("10.0.0.1"));
        assert_eq!(
            request.custom_attributes.unwrap().get("plan"),
            Some(&serde_json::json!("free"))
        );
        assert_eq!(request.user.unwrap().email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn active_context_resolution_beats_cached_default_key() {
        let defaults = EvaluationDefaults::new(
            "app".to_owned(),
            "env".to_owned(),
            Some(EvaluationContext::new().ip_address("10.0.0.1")),
            Some("cached".to_owned()),
        );

        let request = defaults.build_request(None);

        assert_ne!(request.targeting_key, "cached");
        assert!(request.targeting_key.starts_with("app-env-"));
    }

    #[test]
    fn targeting_key_is_never_empty() {
        let empty_contexts = [
            None,
            Some(EvaluationContext::new()),
            Some(EvaluationContext::with_targeting_key("")),
            Some(EvaluationContext::new().user(User::new(""))),
        ];

        for default_context in empty_contexts.clone() {
            for override_context in empty_contexts.iter() {
                for (app, env) in [("app", "env"), ("", "env"), ("", "")] {
                    let defaults = EvaluationDefaults::new(
                        app.to_owned(),
                        env.to_owned(),
                        default_context.clone(),
                        None,
                    );
                    let request = defaults.build_request(override_context.as_ref());
                    assert!(!request.targeting_key.is_empty());
                }
            }
        }
    }

    #[test]
    fn request_serializes_to_wire_format() {
        let defaults = defaults(None);
        let context = EvaluationContext::with_targeting_key("user-1")
            .ip_address("203.0.113.7")
            .custom_attribute("beta", true)
            .user(User::new("user-1").name("Jane"));

        let json = serde_json::to_value(defaults.build_request(Some(&context))).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "application": "app",
                "environment": "production",
                "targetingKey": "user-1",
                "ipAddress": "203.0.113.7",
                "customAttributes": {"beta": true},
                "user": {"id": "user-1", "name": "Jane"}
            })
        );
    }

    #[test]
    fn empty_optional_fields_are_omitted() {
        let json = serde_json::to_value(defaults(None).build_request(None)).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert!(object.contains_key("targetingKey"));
    }
}
