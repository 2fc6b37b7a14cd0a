//! Hyphen Toggle: remote feature-flag evaluation.
//!
//! Start with [`ToggleConfig`] to create a [`Toggle`] client. Values are evaluated by the Toggle
//! service on every call; nothing is cached locally.
mod client;
mod config;
mod context;
mod endpoints;
mod models;

pub use client::{Toggle, ToggleOutcome};
pub use config::ToggleConfig;
pub use context::{
    generate_targeting_key, resolve_targeting_key, CustomAttributes, EvaluationContext,
    EvaluationRequest, User,
};
pub use endpoints::{
    default_horizon_urls, organization_horizon_url, organization_id_from_public_key,
    resolve_horizon_urls, DEFAULT_HORIZON_URL, PUBLIC_KEY_PREFIX,
};
pub use models::{Evaluation, EvaluationResponse, ToggleType, ToggleValue};
