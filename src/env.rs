use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{Error, HyphenConfig, Result};

/// Hyphen settings read from the environment.
///
/// Service clients never read the environment themselves; load an `EnvConfig` and
/// [`apply`](EnvConfig::apply) it to a [`HyphenConfig`] instead. Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct EnvConfig {
    pub public_api_key: Option<String>,
    pub api_key: Option<String>,
    pub application_id: Option<String>,
    pub environment: Option<String>,
    pub organization_id: Option<String>,
}

impl EnvConfig {
    #[allow(missing_docs)]
    pub const PUBLIC_API_KEY_VAR: &'static str = "HYPHEN_PUBLIC_API_KEY";
    #[allow(missing_docs)]
    pub const API_KEY_VAR: &'static str = "HYPHEN_API_KEY";
    #[allow(missing_docs)]
    pub const APPLICATION_ID_VAR: &'static str = "HYPHEN_APPLICATION_ID";
    #[allow(missing_docs)]
    pub const ENVIRONMENT_VAR: &'static str = "HYPHEN_ENVIRONMENT";
    #[allow(missing_docs)]
    pub const ORGANIZATION_ID_VAR: &'static str = "HYPHEN_ORGANIZATION_ID";

    /// Read the `HYPHEN_*` variables of the current process.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the variables through `lookup`, which returns the value of a variable by name.
    ///
    /// ```
    /// # use hyphen::EnvConfig;
    /// let env = EnvConfig::from_lookup(|name| match name {
    ///     "HYPHEN_API_KEY" => Some("secret".to_owned()),
    ///     _ => None,
    /// });
    /// assert_eq!(env.api_key.as_deref(), Some("secret"));
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        EnvConfig {
            public_api_key: read(Self::PUBLIC_API_KEY_VAR),
            api_key: read(Self::API_KEY_VAR),
            application_id: read(Self::APPLICATION_ID_VAR),
            environment: read(Self::ENVIRONMENT_VAR),
            organization_id: read(Self::ORGANIZATION_ID_VAR),
        }
    }

    /// Fill the fields of `config` that are unset. Explicit settings always win.
    pub fn apply(&self, mut config: HyphenConfig) -> HyphenConfig {
        fill(&mut config.public_api_key, &self.public_api_key);
        fill(&mut config.api_key, &self.api_key);
        fill(&mut config.application_id, &self.application_id);
        fill(&mut config.environment, &self.environment);
        fill(&mut config.organization_id, &self.organization_id);
        config
    }
}

/// Options of [`load_env_files`].
#[derive(Debug, Clone)]
pub struct LoadEnvOptions {
    /// Directory holding the `.env` files. The current directory when unset.
    pub path: Option<PathBuf>,
    /// Environment whose `.env.<environment>` files are loaded. When unset,
    /// `HYPHEN_ENVIRONMENT` is read after the base files are loaded.
    pub environment: Option<String>,
    /// Whether `.local` files are loaded. Defaults to `true`.
    pub local: bool,
}

impl Default for LoadEnvOptions {
    fn default() -> Self {
        LoadEnvOptions {
            path: None,
            environment: None,
            local: true,
        }
    }
}

/// Load `.env` files into the process environment.
///
/// Files are loaded in this order, skipping the ones that do not exist:
/// 1. `.env`, which never overrides variables already set;
/// 2. `.env.local`;
/// 3. `.env.<environment>`;
/// 4. `.env.<environment>.local`.
///
/// Every file after the first overrides what was set before it. Returns the files that were
/// loaded. Call this before [`EnvConfig::from_env`] or [`HyphenConfig::from_env`].
///
/// ```no_run
/// # use hyphen::{load_env_files, HyphenConfig, LoadEnvOptions};
/// load_env_files(&LoadEnvOptions::default()).unwrap();
/// let config = HyphenConfig::from_env();
/// ```
pub fn load_env_files(options: &LoadEnvOptions) -> Result<Vec<PathBuf>> {
    let dir = match &options.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().map_err(|err| Error::EnvFile {
            path: PathBuf::from("."),
            source: Arc::new(dotenvy::Error::Io(err)),
        })?,
    };

    let mut loaded = Vec::new();
    load_file(&dir.join(".env"), false, &mut loaded)?;
    if options.local {
        load_file(&dir.join(".env.local"), true, &mut loaded)?;
    }

    let environment = options
        .environment
        .clone()
        .or_else(|| std::env::var(EnvConfig::ENVIRONMENT_VAR).ok())
        .filter(|environment| !environment.is_empty());
    if let Some(environment) = environment {
        load_file(&dir.join(format!(".env.{environment}")), true, &mut loaded)?;
        if options.local {
            load_file(
                &dir.join(format!(".env.{environment}.local")),
                true,
                &mut loaded,
            )?;
        }
    }

    Ok(loaded)
}

fn load_file(path: &Path, overwrite: bool, loaded: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let result = if overwrite {
        dotenvy::from_path_override(path)
    } else {
        dotenvy::from_path(path)
    };
    result.map_err(|err| Error::EnvFile {
        path: path.to_owned(),
        source: Arc::new(err),
    })?;
    log::debug!(target: "hyphen", path:? = path, overwrite; "loaded env file");
    loaded.push(path.to_owned());
    Ok(())
}

fn fill(target: &mut Option<String>, value: &Option<String>) {
    if target.as_deref().map_or(true, str::is_empty) {
        if let Some(value) = value {
            *target = Some(value.clone());
        }
    }
}
