//! Runtime configuration.
//!
//! Values are resolved in order: explicit builder value, environment variable,
//! built-in default. `main` loads `.env` before building, so entries there act
//! like environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::aggregator::{Aggregator, DEFAULT_SOURCE_TIMEOUT};
use crate::service::EnergyService;
use crate::sources::{CatalogClient, CatalogClientBuilder, RetryPolicy, SourceError, default_sources};
use crate::taxonomy::{Taxonomy, TaxonomyError};

/// Path of a taxonomy JSON file to use instead of the built-in table.
pub const TAXONOMY_ENV: &str = "APPENERGY_TAXONOMY";

/// Seconds to wait for the catalogs.
pub const SOURCE_TIMEOUT_ENV: &str = "APPENERGY_SOURCE_TIMEOUT_SECS";

/// Retries per catalog request after a transient failure.
pub const MAX_RETRIES_ENV: &str = "APPENERGY_MAX_RETRIES";

const DEFAULT_MAX_RETRIES: usize = 2;

/// Longer source timeouts are capped to this (one day).
pub const MAX_SOURCE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors raised while resolving settings or building from them.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Source timeout must be greater than zero")]
    ZeroTimeout,

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error("Failed to create catalog client: {0}")]
    Client(#[from] SourceError),
}

/// Where `appenergy` looks for a user taxonomy when none is configured.
///
/// `{config_dir}/appenergy/taxonomy.json`, e.g. `~/.config/appenergy/taxonomy.json`
/// on Linux.
pub fn default_taxonomy_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("appenergy").join("taxonomy.json"))
}

/// Builder for [`Settings`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use appenergy::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .source_timeout(Duration::from_secs(5))
///     .max_retries(0)
///     .build()
///     .unwrap();
/// assert_eq!(settings.source_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    taxonomy_path: Option<PathBuf>,
    source_timeout: Option<Duration>,
    max_retries: Option<usize>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the taxonomy from `path` instead of the built-in table.
    pub fn taxonomy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.taxonomy_path = Some(path.into());
        self
    }

    /// How long to wait for the catalogs (default 20s, at most one day).
    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = Some(timeout);
        self
    }

    /// Retries per request on transient failures (default 2).
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Resolves every setting.
    ///
    /// Unset values fall back to `APPENERGY_TAXONOMY`,
    /// `APPENERGY_SOURCE_TIMEOUT_SECS` and `APPENERGY_MAX_RETRIES`, then to
    /// the defaults. The taxonomy defaults to [`default_taxonomy_path`] when
    /// that file exists and to the built-in table otherwise.
    pub fn build(self) -> Result<Settings, SettingsError> {
        let taxonomy_path = self
            .taxonomy_path
            .or_else(|| env_value(TAXONOMY_ENV).map(PathBuf::from))
            .or_else(|| default_taxonomy_path().filter(|path| path.is_file()));

        let source_timeout = match self.source_timeout {
            Some(timeout) => timeout,
            None => match env_number(SOURCE_TIMEOUT_ENV)? {
                Some(secs) => Duration::from_secs(secs),
                None => DEFAULT_SOURCE_TIMEOUT,
            },
        };
        if source_timeout.is_zero() {
            return Err(SettingsError::ZeroTimeout);
        }
        if source_timeout > MAX_SOURCE_TIMEOUT {
            debug!(requested = ?source_timeout, cap = ?MAX_SOURCE_TIMEOUT, "capping source timeout");
        }
        let source_timeout = source_timeout.min(MAX_SOURCE_TIMEOUT);

        let max_retries = match self.max_retries {
            Some(retries) => retries,
            None => match env_number(MAX_RETRIES_ENV)? {
                Some(retries) => usize::try_from(retries).unwrap_or(usize::MAX),
                None => DEFAULT_MAX_RETRIES,
            },
        };

        let settings = Settings {
            taxonomy_path,
            source_timeout,
            max_retries,
        };
        debug!(?settings, "resolved settings");
        Ok(settings)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_number(name: &'static str) -> Result<Option<u64>, SettingsError> {
    env_value(name)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidNumber { name, value })
        })
        .transpose()
}

/// Resolved configuration for one run.
///
/// `Settings::default()` uses the built-in taxonomy and default limits without
/// consulting the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    taxonomy_path: Option<PathBuf>,
    source_timeout: Duration,
    max_retries: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            taxonomy_path: None,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Taxonomy file in use; `None` means the built-in table.
    pub fn taxonomy_path(&self) -> Option<&Path> {
        self.taxonomy_path.as_deref()
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }

    /// Loads the configured taxonomy file, or the built-in table.
    pub fn load_taxonomy(&self) -> Result<Taxonomy, SettingsError> {
        let taxonomy = match &self.taxonomy_path {
            Some(path) => Taxonomy::from_path(path)?,
            None => Taxonomy::builtin()?,
        };
        Ok(taxonomy)
    }

    /// HTTP client for the catalogs; each request is bounded by the source timeout.
    pub fn catalog_client(&self) -> Result<CatalogClient, SettingsError> {
        let client = CatalogClientBuilder::new()
            .timeout(self.source_timeout)
            .retry_policy(self.retry_policy())
            .build()?;
        Ok(client)
    }

    /// Wires taxonomy, catalogs and aggregator into a ready service.
    pub fn energy_service(&self) -> Result<EnergyService, SettingsError> {
        let taxonomy = Arc::new(self.load_taxonomy()?);
        let client = Arc::new(self.catalog_client()?);
        let aggregator = Aggregator::new(default_sources(client)).with_timeout(self.source_timeout);
        Ok(EnergyService::new(taxonomy, aggregator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        unsafe {
            std::env::remove_var(TAXONOMY_ENV);
            std::env::remove_var(SOURCE_TIMEOUT_ENV);
            std::env::remove_var(MAX_RETRIES_ENV);
        }
    }

    #[test]
    #[serial]
    fn build_uses_defaults_without_env() {
        clear_env();

        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings.source_timeout(), Duration::from_secs(20));
        assert_eq!(settings.max_retries(), 2);
    }

    #[test]
    #[serial]
    fn build_reads_environment_variables() {
        clear_env();
        unsafe {
            std::env::set_var(TAXONOMY_ENV, "/tmp/custom-taxonomy.json");
            std::env::set_var(SOURCE_TIMEOUT_ENV, "7");
            std::env::set_var(MAX_RETRIES_ENV, "0");
        }

        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(
            settings.taxonomy_path(),
            Some(Path::new("/tmp/custom-taxonomy.json"))
        );
        assert_eq!(settings.source_timeout(), Duration::from_secs(7));
        assert_eq!(settings.max_retries(), 0);
        assert_eq!(settings.retry_policy().max_retries, 0);

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_values_win_over_environment() {
        clear_env();
        unsafe {
            std::env::set_var(SOURCE_TIMEOUT_ENV, "7");
            std::env::set_var(MAX_RETRIES_ENV, "5");
        }

        let settings = SettingsBuilder::new()
            .source_timeout(Duration::from_secs(3))
            .max_retries(1)
            .taxonomy_path("/etc/appenergy.json")
            .build()
            .unwrap();
        assert_eq!(settings.source_timeout(), Duration::from_secs(3));
        assert_eq!(settings.max_retries(), 1);
        assert_eq!(settings.taxonomy_path(), Some(Path::new("/etc/appenergy.json")));

        clear_env();
    }

    #[test]
    #[serial]
    fn huge_timeout_is_capped() {
        clear_env();
        unsafe {
            std::env::set_var(SOURCE_TIMEOUT_ENV, u64::MAX.to_string());
        }

        let from_env = SettingsBuilder::new().build().unwrap();
        assert_eq!(from_env.source_timeout(), MAX_SOURCE_TIMEOUT);

        let from_builder = SettingsBuilder::new()
            .source_timeout(Duration::from_secs(u64::MAX))
            .build()
            .unwrap();
        assert_eq!(from_builder.source_timeout(), MAX_SOURCE_TIMEOUT);

        clear_env();
    }

    #[test]
    #[serial]
    fn malformed_number_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var(SOURCE_TIMEOUT_ENV, "soon");
        }

        let err = SettingsBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidNumber { name: SOURCE_TIMEOUT_ENV, ref value } if value == "soon"
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn blank_environment_value_counts_as_unset() {
        clear_env();
        unsafe {
            std::env::set_var(MAX_RETRIES_ENV, "  ");
        }

        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings.max_retries(), 2);

        clear_env();
    }

    #[test]
    #[serial]
    fn zero_timeout_is_rejected() {
        let err = SettingsBuilder::new()
            .source_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, SettingsError::ZeroTimeout));
    }

    #[test]
    fn default_settings_load_builtin_taxonomy() {
        let taxonomy = Settings::default().load_taxonomy().unwrap();
        assert!(taxonomy.category("internet_browsers").is_some());
    }

    #[test]
    #[serial]
    fn load_taxonomy_reads_configured_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "categories": [ {{ "id": "games", "keywords": ["game"] }} ],
                 "energy_tiers": {{ "games": "high-energy-level" }} }}"#
        )
        .unwrap();

        let settings = SettingsBuilder::new()
            .taxonomy_path(file.path())
            .build()
            .unwrap();
        let taxonomy = settings.load_taxonomy().unwrap();

        assert_eq!(taxonomy.categories().len(), 1);
        assert_eq!(taxonomy.energy_tier("games").as_str(), "high-energy-level");
    }

    #[test]
    #[serial]
    fn missing_taxonomy_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .taxonomy_path(dir.path().join("absent.json"))
            .build()
            .unwrap();

        assert!(matches!(
            settings.load_taxonomy(),
            Err(SettingsError::Taxonomy(TaxonomyError::Io { .. }))
        ));
    }

    #[test]
    #[serial]
    fn energy_service_uses_configured_timeout() {
        clear_env();
        let settings = SettingsBuilder::new()
            .source_timeout(Duration::from_secs(4))
            .build()
            .unwrap();
        let service = settings.energy_service().unwrap();

        assert_eq!(service.aggregator().timeout(), Duration::from_secs(4));
        assert_eq!(service.aggregator().sources().len(), 6);
    }

    #[test]
    fn default_taxonomy_path_lives_in_config_dir() {
        if let Some(path) = default_taxonomy_path() {
            assert!(path.ends_with("appenergy/taxonomy.json"));
        }
    }
}
