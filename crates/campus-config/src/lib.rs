//! # campus-config
//!
//! Layered configuration loading for the campus services using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CAMPUS_*` prefix, `__` as separator)
//! 2. The bare `GEMINI_API_KEY` variable (model credential only)
//! 3. Project-level `.campus/config.toml`
//! 4. User-level `~/.config/campus/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CAMPUS_SUPABASE__URL` -> `supabase.url`,
//! `CAMPUS_GRADER__BIND` -> `grader.bind`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use campus_config::CampusConfig;
//!
//! let config = CampusConfig::load_with_dotenv().expect("config");
//! if config.gemini.is_configured() {
//!     println!("grading with {}", config.gemini.model);
//! }
//! ```

mod error;
mod gemini;
mod grader;
mod session;
mod supabase;

pub use error::ConfigError;
pub use gemini::GeminiConfig;
pub use grader::GraderConfig;
pub use session::SessionConfig;
pub use supabase::SupabaseConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bare variable name accepted for the model credential.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CampusConfig {
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub grader: GraderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl CampusConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value fails
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".campus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: bare model credential
        figment = figment.merge(
            Env::raw()
                .only(&[GEMINI_API_KEY_VAR])
                .map(|_| "gemini.api_key".into()),
        );

        // Layer 4: prefixed environment variables (highest priority)
        figment.merge(Env::prefixed("CAMPUS_").split("__"))
    }

    /// Reject values that would make the services misbehave at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.supabase.url.is_empty()
            && !(self.supabase.url.starts_with("https://")
                || self.supabase.url.starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "supabase.url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }
        if self.grader.image_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "grader.image_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.grader.model_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "grader.model_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.session.expiry_buffer_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.expiry_buffer_secs".into(),
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }

    /// Return the identity service section, or an error if it is incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `url` or `anon_key` is empty.
    pub fn require_supabase(&self) -> Result<&SupabaseConfig, ConfigError> {
        if self.supabase.is_configured() {
            Ok(&self.supabase)
        } else {
            Err(ConfigError::NotConfigured {
                section: "supabase".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("campus").join("config.toml"))
    }
}
