//! Environment-driven application configuration.
//!
//! Every setting is read through [`mockable::Env`] so validation can be
//! exercised in isolation. Missing required variables are reported as
//! [`ConfigError`]; the binary treats any error as fatal.

use std::fmt;

use mockable::Env;
use sha2::{Digest, Sha512};
use tracing::warn;
use zeroize::Zeroizing;

const PORT_ENV: &str = "PORT";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const DATABASE_URL_ALIAS: &str = "MONGODB_URI";
const APP_ENV: &str = "APP_ENV";
const APP_ENV_ALIAS: &str = "NODE_ENV";
const JWT_SECRET_ENV: &str = "JWT_SECRET";
const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

const DEFAULT_PORT: u16 = 3000;
const PORT_EXPECTED: &str = "an integer between 1 and 65535";
/// Placeholder used when `JWT_SECRET` is unset.
pub const JWT_SECRET_PLACEHOLDER: &str = "your-secret-key";
/// Shortest session secret used as a cookie master key without stretching.
pub const SESSION_SECRET_MIN_LEN: usize = 32;

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development: verbose logs, raw fault messages, API docs.
    #[default]
    Development,
    /// Production: quiet request logs, opaque server faults.
    Production,
    /// Automated test runs.
    Test,
    /// Any other label, treated like development.
    Other(String),
}

impl Environment {
    /// Parse an environment label; matching is case-insensitive.
    ///
    /// # Examples
    /// ```
    /// use starter_backend::config::Environment;
    ///
    /// assert_eq!(Environment::from_name("Production"), Environment::Production);
    /// assert_eq!(Environment::from_name("staging").name(), "staging");
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" => Self::Development,
            "production" => Self::Production,
            "test" => Self::Test,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Read the environment label from `APP_ENV`, falling back to `NODE_ENV`
    /// and then to development.
    pub fn from_env<E: Env>(env: &E) -> Self {
        lookup(env, APP_ENV, Some(APP_ENV_ALIAS))
            .map(|label| Self::from_name(&label))
            .unwrap_or_default()
    }

    /// Label reported by diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Whether this is the production environment.
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether this is the development environment.
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value as found.
        value: String,
        /// Description of accepted values.
        expected: &'static str,
    },
}

/// Validated application configuration.
pub struct AppConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Database connection URL.
    pub database_url: String,
    /// Deployment environment.
    pub environment: Environment,
    /// Token signing secret; unused by the core.
    pub jwt_secret: String,
    /// Master secret for session cookies, at least
    /// [`SESSION_SECRET_MIN_LEN`] bytes; `None` means an ephemeral key.
    pub session_secret: Option<Zeroizing<Vec<u8>>>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("environment", &self.environment)
            .field("jwt_secret", &"<redacted>")
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Load and validate configuration from `env`.
    ///
    /// # Examples
    /// ```
    /// use mockable::MockEnv;
    /// use starter_backend::config::{AppConfig, Environment};
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "DATABASE_URL" => Some("postgres://localhost/app".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let config = AppConfig::from_env(&env).expect("valid configuration");
    /// assert_eq!(config.port, 3000);
    /// assert_eq!(config.environment, Environment::Development);
    /// ```
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// fails validation.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let environment = Environment::from_env(env);
        let database_url = lookup(env, DATABASE_URL_ENV, Some(DATABASE_URL_ALIAS)).ok_or(
            ConfigError::MissingEnv {
                name: DATABASE_URL_ENV,
            },
        )?;
        let port = port_from_env(env)?;
        let jwt_secret = jwt_secret_from_env(env, &environment);
        let session_secret = session_secret_from_env(env);

        Ok(Self {
            port,
            database_url,
            environment,
            jwt_secret,
            session_secret,
        })
    }
}

/// First non-blank value of `primary`, falling back to `alias`.
fn lookup<E: Env>(env: &E, primary: &'static str, alias: Option<&'static str>) -> Option<String> {
    let non_blank = |name: &str| env.string(name).filter(|value| !value.trim().is_empty());
    non_blank(primary).or_else(|| alias.and_then(non_blank))
}

fn port_from_env<E: Env>(env: &E) -> Result<u16, ConfigError> {
    let Some(raw) = lookup(env, PORT_ENV, None) else {
        return Ok(DEFAULT_PORT);
    };
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidEnv {
            name: PORT_ENV,
            value: raw,
            expected: PORT_EXPECTED,
        }),
    }
}

fn jwt_secret_from_env<E: Env>(env: &E, environment: &Environment) -> String {
    lookup(env, JWT_SECRET_ENV, None).unwrap_or_else(|| {
        if environment.is_production() {
            warn!("JWT_SECRET not set; using placeholder");
        }
        JWT_SECRET_PLACEHOLDER.to_owned()
    })
}

fn session_secret_from_env<E: Env>(env: &E) -> Option<Zeroizing<Vec<u8>>> {
    let Some(secret) = lookup(env, SESSION_SECRET_ENV, None).map(Zeroizing::new) else {
        warn!("SESSION_SECRET not set; using an ephemeral session key");
        return None;
    };
    if secret.len() >= SESSION_SECRET_MIN_LEN {
        return Some(Zeroizing::new(secret.as_bytes().to_vec()));
    }
    warn!(
        length = secret.len(),
        min_len = SESSION_SECRET_MIN_LEN,
        "SESSION_SECRET is short; stretching it with SHA-512"
    );
    Some(stretch_secret(secret.as_bytes()))
}

/// Expand a short secret into a 64-byte digest usable as a cookie master key.
fn stretch_secret(secret: &[u8]) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(Sha512::digest(secret).to_vec())
}
