//! HTTP server configuration object and helpers.

use std::net::{Ipv4Addr, SocketAddr};

use actix_web::cookie::Key;
use tracing::warn;

use crate::config::{AppConfig, Environment};

/// Everything the server needs besides the handler state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) environment: Environment,
}

impl ServerConfig {
    /// Construct a server configuration from explicit parts.
    #[must_use]
    pub fn new(key: Key, bind_addr: SocketAddr, environment: Environment) -> Self {
        Self {
            key,
            bind_addr,
            environment,
        }
    }

    /// Derive the session key and bind address from application config.
    ///
    /// The session key is derived from `SESSION_SECRET` when present; the
    /// secret buffer is wiped once the key exists. Without a secret an
    /// ephemeral key is generated, which invalidates sessions on restart.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let key = match &config.session_secret {
            Some(secret) => Key::derive_from(secret.as_slice()),
            None => {
                warn!("using an ephemeral session key; sessions end on restart");
                Key::generate()
            }
        };
        Self::new(
            key,
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port)),
            config.environment.clone(),
        )
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the deployment environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}
