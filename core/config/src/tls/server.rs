// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use tonic::transport::{Identity, ServerTlsConfig};

use super::common::{Config, ConfigError};
use crate::component::configuration::Configuration;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct TlsServerConfig {
    /// The Config struct
    #[serde(flatten, default)]
    pub config: Config,

    /// insecure do not setup a TLS server
    #[serde(default)]
    pub insecure: bool,
}

/// Display the ServerConfig
impl std::fmt::Display for TlsServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TlsServerConfig {
    /// Create a new TlsServerConfig
    pub fn new() -> Self {
        TlsServerConfig {
            ..Default::default()
        }
    }

    /// Create insecure TlsServerConfig
    /// This will disable TLS and allow plaintext connections
    pub fn insecure() -> Self {
        TlsServerConfig {
            insecure: true,
            ..Default::default()
        }
    }

    /// Set insecure (disable TLS)
    pub fn with_insecure(self, insecure: bool) -> Self {
        TlsServerConfig { insecure, ..self }
    }

    /// Set cert file
    pub fn with_cert_file(self, cert_file: &str) -> Self {
        TlsServerConfig {
            config: self.config.with_cert_file(cert_file),
            ..self
        }
    }

    /// Set cert pem
    pub fn with_cert_pem(self, cert_pem: &str) -> Self {
        TlsServerConfig {
            config: self.config.with_cert_pem(cert_pem),
            ..self
        }
    }

    /// Set key file
    pub fn with_key_file(self, key_file: &str) -> Self {
        TlsServerConfig {
            config: self.config.with_key_file(key_file),
            ..self
        }
    }

    /// Set key pem
    pub fn with_key_pem(self, key_pem: &str) -> Self {
        TlsServerConfig {
            config: self.config.with_key_pem(key_pem),
            ..self
        }
    }

    /// Build the tonic TLS settings. Returns None when TLS is disabled.
    ///
    /// The server never requests a client certificate: callers are
    /// identified by their credentials, not at the TLS layer.
    pub fn load_server_tls_config(&self) -> Result<Option<ServerTlsConfig>, ConfigError> {
        if self.insecure {
            return Ok(None);
        }

        let (cert, key) = self
            .config
            .load_cert_and_key()?
            .ok_or(ConfigError::MissingServerCertAndKey)?;

        Ok(Some(
            ServerTlsConfig::new().identity(Identity::from_pem(cert, key)),
        ))
    }
}

impl Configuration for TlsServerConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.load_server_tls_config().map(|_| ())
    }
}
