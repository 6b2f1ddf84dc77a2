// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use tonic::transport::{Certificate, ClientTlsConfig};

use super::common::{Config, ConfigError};
use crate::component::configuration::Configuration;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct TlsClientConfig {
    /// The Config struct
    #[serde(flatten, default)]
    pub config: Config,

    /// insecure do not setup a TLS connection
    #[serde(default)]
    pub insecure: bool,

    /// Override the name checked against the server certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// Display the ClientConfig
impl std::fmt::Display for TlsClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TlsClientConfig {
    /// Create a new TlsClientConfig
    pub fn new() -> Self {
        TlsClientConfig {
            ..Default::default()
        }
    }

    /// Create insecure TlsClientConfig
    pub fn insecure() -> Self {
        TlsClientConfig {
            insecure: true,
            ..Default::default()
        }
    }

    /// Set insecure (disable TLS)
    pub fn with_insecure(self, insecure: bool) -> Self {
        TlsClientConfig { insecure, ..self }
    }

    /// Set server name
    pub fn with_server_name(self, server_name: &str) -> Self {
        TlsClientConfig {
            server_name: Some(server_name.to_string()),
            ..self
        }
    }

    /// Set CA file
    pub fn with_ca_file(self, ca_file: &str) -> Self {
        TlsClientConfig {
            config: self.config.with_ca_file(ca_file),
            ..self
        }
    }

    /// Set CA pem
    pub fn with_ca_pem(self, ca_pem: &str) -> Self {
        TlsClientConfig {
            config: self.config.with_ca_pem(ca_pem),
            ..self
        }
    }

    /// Set include system CA certs pool
    pub fn with_include_system_ca_certs_pool(self, include_system_ca_certs_pool: bool) -> Self {
        TlsClientConfig {
            config: self
                .config
                .with_include_system_ca_certs_pool(include_system_ca_certs_pool),
            ..self
        }
    }

    /// Build the tonic TLS settings. Returns None when TLS is disabled.
    pub fn load_client_tls_config(&self) -> Result<Option<ClientTlsConfig>, ConfigError> {
        if self.insecure {
            return Ok(None);
        }

        // one-way TLS only
        if self.config.has_cert_or_key() {
            return Err(ConfigError::ClientCertNotSupported);
        }

        let ca = self.config.load_ca()?;
        if ca.is_none() && !self.config.include_system_ca_certs_pool {
            return Err(ConfigError::MissingCa);
        }

        let mut tls = ClientTlsConfig::new();
        if let Some(ca) = ca {
            tls = tls.ca_certificate(Certificate::from_pem(ca));
        }
        if self.config.include_system_ca_certs_pool {
            tls = tls.with_native_roots();
        }

        if let Some(server_name) = &self.server_name {
            tls = tls.domain_name(server_name.clone());
        }

        Ok(Some(tls))
    }
}

impl Configuration for TlsClientConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.load_client_tls_config().map(|_| ())
    }
}
