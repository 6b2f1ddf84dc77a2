// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use rustls_pki_types::pem::{self, PemObject};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use serde::{Deserialize, Serialize};

pub use super::errors::ConfigError;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    /// Path to the CA cert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,
    /// In memory PEM encoded CA cert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_pem: Option<String>,

    /// If true, also trust the system root CA certificates
    #[serde(default = "default_include_system_ca_certs_pool")]
    pub include_system_ca_certs_pool: bool,

    /// Path to the TLS cert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    /// In memory PEM encoded TLS cert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_pem: Option<String>,

    /// Path to the TLS key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    /// In memory PEM encoded TLS key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pem: Option<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            ca_file: None,
            ca_pem: None,
            include_system_ca_certs_pool: default_include_system_ca_certs_pool(),
            cert_file: None,
            cert_pem: None,
            key_file: None,
            key_pem: None,
        }
    }
}

fn default_include_system_ca_certs_pool() -> bool {
    true
}

impl Config {
    pub fn with_ca_file(self, ca_file: &str) -> Config {
        Config {
            ca_file: Some(ca_file.to_string()),
            ..self
        }
    }

    pub fn with_ca_pem(self, ca_pem: &str) -> Config {
        Config {
            ca_pem: Some(ca_pem.to_string()),
            ..self
        }
    }

    pub fn with_include_system_ca_certs_pool(self, include_system_ca_certs_pool: bool) -> Config {
        Config {
            include_system_ca_certs_pool,
            ..self
        }
    }

    pub fn with_cert_file(self, cert_file: &str) -> Config {
        Config {
            cert_file: Some(cert_file.to_string()),
            ..self
        }
    }

    pub fn with_cert_pem(self, cert_pem: &str) -> Config {
        Config {
            cert_pem: Some(cert_pem.to_string()),
            ..self
        }
    }

    pub fn with_key_file(self, key_file: &str) -> Config {
        Config {
            key_file: Some(key_file.to_string()),
            ..self
        }
    }

    pub fn with_key_pem(self, key_pem: &str) -> Config {
        Config {
            key_pem: Some(key_pem.to_string()),
            ..self
        }
    }

    /// Load and check the CA bundle, if any.
    pub(crate) fn load_ca(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let ca = read_source(&self.ca_file, &self.ca_pem, "ca")?;
        if let Some(ca) = &ca {
            validate_certificates(ca)?;
        }

        Ok(ca)
    }

    pub(crate) fn has_cert_or_key(&self) -> bool {
        self.cert_file.is_some()
            || self.cert_pem.is_some()
            || self.key_file.is_some()
            || self.key_pem.is_some()
    }

    /// Load and check the end-entity cert and key, if any.
    pub(crate) fn load_cert_and_key(&self) -> Result<Option<(Vec<u8>, Vec<u8>)>, ConfigError> {
        let cert = read_source(&self.cert_file, &self.cert_pem, "cert")?;
        let key = read_source(&self.key_file, &self.key_pem, "key")?;

        match (cert, key) {
            (Some(cert), Some(key)) => {
                validate_certificates(&cert)?;
                validate_private_key(&key)?;
                Ok(Some((cert, key)))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteCertAndKey),
        }
    }
}

/// Read PEM bytes from either a file or an inline value.
pub(crate) fn read_source(
    file: &Option<String>,
    pem: &Option<String>,
    what: &'static str,
) -> Result<Option<Vec<u8>>, ConfigError> {
    match (file, pem) {
        (Some(_), Some(_)) => Err(ConfigError::CannotUseBoth(what)),
        (Some(path), None) => std::fs::read(path)
            .map(Some)
            .map_err(|e| ConfigError::InvalidFile(format!("{path}: {e}"))),
        (None, Some(pem)) => Ok(Some(pem.as_bytes().to_vec())),
        (None, None) => Ok(None),
    }
}

pub(crate) fn validate_certificates(pem: &[u8]) -> Result<(), ConfigError> {
    let mut found = false;
    for cert in CertificateDer::pem_slice_iter(pem) {
        cert?;
        found = true;
    }

    if !found {
        return Err(ConfigError::InvalidPem(pem::Error::NoItemsFound));
    }

    Ok(())
}

pub(crate) fn validate_private_key(pem: &[u8]) -> Result<(), ConfigError> {
    PrivateKeyDer::from_pem_slice(pem)?;
    Ok(())
}
