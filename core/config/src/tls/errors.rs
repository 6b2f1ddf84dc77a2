// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors for Config
#[derive(Error, Debug)]
pub enum ConfigError {
    // PEM / certificate/key parsing
    #[error("invalid pem format: {0}")]
    InvalidPem(#[from] rustls_pki_types::pem::Error),
    // File content/read validation
    #[error("error reading cert/key from file: {0}")]
    InvalidFile(String),
    // Conflicting sources
    #[error("both file and pem are set for {0}")]
    CannotUseBoth(&'static str),
    // Required artifacts
    #[error("missing server cert or key")]
    MissingServerCertAndKey,
    #[error("cert and key must be set together")]
    IncompleteCertAndKey,
    #[error("no trusted CA configured and system CA pool disabled")]
    MissingCa,
    #[error("client certificates are not supported")]
    ClientCertNotSupported,
}
