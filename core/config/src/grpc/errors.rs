// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use patron_auth::errors::AuthError;
use thiserror::Error;

/// Errors for Config.
/// This is a custom error type for handling configuration-related errors.
/// It is used to provide more context to the error messages.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing grpc endpoint")]
    MissingEndpoint,
    #[error("endpoint parse error: {0}")]
    EndpointParse(#[from] std::net::AddrParseError),
    #[error("scheme {scheme} does not match tls setting (insecure: {insecure})")]
    SchemeMismatch { scheme: String, insecure: bool },
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),
    #[error("TLS config error: {0}")]
    TlsConfig(#[from] crate::tls::errors::ConfigError),
    #[error("auth error: {0}")]
    AuthError(#[from] AuthError),
}
