// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use patron_config::grpc::errors::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    // Configuration
    #[error("missing gateway endpoint")]
    MissingEndpoint,
    #[error("endpoint parse error: {0}")]
    EndpointParse(#[from] std::net::AddrParseError),
    #[error("backend configuration error: {0}")]
    Backend(#[from] ConfigError),
    #[error("invalid forwarded header {0}")]
    InvalidHeader(String),

    // Lifecycle
    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),
    #[error("gateway already started")]
    AlreadyStarted,
    #[error("gateway not started")]
    NotStarted,
}
