// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use patron_auth::errors::AuthError;
use patron_config::grpc::errors::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    // Configuration / setup
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("auth error: {0}")]
    AuthError(#[from] AuthError),

    // Lifecycle
    #[error("server already started")]
    AlreadyStarted,
    #[error("server not started")]
    NotStarted,
}
