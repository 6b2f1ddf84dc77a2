// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Configuration / generic
    #[error("config error: {0}")]
    ConfigError(String),

    // Call validation
    #[error("missing credentials")]
    MissingCredentials,
    #[error("unknown user {0}")]
    UnknownIdentity(String),
    #[error("bad password for user {0}")]
    BadCredential(String),

    // Credential attachment
    #[error("invalid metadata value for key {0}")]
    InvalidMetadata(&'static str),
    #[error("credentials require a secure transport")]
    InsecureTransport,
}

impl AuthError {
    /// True when the error is the outcome of rejecting a caller, as opposed
    /// to a local misconfiguration.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredentials
                | AuthError::UnknownIdentity(_)
                | AuthError::BadCredential(_)
        )
    }
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            Status::unauthenticated(err.to_string())
        } else {
            Status::internal(err.to_string())
        }
    }
}
