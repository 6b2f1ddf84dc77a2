// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use patron_auth::credentials::BasicCredentials;
use patron_auth::errors::AuthError;
use patron_auth::identity::StaticIdentity;
use serde::{Deserialize, Serialize};

use crate::component::configuration::Configuration;
use crate::opaque::OpaqueString;

/// Login/password pair. On the server it is the identity every call is
/// validated against; on a client it is the pair attached to each call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// The login of the caller.
    login: String,

    /// The password for the login.
    password: OpaqueString,

    /// Client id issued to callers presenting this pair. Defaults to the login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new(login: &str, password: &str) -> Self {
        Config {
            login: login.to_string(),
            password: OpaqueString::new(password),
            client_id: None,
        }
    }

    /// Set the client id issued on successful validation
    pub fn with_client_id(self, client_id: &str) -> Self {
        Config {
            client_id: Some(client_id.to_string()),
            ..self
        }
    }

    /// Get the login
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Get the password
    pub fn password(&self) -> &OpaqueString {
        &self.password
    }

    /// Get the client id
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(&self.login)
    }

    /// Build the verifier used by the server interceptor.
    pub fn to_verifier(&self) -> Result<StaticIdentity, AuthError> {
        StaticIdentity::new(self.login(), self.password().as_ref(), self.client_id())
    }

    /// Build the credentials attached by a client.
    pub fn to_credentials(&self) -> Result<BasicCredentials, AuthError> {
        self.validate()?;
        Ok(BasicCredentials::new(self.login(), self.password().as_ref()))
    }
}

impl Configuration for Config {
    type Error = AuthError;

    fn validate(&self) -> Result<(), Self::Error> {
        match (self.login(), self.password().as_ref(), self.client_id()) {
            ("", _, _) => Err(AuthError::ConfigError("login is empty".to_string())),
            (_, "", _) => Err(AuthError::ConfigError("password is empty".to_string())),
            (_, _, "") => Err(AuthError::ConfigError("client id is empty".to_string())),
            _ => Ok(()),
        }
    }
}
