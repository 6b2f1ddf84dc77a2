// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Caller identities and the verifiers that issue them.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::errors::AuthError;

/// Token identifying an authenticated caller.
///
/// Handlers read it from the request extensions, where only the
/// authentication interceptor puts it. Remote peers cannot set extensions,
/// so its presence proves the call went through validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks a login/password pair and yields the caller identity.
pub trait IdentityVerifier: Send + Sync + 'static {
    fn validate(&self, login: &str, password: &str) -> Result<ClientId, AuthError>;
}

/// Verifier holding a single configured identity.
#[derive(Clone)]
pub struct StaticIdentity {
    login: String,
    password: String,
    client_id: ClientId,
}

impl StaticIdentity {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let login = login.into();
        let password = password.into();
        let client_id = client_id.into();

        if login.is_empty() {
            return Err(AuthError::ConfigError("login is empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::ConfigError("password is empty".to_string()));
        }
        if client_id.is_empty() {
            return Err(AuthError::ConfigError("client id is empty".to_string()));
        }

        Ok(Self {
            login,
            password,
            client_id: ClientId::new(client_id),
        })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }
}

impl fmt::Debug for StaticIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticIdentity")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl IdentityVerifier for StaticIdentity {
    fn validate(&self, login: &str, password: &str) -> Result<ClientId, AuthError> {
        if !constant_time_eq(login, &self.login) {
            return Err(AuthError::UnknownIdentity(login.to_string()));
        }

        if !constant_time_eq(password, &self.password) {
            return Err(AuthError::BadCredential(login.to_string()));
        }

        Ok(self.client_id.clone())
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
