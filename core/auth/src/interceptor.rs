// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Server-side interceptor validating the credentials of every call.

use std::fmt;
use std::sync::Arc;

use tonic::metadata::MetadataMap;
use tonic::metadata::errors::ToStrError;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::errors::AuthError;
use crate::identity::{ClientId, IdentityVerifier};
use crate::{LOGIN_KEY, PASSWORD_KEY};

/// Rejects calls whose metadata does not carry a valid login/password pair.
///
/// On success the caller [`ClientId`] is inserted in the request extensions
/// before the handler runs. Applied at the service level, so it covers unary
/// and streaming methods alike.
#[derive(Clone)]
pub struct AuthInterceptor {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthInterceptor {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    /// Validate the credentials found in `metadata`.
    ///
    /// A key present several times has its values concatenated in order. A
    /// call carrying neither key fails with [`AuthError::MissingCredentials`];
    /// a call carrying only one of them is validated with the other empty.
    /// Values that are not visible ASCII are rejected, never skipped.
    pub fn authenticate(&self, metadata: &MetadataMap) -> Result<ClientId, AuthError> {
        let login = joined_value(metadata, LOGIN_KEY).map_err(|_| {
            debug!("unreadable login value");
            AuthError::MissingCredentials
        })?;
        let password = joined_value(metadata, PASSWORD_KEY).map_err(|_| {
            debug!("unreadable password value");
            match &login {
                Some(login) => AuthError::BadCredential(login.clone()),
                None => AuthError::MissingCredentials,
            }
        })?;

        if login.is_none() && password.is_none() {
            return Err(AuthError::MissingCredentials);
        }

        self.verifier.validate(
            login.as_deref().unwrap_or_default(),
            password.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        match self.authenticate(request.metadata()) {
            Ok(client_id) => {
                debug!(%client_id, "call authenticated");
                request.extensions_mut().insert(client_id);
                Ok(request)
            }
            Err(e) => {
                warn!(reason = %e, "call rejected");
                Err(e.into())
            }
        }
    }
}

fn joined_value(metadata: &MetadataMap, key: &str) -> Result<Option<String>, ToStrError> {
    let mut values = metadata.get_all(key).iter().peekable();
    if values.peek().is_none() {
        return Ok(None);
    }

    values.map(|v| v.to_str()).collect::<Result<String, _>>().map(Some)
}
