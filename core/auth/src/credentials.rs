// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Client-side call credentials.

use std::fmt;
use std::sync::Arc;

use tonic::metadata::MetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::errors::AuthError;
use crate::{LOGIN_KEY, PASSWORD_KEY};

/// Per-call credentials attached to outgoing requests as metadata.
pub trait CallCredentials: Send + Sync + 'static {
    /// Metadata entries to add to every outgoing call.
    fn request_metadata(&self) -> Result<Vec<(&'static str, String)>, AuthError>;

    /// Whether these credentials may only travel over an encrypted channel.
    fn require_transport_security(&self) -> bool;
}

/// Login/password pair sent as `login` and `password` metadata.
#[derive(Clone)]
pub struct BasicCredentials {
    login: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CallCredentials for BasicCredentials {
    fn request_metadata(&self) -> Result<Vec<(&'static str, String)>, AuthError> {
        Ok(vec![
            (LOGIN_KEY, self.login.clone()),
            (PASSWORD_KEY, self.password.clone()),
        ])
    }

    fn require_transport_security(&self) -> bool {
        true
    }
}

/// Client interceptor adding [`CallCredentials`] metadata to each call.
#[derive(Clone)]
pub struct CredentialsInterceptor {
    credentials: Arc<dyn CallCredentials>,
}

impl CredentialsInterceptor {
    /// Build the interceptor for a channel whose security is
    /// `transport_secure`. Credentials demanding transport security are
    /// refused on a plaintext channel.
    pub fn new(
        credentials: Arc<dyn CallCredentials>,
        transport_secure: bool,
    ) -> Result<Self, AuthError> {
        if credentials.require_transport_security() && !transport_secure {
            return Err(AuthError::InsecureTransport);
        }

        Ok(Self { credentials })
    }
}

impl fmt::Debug for CredentialsInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsInterceptor")
            .finish_non_exhaustive()
    }
}

impl Interceptor for CredentialsInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        for (key, value) in self.credentials.request_metadata()? {
            let value = MetadataValue::try_from(value.as_str())
                .map_err(|_| AuthError::InvalidMetadata(key))?;
            request.metadata_mut().insert(key, value);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ClientId, StaticIdentity};
    use crate::interceptor::AuthInterceptor;

    #[test]
    fn test_basic_credentials_metadata() {
        let creds = BasicCredentials::new("john", "doe");
        let md = creds.request_metadata().unwrap();

        assert_eq!(
            md,
            vec![("login", "john".to_string()), ("password", "doe".to_string())]
        );
        assert!(creds.require_transport_security());
        assert!(!format!("{creds:?}").contains("doe"));
    }

    #[test]
    fn test_refused_on_insecure_transport() {
        let creds = Arc::new(BasicCredentials::new("john", "doe"));
        let err = CredentialsInterceptor::new(creds, false).unwrap_err();
        assert_eq!(err, AuthError::InsecureTransport);
    }

    #[test]
    fn test_attached_credentials_pass_validation() {
        let creds = Arc::new(BasicCredentials::new("john", "doe"));
        let mut client = CredentialsInterceptor::new(creds, true).unwrap();
        let request = client.call(Request::new(())).unwrap();

        assert_eq!(request.metadata().get("login").unwrap(), "john");
        assert_eq!(request.metadata().get("password").unwrap(), "doe");

        let identity = StaticIdentity::new("john", "doe", "42").unwrap();
        let mut server = AuthInterceptor::new(Arc::new(identity));
        let request = server.call(request).unwrap();
        assert_eq!(
            request.extensions().get::<ClientId>(),
            Some(&ClientId::new("42"))
        );
    }

    #[test]
    fn test_invalid_metadata_value() {
        let creds = Arc::new(BasicCredentials::new("john", "line\nbreak"));
        let mut client = CredentialsInterceptor::new(creds, true).unwrap();
        let status = client.call(Request::new(())).unwrap_err();

        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
