// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use duration_str::deserialize_duration;
use patron_auth::credentials::{CallCredentials, CredentialsInterceptor};
use serde::{Deserialize, Serialize};
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

use super::errors::ConfigError;
use crate::component::configuration::Configuration;
use crate::tls::client::TlsClientConfig as TLSSetting;

/// Keepalive configuration for the client.
/// This struct contains the keepalive time for HTTP2,
/// the timeout duration for the keepalive, and whether to permit
/// keepalive without an active stream.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KeepaliveConfig {
    /// The duration of the keepalive time for HTTP2
    #[serde(
        default = "default_http2_keepalive",
        deserialize_with = "deserialize_duration"
    )]
    pub http2_keepalive: Duration,

    /// The timeout duration for the keepalive
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,

    /// Whether to permit keepalive without an active stream
    #[serde(default)]
    pub keep_alive_while_idle: bool,
}

/// Defaults for KeepaliveConfig
impl Default for KeepaliveConfig {
    fn default() -> Self {
        KeepaliveConfig {
            http2_keepalive: default_http2_keepalive(),
            timeout: default_timeout(),
            keep_alive_while_idle: false,
        }
    }
}

fn default_http2_keepalive() -> Duration {
    Duration::from_secs(60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ClientConfig {
    /// The target the client will connect to. A missing scheme is derived
    /// from the TLS setting.
    pub endpoint: String,

    /// TLS client configuration.
    #[serde(default, rename = "tls")]
    pub tls_setting: TLSSetting,

    /// Keepalive parameters.
    pub keepalive: Option<KeepaliveConfig>,

    /// Timeout for the connection. Zero means no timeout.
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub connect_timeout: Duration,

    /// Timeout per request. Zero means no timeout.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,

    /// ReadBufferSize.
    pub buffer_size: Option<usize>,
}

/// Defaults for ClientConfig
impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: String::new(),
            tls_setting: TLSSetting::default(),
            keepalive: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            buffer_size: None,
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(0)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(0)
}

// Display for ClientConfig
impl std::fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ClientConfig {{ endpoint: {}, tls_setting: {}, keepalive: {:?}, connect_timeout: {:?}, request_timeout: {:?}, buffer_size: {:?} }}",
            self.endpoint,
            self.tls_setting,
            self.keepalive,
            self.connect_timeout,
            self.request_timeout,
            self.buffer_size,
        )
    }
}

impl Configuration for ClientConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.endpoint_uri()?;
        self.tls_setting.validate()?;

        Ok(())
    }
}

impl ClientConfig {
    /// Creates a new client configuration with the given endpoint.
    /// This function will return a ClientConfig with the endpoint set
    /// and all other fields set to default.
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tls_setting(self, tls_setting: TLSSetting) -> Self {
        Self {
            tls_setting,
            ..self
        }
    }

    pub fn with_keepalive(self, keepalive: KeepaliveConfig) -> Self {
        Self {
            keepalive: Some(keepalive),
            ..self
        }
    }

    pub fn with_connect_timeout(self, connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            ..self
        }
    }

    pub fn with_request_timeout(self, request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            ..self
        }
    }

    pub fn with_buffer_size(self, buffer_size: usize) -> Self {
        Self {
            buffer_size: Some(buffer_size),
            ..self
        }
    }

    /// Full URI of the endpoint. The scheme must agree with the TLS setting.
    pub fn endpoint_uri(&self) -> Result<String, ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let insecure = self.tls_setting.insecure;
        let expected = if insecure { "http" } else { "https" };

        match self.endpoint.split_once("://") {
            None => Ok(format!("{}://{}", expected, self.endpoint)),
            Some((scheme, _)) if scheme == expected => Ok(self.endpoint.clone()),
            Some((scheme, _)) => Err(ConfigError::SchemeMismatch {
                scheme: scheme.to_string(),
                insecure,
            }),
        }
    }

    /// Build a lazily connected channel. The connection is established on
    /// the first call and re-established after failures.
    pub fn to_channel(&self) -> Result<Channel, ConfigError> {
        let uri = self.endpoint_uri()?;
        let mut builder = Endpoint::from_shared(uri)?;

        if let Some(tls_config) = self.tls_setting.load_client_tls_config()? {
            builder = builder.tls_config(tls_config)?;
        }

        if !self.connect_timeout.is_zero() {
            builder = builder.connect_timeout(self.connect_timeout);
        }

        if !self.request_timeout.is_zero() {
            builder = builder.timeout(self.request_timeout);
        }

        if let Some(keepalive) = &self.keepalive {
            builder = builder
                .http2_keep_alive_interval(keepalive.http2_keepalive)
                .keep_alive_timeout(keepalive.timeout)
                .keep_alive_while_idle(keepalive.keep_alive_while_idle);
        }

        if let Some(buffer_size) = self.buffer_size {
            builder = builder.buffer_size(buffer_size);
        }

        debug!(%self, "client channel configured");
        Ok(builder.connect_lazy())
    }

    /// Build the interceptor attaching `credentials` to each call on this
    /// client's channels. Fails when the credentials require transport
    /// security and TLS is disabled.
    pub fn credentials_interceptor(
        &self,
        credentials: Arc<dyn CallCredentials>,
    ) -> Result<CredentialsInterceptor, ConfigError> {
        let secure = !self.tls_setting.insecure;
        if !secure && !credentials.require_transport_security() {
            warn!("credentials are sent without TLS. This is not recommended.");
        }

        Ok(CredentialsInterceptor::new(credentials, secure)?)
    }
}

#[cfg(test)]
mod tests {
    use patron_auth::credentials::BasicCredentials;
    use patron_auth::errors::AuthError;

    use super::*;

    static TEST_DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/tls");

    fn tls() -> TLSSetting {
        TLSSetting::new()
            .with_include_system_ca_certs_pool(false)
            .with_ca_file(&format!("{}/ca.crt", TEST_DATA_PATH))
    }

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "");
        assert_eq!(config.keepalive, None);
        assert_eq!(config.connect_timeout, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::ZERO);
    }

    #[test]
    fn test_endpoint_uri() {
        let config = ClientConfig::with_endpoint("localhost:7777");
        assert_eq!(config.endpoint_uri().unwrap(), "https://localhost:7777");

        let config = config.with_tls_setting(TLSSetting::insecure());
        assert_eq!(config.endpoint_uri().unwrap(), "http://localhost:7777");

        let config = ClientConfig::with_endpoint("http://localhost:7777");
        assert!(matches!(
            config.endpoint_uri(),
            Err(ConfigError::SchemeMismatch { insecure: false, .. })
        ));

        assert!(matches!(
            ClientConfig::default().endpoint_uri(),
            Err(ConfigError::MissingEndpoint)
        ));
    }

    #[tokio::test]
    async fn test_to_channel() {
        let config = ClientConfig::with_endpoint("https://127.0.0.1:7777")
            .with_tls_setting(tls().with_server_name("localhost"))
            .with_connect_timeout(Duration::from_secs(1))
            .with_keepalive(KeepaliveConfig::default());
        assert!(config.to_channel().is_ok());

        let config = ClientConfig::with_endpoint("127.0.0.1:7777").with_tls_setting(
            TLSSetting::new().with_include_system_ca_certs_pool(false),
        );
        assert!(matches!(
            config.to_channel(),
            Err(ConfigError::TlsConfig(_))
        ));
    }

    #[test]
    fn test_credentials_refused_without_tls() {
        let creds = Arc::new(BasicCredentials::new("john", "doe"));

        let config = ClientConfig::with_endpoint("127.0.0.1:7777")
            .with_tls_setting(TLSSetting::insecure());
        assert!(matches!(
            config.credentials_interceptor(creds.clone()),
            Err(ConfigError::AuthError(AuthError::InsecureTransport))
        ));

        let config = ClientConfig::with_endpoint("127.0.0.1:7777").with_tls_setting(tls());
        assert!(config.credentials_interceptor(creds).is_ok());
    }

    #[test]
    fn test_deserialize() {
        let yaml = r#"
endpoint: "https://localhost:7777"
connect_timeout: "5s"
tls:
  ca_file: "/etc/patron/ca.crt"
  server_name: localhost
keepalive:
  http2_keepalive: "30s"
"#;
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(
            config.tls_setting.config.ca_file.as_deref(),
            Some("/etc/patron/ca.crt")
        );
        assert_eq!(
            config.keepalive.unwrap().http2_keepalive,
            Duration::from_secs(30)
        );
    }
}
