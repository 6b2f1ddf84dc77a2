// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;

use patron_config::component::configuration::Configuration;
use patron_config::grpc::client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;
use crate::headers::AllowList;

fn default_endpoint() -> String {
    "0.0.0.0:8081".to_string()
}

fn default_forward_headers() -> Vec<String> {
    vec![
        patron_auth::LOGIN_KEY.to_string(),
        patron_auth::PASSWORD_KEY.to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How to reach the customer service
    pub backend: ClientConfig,

    /// HTTP headers copied into the gRPC metadata of each call.
    /// Anything else is dropped.
    #[serde(default = "default_forward_headers")]
    pub forward_headers: Vec<String>,
}

impl GatewayConfig {
    pub fn new(endpoint: &str, backend: ClientConfig) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            backend,
            forward_headers: default_forward_headers(),
        }
    }

    pub fn with_forward_headers(self, forward_headers: &[&str]) -> Self {
        Self {
            forward_headers: forward_headers.iter().map(|h| h.to_string()).collect(),
            ..self
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, GatewayError> {
        if self.endpoint.is_empty() {
            return Err(GatewayError::MissingEndpoint);
        }

        Ok(self.endpoint.parse()?)
    }

    pub fn allow_list(&self) -> Result<AllowList, GatewayError> {
        AllowList::new(&self.forward_headers)
    }
}

impl Configuration for GatewayConfig {
    type Error = GatewayError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.socket_addr()?;
        self.backend.validate()?;
        self.allow_list()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use patron_config::tls::client::TlsClientConfig;

    use super::*;

    fn backend() -> ClientConfig {
        ClientConfig::with_endpoint("127.0.0.1:7777").with_tls_setting(TlsClientConfig::insecure())
    }

    #[test]
    fn test_validate() {
        assert!(GatewayConfig::new("127.0.0.1:8081", backend()).validate().is_ok());

        assert!(matches!(
            GatewayConfig::new("", backend()).validate(),
            Err(GatewayError::MissingEndpoint)
        ));
        assert!(matches!(
            GatewayConfig::new("localhost", backend()).validate(),
            Err(GatewayError::EndpointParse(_))
        ));
        assert!(matches!(
            GatewayConfig::new("127.0.0.1:8081", ClientConfig::default()).validate(),
            Err(GatewayError::Backend(_))
        ));

        let config =
            GatewayConfig::new("127.0.0.1:8081", backend()).with_forward_headers(&["bad header"]);
        assert!(matches!(
            config.validate(),
            Err(GatewayError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_deserialize() {
        let yaml = r#"
backend:
  endpoint: "https://localhost:7777"
  tls:
    ca_file: "/etc/patron/ca.crt"
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.endpoint, "0.0.0.0:8081");
        assert_eq!(config.forward_headers, vec!["login", "password"]);

        let yaml = r#"
endpoint: "127.0.0.1:9090"
backend:
  endpoint: "localhost:7777"
forward_headers: [login, password, x-request-id]
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9090);
        assert_eq!(config.forward_headers.len(), 3);

        let yaml = r#"
backend:
  endpoint: "localhost:7777"
routes: []
"#;
        assert!(serde_yaml::from_str::<GatewayConfig>(yaml).is_err());
    }
}
