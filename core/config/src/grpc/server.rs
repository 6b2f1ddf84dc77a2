// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::{net::SocketAddr, str::FromStr, time::Duration};

use duration_str::deserialize_duration;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::codegen::{Body, Bytes, StdError};
use tracing::{debug, error};

use super::errors::ConfigError;
use crate::component::configuration::Configuration;
use crate::tls::server::TlsServerConfig as TLSSetting;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KeepaliveServerParameters {
    /// max_connection_age sets the maximum amount of time a connection may exist before it will be closed.
    #[serde(
        default = "default_max_connection_age",
        deserialize_with = "deserialize_duration"
    )]
    pub max_connection_age: Duration,

    /// Time sets the frequency of the keepalive ping.
    #[serde(default = "default_time", deserialize_with = "deserialize_duration")]
    pub time: Duration,

    /// Timeout sets the amount of time the server waits for a keepalive ping ack.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

/// Default values for KeepaliveServerParameters
impl Default for KeepaliveServerParameters {
    fn default() -> Self {
        Self {
            max_connection_age: default_max_connection_age(),
            time: default_time(),
            timeout: default_timeout(),
        }
    }
}

fn default_max_connection_age() -> Duration {
    Duration::from_secs(2 * 3600)
}

fn default_time() -> Duration {
    Duration::from_secs(2 * 60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ServerConfig {
    /// Endpoint is the address to listen on.
    pub endpoint: String,

    /// Configures the protocol to use TLS.
    #[serde(default, rename = "tls")]
    pub tls_setting: TLSSetting,

    /// Maximum size (in MiB) of HTTP/2 frames accepted by the server.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: Option<u32>,

    /// Limit on the number of concurrent requests served on each connection.
    #[serde(default = "default_max_concurrent_streams")]
    pub max_concurrent_streams: Option<u32>,

    /// Keepalive anchor for all the settings related to keepalive.
    #[serde(default)]
    pub keepalive: KeepaliveServerParameters,
}

fn default_max_frame_size() -> Option<u32> {
    Some(4)
}

fn default_max_concurrent_streams() -> Option<u32> {
    Some(100)
}

/// Default values for ServerConfig
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            tls_setting: TLSSetting::default(),
            max_frame_size: default_max_frame_size(),
            max_concurrent_streams: default_max_concurrent_streams(),
            keepalive: KeepaliveServerParameters::default(),
        }
    }
}

/// Display implementation for ServerConfig
/// This is used to print the ServerConfig in a human-readable format.
impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ServerConfig {{ endpoint: {}, tls_setting: {}, max_frame_size: {:?}, max_concurrent_streams: {:?}, keepalive: {:?} }}",
            self.endpoint,
            self.tls_setting,
            self.max_frame_size,
            self.max_concurrent_streams,
            self.keepalive,
        )
    }
}

impl Configuration for ServerConfig {
    type Error = ConfigError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        SocketAddr::from_str(self.endpoint.as_str())?;

        self.tls_setting.validate()?;

        Ok(())
    }
}

/// ServerFuture is a type alias for a boxed future that returns a Result<(), tonic::transport::Error>.
pub type ServerFuture = Pin<Box<dyn Future<Output = Result<(), tonic::transport::Error>> + Send>>;

impl ServerConfig {
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tls_settings(self, tls_setting: TLSSetting) -> Self {
        Self {
            tls_setting,
            ..self
        }
    }

    pub fn with_max_frame_size(self, max_frame_size: Option<u32>) -> Self {
        Self {
            max_frame_size,
            ..self
        }
    }

    pub fn with_max_concurrent_streams(self, max_concurrent_streams: Option<u32>) -> Self {
        Self {
            max_concurrent_streams,
            ..self
        }
    }

    pub fn with_keepalive(self, keepalive: KeepaliveServerParameters) -> Self {
        Self { keepalive, ..self }
    }

    fn create_server_builder(&self) -> tonic::transport::Server {
        let builder: tonic::transport::Server =
            tonic::transport::Server::builder().accept_http1(false);

        let builder = match self.max_concurrent_streams {
            Some(max_concurrent_streams) => {
                builder.concurrency_limit_per_connection(max_concurrent_streams as usize)
            }
            None => builder,
        };

        let builder = match self.max_frame_size {
            Some(max_frame_size) => builder.max_frame_size(max_frame_size * 1024 * 1024),
            None => builder,
        };

        let builder = builder.http2_keepalive_interval(Some(self.keepalive.time));
        let builder = builder.http2_keepalive_timeout(Some(self.keepalive.timeout));

        builder.max_connection_age(self.keepalive.max_connection_age)
    }

    /// Bind the listener and build the server future for `svc`.
    ///
    /// The returned address is the one actually bound, which differs from
    /// the configured one when the configured port is 0.
    ///
    /// `svc` may be wrapped, e.g. by an interceptor, as long as its response
    /// body yields `Bytes`.
    pub async fn to_server_future<S, B>(
        &self,
        svc: S,
    ) -> Result<(SocketAddr, ServerFuture), ConfigError>
    where
        S: tower::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<B>,
                Error = Infallible,
            >
            + tonic::server::NamedService
            + Clone
            + Send
            + 'static
            + Sync,
        S::Future: Send + 'static,
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<StdError>,
    {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let addr = SocketAddr::from_str(self.endpoint.as_str())?;

        let mut builder = self.create_server_builder();
        if let Some(tls_config) = self.tls_setting.load_server_tls_config()? {
            builder = builder.tls_config(tls_config)?;
        }

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let incoming = TcpListenerStream::new(listener);

        let router = builder.add_service(svc);
        Ok((local_addr, router.serve_with_incoming(incoming).boxed()))
    }

    pub async fn run_server<S, B>(
        &self,
        svc: S,
    ) -> Result<(SocketAddr, CancellationToken), ConfigError>
    where
        S: tower::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<B>,
                Error = Infallible,
            >
            + tonic::server::NamedService
            + Clone
            + Send
            + 'static
            + Sync,
        S::Future: Send + 'static,
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<StdError>,
    {
        debug!(%self, "server configured: setting it up");
        let (local_addr, server_future) = self.to_server_future(svc).await?;

        // create a new cancellation token
        let token = CancellationToken::new();
        let token_clone = token.clone();

        // spawn server acceptor in a new task
        tokio::spawn(async move {
            debug!(%local_addr, "starting server main loop");

            tokio::select! {
                res = server_future => {
                    match res {
                        Ok(_) => {
                            debug!("server shutdown");
                        }
                        Err(e) => {
                            error!(error = %e, "server error");
                        }
                    }
                }
                _ = token.cancelled() => {
                    debug!("cancellation token triggered: shutting down server");
                }
            }
        });

        Ok((local_addr, token_clone))
    }
}
