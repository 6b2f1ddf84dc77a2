// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::sync::Arc;

use patron_auth::interceptor::AuthInterceptor;
use patron_config::auth::basic::Config as BasicAuthConfig;
use patron_config::component::Component;
use patron_config::component::configuration::Configuration;
use patron_config::grpc::server::ServerConfig;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::CustomerServiceServer;
use crate::errors::ServiceError;
use crate::handler::CustomerHandler;
use crate::store::RecordStore;

/// Configuration of the gRPC side: where to listen and whom to accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfiguration {
    /// Listener and TLS settings
    pub server: ServerConfig,

    /// The identity every call is validated against
    pub identity: BasicAuthConfig,
}

impl RpcConfiguration {
    pub fn new(server: ServerConfig, identity: BasicAuthConfig) -> Self {
        Self { server, identity }
    }
}

impl Configuration for RpcConfiguration {
    type Error = ServiceError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.server.validate()?;
        self.identity.validate()?;
        Ok(())
    }
}

/// The customer service listening on its configured endpoint.
#[derive(Debug)]
pub struct RpcServer {
    config: RpcConfiguration,
    store: Arc<RecordStore>,
    local_addr: Option<SocketAddr>,
    cancellation_token: Option<CancellationToken>,
}

impl RpcServer {
    pub fn new(config: RpcConfiguration) -> Self {
        Self::with_store(config, Arc::new(RecordStore::new()))
    }

    pub fn with_store(config: RpcConfiguration, store: Arc<RecordStore>) -> Self {
        Self {
            config,
            store,
            local_addr: None,
            cancellation_token: None,
        }
    }

    pub fn config(&self) -> &RpcConfiguration {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Address the server is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Start serving. Fails if the identity or the TLS material is
    /// unusable, or if the endpoint cannot be bound.
    pub async fn run(&mut self) -> Result<SocketAddr, ServiceError> {
        if self.cancellation_token.is_some() {
            return Err(ServiceError::AlreadyStarted);
        }

        let verifier = self.config.identity.to_verifier()?;
        let interceptor = AuthInterceptor::new(Arc::new(verifier));
        let handler = CustomerHandler::new(self.store.clone());
        let svc = CustomerServiceServer::with_interceptor(handler, interceptor);

        let (local_addr, token) = self.config.server.run_server(svc).await?;
        info!(
            %local_addr,
            tls = !self.config.server.tls_setting.insecure,
            "customer service listening"
        );

        self.local_addr = Some(local_addr);
        self.cancellation_token = Some(token);
        Ok(local_addr)
    }

    /// Stop accepting calls.
    pub fn shutdown(&mut self) -> Result<(), ServiceError> {
        let token = self
            .cancellation_token
            .take()
            .ok_or(ServiceError::NotStarted)?;

        token.cancel();
        info!("customer service stopped");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Component for RpcServer {
    type Error = ServiceError;

    fn identifier(&self) -> &str {
        "rpc"
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        self.run().await.map(|_| ())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.shutdown()
    }
}
