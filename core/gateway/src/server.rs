// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;

use patron_config::component::Component;
use patron_config::component::configuration::Configuration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::routes::{self, GatewayState};

/// The HTTP gateway, serving on its own task next to the RPC server.
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    local_addr: Option<SocketAddr>,
    cancellation_token: Option<CancellationToken>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            local_addr: None,
            cancellation_token: None,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Build the backend channel and start serving HTTP. The channel
    /// connects lazily, so an unreachable backend is not an error here.
    pub async fn run(&mut self) -> Result<SocketAddr, GatewayError> {
        if self.cancellation_token.is_some() {
            return Err(GatewayError::AlreadyStarted);
        }

        self.config.validate()?;
        if self.config.backend.tls_setting.insecure {
            warn!("gateway forwards caller credentials to the backend without TLS");
        }

        let channel = self.config.backend.to_channel()?;
        let state = GatewayState::new(channel, self.config.allow_list()?);
        let app = routes::router(state);

        let listener = TcpListener::bind(self.config.socket_addr()?).await?;
        let local_addr = listener.local_addr()?;

        let token = CancellationToken::new();
        let shutdown = token.clone();

        tokio::spawn(async move {
            debug!(%local_addr, "starting gateway main loop");

            let server = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await });

            match server.await {
                Ok(_) => debug!("gateway shutdown"),
                Err(e) => error!(error = %e, "gateway error"),
            }
        });

        info!(
            %local_addr,
            backend = %self.config.backend.endpoint,
            "gateway listening"
        );

        self.local_addr = Some(local_addr);
        self.cancellation_token = Some(token);
        Ok(local_addr)
    }

    /// Stop accepting requests. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) -> Result<(), GatewayError> {
        let token = self
            .cancellation_token
            .take()
            .ok_or(GatewayError::NotStarted)?;

        token.cancel();
        info!("gateway stopped");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Component for Gateway {
    type Error = GatewayError;

    fn identifier(&self) -> &str {
        "gateway"
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        self.run().await.map(|_| ())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.shutdown()
    }
}
