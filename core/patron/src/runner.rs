// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use patron_config::component::Component;
use patron_config::tls::provider;
use patron_gateway::config::GatewayConfig;
use patron_gateway::server::Gateway;
use patron_service::server::{RpcConfiguration, RpcServer};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::build_info;
use crate::config::ConfigLoader;
use crate::runtime;

/// Start the customer service and the optional gateway, wait for
/// `shutdown`, then stop both within `drain_timeout`.
///
/// A failure to start either server is fatal: whatever was already started
/// is stopped before the error is returned.
pub async fn serve<F>(
    rpc: RpcConfiguration,
    gateway: Option<GatewayConfig>,
    drain_timeout: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let mut rpc = RpcServer::new(rpc);
    rpc.start().await.context("failed to start customer service")?;
    info!(component = rpc.identifier(), "component started");

    let mut gateway = gateway.map(Gateway::new);
    if let Some(gw) = gateway.as_mut() {
        if let Err(e) = gw.start().await {
            if let Err(stop_err) = rpc.stop().await {
                warn!(error = %stop_err, "failed to stop customer service");
            }
            return Err(e).context("failed to start gateway");
        }
        info!(component = gw.identifier(), "component started");
    }

    shutdown.await;
    debug!("received shutdown signal");

    let stop_all = async {
        if let Some(gw) = gateway.as_mut() {
            info!(component = gw.identifier(), "stopping component");
            gw.stop().await.context("failed to stop gateway")?;
        }

        info!(component = rpc.identifier(), "stopping component");
        rpc.stop().await.context("failed to stop customer service")?;
        Ok::<(), anyhow::Error>(())
    };

    match tokio::time::timeout(drain_timeout, stop_all).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout = ?drain_timeout, "shutdown timed out");
            anyhow::bail!("shutdown timed out after {:?}", drain_timeout);
        }
    }
}

/// Async body: read the server sections and serve until a signal arrives.
pub async fn run_services(mut config: ConfigLoader) -> Result<()> {
    let drain_timeout = config
        .runtime()
        .context("invalid runtime configuration")?
        .drain_timeout();
    let rpc = config
        .rpc()
        .context("invalid rpc configuration")?
        .clone();
    let gateway = config
        .gateway()
        .context("invalid gateway configuration")?
        .cloned();

    if gateway.is_none() {
        info!("no gateway configured: serving gRPC only");
    }

    serve(rpc, gateway, drain_timeout, patron_signal::shutdown()).await
}

/// Load the configuration from `config_file`, set up logging and the
/// crypto provider, build the runtime and serve until a shutdown signal.
///
/// This call blocks.
pub fn run(config_file: &str) -> Result<()> {
    let mut config = ConfigLoader::new(config_file).context("failed to load configuration")?;

    let tracing_conf = config.tracing().context("invalid tracing configuration")?;
    tracing_conf
        .setup_tracing_subscriber()
        .context("failed to set up tracing")?;
    debug!(?tracing_conf);
    info!(build_info = %build_info::BUILD_INFO);

    provider::initialize_crypto_provider();

    let patron_runtime = runtime::build(config.runtime().context("invalid runtime configuration")?)
        .context("failed to build runtime")?;

    patron_runtime
        .runtime
        .block_on(run_services(config).instrument(info_span!("application_lifecycle")))
}
