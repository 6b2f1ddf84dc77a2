// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! `patron customers` subcommands.

use std::sync::Arc;

use anyhow::{Context, Result};
use patron_config::auth::basic::Config as BasicAuthConfig;
use patron_config::grpc::client::ClientConfig;
use patron_config::tls::client::TlsClientConfig;
use patron_config::tls::provider::initialize_crypto_provider;
use patron_service::api::{Address, CreateResult, CustomerRecord};
use patron_service::client::CustomerClient;
use tracing::info;

use crate::args::{ConnectionArgs, CustomersArgs, CustomersCommand};

impl ConnectionArgs {
    /// Client settings for these flags. Credentials always travel over TLS.
    /// A CA file, when given, replaces the system roots.
    pub fn to_client_config(&self) -> ClientConfig {
        let mut tls = TlsClientConfig::new();
        if let Some(ca_file) = &self.tls_ca_file {
            tls = tls
                .with_include_system_ca_certs_pool(false)
                .with_ca_file(ca_file);
        }
        if let Some(server_name) = &self.tls_server_name {
            tls = tls.with_server_name(server_name);
        }

        ClientConfig::with_endpoint(&self.server)
            .with_tls_setting(tls)
            .with_request_timeout(self.timeout)
    }

    pub fn connect(&self) -> Result<CustomerClient> {
        let credentials = BasicAuthConfig::new(&self.login, &self.password)
            .to_credentials()
            .context("invalid credentials")?;
        CustomerClient::connect(&self.to_client_config(), Arc::new(credentials))
            .context("failed to set up the customer service client")
    }
}

/// Run a `customers` subcommand on a dedicated single-threaded runtime.
pub fn run(args: CustomersArgs) -> Result<()> {
    initialize_crypto_provider();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async move {
        let mut client = args.connection.connect()?;

        match args.command {
            CustomersCommand::Create { json } => {
                let result = create(&mut client, &json).await?;
                println!("{}", serde_json::to_string(&result)?);
            }
            CustomersCommand::List { keyword } => {
                for record in list(&mut client, &keyword).await? {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            CustomersCommand::Demo => {
                for record in demo(&mut client).await? {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
        }

        Ok(())
    })
}

/// Create the customer described by `json` (protobuf JSON mapping).
pub async fn create(client: &mut CustomerClient, json: &str) -> Result<CreateResult> {
    let record: CustomerRecord =
        serde_json::from_str(json).context("invalid customer record json")?;

    let result = client
        .create_customer(record)
        .await
        .context("could not create customer")?;

    if result.success {
        info!(id = result.id, "a new customer has been added");
    }

    Ok(result)
}

pub async fn list(client: &mut CustomerClient, keyword: &str) -> Result<Vec<CustomerRecord>> {
    client
        .get_customers(keyword)
        .await
        .with_context(|| format!("could not get customers matching {:?}", keyword))
}

/// Create the two sample customers and read every record back.
pub async fn demo(client: &mut CustomerClient) -> Result<Vec<CustomerRecord>> {
    for record in sample_customers() {
        let result = client
            .create_customer(record)
            .await
            .context("could not create customer")?;
        info!(id = result.id, "a new customer has been added");
    }

    list(client, "").await
}

pub fn sample_customers() -> Vec<CustomerRecord> {
    vec![
        CustomerRecord {
            id: 103,
            name: "Shiju Varghese".to_string(),
            email: "shiju@xyz.com".to_string(),
            phone: "732-757-2923".to_string(),
            addresses: vec![
                Address {
                    street: "1 Mission Street".to_string(),
                    city: "San Francisco".to_string(),
                    state: "CA".to_string(),
                    zip: "94105".to_string(),
                    is_shipping_address: false,
                },
                Address {
                    street: "Greenfield".to_string(),
                    city: "Kochi".to_string(),
                    state: "KL".to_string(),
                    zip: "68356".to_string(),
                    is_shipping_address: true,
                },
            ],
        },
        CustomerRecord {
            id: 102,
            name: "Irene Rose".to_string(),
            email: "irene@xyz.com".to_string(),
            phone: "732-757-2924".to_string(),
            addresses: vec![Address {
                street: "1 Mission Street".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                zip: "94105".to_string(),
                is_shipping_address: true,
            }],
        },
    ]
}
