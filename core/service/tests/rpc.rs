// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! End to end tests of the customer service over TLS.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use patron_auth::credentials::BasicCredentials;
use patron_auth::errors::AuthError;
use patron_config::auth::basic::Config as BasicAuthConfig;
use patron_config::grpc::client::ClientConfig;
use patron_config::grpc::errors::ConfigError;
use patron_config::grpc::server::ServerConfig;
use patron_config::tls::client::TlsClientConfig;
use patron_config::tls::provider::initialize_crypto_provider;
use patron_config::tls::server::TlsServerConfig;
use patron_service::api::{Address, CustomerFilter, CustomerRecord, CustomerServiceClient};
use patron_service::client::CustomerClient;
use patron_service::errors::ServiceError;
use patron_service::server::{RpcConfiguration, RpcServer};
use tonic::Code;

static TEST_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/testdata/tls");

async fn start_server() -> (RpcServer, SocketAddr) {
    initialize_crypto_provider();

    let tls = TlsServerConfig::new()
        .with_cert_file(&format!("{}/server.crt", TEST_PATH))
        .with_key_file(&format!("{}/server.key", TEST_PATH));
    let config = RpcConfiguration::new(
        ServerConfig::with_endpoint("127.0.0.1:0").with_tls_settings(tls),
        BasicAuthConfig::new("john", "doe").with_client_id("42"),
    );

    let mut server = RpcServer::new(config);
    let addr = server.run().await.unwrap();
    (server, addr)
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    let tls = TlsClientConfig::new()
        .with_include_system_ca_certs_pool(false)
        .with_ca_file(&format!("{}/ca.crt", TEST_PATH))
        .with_server_name("localhost");

    ClientConfig::with_endpoint(&format!("https://{}", addr)).with_tls_setting(tls)
}

fn client(addr: SocketAddr, login: &str, password: &str) -> CustomerClient {
    let credentials = Arc::new(BasicCredentials::new(login, password));
    CustomerClient::connect(&client_config(addr), credentials).unwrap()
}

fn shiju() -> CustomerRecord {
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
    }
}

fn irene() -> CustomerRecord {
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
    }
}

#[tokio::test]
async fn test_create_then_list() {
    let (mut server, addr) = start_server().await;
    let mut client = client(addr, "john", "doe");

    let result = client.create_customer(shiju()).await.unwrap();
    assert_eq!(result.id, 103);
    assert!(result.success);

    let result = client.create_customer(irene()).await.unwrap();
    assert_eq!(result.id, 102);

    assert_eq!(client.get_customers("Rose").await.unwrap(), vec![irene()]);
    assert_eq!(
        client.get_customers("").await.unwrap(),
        vec![shiju(), irene()]
    );
    assert!(client.get_customers("rose").await.unwrap().is_empty());

    server.shutdown().unwrap();
}

#[tokio::test]
async fn test_rejected_calls_leave_the_store_untouched() {
    let (mut server, addr) = start_server().await;

    let cases = [("john", "wrong"), ("jane", "doe"), ("", ""), ("john", "")];
    for _ in 0..5 {
        for (login, password) in cases {
            let mut client = client(addr, login, password);

            let status = client.create_customer(shiju()).await.unwrap_err();
            assert_eq!(status.code(), Code::Unauthenticated, "{login}/{password}");

            let status = client.get_customers("").await.unwrap_err();
            assert_eq!(status.code(), Code::Unauthenticated, "{login}/{password}");
        }
    }

    assert!(server.store().is_empty());
    server.shutdown().unwrap();
}

#[tokio::test]
async fn test_rejection_messages() {
    let (mut server, addr) = start_server().await;

    let status = client(addr, "jane", "doe")
        .create_customer(irene())
        .await
        .unwrap_err();
    assert_eq!(status.message(), "unknown user jane");

    let status = client(addr, "john", "nope")
        .create_customer(irene())
        .await
        .unwrap_err();
    assert_eq!(status.message(), "bad password for user john");

    server.shutdown().unwrap();
}

#[tokio::test]
async fn test_calls_without_credentials_are_rejected() {
    let (mut server, addr) = start_server().await;

    let channel = client_config(addr).to_channel().unwrap();
    let mut raw = CustomerServiceClient::new(channel);

    let status = raw.create_customer(shiju()).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "missing credentials");

    let status = raw
        .get_customers(CustomerFilter::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    assert!(server.store().is_empty());
    server.shutdown().unwrap();
}

#[tokio::test]
async fn test_credentials_refused_without_tls() {
    let config = ClientConfig::with_endpoint("127.0.0.1:7777")
        .with_tls_setting(TlsClientConfig::insecure());
    let credentials = Arc::new(BasicCredentials::new("john", "doe"));

    let res = CustomerClient::connect(&config, credentials);
    assert!(matches!(
        res,
        Err(ServiceError::ConfigError(ConfigError::AuthError(
            AuthError::InsecureTransport
        )))
    ));
}

#[tokio::test]
async fn test_concurrent_creates_are_all_kept() {
    let (mut server, addr) = start_server().await;
    let client = client(addr, "john", "doe");

    let tasks: Vec<_> = (0..50)
        .map(|id| {
            let mut client = client.clone();
            tokio::spawn(async move {
                let record = CustomerRecord {
                    id,
                    name: format!("customer {id}"),
                    email: format!("customer{id}@xyz.com"),
                    ..Default::default()
                };
                client.create_customer(record).await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().unwrap().success);
    }

    let records = client.clone().get_customers("customer").await.unwrap();
    assert_eq!(records.len(), 50);

    let by_id: BTreeMap<i32, CustomerRecord> = records.into_iter().map(|r| (r.id, r)).collect();
    for id in 0..50 {
        let record = &by_id[&id];
        assert_eq!(record.name, format!("customer {id}"));
        assert_eq!(record.email, format!("customer{id}@xyz.com"));
    }

    assert_eq!(server.store().len(), 50);
    server.shutdown().unwrap();
}

#[tokio::test]
async fn test_server_rejects_plaintext_clients() {
    let (mut server, addr) = start_server().await;

    let config = ClientConfig::with_endpoint(&format!("http://{}", addr))
        .with_tls_setting(TlsClientConfig::insecure());
    let mut raw = CustomerServiceClient::new(config.to_channel().unwrap());

    assert!(raw.create_customer(irene()).await.is_err());
    assert!(server.store().is_empty());
    server.shutdown().unwrap();
}
