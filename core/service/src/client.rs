// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use patron_auth::credentials::{CallCredentials, CredentialsInterceptor};
use patron_config::grpc::client::ClientConfig;
use tonic::Status;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;

use crate::api::{CreateResult, CustomerFilter, CustomerRecord, CustomerServiceClient};
use crate::errors::ServiceError;

/// Customer service client attaching call credentials to every request.
#[derive(Debug, Clone)]
pub struct CustomerClient {
    inner: CustomerServiceClient<InterceptedService<Channel, CredentialsInterceptor>>,
}

impl CustomerClient {
    /// Build a client for `config`. The connection is established lazily.
    ///
    /// Fails when `credentials` require transport security and `config`
    /// disables TLS.
    pub fn connect(
        config: &ClientConfig,
        credentials: Arc<dyn CallCredentials>,
    ) -> Result<Self, ServiceError> {
        let interceptor = config.credentials_interceptor(credentials)?;
        let channel = config.to_channel()?;

        Ok(Self {
            inner: CustomerServiceClient::with_interceptor(channel, interceptor),
        })
    }

    pub async fn create_customer(&mut self, record: CustomerRecord) -> Result<CreateResult, Status> {
        Ok(self.inner.create_customer(record).await?.into_inner())
    }

    /// Collect every record matching `keyword`.
    pub async fn get_customers(&mut self, keyword: &str) -> Result<Vec<CustomerRecord>, Status> {
        let filter = CustomerFilter {
            keyword: keyword.to_string(),
        };
        let mut stream = self.inner.get_customers(filter).await?.into_inner();

        let mut records = Vec::new();
        while let Some(record) = stream.message().await? {
            records.push(record);
        }

        Ok(records)
    }
}
