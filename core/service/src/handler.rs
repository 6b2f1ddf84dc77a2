// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use patron_auth::identity::ClientId;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::api::{CreateResult, CustomerFilter, CustomerRecord, CustomerService};
use crate::query::{self, CustomerStream};
use crate::store::RecordStore;

/// gRPC handler for the customer service.
///
/// Every call must carry the [`ClientId`] set by the authentication
/// interceptor, otherwise it is rejected before touching the store.
#[derive(Debug, Clone)]
pub struct CustomerHandler {
    store: Arc<RecordStore>,
}

impl CustomerHandler {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

fn client_id<T>(request: &Request<T>) -> Result<ClientId, Status> {
    request
        .extensions()
        .get::<ClientId>()
        .cloned()
        .ok_or_else(|| Status::unauthenticated("missing credentials"))
}

#[tonic::async_trait]
impl CustomerService for CustomerHandler {
    type GetCustomersStream = CustomerStream;

    async fn create_customer(
        &self,
        request: Request<CustomerRecord>,
    ) -> Result<Response<CreateResult>, Status> {
        let client_id = client_id(&request)?;
        let record = request.into_inner();

        debug!(%client_id, id = record.id, "create customer");
        Ok(Response::new(self.store.append(record)))
    }

    async fn get_customers(
        &self,
        request: Request<CustomerFilter>,
    ) -> Result<Response<Self::GetCustomersStream>, Status> {
        let client_id = client_id(&request)?;
        let filter = request.into_inner();

        debug!(%client_id, keyword = %filter.keyword, "get customers");
        Ok(Response::new(query::stream_customers(&self.store, filter)))
    }
}
