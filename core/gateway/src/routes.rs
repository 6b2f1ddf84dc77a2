// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Route table of the gateway.
//!
//! | route                      | rpc              |
//! |----------------------------|------------------|
//! | `POST /v1/customers`       | `CreateCustomer` |
//! | `GET /v1/customers?keyword` | `GetCustomers`  |
//!
//! Streamed results are written as newline-delimited JSON, one
//! `{"result": ...}` object per record. A failure after the first record
//! ends the body with an `{"error": ...}` line.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use futures::Stream;
use http::{HeaderMap, HeaderValue, Method, Uri, header};
use patron_service::api::{CreateResult, CustomerFilter, CustomerRecord, CustomerServiceClient};
use serde::{Deserialize, Serialize};
use tonic::transport::Channel;
use tonic::{Request, Status, Streaming};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::headers::{AllowList, forward_headers};
use crate::status::{ApiError, ErrorBody};

pub const CUSTOMERS_PATH: &str = "/v1/customers";

const NDJSON: &str = "application/x-ndjson";

/// Shared by all requests: one backend client and the header allow-list.
#[derive(Debug, Clone)]
pub struct GatewayState {
    client: CustomerServiceClient<Channel>,
    allow_list: Arc<AllowList>,
}

impl GatewayState {
    pub fn new(channel: Channel, allow_list: AllowList) -> Self {
        Self {
            client: CustomerServiceClient::new(channel),
            allow_list: Arc::new(allow_list),
        }
    }

    fn request<T>(&self, headers: &HeaderMap, message: T) -> Request<T> {
        let mut request = Request::new(message);
        *request.metadata_mut() = forward_headers(headers, &self.allow_list);
        request
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(
            CUSTOMERS_PATH,
            post(create_customer)
                .get(get_customers)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_customer(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    payload: Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<CreateResult>, ApiError> {
    let Json(record) = payload.map_err(|e| ApiError::invalid_argument(e.body_text()))?;
    debug!(id = record.id, "forwarding create customer");

    let request = state.request(&headers, record);
    let result = state.client.clone().create_customer(request).await?;

    Ok(Json(result.into_inner()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    keyword: String,
}

async fn get_customers(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::invalid_argument(e.body_text()))?;
    debug!(keyword = %params.keyword, "forwarding get customers");

    let filter = CustomerFilter {
        keyword: params.keyword,
    };
    let request = state.request(&headers, filter);
    let stream = state.client.clone().get_customers(request).await?.into_inner();

    let body = Body::from_stream(ndjson(stream));
    Ok(([(header::CONTENT_TYPE, HeaderValue::from_static(NDJSON))], body).into_response())
}

async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    let status = Status::unimplemented(format!("method {} not allowed on {}", method, uri.path()));
    let mut response = ApiError::from(status).into_response();
    *response.status_mut() = http::StatusCode::METHOD_NOT_ALLOWED;
    response
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}

/// One line of a streamed response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamChunk {
    Result(CustomerRecord),
    Error(ErrorBody),
}

impl StreamChunk {
    fn encode(&self) -> Result<Bytes, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(Bytes::from(line))
    }
}

/// Turn the record stream into JSON lines. The body stops after the first
/// error line.
fn ndjson(
    stream: Streaming<CustomerRecord>,
) -> impl Stream<Item = Result<Bytes, serde_json::Error>> + Send + 'static {
    futures::stream::unfold(Some(stream), |state| async move {
        let mut stream = state?;

        match stream.message().await {
            Ok(Some(record)) => Some((StreamChunk::Result(record).encode(), Some(stream))),
            Ok(None) => None,
            Err(status) => {
                debug!(code = ?status.code(), "customer stream failed");
                Some((StreamChunk::Error(ErrorBody::from(&status)).encode(), None))
            }
        }
    })
}
