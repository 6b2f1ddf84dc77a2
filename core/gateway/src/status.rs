// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! gRPC status to HTTP response conversion.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tonic::{Code, Status};
use tracing::{debug, warn};

/// Error payload returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric gRPC status code
    pub code: i32,
    pub message: String,
}

impl From<&Status> for ErrorBody {
    fn from(status: &Status) -> Self {
        Self {
            code: status.code() as i32,
            message: status.message().to_string(),
        }
    }
}

/// HTTP status matching a gRPC code, as grpc-gateway maps them.
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::Unknown | Code::Internal | Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failure of a gateway request, rendered as [`ErrorBody`] JSON.
#[derive(Debug)]
pub struct ApiError(Status);

impl ApiError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self(Status::invalid_argument(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self(Status::not_found(message))
    }
}

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = http_status(self.0.code());

        if status.is_server_error() {
            warn!(code = ?self.0.code(), message = %self.0.message(), "backend call failed");
        } else {
            debug!(code = ?self.0.code(), message = %self.0.message(), "request rejected");
        }

        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}
