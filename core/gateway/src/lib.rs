// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! HTTP/JSON front end of the customer service.
//!
//! Each route maps to one RPC of the customer service. Request bodies are
//! decoded from the protobuf JSON mapping, an allow-listed subset of the
//! HTTP headers is forwarded as gRPC metadata, and gRPC statuses are turned
//! back into HTTP statuses.

pub mod config;
pub mod errors;
pub mod headers;
pub mod routes;
pub mod server;
pub mod status;
