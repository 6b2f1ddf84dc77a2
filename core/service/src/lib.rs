// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Customer record service.
//!
//! The [`store::RecordStore`] keeps records in insertion order. The
//! [`handler::CustomerHandler`] exposes it over gRPC, and [`server::RpcServer`]
//! runs that handler behind TLS and the login/password interceptor.

pub mod api;
pub mod client;
pub mod errors;
pub mod handler;
pub mod query;
pub mod server;
pub mod store;
