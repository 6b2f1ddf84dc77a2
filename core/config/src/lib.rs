// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod auth;
pub mod component;
pub mod grpc;
pub mod opaque;
pub mod tls;
