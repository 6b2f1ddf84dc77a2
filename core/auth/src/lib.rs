// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Login/password authentication for gRPC calls.
//!
//! The server side validates the `login` and `password` metadata entries of
//! every incoming call through an [`interceptor::AuthInterceptor`], which
//! attaches the resulting [`identity::ClientId`] to the request extensions.
//! The client side attaches the same entries through a
//! [`credentials::CredentialsInterceptor`].

pub mod credentials;
pub mod errors;
pub mod identity;
pub mod interceptor;

/// Metadata key carrying the caller login.
pub const LOGIN_KEY: &str = "login";

/// Metadata key carrying the caller password.
pub const PASSWORD_KEY: &str = "password";
