// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod configuration;

#[async_trait::async_trait]
pub trait Component {
    // Error type for component operations
    type Error: std::error::Error + Send + Sync + 'static;

    // Name of the component, used in logs
    fn identifier(&self) -> &str;

    // start the component
    async fn start(&mut self) -> Result<(), Self::Error>;

    // stop the component
    async fn stop(&mut self) -> Result<(), Self::Error>;
}
