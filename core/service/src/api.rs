// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod proto {
    pub mod customer {
        pub mod v1 {
            tonic::include_proto!("patron.customer.v1");
        }
    }
}

pub use proto::customer::v1::customer_service_client::CustomerServiceClient;
pub use proto::customer::v1::customer_service_server::{CustomerService, CustomerServiceServer};
pub use proto::customer::v1::{Address, CreateResult, CustomerFilter, CustomerRecord};
