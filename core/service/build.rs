// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

fn main() {
    // Get protoc path
    let protoc_path = protoc_bin_vendored::protoc_bin_path().unwrap();

    // export PROTOC to the environment
    unsafe {
        #[allow(clippy::disallowed_methods)]
        std::env::set_var("PROTOC", protoc_path);
    }

    println!("cargo:rerun-if-changed=proto/customer/v1/customer.proto");

    // JSON mapping of the messages, used by the HTTP gateway
    tonic_prost_build::configure()
        .type_attribute(
            ".patron.customer.v1",
            "#[derive(serde::Serialize, serde::Deserialize)]",
        )
        .type_attribute(
            ".patron.customer.v1",
            "#[serde(rename_all = \"camelCase\", default)]",
        )
        .compile_protos(&["proto/customer/v1/customer.proto"], &["proto"])
        .unwrap();
}
