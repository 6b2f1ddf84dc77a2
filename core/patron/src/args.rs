// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use clap::{Parser, Subcommand};

/// Authenticated customer record service
#[derive(Parser, Debug)]
#[command(name = "patron", about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the customer service, and the HTTP gateway when configured
    Serve {
        /// Configuration file
        #[arg(short, long, value_name = "FILE", env = "PATRON_CONFIG")]
        config: String,
    },

    /// Call a running customer service
    #[command(alias = "c")]
    Customers(CustomersArgs),

    /// Print version information
    Version,
}

#[derive(clap::Args, Debug)]
pub struct CustomersArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: CustomersCommand,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Customer service endpoint (host:port)
    #[arg(short, long, env = "PATRON_SERVER", default_value = "localhost:7777")]
    pub server: String,

    /// Login sent with every call
    #[arg(short, long, env = "PATRON_LOGIN")]
    pub login: String,

    /// Password sent with every call
    #[arg(short, long, env = "PATRON_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Per-call timeout (e.g. 15s, 1m)
    #[arg(long, default_value = "15s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// CA certificate used to verify the server, instead of the system roots
    #[arg(long = "tls.ca_file", env = "PATRON_TLS_CA_FILE")]
    pub tls_ca_file: Option<String>,

    /// Name expected in the server certificate, if not the endpoint host
    #[arg(long = "tls.server_name")]
    pub tls_server_name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CustomersCommand {
    /// Create a customer from its JSON representation
    Create {
        /// The record, e.g. '{"id": 1, "name": "Irene Rose"}'
        #[arg(long)]
        json: String,
    },

    /// List customers whose name contains the keyword
    #[command(alias = "ls")]
    List {
        /// Case-sensitive name fragment. Empty lists everything.
        #[arg(short, long, default_value = "")]
        keyword: String,
    },

    /// Create two sample customers and list them back
    Demo,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    duration_str::parse(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_serve() {
        let args = Args::try_parse_from(["patron", "serve", "--config", "patron.yaml"]).unwrap();
        assert!(matches!(
            args.command(),
            Command::Serve { config } if config == "patron.yaml"
        ));
    }

    #[test]
    fn test_customers() {
        let args = Args::try_parse_from([
            "patron",
            "customers",
            "--login",
            "john",
            "--password",
            "doe",
            "--timeout",
            "2s",
            "--tls.ca_file",
            "ca.crt",
            "list",
            "--keyword",
            "Rose",
        ])
        .unwrap();

        let Command::Customers(customers) = args.into_command() else {
            panic!("expected the customers command");
        };
        assert_eq!(customers.connection.server, "localhost:7777");
        assert_eq!(customers.connection.login, "john");
        assert_eq!(customers.connection.timeout, Duration::from_secs(2));
        assert_eq!(customers.connection.tls_ca_file.as_deref(), Some("ca.crt"));
        assert!(matches!(
            customers.command,
            CustomersCommand::List { keyword } if keyword == "Rose"
        ));
    }

    #[test]
    fn test_invalid_timeout() {
        let res = Args::try_parse_from([
            "patron",
            "customers",
            "-l",
            "john",
            "-p",
            "doe",
            "--timeout",
            "soon",
            "demo",
        ]);
        assert!(res.is_err());
    }
}
