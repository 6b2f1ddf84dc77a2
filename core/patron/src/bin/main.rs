// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;

use patron::args::{Args, Command};
use patron::build_info;
use patron::commands;
use patron::runner;

fn main() -> Result<()> {
    let args = Args::parse();

    match args.into_command() {
        Command::Version => {
            println!("{}", build_info::BUILD_INFO);
            Ok(())
        }
        Command::Serve { config } => runner::run(&config),
        Command::Customers(customers) => commands::run(customers),
    }
}
