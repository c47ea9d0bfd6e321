// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use authreg::config::Config;
use authreg::run;

fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(run::EXIT_USAGE);
    }

    run::init_tracing(&config);
    std::process::exit(run::run(&config));
}
