/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use xiangqi::{Cli, Engine};

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut engine = Engine::new(cli.search_config());

    if let Some(path) = &cli.book {
        engine.load_book(path)?;
    }

    engine.run()
}
