/*
 * Copyright 2024 Fluence Labs Limited
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![deny(
    dead_code,
    nonstandard_style,
    unused_imports,
    unused_mut,
    unused_variables,
    unused_unsafe,
    unreachable_patterns
)]

mod report;

use std::path::Path;

use clap::Parser;
use eyre::WrapErr as _;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use rdt_capabilities::Interface;
use rdt_capabilities::RDTConfig;
use rdt_capabilities::RDTContext;
use rdt_config::load_config;

#[derive(Parser, Debug)]
#[command(about = "Discovers cache and memory bandwidth QoS capabilities")]
struct Args {
    /// TOML config, defaults are used when omitted.
    #[arg(short, long)]
    config_path: Option<String>,

    /// Overrides the interface from the config.
    #[arg(short, long)]
    interface: Option<Interface>,

    /// Print capabilities as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();
    let mut config = match &args.config_path {
        Some(path) => load_config(path)?,
        None => RDTConfig::default(),
    };
    if let Some(interface) = args.interface {
        config.interface = interface;
    }

    let filter = EnvFilter::builder()
        .with_env_var("RUST_LOG")
        .with_default_directive(Directive::from(config.logs.log_level))
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("setting global tracing subscriber failed")?;
    tracing_log::LogTracer::init()?;

    check_lock_dir(&config.lock_file)
        .wrap_err("lock-file value in a config should point into an existing directory")?;

    tracing::debug!("Discovering capabilities with config {config:?}");
    let context = RDTContext::native(&config)?;
    context
        .initialize(&config)
        .wrap_err_with(|| format!("initialization over {} interface failed", config.interface))?;

    let printed = context.get_capabilities().map_err(eyre::Report::from).and_then(
        |(table, topology)| {
            let output = if args.json {
                serde_json::to_string_pretty(&table)?
            } else {
                report::render(&table, &topology)
            };
            println!("{output}");
            Ok(())
        },
    );

    context.teardown()?;
    printed
}

// Preliminary check that is useful on early diagnostics.
fn check_lock_dir(lock_file: &Path) -> eyre::Result<()> {
    match lock_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            eyre::bail!("{dir:?} is not a directory")
        }
        _ => Ok(()),
    }
}
