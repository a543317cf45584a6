// Copyright © giftswap 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::{env, fs};

use clap::Parser;
use color_eyre::Result;
use database::sled_database::SledDatabase;
use server::auth::StaticTokenAuth;
use server::config::ServerConfig;
use tracing::info;
use utils::command_line;
use utils::command_line::TracingStyle;
use utils::paths;

use crate::command_line_parser::CommandLineParser;

mod command_line_parser;
mod initialize;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLineParser::parse().build();
    command_line::FLAGS.set(args).expect("Flags should not be set multiple times");

    if command_line::flags().tracing_style == TracingStyle::Console {
        logging::initialize();
    }
    if env::var("DISABLE_PANIC_HANDLER").is_err() {
        initialize::initialize_panic_handler()?;
    }

    let config = load_config()?;
    let data_dir = config.data_dir.clone().unwrap_or_else(paths::get_data_dir);
    fs::create_dir_all(&data_dir)?;
    info!(?data_dir, port = config.port(), "Starting server");

    let database = Arc::new(SledDatabase::new(data_dir.join("store")));
    let auth = Arc::new(StaticTokenAuth::new(&config.auth));
    server::server::run(config, database, auth).await
}

/// Layered configuration: optional file, then `GIFTSWAP_*` environment
/// variables, then command-line flag overrides on top.
fn load_config() -> Result<ServerConfig> {
    let flags = command_line::flags();
    let config_file = flags
        .config_file
        .clone()
        .unwrap_or_else(|| paths::get_config_dir().join("giftswap.toml"));

    let mut config = config::Config::builder()
        .add_source(config::File::from(config_file).required(false))
        .add_source(config::Environment::with_prefix("GIFTSWAP").separator("__"))
        .build()?
        .try_deserialize::<ServerConfig>()?;

    if let Some(port) = flags.port {
        config.port = Some(port);
    }
    if let Some(data_dir) = flags.data_dir {
        config.data_dir = Some(data_dir);
    }
    Ok(config)
}
