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

use std::path::PathBuf;

use clap::Parser;
use utils::command_line::{Flags, TracingStyle};

#[derive(Debug, Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about)]
pub struct CommandLineParser {
    /// Listen port for the WebSocket and HTTP endpoints.
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for durable state (store and logs).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to a configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tracing output style: 'console' or 'none'.
    #[arg(long, default_value = "console")]
    pub tracing: String,
}

impl CommandLineParser {
    /// Converts parsed arguments into the process-wide [Flags].
    pub fn build(self) -> Flags {
        Flags {
            tracing_style: match self.tracing.as_str() {
                "none" => TracingStyle::None,
                _ => TracingStyle::Console,
            },
            port: self.port,
            data_dir: self.data_dir,
            config_file: self.config,
        }
    }
}
