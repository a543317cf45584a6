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

use once_cell::sync::OnceCell;

/// Global command-line flag values, set once at process startup.
pub static FLAGS: OnceCell<Flags> = OnceCell::new();

/// Returns the current command-line flags, or defaults if none were set (e.g.
/// in tests).
pub fn flags() -> Flags {
    FLAGS.get().cloned().unwrap_or_default()
}

/// Parsed command-line options which need to be visible process-wide.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// How to emit tracing output.
    pub tracing_style: TracingStyle,

    /// Override for the WebSocket/HTTP listen port.
    pub port: Option<u16>,

    /// Override for the durable data directory.
    pub data_dir: Option<PathBuf>,

    /// Explicit path to a configuration file.
    pub config_file: Option<PathBuf>,
}

/// Controls the tracing output format.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum TracingStyle {
    /// Human-readable console output plus a log file in the data directory.
    #[default]
    Console,

    /// No tracing output.
    None,
}
