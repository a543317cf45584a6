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

use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use once_cell::sync::Lazy;

/// Name of the environment variable which overrides the log filter.
pub static LOG_ENV: Lazy<String> = Lazy::new(|| "GIFTSWAP_LOG_LEVEL".to_string());

/// File name used for the server log inside the data directory.
pub static LOG_FILE: Lazy<String> = Lazy::new(|| "giftswap.log".to_string());

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "giftswap", "giftswap")
}

/// Directory used for durable server state (the sled store and log files).
///
/// Resolution order: the `GIFTSWAP_DATA` environment variable, then the
/// platform data directory, then `.data` under the working directory.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("GIFTSWAP_DATA") {
        PathBuf::from(dir)
    } else if let Some(dirs) = project_directory() {
        dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Directory searched for the server configuration file.
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var("GIFTSWAP_CONFIG") {
        PathBuf::from(dir)
    } else if let Some(dirs) = project_directory() {
        dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}
