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

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Complete server configuration, deserialized from the layered config
/// sources (file, environment, command line) assembled by the binary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub auth: AuthConfig,
    pub actor: ActorSettings,
    pub bots: BotSettings,
}

impl ServerConfig {
    /// Listen port, defaulting when unconfigured.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8780)
    }
}

/// Token table for the development auth provider. Production deployments
/// substitute a real auth collaborator behind the same trait.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Opaque bearer token → user id.
    pub tokens: HashMap<String, String>,

    /// User id → display name, for the batch profile lookup.
    pub names: HashMap<String, String>,

    /// User id → email, for the batch profile lookup.
    pub emails: HashMap<String, String>,
}

/// Tuning knobs for party actors and sessions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorSettings {
    /// Bounded inbox size; a full inbox rejects commands with Busy.
    pub inbox_capacity: usize,

    /// How long an actor lingers with no subscribers and no traffic before
    /// self-terminating.
    pub idle_timeout_secs: u64,

    /// Default deadline applied to commands submitted by sessions.
    pub command_timeout_ms: u64,

    /// Outbound queue size per session; overflowing it drops the session.
    pub session_queue: usize,

    /// Command submissions allowed in a burst, per session.
    pub rate_limit_burst: u32,

    /// Sustained command submissions per second, per session.
    pub rate_limit_per_second: f64,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            inbox_capacity: 64,
            idle_timeout_secs: 600,
            command_timeout_ms: 10_000,
            session_queue: 64,
            rate_limit_burst: 10,
            rate_limit_per_second: 5.0,
        }
    }
}

impl ActorSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Simulated-player configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Master switch for the bot driver; when false, admin bot commands are
    /// refused.
    pub enabled: bool,

    /// Pause before an autoplaying bot acts.
    pub think_delay_ms: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self { enabled: true, think_delay_ms: 400 }
    }
}

impl BotSettings {
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}
