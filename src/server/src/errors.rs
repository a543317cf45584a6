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

use std::fmt;

use data::actions::rule_violation::RuleViolation;

/// Why a submitted command produced no state change.
///
/// Every variant is reported only to the originating session; the party state
/// and the other subscribers are unaffected.
#[derive(Debug, Clone)]
pub enum CommandError {
    /// The rule engine rejected the command.
    Rule(RuleViolation),

    /// The store write failed or kept conflicting past the retry budget. The
    /// session may simply retry.
    Transient(String),

    /// The request itself was unusable: malformed message, unknown party,
    /// not joined, or similar.
    Transport(String),

    /// The party's inbox is full.
    Busy,

    /// The command's deadline passed before the actor reached it.
    Timeout,
}

impl CommandError {
    /// Stable machine-readable code for wire errors.
    pub fn code(&self) -> String {
        match self {
            CommandError::Rule(violation) => violation.kind().code().to_string(),
            CommandError::Transient(_) => "Transient".to_string(),
            CommandError::Transport(_) => "Transport".to_string(),
            CommandError::Busy => "Busy".to_string(),
            CommandError::Timeout => "Timeout".to_string(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Rule(violation) => violation.fmt(f),
            CommandError::Transient(message) => write!(f, "transient failure: {message}"),
            CommandError::Transport(message) => write!(f, "{message}"),
            CommandError::Busy => write!(f, "the party is busy, try again shortly"),
            CommandError::Timeout => write!(f, "the command deadline was exceeded"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<RuleViolation> for CommandError {
    fn from(value: RuleViolation) -> Self {
        CommandError::Rule(value)
    }
}
