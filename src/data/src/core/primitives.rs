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

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by every synthetic (bot) user id.
pub const BOT_ID_PREFIX: &str = "bot-";

/// Unique identifier for a party.
///
/// Party ids are opaque strings minted by the party-creation collaborator; the
/// core never inspects their contents.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PartyId(pub String);

impl PartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Unique identifier for a user.
///
/// A 'user' is an authenticated operator resolved by the auth collaborator. A
/// 'player' is a participant within a party, who may be a user or a bot.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh synthetic-player id of the recognizable `bot-` form.
    pub fn new_bot() -> Self {
        Self(format!("{BOT_ID_PREFIX}{}", &Uuid::new_v4().simple().to_string()[..8]))
    }

    /// True if this id names a synthetic player rather than a human.
    pub fn is_bot(&self) -> bool {
        self.0.starts_with(BOT_ID_PREFIX)
    }
}

/// Unique identifier for a gift.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GiftId(pub String);

impl GiftId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Unique identifier for one client connection to the session gateway.
#[derive(Debug, Display, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Monotonically increasing counter bumped on every authoritative mutation of
/// a party document.
///
/// Used for compare-and-set writes against the store and for supersession
/// ordering in the broadcaster.
#[derive(
    Debug, Display, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize,
    Deserialize,
)]
pub struct StateVersion(pub u64);

impl StateVersion {
    /// The version following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A point in time, in milliseconds since the Unix epoch.
///
/// The rule engine never reads a clock; it receives the current instant as a
/// parameter and uses it only for event timestamps and the optional shuffle
/// seed.
#[derive(
    Debug, Display, Clone, Copy, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize,
    Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The current wall-clock instant. Not for use inside the rule engine.
    pub fn now() -> Self {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        Self(elapsed.as_millis() as u64)
    }
}
