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

use serde::{Deserialize, Serialize};

use crate::core::primitives::{PartyId, StateVersion, Timestamp, UserId};
use crate::game_states::game_state::GameState;

/// The authoritative document for a single gift-exchange room.
///
/// A party moves through the [PartyStatus] lifecycle exactly once (modulo
/// admin resets). While the party is active or ended, `game_state` holds the
/// embedded turn-engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Unique id for this party.
    pub id: PartyId,

    /// User who created the party and may issue admin commands.
    pub admin_id: UserId,

    /// Optional display name for the room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Scheduled date of the exchange, if one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,

    /// Where this party is in its lifecycle.
    pub status: PartyStatus,

    /// Game rules configured by the admin while in the lobby.
    pub config: PartyConfig,

    /// Bumped on every authoritative mutation; the store write is a
    /// compare-and-set on this value.
    pub state_version: StateVersion,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Turn-engine state, present iff `status` is Active or Ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameState>,
}

impl Party {
    /// True if the named user may issue admin commands for this party.
    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.admin_id == *user_id
    }
}

/// Lifecycle status of a party.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyStatus {
    /// Guests are joining and submitting gifts; the game has not started.
    Lobby,

    /// The game is in progress.
    Active,

    /// The game has ended; ownership is final. Terminal (modulo admin reset).
    Ended,
}

/// Game rules chosen by the admin before the game starts.
///
/// A copy is frozen into [GameState] at start so later lobby edits cannot
/// change an in-flight game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyConfig {
    /// Number of steals after which a gift becomes frozen (unstealable).
    pub max_steals: u32,

    /// Whether the turn queue makes a second pass in reverse order (the
    /// "boomerang") after every player has had a turn.
    pub return_to_start: bool,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self { max_steals: 3, return_to_start: false }
    }
}
