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

use crate::actions::party_action::PartyAction;

/// Simulation and recovery actions accepted only from the party admin.
///
/// These ride the same per-party mailbox as game commands, so they are
/// serialized with ordinary play and never bypass the actor.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminAction {
    /// Add `count` synthetic players to the lobby roster, each contributing
    /// one placeholder gift.
    BatchAddBots { count: u32 },

    /// Enable or disable automatic play for synthetic players.
    ToggleAutoplay { active: bool },

    /// Make the active bot take its preferred heuristic action now.
    ForceBotMove,

    /// Make the active bot steal, if any steal is legal.
    ForceBotSteal,

    /// Make the active bot pick, if any wrapped gift remains.
    ForceBotPick,

    /// Make the active bot end its turn, if legal.
    ForceBotSkip,

    /// Discard the game state and return the party to the lobby.
    ResetGame,
}

impl From<AdminAction> for PartyAction {
    fn from(value: AdminAction) -> Self {
        PartyAction::Admin(value)
    }
}
