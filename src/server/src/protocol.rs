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

use data::core::primitives::{GiftId, PartyId, UserId};
use data::game_states::game_event::GameEvent;
use data::parties::party::Party;
use serde::{Deserialize, Serialize};

/// Messages a client may send over the event channel.
///
/// Wire shape: `{"event": "<name>", "data": {...}}` with camelCase payload
/// fields. Unknown events fail to parse and are answered with a Transport
/// error.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Subscribe this session to a party's broadcasts.
    #[serde(rename = "join-party")]
    JoinParty { party_id: PartyId },

    #[serde(rename = "pick-gift")]
    PickGift { party_id: PartyId, gift_id: GiftId },

    #[serde(rename = "steal-gift")]
    StealGift { party_id: PartyId, gift_id: GiftId },

    #[serde(rename = "end-turn")]
    EndTurn { party_id: PartyId },

    /// Pass-through broadcast to the room; never touches game state.
    #[serde(rename = "send_reaction")]
    SendReaction {
        party_id: PartyId,
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },

    #[serde(rename = "admin_batch_add_bots")]
    AdminBatchAddBots { party_id: PartyId, count: u32 },

    #[serde(rename = "admin_toggle_autoplay")]
    AdminToggleAutoplay { party_id: PartyId, active: bool },

    #[serde(rename = "admin_force_bot_move")]
    AdminForceBotMove { party_id: PartyId },

    #[serde(rename = "admin_force_bot_steal")]
    AdminForceBotSteal { party_id: PartyId },

    #[serde(rename = "admin_force_bot_pick")]
    AdminForceBotPick { party_id: PartyId },

    #[serde(rename = "admin_force_bot_skip")]
    AdminForceBotSkip { party_id: PartyId },

    #[serde(rename = "admin_reset_game")]
    AdminResetGame { party_id: PartyId },
}

impl ClientMessage {
    /// The party this message addresses.
    pub fn party_id(&self) -> &PartyId {
        match self {
            ClientMessage::JoinParty { party_id }
            | ClientMessage::PickGift { party_id, .. }
            | ClientMessage::StealGift { party_id, .. }
            | ClientMessage::EndTurn { party_id }
            | ClientMessage::SendReaction { party_id, .. }
            | ClientMessage::AdminBatchAddBots { party_id, .. }
            | ClientMessage::AdminToggleAutoplay { party_id, .. }
            | ClientMessage::AdminForceBotMove { party_id }
            | ClientMessage::AdminForceBotSteal { party_id }
            | ClientMessage::AdminForceBotPick { party_id }
            | ClientMessage::AdminForceBotSkip { party_id }
            | ClientMessage::AdminResetGame { party_id } => party_id,
        }
    }
}

/// Messages the server pushes to subscribed sessions.
///
/// Snapshot-bearing messages carry the full party document (including
/// `stateVersion` and `updatedAt`); event-bearing messages list the newly
/// appended history entries in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full snapshot delivered on join.
    #[serde(rename = "game-state")]
    GameState { party: Party },

    /// Snapshot delivered when the game transitions to active.
    #[serde(rename = "game-started")]
    GameStarted { party: Party },

    /// Snapshot after every authoritative mutation.
    #[serde(rename = "game-updated")]
    GameUpdated { party: Party, events: Vec<GameEvent> },

    /// Final snapshot.
    #[serde(rename = "game-ended")]
    GameEnded { party: Party, events: Vec<GameEvent> },

    /// Subscription acknowledgement.
    #[serde(rename = "party-joined")]
    PartyJoined { party_id: PartyId, room_name: String },

    /// Typed rule-violation or transport error, sent only to the session
    /// whose request failed.
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    #[serde(rename = "bots-added")]
    BotsAdded { count: u32 },

    #[serde(rename = "autoplay-toggled")]
    AutoplayToggled { active: bool },

    /// Autoplay state changed without an explicit toggle (e.g. halted at game
    /// end).
    #[serde(rename = "autoplay-updated")]
    AutoplayUpdated { active: bool },

    #[serde(rename = "game-reset")]
    GameReset { party: Party },

    #[serde(rename = "bot-move-forced")]
    BotMoveForced,

    /// Pass-through room reaction.
    #[serde(rename = "reaction")]
    Reaction {
        player_id: UserId,
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },
}
