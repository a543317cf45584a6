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

use enum_kinds::EnumKind;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{GiftId, Timestamp, UserId};

/// Records a single event which happened during a game.
///
/// Events are appended to [crate::game_states::game_state::GameState] history
/// in order and broadcast to room members alongside each state snapshot. The
/// history is the replay contract: feeding it back through the rule engine
/// from the initial post-start state reproduces the final state exactly.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, EnumKind)]
#[enum_kind(GameEventKind, derive(Serialize, Deserialize))]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    /// A player took a wrapped gift and opened it.
    #[serde(rename_all = "camelCase")]
    Pick { player_id: UserId, gift_id: GiftId, timestamp: Timestamp },

    /// A player took an opened gift from its current owner.
    #[serde(rename_all = "camelCase")]
    Steal {
        player_id: UserId,
        gift_id: GiftId,

        /// The victim the gift was taken from.
        previous_owner_id: UserId,

        /// When the stealer already held a gift, the id of the gift handed to
        /// the victim in exchange (a swap). Absent for chain-opening steals.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exchanged_gift_id: Option<GiftId>,

        /// Steal count of the stolen gift after this steal.
        steal_count: u32,

        /// Whether this steal froze the gift.
        is_frozen: bool,

        timestamp: Timestamp,
    },

    /// A player holding a gift declined to act and released the turn.
    #[serde(rename_all = "camelCase")]
    EndTurn { player_id: UserId, timestamp: Timestamp },

    /// The game is over and ownership is final.
    #[serde(rename_all = "camelCase")]
    GameEnd {
        /// The admin who force-ended the game, or absent when the game ended
        /// naturally by exhausting the turn queue.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        forced_by: Option<UserId>,
        timestamp: Timestamp,
    },
}

impl GameEvent {
    /// Returns the [GameEventKind] for this event.
    pub fn kind(&self) -> GameEventKind {
        self.into()
    }

    /// The instant at which this event was recorded.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            GameEvent::Pick { timestamp, .. }
            | GameEvent::Steal { timestamp, .. }
            | GameEvent::EndTurn { timestamp, .. }
            | GameEvent::GameEnd { timestamp, .. } => *timestamp,
        }
    }
}
