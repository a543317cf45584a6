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

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::primitives::{GiftId, UserId};
use crate::game_states::game_event::GameEvent;
use crate::parties::party::PartyConfig;

/// This is the state of a single ongoing game within one party.
///
/// All collections are ordered (Vec/BTree) so that serialization is
/// deterministic: replaying `history` from the initial post-start state must
/// reproduce the final document byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// The initial randomized permutation of GOING participants, length P.
    pub turn_order: Vec<UserId>,

    /// The full sequence of turn slots. Equal to `turn_order` in standard
    /// mode; with the boomerang option it continues in reverse order for a
    /// second pass, giving length 2P−1.
    pub turn_queue: Vec<UserId>,

    /// 0-based position into `turn_queue`. May equal `turn_queue.len()` once
    /// the game has ended.
    pub current_turn_index: usize,

    /// Set while a steal chain is active: the player who was just robbed and
    /// must act before the queue pointer moves again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_victim_id: Option<UserId>,

    /// Gift ids still wrapped.
    pub wrapped_gifts: BTreeSet<GiftId>,

    /// Opened gifts and their ownership/steal bookkeeping.
    pub unwrapped_gifts: BTreeMap<GiftId, UnwrappedGift>,

    /// Every event which has happened during this game, append-only.
    pub history: Vec<GameEvent>,

    /// Copy of the party config taken at game start.
    pub config: PartyConfig,
}

impl GameState {
    /// Number of players in the game.
    pub fn player_count(&self) -> usize {
        self.turn_order.len()
    }

    /// The unique id currently authorized to act: the pending steal victim if
    /// a chain is open, else the owner of the current queue slot, else none
    /// once the pointer has run off the end.
    pub fn active_player_id(&self) -> Option<&UserId> {
        if let Some(victim) = &self.pending_victim_id {
            return Some(victim);
        }
        self.turn_queue.get(self.current_turn_index)
    }

    /// The gift currently held by the named player, if any.
    pub fn gift_held_by(&self, player: &UserId) -> Option<(&GiftId, &UnwrappedGift)> {
        self.unwrapped_gifts.iter().find(|(_, gift)| gift.owner_id == *player)
    }

    /// True if the named player currently owns an unwrapped gift.
    pub fn holds_gift(&self, player: &UserId) -> bool {
        self.gift_held_by(player).is_some()
    }

    /// True once the queue has entered the reverse-order second pass.
    ///
    /// Only possible when the boomerang option is configured; the phase begins
    /// when the pointer passes the last normal-order slot.
    pub fn in_boomerang_phase(&self) -> bool {
        self.config.return_to_start && self.current_turn_index >= self.player_count()
    }

    /// True while a steal chain holds the queue pointer in place.
    pub fn is_paused(&self) -> bool {
        self.pending_victim_id.is_some()
    }

    /// Final ownership map, used for the winner back-write at game end.
    pub fn winners(&self) -> BTreeMap<GiftId, UserId> {
        self.unwrapped_gifts
            .iter()
            .map(|(gift_id, gift)| (gift_id.clone(), gift.owner_id.clone()))
            .collect()
    }
}

/// Ownership and steal bookkeeping for one opened gift.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrappedGift {
    /// Current holder.
    pub owner_id: UserId,

    /// How many times this gift has been stolen.
    pub steal_count: u32,

    /// True once `steal_count` has reached the configured maximum; a frozen
    /// gift can never be stolen again.
    pub is_frozen: bool,

    /// The player this gift was most recently taken from. Stealing a gift
    /// back from its `last_owner_id` on the same turn is forbidden outside
    /// the boomerang phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_owner_id: Option<UserId>,
}

impl UnwrappedGift {
    /// A gift opened fresh from the wrapped set.
    pub fn newly_opened(owner_id: UserId) -> Self {
        Self { owner_id, steal_count: 0, is_frozen: false, last_owner_id: None }
    }
}
