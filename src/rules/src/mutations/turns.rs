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

use data::core::primitives::{Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::parties::party::{Party, PartyStatus};
use tracing::info;

/// Advances the queue pointer by one slot and runs end-of-game detection.
///
/// Called for every resolution of a turn slot: a pick, a skip, or a swap
/// steal. Any open steal chain is considered resolved at this point.
pub fn advance(party: &mut Party, events: &mut Vec<GameEvent>, now: Timestamp) {
    let Some(state) = party.game_state.as_mut() else {
        return;
    };
    state.pending_victim_id = None;
    state.current_turn_index += 1;
    finish_if_complete(party, events, now);
}

/// Ends the game if every slot has resolved and every player holds a gift.
pub fn finish_if_complete(party: &mut Party, events: &mut Vec<GameEvent>, now: Timestamp) {
    let Some(state) = party.game_state.as_ref() else {
        return;
    };
    let complete = state.pending_victim_id.is_none()
        && state.current_turn_index == state.turn_queue.len()
        && state.unwrapped_gifts.len() == state.player_count();
    if complete {
        end(party, None, events, now);
    }
}

/// Transitions the party to ENDED, freezing current ownership as final.
pub fn end(party: &mut Party, forced_by: Option<UserId>, events: &mut Vec<GameEvent>, now: Timestamp) {
    party.status = PartyStatus::Ended;
    info!(party_id = %party.id, forced = forced_by.is_some(), "Game ended");
    events.push(GameEvent::GameEnd { forced_by, timestamp: now });
}
