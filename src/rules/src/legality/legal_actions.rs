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

use data::actions::game_command::GameCommand;
use data::core::primitives::UserId;
use data::parties::party::{Party, PartyStatus};

use crate::action_handlers::{end_turn, pick, steal};

/// Every in-game command the named player could legally submit right now.
///
/// Covers active-game play only (pick/steal/skip); lobby and admin commands
/// are authorized at dispatch. Consumed by the bot driver to choose moves and
/// by the playout tests to walk the reachable state space.
pub fn compute(party: &Party, player: &UserId) -> Vec<GameCommand> {
    let mut actions = vec![];
    if party.status != PartyStatus::Active {
        return actions;
    }
    let Some(state) = &party.game_state else {
        return actions;
    };

    for gift_id in &state.wrapped_gifts {
        if pick::can_pick(party, player, gift_id).is_ok() {
            actions.push(GameCommand::Pick { gift_id: gift_id.clone() });
        }
    }
    for gift_id in state.unwrapped_gifts.keys() {
        if steal::can_steal(party, player, gift_id).is_ok() {
            actions.push(GameCommand::Steal { gift_id: gift_id.clone() });
        }
    }
    if end_turn::can_end_turn(party, player).is_ok() {
        actions.push(GameCommand::EndTurn);
    }
    actions
}

/// Returns true if the player can currently legally take the provided
/// command.
pub fn can_take_action(party: &Party, player: &UserId, command: &GameCommand) -> bool {
    compute(party, player).contains(command)
}

/// The id currently allowed to act, if the game is active and not over.
pub fn next_to_act(party: &Party) -> Option<&UserId> {
    if party.status != PartyStatus::Active {
        return None;
    }
    party.game_state.as_ref()?.active_player_id()
}
