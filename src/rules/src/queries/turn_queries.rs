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

use data::actions::rule_violation::RuleViolation;
use data::core::primitives::UserId;
use data::game_states::game_state::GameState;
use data::parties::party::{Party, PartyStatus};

/// Returns the game state of an ACTIVE party, or `GameNotActive`.
pub fn active_game(party: &Party) -> Result<&GameState, RuleViolation> {
    match (party.status, &party.game_state) {
        (PartyStatus::Active, Some(state)) => Ok(state),
        _ => Err(RuleViolation::GameNotActive),
    }
}

/// Mutable variant of [active_game].
pub fn active_game_mut(party: &mut Party) -> Result<&mut GameState, RuleViolation> {
    match (party.status, &mut party.game_state) {
        (PartyStatus::Active, Some(state)) => Ok(state),
        _ => Err(RuleViolation::GameNotActive),
    }
}

/// Verifies that the named player is the unique id allowed to act right now.
pub fn check_is_active_player(state: &GameState, actor: &UserId) -> Result<(), RuleViolation> {
    match state.active_player_id() {
        Some(active) if active == actor => Ok(()),
        _ => Err(RuleViolation::NotYourTurn(actor.clone())),
    }
}

/// True if a player who already holds a gift may still pick or steal.
///
/// Holding a gift normally restricts a player to ending their turn; the
/// restriction lifts in the boomerang phase, and for the opening player's
/// final-slot chance in standard mode.
pub fn may_act_while_holding(state: &GameState, actor: &UserId) -> bool {
    state.in_boomerang_phase() || opening_player_final_turn(state, actor)
}

/// The opening player's one extra chance at the very end of a standard-mode
/// game: the queue pointer sits on the last slot and the actor is the player
/// who went first (and so never had anything to steal).
pub fn opening_player_final_turn(state: &GameState, actor: &UserId) -> bool {
    !state.config.return_to_start
        && !state.turn_queue.is_empty()
        && state.current_turn_index + 1 == state.turn_queue.len()
        && state.turn_queue.first() == Some(actor)
}
