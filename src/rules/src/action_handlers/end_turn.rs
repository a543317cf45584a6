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
use data::core::primitives::{Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::parties::party::Party;
use utils::verify;

use crate::mutations::turns;
use crate::queries::turn_queries;

/// Returns Ok if the named actor may decline to act and release the turn.
///
/// Only a player who already holds a gift can skip; a giftless player must
/// pick or steal.
pub fn can_end_turn(party: &Party, actor: &UserId) -> Result<(), RuleViolation> {
    let state = turn_queries::active_game(party)?;
    turn_queries::check_is_active_player(state, actor)?;
    verify!(state.holds_gift(actor), RuleViolation::SkipRequiresGift(actor.clone()));
    Ok(())
}

/// Releases the turn: resolves any open steal chain and advances the queue
/// pointer.
pub fn execute(
    party: &mut Party,
    actor: &UserId,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    can_end_turn(party, actor)?;

    let mut events = vec![GameEvent::EndTurn { player_id: actor.clone(), timestamp: now }];
    turns::advance(party, &mut events, now);
    Ok(events)
}
