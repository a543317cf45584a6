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
use data::core::primitives::{GiftId, Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::game_states::game_state::UnwrappedGift;
use data::parties::party::Party;
use utils::verify;

use crate::mutations::turns;
use crate::queries::turn_queries;

/// Returns Ok if the named actor may pick the identified wrapped gift.
pub fn can_pick(party: &Party, actor: &UserId, gift_id: &GiftId) -> Result<(), RuleViolation> {
    let state = turn_queries::active_game(party)?;
    turn_queries::check_is_active_player(state, actor)?;

    if !state.wrapped_gifts.contains(gift_id) {
        if state.wrapped_gifts.is_empty() {
            return Err(RuleViolation::NoWrappedGifts);
        }
        return Err(RuleViolation::GiftNotFound(gift_id.clone()));
    }

    // A holder may not open a second gift; the only exception is the opening
    // player's final-slot chance in standard mode.
    if state.holds_gift(actor) {
        verify!(
            turn_queries::opening_player_final_turn(state, actor),
            RuleViolation::AlreadyHoldsGift(actor.clone())
        );
    }
    Ok(())
}

/// Opens a wrapped gift: the actor becomes its owner, any open steal chain
/// resolves, and the turn pointer advances.
pub fn execute(
    party: &mut Party,
    actor: &UserId,
    gift_id: &GiftId,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    can_pick(party, actor, gift_id)?;

    let state = turn_queries::active_game_mut(party)?;
    state.wrapped_gifts.remove(gift_id);
    state.unwrapped_gifts.insert(gift_id.clone(), UnwrappedGift::newly_opened(actor.clone()));

    let mut events = vec![GameEvent::Pick {
        player_id: actor.clone(),
        gift_id: gift_id.clone(),
        timestamp: now,
    }];
    turns::advance(party, &mut events, now);
    Ok(events)
}
