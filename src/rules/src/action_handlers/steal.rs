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
use data::parties::party::Party;
use utils::verify;

use crate::mutations::turns;
use crate::queries::turn_queries;

/// Returns Ok if the named actor may steal the identified opened gift.
pub fn can_steal(party: &Party, actor: &UserId, gift_id: &GiftId) -> Result<(), RuleViolation> {
    let state = turn_queries::active_game(party)?;
    turn_queries::check_is_active_player(state, actor)?;

    let Some(gift) = state.unwrapped_gifts.get(gift_id) else {
        return Err(RuleViolation::GiftNotFound(gift_id.clone()));
    };
    verify!(gift.owner_id != *actor, RuleViolation::GiftNotStealable(gift_id.clone()));
    verify!(!gift.is_frozen, RuleViolation::GiftNotStealable(gift_id.clone()));

    // No immediate steal-back: the player a gift was just taken from cannot
    // reverse the steal within the same turn. The restriction lifts in the
    // boomerang phase, where the turn has effectively advanced.
    if gift.last_owner_id.as_ref() == Some(actor) && !state.in_boomerang_phase() {
        return Err(RuleViolation::UTurnForbidden(gift_id.clone()));
    }

    if state.holds_gift(actor) {
        verify!(
            turn_queries::may_act_while_holding(state, actor),
            RuleViolation::AlreadyHoldsGift(actor.clone())
        );
    }
    Ok(())
}

/// Takes an opened gift from its owner.
///
/// A giftless stealer opens a steal chain: the victim becomes the pending
/// actor and the queue pointer stays put. A stealer who already holds a gift
/// performs a swap instead: the held gift transfers to the victim with its
/// steal counters intact, the chain terminates with no pending victim, and
/// the slot resolves.
pub fn execute(
    party: &mut Party,
    actor: &UserId,
    gift_id: &GiftId,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    can_steal(party, actor, gift_id)?;

    let state = turn_queries::active_game_mut(party)?;
    let max_steals = state.config.max_steals;
    let held_gift_id = state.gift_held_by(actor).map(|(id, _)| id.clone());

    let Some(gift) = state.unwrapped_gifts.get_mut(gift_id) else {
        return Err(RuleViolation::GiftNotFound(gift_id.clone()));
    };
    let victim = gift.owner_id.clone();
    gift.owner_id = actor.clone();
    gift.steal_count += 1;
    gift.is_frozen = gift.steal_count >= max_steals;
    gift.last_owner_id = Some(victim.clone());

    let steal_count = gift.steal_count;
    let is_frozen = gift.is_frozen;

    let mut events = vec![GameEvent::Steal {
        player_id: actor.clone(),
        gift_id: gift_id.clone(),
        previous_owner_id: victim.clone(),
        exchanged_gift_id: held_gift_id.clone(),
        steal_count,
        is_frozen,
        timestamp: now,
    }];

    match held_gift_id {
        Some(held_id) => {
            // Swap: the stealer's gift goes to the victim. Counters carry
            // over unchanged; a swap is not a fresh unwrap.
            if let Some(held) = state.unwrapped_gifts.get_mut(&held_id) {
                held.owner_id = victim;
                held.last_owner_id = Some(actor.clone());
            }
            turns::advance(party, &mut events, now);
        }
        None => {
            // The victim was left giftless and must act before the queue
            // pointer moves again.
            state.pending_victim_id = Some(victim);
        }
    }
    Ok(events)
}
