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
use data::parties::party::{Party, PartyStatus};
use utils::verify;

use crate::mutations::turns;

/// Returns Ok if the named actor may force-end the game.
pub fn can_end_game(party: &Party, actor: &UserId) -> Result<(), RuleViolation> {
    verify!(party.is_admin(actor), RuleViolation::Unauthorized(actor.clone()));
    verify!(party.status == PartyStatus::Active, RuleViolation::GameNotActive);
    Ok(())
}

/// Admin override: immediately ends the game.
///
/// Current ownership is preserved verbatim as final, even mid steal chain;
/// an unresolved victim simply ends the game without a gift.
pub fn execute(
    party: &mut Party,
    actor: &UserId,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    can_end_game(party, actor)?;

    let mut events = vec![];
    turns::end(party, Some(actor.clone()), &mut events, now);
    Ok(events)
}
