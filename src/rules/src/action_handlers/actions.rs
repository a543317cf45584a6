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
use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::parties::party::Party;
use data::parties::roster::Roster;
use tracing::{debug, instrument};

use crate::action_handlers::{end_game, end_turn, pick, start_game, steal};

/// Applies a [GameCommand] to the party on behalf of the named actor.
///
/// On success the snapshot has been mutated, the produced events appended to
/// the game history, and the same events are returned for broadcast. On a
/// [RuleViolation] the snapshot is unchanged and must not be persisted.
///
/// `roster` is the cached snapshot of the externally-owned participant and
/// gift collections; only [GameCommand::StartGame] reads it.
#[instrument(err, level = "debug", skip(party, roster))]
pub fn execute(
    party: &mut Party,
    roster: &Roster,
    actor: &UserId,
    command: &GameCommand,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    debug!(?actor, ?command, "Executing command");
    let events = match command {
        GameCommand::StartGame { seed } => start_game::execute(party, roster, actor, *seed, now)?,
        GameCommand::Pick { gift_id } => pick::execute(party, actor, gift_id, now)?,
        GameCommand::Steal { gift_id } => steal::execute(party, actor, gift_id, now)?,
        GameCommand::EndTurn => end_turn::execute(party, actor, now)?,
        GameCommand::EndGame => end_game::execute(party, actor, now)?,
    };

    if let Some(state) = party.game_state.as_mut() {
        state.history.extend(events.iter().cloned());
    }
    Ok(events)
}
