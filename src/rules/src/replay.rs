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
use data::game_states::game_event::GameEvent;
use data::parties::party::Party;
use data::parties::roster::Roster;

use crate::action_handlers::actions;

/// Reapplies a recorded game history to a freshly started party.
///
/// `initial` must be the snapshot taken immediately after the game started,
/// with an empty history. Because the engine is deterministic, the returned
/// party is identical (including serialized bytes) to the one the original
/// command sequence produced; this is the correctness contract for the
/// history log.
pub fn replay(initial: &Party, history: &[GameEvent]) -> Result<Party, RuleViolation> {
    let mut party = initial.clone();
    let roster = Roster::default();

    for event in history {
        let (actor, command) = match event {
            GameEvent::Pick { player_id, gift_id, .. } => {
                (player_id, GameCommand::Pick { gift_id: gift_id.clone() })
            }
            GameEvent::Steal { player_id, gift_id, .. } => {
                (player_id, GameCommand::Steal { gift_id: gift_id.clone() })
            }
            GameEvent::EndTurn { player_id, .. } => (player_id, GameCommand::EndTurn),
            GameEvent::GameEnd { forced_by: Some(admin), .. } => {
                (admin, GameCommand::EndGame)
            }
            // A natural game end is re-derived by end-of-game detection while
            // replaying the command that caused it.
            GameEvent::GameEnd { forced_by: None, .. } => continue,
        };
        actions::execute(&mut party, &roster, actor, &command, event.timestamp())?;
    }
    Ok(party)
}
