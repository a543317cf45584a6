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

use std::time::Duration;

use data::actions::game_command::GameCommand;
use data::core::primitives::UserId;
use data::parties::party::Party;
use rand::seq::SliceRandom;
use rules::legality::legal_actions;
use tokio::time;
use tracing::debug;

/// Select a command for the synthetic player in the given party.
///
/// Heuristic: open a wrapped gift while giftless and gifts remain; otherwise
/// steal one of the legally stealable gifts; otherwise skip. Ties are broken
/// at random so simulated games do not all look alike. Returns None when the
/// player has no legal action (not its turn, or the game is over).
pub fn select(party: &Party, player: &UserId) -> Option<GameCommand> {
    let legal = legal_actions::compute(party, player);

    let preferred = if party.game_state.as_ref().is_some_and(|s| !s.holds_gift(player)) {
        pick_action(&legal).or_else(|| steal_action(&legal))
    } else {
        steal_action(&legal)
    };
    let action = preferred.or_else(|| {
        legal.iter().find(|a| matches!(a, GameCommand::EndTurn)).cloned()
    });

    debug!(?player, ?action, "Bot action selected");
    action
}

/// [select] with a short think delay, so simulated players do not act at
/// machine speed in live rooms.
pub async fn select_delayed(party: &Party, player: &UserId, delay: Duration) -> Option<GameCommand> {
    time::sleep(delay).await;
    select(party, player)
}

/// A forced steal, ignoring the heuristic preference order.
pub fn select_steal(party: &Party, player: &UserId) -> Option<GameCommand> {
    steal_action(&legal_actions::compute(party, player))
}

/// A forced pick, ignoring the heuristic preference order.
pub fn select_pick(party: &Party, player: &UserId) -> Option<GameCommand> {
    pick_action(&legal_actions::compute(party, player))
}

/// A forced skip, if skipping is currently legal.
pub fn select_skip(party: &Party, player: &UserId) -> Option<GameCommand> {
    legal_actions::compute(party, player).into_iter().find(|a| matches!(a, GameCommand::EndTurn))
}

fn pick_action(legal: &[GameCommand]) -> Option<GameCommand> {
    let picks: Vec<&GameCommand> =
        legal.iter().filter(|a| matches!(a, GameCommand::Pick { .. })).collect();
    picks.choose(&mut rand::thread_rng()).map(|a| (*a).clone())
}

fn steal_action(legal: &[GameCommand]) -> Option<GameCommand> {
    let steals: Vec<&GameCommand> =
        legal.iter().filter(|a| matches!(a, GameCommand::Steal { .. })).collect();
    steals.choose(&mut rand::thread_rng()).map(|a| (*a).clone())
}
