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

use std::collections::{BTreeMap, BTreeSet};

use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{GiftId, Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::game_states::game_state::GameState;
use data::parties::party::{Party, PartyStatus};
use data::parties::roster::Roster;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::info;
use utils::verify;

/// Returns Ok if the named actor may start the game right now.
pub fn can_start(party: &Party, roster: &Roster, actor: &UserId) -> Result<(), RuleViolation> {
    verify!(party.is_admin(actor), RuleViolation::Unauthorized(actor.clone()));
    verify!(party.status == PartyStatus::Lobby, RuleViolation::GameNotActive);

    let going = roster.going_ids();
    verify!(going.len() >= 2, RuleViolation::InsufficientPlayers { going: going.len() });

    let with_gift = going.iter().filter(|id| !roster.gifts_by(id).is_empty()).count();
    verify!(
        with_gift == going.len(),
        RuleViolation::InsufficientGifts { players: going.len(), gifts: with_gift }
    );
    Ok(())
}

/// Transitions the party to ACTIVE and builds the initial [GameState].
///
/// The turn order is a seeded shuffle of the GOING participants, so a fixed
/// seed always produces the same order. Exactly one gift per player enters
/// play: each submitter's first gift in submission order.
pub fn execute(
    party: &mut Party,
    roster: &Roster,
    actor: &UserId,
    seed: Option<u64>,
    now: Timestamp,
) -> Result<Vec<GameEvent>, RuleViolation> {
    can_start(party, roster, actor)?;

    let mut turn_order = roster.going_ids();
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed.unwrap_or(now.0));
    turn_order.shuffle(&mut rng);

    let turn_queue = build_turn_queue(&turn_order, party.config.return_to_start);
    let wrapped_gifts = select_gifts_for_play(roster, &turn_order);

    info!(
        party_id = %party.id,
        players = turn_order.len(),
        slots = turn_queue.len(),
        "Starting game"
    );

    party.status = PartyStatus::Active;
    party.game_state = Some(GameState {
        turn_order,
        turn_queue,
        current_turn_index: 0,
        pending_victim_id: None,
        wrapped_gifts,
        unwrapped_gifts: BTreeMap::new(),
        history: vec![],
        config: party.config,
    });
    Ok(vec![])
}

/// The full slot sequence: one pass in order, then (with the boomerang
/// option) a second pass in reverse order starting from the second-to-last
/// player, for 2P−1 slots total.
fn build_turn_queue(turn_order: &[UserId], return_to_start: bool) -> Vec<UserId> {
    let mut queue = turn_order.to_vec();
    if return_to_start {
        queue.extend(turn_order.iter().rev().skip(1).cloned());
    }
    queue
}

/// One gift per player: the first gift each submitter contributed, in
/// submission order.
fn select_gifts_for_play(roster: &Roster, players: &[UserId]) -> BTreeSet<GiftId> {
    let playing: BTreeSet<&UserId> = players.iter().collect();
    roster
        .gifts
        .iter()
        .filter(|gift| playing.contains(&gift.submitter_id))
        .sorted_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)))
        .unique_by(|gift| gift.submitter_id.clone())
        .map(|gift| gift.id.clone())
        .collect()
}
