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

//! Builders and drivers for scripted test games.

use data::actions::game_command::GameCommand;
use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{GiftId, PartyId, StateVersion, Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::gifts::gift::{Gift, GiftMetadata};
use data::parties::participant::{Participant, ParticipantStatus};
use data::parties::party::{Party, PartyConfig, PartyStatus};
use data::parties::roster::Roster;
use rules::action_handlers::actions;

/// Party id used by every test fixture.
pub const TEST_PARTY: &str = "party-1";

pub fn user(id: &str) -> UserId {
    UserId::new(id)
}

pub fn gift(id: &str) -> GiftId {
    GiftId::new(id)
}

/// A lobby party whose admin is the first listed player. Each player is a
/// GOING participant contributing one gift named `g1`, `g2`, ... in listing
/// order.
pub fn lobby_party(players: &[&str], config: PartyConfig) -> (Party, Roster) {
    let party_id = PartyId::new(TEST_PARTY);
    let party = Party {
        id: party_id.clone(),
        admin_id: user(players[0]),
        title: Some("Test Party".to_string()),
        date: None,
        status: PartyStatus::Lobby,
        config,
        state_version: StateVersion(0),
        created_at: Timestamp(0),
        updated_at: Timestamp(0),
        game_state: None,
    };

    let mut roster = Roster::default();
    for (index, player) in players.iter().enumerate() {
        roster.participants.push(Participant {
            party_id: party_id.clone(),
            user_id: user(player),
            status: ParticipantStatus::Going,
            joined_at: Timestamp(index as u64),
        });
        roster.gifts.push(Gift {
            id: gift(&format!("g{}", index + 1)),
            party_id: party_id.clone(),
            submitter_id: user(player),
            metadata: GiftMetadata { title: format!("Gift {}", index + 1), ..Default::default() },
            submitted_at: Timestamp(index as u64),
            winner_id: None,
        });
    }
    (party, roster)
}

/// Starts the game so that the resulting turn order is exactly `order`.
///
/// The start shuffle is seeded, so this simply searches seeds until one
/// yields the requested permutation; with test-sized player counts that is
/// nearly immediate.
pub fn start_with_order(party: &mut Party, roster: &Roster, order: &[&str]) {
    let admin = party.admin_id.clone();
    let wanted: Vec<UserId> = order.iter().map(|p| user(p)).collect();
    for seed in 0..100_000u64 {
        let mut candidate = party.clone();
        actions::execute(
            &mut candidate,
            roster,
            &admin,
            &GameCommand::StartGame { seed: Some(seed) },
            Timestamp(1_000),
        )
        .expect("Starting game");
        if candidate.game_state.as_ref().expect("Game state").turn_order == wanted {
            *party = candidate;
            return;
        }
    }
    panic!("No seed produced turn order {order:?}");
}

/// A running game with the given player order and config.
pub fn started_party(order: &[&str], config: PartyConfig) -> Party {
    let mut sorted = order.to_vec();
    sorted.sort_unstable();
    let (mut party, roster) = lobby_party(&sorted, config);
    start_with_order(&mut party, &roster, order);
    party
}

/// Timestamp for the next scripted command, derived from history length so
/// scripted games are fully deterministic.
pub fn next_timestamp(party: &Party) -> Timestamp {
    let events = party.game_state.as_ref().map(|s| s.history.len()).unwrap_or_default();
    Timestamp(2_000 + events as u64 * 10)
}

pub fn pick(party: &mut Party, actor: &str, gift_id: &str) -> Result<Vec<GameEvent>, RuleViolation> {
    let now = next_timestamp(party);
    actions::execute(
        party,
        &Roster::default(),
        &user(actor),
        &GameCommand::Pick { gift_id: gift(gift_id) },
        now,
    )
}

pub fn steal(party: &mut Party, actor: &str, gift_id: &str) -> Result<Vec<GameEvent>, RuleViolation> {
    let now = next_timestamp(party);
    actions::execute(
        party,
        &Roster::default(),
        &user(actor),
        &GameCommand::Steal { gift_id: gift(gift_id) },
        now,
    )
}

pub fn end_turn(party: &mut Party, actor: &str) -> Result<Vec<GameEvent>, RuleViolation> {
    let now = next_timestamp(party);
    actions::execute(party, &Roster::default(), &user(actor), &GameCommand::EndTurn, now)
}

pub fn end_game(party: &mut Party, actor: &str) -> Result<Vec<GameEvent>, RuleViolation> {
    let now = next_timestamp(party);
    actions::execute(party, &Roster::default(), &user(actor), &GameCommand::EndGame, now)
}

/// The current owner of a gift, for assertions.
pub fn owner_of(party: &Party, gift_id: &str) -> Option<UserId> {
    party
        .game_state
        .as_ref()?
        .unwrapped_gifts
        .get(&gift(gift_id))
        .map(|g| g.owner_id.clone())
}
