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
use data::core::primitives::Timestamp;
use data::game_states::game_event::{GameEvent, GameEventKind};
use data::parties::party::{PartyConfig, PartyStatus};
use rules::action_handlers::actions;
use rules::action_handlers::start_game;
use testing::test_parties::{end_turn, gift, lobby_party, pick, started_party, steal, user};

#[test]
fn minimal_game_ends_after_two_picks() {
    let mut party = started_party(&["a", "b"], PartyConfig { max_steals: 3, return_to_start: false });
    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();

    assert_eq!(party.status, PartyStatus::Ended);
    let history = &party.game_state.as_ref().unwrap().history;
    let kinds: Vec<GameEventKind> = history.iter().map(GameEvent::kind).collect();
    assert_eq!(kinds, vec![GameEventKind::Pick, GameEventKind::Pick, GameEventKind::GameEnd]);
}

#[test]
fn boomerang_queue_has_five_slots_for_three_players() {
    let config = PartyConfig { max_steals: 3, return_to_start: true };
    let mut party = started_party(&["a", "b", "c"], config);
    assert_eq!(party.game_state.as_ref().unwrap().turn_queue.len(), 5);

    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    pick(&mut party, "c", "g3").unwrap();
    assert_eq!(party.status, PartyStatus::Active);

    end_turn(&mut party, "b").unwrap();
    // Index 4 of 5: still running.
    assert_eq!(party.status, PartyStatus::Active);

    end_turn(&mut party, "a").unwrap();
    assert_eq!(party.status, PartyStatus::Ended);
    assert_eq!(party.game_state.as_ref().unwrap().current_turn_index, 5);
}

#[test]
fn steal_at_penultimate_count_freezes() {
    let mut party = started_party(&["a", "b", "c"], PartyConfig { max_steals: 1, return_to_start: false });
    pick(&mut party, "a", "g1").unwrap();

    // maxSteals − 1 == 0 steals so far: this steal freezes the gift.
    steal(&mut party, "b", "g1").unwrap();
    let frozen = party.game_state.as_ref().unwrap().unwrapped_gifts.get(&gift("g1")).unwrap();
    assert!(frozen.is_frozen);

    pick(&mut party, "a", "g2").unwrap();
    let result = steal(&mut party, "c", "g1");
    assert_eq!(result.unwrap_err(), RuleViolation::GiftNotStealable(gift("g1")));
}

#[test]
fn start_requires_two_going_players() {
    let (party, roster) = lobby_party(&["a"], PartyConfig::default());
    let result = start_game::can_start(&party, &roster, &user("a"));
    assert_eq!(result.unwrap_err(), RuleViolation::InsufficientPlayers { going: 1 });
}

#[test]
fn start_requires_a_gift_per_player() {
    let (party, mut roster) = lobby_party(&["a", "b", "c"], PartyConfig::default());
    roster.gifts.retain(|g| g.submitter_id != user("c"));
    let result = start_game::can_start(&party, &roster, &user("a"));
    assert_eq!(result.unwrap_err(), RuleViolation::InsufficientGifts { players: 3, gifts: 2 });
}

#[test]
fn start_is_admin_only() {
    let (mut party, roster) = lobby_party(&["a", "b"], PartyConfig::default());
    let result = actions::execute(
        &mut party,
        &roster,
        &user("b"),
        &GameCommand::StartGame { seed: Some(1) },
        Timestamp(1_000),
    );
    assert_eq!(result.unwrap_err(), RuleViolation::Unauthorized(user("b")));
}

#[test]
fn start_is_rejected_once_active() {
    let mut party = started_party(&["a", "b"], PartyConfig::default());
    let result = actions::execute(
        &mut party,
        &Default::default(),
        &user("a"),
        &GameCommand::StartGame { seed: Some(1) },
        Timestamp(1_000),
    );
    assert_eq!(result.unwrap_err(), RuleViolation::GameNotActive);
}

#[test]
fn extra_gifts_from_one_submitter_stay_out_of_play() {
    let (mut party, mut roster) = lobby_party(&["a", "b"], PartyConfig::default());
    // A second, later gift from player a must not enter play.
    let mut extra = roster.gifts[0].clone();
    extra.id = gift("g9");
    extra.submitted_at = Timestamp(99);
    roster.gifts.push(extra);

    let admin = party.admin_id.clone();
    actions::execute(
        &mut party,
        &roster,
        &admin,
        &GameCommand::StartGame { seed: Some(3) },
        Timestamp(1_000),
    )
    .unwrap();

    let state = party.game_state.as_ref().unwrap();
    assert_eq!(state.wrapped_gifts.len(), 2);
    assert!(state.wrapped_gifts.contains(&gift("g1")));
    assert!(state.wrapped_gifts.contains(&gift("g2")));
    assert!(!state.wrapped_gifts.contains(&gift("g9")));
}
