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
use data::game_states::game_event::GameEvent;
use data::parties::party::{PartyConfig, PartyStatus};
use testing::test_parties::{
    end_game, end_turn, gift, owner_of, pick, started_party, steal, user,
};

fn standard(max_steals: u32) -> PartyConfig {
    PartyConfig { max_steals, return_to_start: false }
}

#[test]
fn two_player_pick_only_game() {
    let mut party = started_party(&["a", "b"], standard(3));
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(state.turn_queue, vec![user("a"), user("b")]);
    assert_eq!(state.current_turn_index, 0);

    pick(&mut party, "a", "g1").unwrap();
    {
        let state = party.game_state.as_ref().unwrap();
        assert_eq!(owner_of(&party, "g1"), Some(user("a")));
        assert_eq!(state.wrapped_gifts.len(), 1);
        assert!(state.wrapped_gifts.contains(&gift("g2")));
        assert_eq!(state.current_turn_index, 1);
    }

    pick(&mut party, "b", "g2").unwrap();
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(owner_of(&party, "g1"), Some(user("a")));
    assert_eq!(owner_of(&party, "g2"), Some(user("b")));
    assert!(state.wrapped_gifts.is_empty());
    assert_eq!(state.current_turn_index, 2);
    assert_eq!(party.status, PartyStatus::Ended);
}

#[test]
fn steal_creates_pending_victim() {
    let mut party = started_party(&["a", "b", "c"], standard(3));
    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    assert_eq!(party.game_state.as_ref().unwrap().current_turn_index, 2);

    steal(&mut party, "c", "g1").unwrap();
    let state = party.game_state.as_ref().unwrap();
    let stolen = state.unwrapped_gifts.get(&gift("g1")).unwrap();
    assert_eq!(stolen.owner_id, user("c"));
    assert_eq!(stolen.steal_count, 1);
    assert_eq!(stolen.last_owner_id, Some(user("a")));
    assert_eq!(state.pending_victim_id, Some(user("a")));
    assert_eq!(state.current_turn_index, 2);
    assert_eq!(state.active_player_id(), Some(&user("a")));
}

#[test]
fn victim_pick_resumes_and_ends_game() {
    let mut party = started_party(&["a", "b", "c"], standard(3));
    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    steal(&mut party, "c", "g1").unwrap();

    pick(&mut party, "a", "g3").unwrap();
    let state = party.game_state.as_ref().unwrap();
    assert!(state.wrapped_gifts.is_empty());
    assert_eq!(owner_of(&party, "g1"), Some(user("c")));
    assert_eq!(owner_of(&party, "g2"), Some(user("b")));
    assert_eq!(owner_of(&party, "g3"), Some(user("a")));
    assert_eq!(state.pending_victim_id, None);
    assert_eq!(state.current_turn_index, 3);
    assert_eq!(party.status, PartyStatus::Ended);
}

#[test]
fn immediate_steal_back_is_rejected() {
    let mut party = started_party(&["a", "b", "c"], standard(3));
    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    steal(&mut party, "c", "g1").unwrap();

    let result = steal(&mut party, "a", "g1");
    assert_eq!(result.unwrap_err(), RuleViolation::UTurnForbidden(gift("g1")));
    // The failed command left the state untouched.
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(state.pending_victim_id, Some(user("a")));
    assert_eq!(owner_of(&party, "g1"), Some(user("c")));
}

#[test]
fn gift_freezes_at_max_steals() {
    let mut party = started_party(&["a", "b", "c"], standard(2));
    pick(&mut party, "a", "g1").unwrap();

    steal(&mut party, "b", "g1").unwrap();
    {
        let state = party.game_state.as_ref().unwrap();
        let stolen = state.unwrapped_gifts.get(&gift("g1")).unwrap();
        assert_eq!(stolen.steal_count, 1);
        assert!(!stolen.is_frozen);
        assert_eq!(state.pending_victim_id, Some(user("a")));
    }

    pick(&mut party, "a", "g2").unwrap();
    assert_eq!(party.game_state.as_ref().unwrap().active_player_id(), Some(&user("c")));

    steal(&mut party, "c", "g1").unwrap();
    {
        let state = party.game_state.as_ref().unwrap();
        let stolen = state.unwrapped_gifts.get(&gift("g1")).unwrap();
        assert_eq!(stolen.steal_count, 2);
        assert!(stolen.is_frozen);
        assert_eq!(state.pending_victim_id, Some(user("b")));
    }

    let result = steal(&mut party, "b", "g1");
    assert_eq!(result.unwrap_err(), RuleViolation::GiftNotStealable(gift("g1")));
}

#[test]
fn boomerang_swap_advances_turn() {
    let config = PartyConfig { max_steals: 3, return_to_start: true };
    let mut party = started_party(&["a", "b", "c"], config);
    assert_eq!(
        party.game_state.as_ref().unwrap().turn_queue,
        vec![user("a"), user("b"), user("c"), user("b"), user("a")]
    );

    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    pick(&mut party, "c", "g3").unwrap();
    assert_eq!(party.game_state.as_ref().unwrap().current_turn_index, 3);

    // B holds g2 and steals A's g1 in the boomerang pass: a swap.
    let events = steal(&mut party, "b", "g1").unwrap();
    assert!(matches!(
        events[0],
        GameEvent::Steal { exchanged_gift_id: Some(ref exchanged), .. }
            if *exchanged == gift("g2")
    ));
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(owner_of(&party, "g1"), Some(user("b")));
    assert_eq!(owner_of(&party, "g2"), Some(user("a")));
    assert_eq!(state.pending_victim_id, None);
    assert_eq!(state.current_turn_index, 4);
    assert_eq!(party.status, PartyStatus::Active);
}

#[test]
fn admin_end_game_freezes_ownership_mid_chain() {
    let mut party = started_party(&["a", "b", "c"], standard(3));
    pick(&mut party, "a", "g1").unwrap();
    pick(&mut party, "b", "g2").unwrap();
    steal(&mut party, "c", "g1").unwrap();

    // Victim A never resolves; the admin pulls the plug.
    end_game(&mut party, "a").unwrap();
    assert_eq!(party.status, PartyStatus::Ended);
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(owner_of(&party, "g1"), Some(user("c")));
    assert_eq!(owner_of(&party, "g2"), Some(user("b")));
    assert_eq!(state.winners().len(), 2);
    assert!(matches!(
        state.history.last(),
        Some(GameEvent::GameEnd { forced_by: Some(ref admin), .. }) if *admin == user("a")
    ));
}

#[test]
fn skip_requires_a_held_gift() {
    let mut party = started_party(&["a", "b"], standard(3));
    let result = end_turn(&mut party, "a");
    assert_eq!(result.unwrap_err(), RuleViolation::SkipRequiresGift(user("a")));
}

#[test]
fn only_the_active_player_may_act() {
    let mut party = started_party(&["a", "b"], standard(3));
    let result = pick(&mut party, "b", "g1");
    assert_eq!(result.unwrap_err(), RuleViolation::NotYourTurn(user("b")));
}
