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

//! Invariant checks over randomized playouts: every reachable state of a
//! game driven by random legal commands must satisfy the structural
//! invariants, and every transition must respect the turn-advancement and
//! steal-chain rules.

use std::collections::BTreeSet;

use data::actions::game_command::GameCommand;
use data::core::primitives::Timestamp;
use data::game_states::game_event::GameEvent;
use data::parties::party::{Party, PartyConfig, PartyStatus};
use rand::prelude::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::SplitMix64;
use rules::action_handlers::actions;
use rules::legality::legal_actions;
use testing::test_parties::lobby_party;

const PLAYER_SETS: &[&[&str]] = &[
    &["a", "b"],
    &["a", "b", "c"],
    &["a", "b", "c", "d"],
    &["a", "b", "c", "d", "e", "f"],
];

#[test]
fn random_playouts_standard_mode() {
    for players in PLAYER_SETS {
        for max_steals in 1..=3 {
            for seed in 0..20 {
                run_playout(players, PartyConfig { max_steals, return_to_start: false }, seed);
            }
        }
    }
}

#[test]
fn random_playouts_boomerang_mode() {
    for players in PLAYER_SETS {
        for max_steals in 1..=3 {
            for seed in 0..20 {
                run_playout(players, PartyConfig { max_steals, return_to_start: true }, seed);
            }
        }
    }
}

fn run_playout(players: &[&str], config: PartyConfig, seed: u64) {
    let (mut party, roster) = lobby_party(players, config);
    let admin = party.admin_id.clone();
    actions::execute(
        &mut party,
        &roster,
        &admin,
        &GameCommand::StartGame { seed: Some(seed) },
        Timestamp(1_000),
    )
    .unwrap();
    assert_invariants(&party);

    let mut rng = SplitMix64::seed_from_u64(seed.wrapping_mul(0x9e3779b97f4a7c15));
    let mut steps = 0u32;
    while party.status == PartyStatus::Active {
        steps += 1;
        assert!(steps < 10_000, "Playout did not terminate");

        let active = legal_actions::next_to_act(&party).cloned().expect("Active player");
        let legal = legal_actions::compute(&party, &active);
        assert!(!legal.is_empty(), "The active player always has a legal action");
        assert_no_steal_back_offered(&party, &active, &legal);

        let command = legal.choose(&mut rng).unwrap().clone();
        let index_before = party.game_state.as_ref().unwrap().current_turn_index;
        let now = Timestamp(2_000 + u64::from(steps) * 10);
        let events = actions::execute(&mut party, &roster, &active, &command, now).unwrap();

        assert_invariants(&party);
        assert_transition(&party, &command, &events, index_before);
    }

    // Standard termination: every player holds exactly one gift.
    let state = party.game_state.as_ref().unwrap();
    assert_eq!(state.unwrapped_gifts.len(), state.player_count());
    assert!(state.wrapped_gifts.is_empty());
}

/// Structural invariants that must hold after every successful command.
fn assert_invariants(party: &Party) {
    let state = party.game_state.as_ref().expect("Game state");
    let players = state.player_count();

    // One gift per person.
    let owners: BTreeSet<_> = state.unwrapped_gifts.values().map(|g| &g.owner_id).collect();
    assert_eq!(owners.len(), state.unwrapped_gifts.len(), "Duplicate gift owner");

    // Wrapped and unwrapped partition the full gift set.
    assert_eq!(state.wrapped_gifts.len() + state.unwrapped_gifts.len(), players);
    assert!(state.wrapped_gifts.iter().all(|id| !state.unwrapped_gifts.contains_key(id)));

    // Steal accounting.
    for gift in state.unwrapped_gifts.values() {
        assert!(gift.steal_count <= state.config.max_steals);
        assert_eq!(gift.is_frozen, gift.steal_count == state.config.max_steals);
    }

    // Queue pointer bounds; the game only ends at the upper bound.
    assert!(state.current_turn_index <= state.turn_queue.len());
    if party.status == PartyStatus::Active {
        assert!(state.pending_victim_id.is_some() || state.current_turn_index < state.turn_queue.len());
    }

    // A pending victim is a player who was just robbed: in the turn order and
    // holding nothing.
    if let Some(victim) = &state.pending_victim_id {
        assert!(state.turn_order.contains(victim));
        assert!(!state.holds_gift(victim), "Pending victim still holds a gift");
    }
}

/// Turn-advancement and steal-chain rules, per transition.
fn assert_transition(
    party: &Party,
    command: &GameCommand,
    events: &[GameEvent],
    index_before: usize,
) {
    let state = party.game_state.as_ref().expect("Game state");
    let index_after = state.current_turn_index;

    match command {
        GameCommand::Pick { .. } | GameCommand::EndTurn => {
            assert_eq!(index_after, index_before + 1);
        }
        GameCommand::Steal { .. } => {
            let Some(GameEvent::Steal { exchanged_gift_id, previous_owner_id, .. }) =
                events.first()
            else {
                panic!("Steal produced no steal event");
            };
            match exchanged_gift_id {
                // A swap resolves the slot.
                Some(_) => {
                    assert_eq!(index_after, index_before + 1);
                    assert_eq!(state.pending_victim_id, None);
                }
                // A chain-opening steal pauses the queue on the victim.
                None => {
                    assert_eq!(index_after, index_before);
                    if party.status == PartyStatus::Active {
                        assert_eq!(state.pending_victim_id.as_ref(), Some(previous_owner_id));
                    }
                }
            }
        }
        GameCommand::StartGame { .. } | GameCommand::EndGame => {}
    }
}

/// No immediate steal-back: outside the boomerang phase the legal-action set
/// never offers a gift whose last owner is the actor.
fn assert_no_steal_back_offered(party: &Party, active: &data::core::primitives::UserId, legal: &[GameCommand]) {
    let state = party.game_state.as_ref().unwrap();
    if state.in_boomerang_phase() {
        return;
    }
    for (gift_id, gift) in &state.unwrapped_gifts {
        if gift.last_owner_id.as_ref() == Some(active) {
            assert!(
                !legal.contains(&GameCommand::Steal { gift_id: gift_id.clone() }),
                "Steal-back offered outside boomerang"
            );
        }
    }
}
