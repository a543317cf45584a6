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
use data::parties::party::PartyConfig;
use server::errors::CommandError;
use server::protocol::{ClientMessage, ServerMessage};
use server::rate_limit::RateLimiter;
use serde_json::json;
use testing::test_parties::{gift, started_party, user};

#[test]
fn client_messages_parse_from_wire_shape() {
    let parsed: ClientMessage = serde_json::from_value(json!({
        "event": "pick-gift",
        "data": { "partyId": "party-1", "giftId": "g1" }
    }))
    .unwrap();
    assert_eq!(
        parsed,
        ClientMessage::PickGift {
            party_id: data::core::primitives::PartyId::new("party-1"),
            gift_id: gift("g1"),
        }
    );

    let parsed: ClientMessage = serde_json::from_value(json!({
        "event": "admin_batch_add_bots",
        "data": { "partyId": "party-1", "count": 3 }
    }))
    .unwrap();
    assert!(matches!(parsed, ClientMessage::AdminBatchAddBots { count: 3, .. }));

    let parsed: ClientMessage = serde_json::from_value(json!({
        "event": "send_reaction",
        "data": { "partyId": "party-1", "type": "emoji", "value": "🎉" }
    }))
    .unwrap();
    assert!(matches!(parsed, ClientMessage::SendReaction { ref kind, .. } if kind == "emoji"));

    assert!(serde_json::from_value::<ClientMessage>(json!({
        "event": "no-such-event",
        "data": {}
    }))
    .is_err());
}

#[test]
fn snapshots_serialize_with_event_envelope() {
    let party = started_party(&["a", "b"], PartyConfig::default());
    let message = ServerMessage::GameUpdated { party, events: vec![] };
    let value = serde_json::to_value(&message).unwrap();

    assert_eq!(value["event"], "game-updated");
    assert_eq!(value["data"]["party"]["stateVersion"], 0);
    assert_eq!(value["data"]["party"]["status"], "ACTIVE");
    let state = &value["data"]["party"]["gameState"];
    assert_eq!(state["currentTurnIndex"], 0);
    assert!(state["turnQueue"].is_array());
    assert!(state["wrappedGifts"].is_array());
}

#[test]
fn errors_carry_stable_codes() {
    let error = CommandError::Rule(RuleViolation::NotYourTurn(user("b")));
    assert_eq!(error.code(), "NotYourTurn");
    assert_eq!(CommandError::Busy.code(), "Busy");
    assert_eq!(CommandError::Timeout.code(), "Timeout");

    let message = ServerMessage::Error {
        message: error.to_string(),
        code: Some(error.code()),
    };
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["event"], "error");
    assert_eq!(value["data"]["code"], "NotYourTurn");
}

#[test]
fn reaction_round_trips_with_type_field() {
    let message = ServerMessage::Reaction {
        player_id: user("a"),
        kind: "emoji".to_string(),
        value: "🎄".to_string(),
    };
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["event"], "reaction");
    assert_eq!(value["data"]["type"], "emoji");
    assert_eq!(value["data"]["playerId"], "a");
}

#[test]
fn rate_limiter_enforces_burst_then_refills() {
    let mut limiter = RateLimiter::new(2, 1000.0);
    assert!(limiter.try_acquire());
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());

    // A very fast refill rate makes the bucket usable again immediately.
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(limiter.try_acquire());
}
