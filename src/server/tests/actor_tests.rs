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

use std::sync::Arc;
use std::time::{Duration, Instant};

use database::database::Database;
use data::actions::admin_action::AdminAction;
use data::actions::game_command::GameCommand;
use data::actions::party_action::PartyAction;
use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{PartyId, SessionId, StateVersion, Timestamp, UserId};
use data::parties::party::{Party, PartyConfig, PartyStatus};
use server::config::{ActorSettings, BotSettings};
use server::errors::CommandError;
use server::party_actor::{ActorMessage, CommandEnvelope, PartyHandle, SubscribeRequest};
use server::protocol::ServerMessage;
use server::registry::PartyRegistry;
use testing::fake_database::FakeDatabase;
use testing::test_parties::{gift, lobby_party, user, TEST_PARTY};
use tokio::sync::{mpsc, oneshot};

fn bot_settings() -> BotSettings {
    BotSettings { enabled: true, think_delay_ms: 5 }
}

async fn setup(
    players: &[&str],
    config: PartyConfig,
) -> (Arc<FakeDatabase>, Arc<PartyRegistry>, PartyHandle) {
    let database = Arc::new(FakeDatabase::new());
    let (party, roster) = lobby_party(players, config);
    database.seed(party, roster);

    let registry =
        PartyRegistry::new(database.clone(), ActorSettings::default(), bot_settings());
    let handle = registry.resolve(&PartyId::new(TEST_PARTY)).await.unwrap();
    (database, registry, handle)
}

async fn submit(
    handle: &PartyHandle,
    actor: &str,
    action: PartyAction,
) -> Result<(), CommandError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    handle
        .submit(ActorMessage::Command(CommandEnvelope {
            actor_id: user(actor),
            session_id: Some(SessionId::generate()),
            action,
            deadline: None,
            reply: Some(reply_tx),
        }))
        .unwrap();
    reply_rx.await.unwrap()
}

async fn subscribe(
    handle: &PartyHandle,
    who: &str,
    capacity: usize,
) -> (SessionId, mpsc::Receiver<ServerMessage>) {
    let session_id = SessionId::generate();
    let (sink, rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = oneshot::channel();
    handle
        .submit(ActorMessage::Subscribe(SubscribeRequest {
            session_id,
            user_id: user(who),
            sink,
            reply: reply_tx,
        }))
        .unwrap();
    reply_rx.await.unwrap().unwrap();
    (session_id, rx)
}

fn stored(database: &FakeDatabase) -> Party {
    database.stored_party(&PartyId::new(TEST_PARTY)).unwrap()
}

#[tokio::test]
async fn join_delivers_snapshot_then_start_broadcasts() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (_session, mut rx) = subscribe(&handle, "a", 16).await;

    assert!(matches!(rx.recv().await.unwrap(), ServerMessage::GameState { .. }));

    submit(&handle, "a", GameCommand::StartGame { seed: Some(7) }.into()).await.unwrap();
    let ServerMessage::GameStarted { party } = rx.recv().await.unwrap() else {
        panic!("Expected game-started");
    };
    assert_eq!(party.status, PartyStatus::Active);
    assert_eq!(party.state_version, StateVersion(1));
    assert_eq!(stored(&database).state_version, StateVersion(1));
}

#[tokio::test]
async fn rule_violations_do_not_broadcast_or_mutate() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (_session, mut rx) = subscribe(&handle, "a", 16).await;
    assert!(matches!(rx.recv().await.unwrap(), ServerMessage::GameState { .. }));

    let error = submit(&handle, "b", GameCommand::StartGame { seed: None }.into())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        CommandError::Rule(RuleViolation::Unauthorized(ref who)) if *who == user("b")
    ));

    // The reply is sent after any broadcast would have been, so an empty
    // queue here proves nothing was published.
    assert!(rx.try_recv().is_err());
    assert_eq!(stored(&database).state_version, StateVersion(0));
}

#[tokio::test]
async fn state_version_is_monotone_across_broadcasts() {
    let (_database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (_session, mut rx) = subscribe(&handle, "a", 32).await;
    assert!(matches!(rx.recv().await.unwrap(), ServerMessage::GameState { .. }));

    submit(&handle, "a", GameCommand::StartGame { seed: Some(2) }.into()).await.unwrap();
    let order = stored_turn_order(&mut rx).await;

    submit(&handle, &order[0], GameCommand::Pick { gift_id: gift("g1") }.into()).await.unwrap();
    submit(&handle, &order[1], GameCommand::Pick { gift_id: gift("g2") }.into()).await.unwrap();

    let mut last = StateVersion(0);
    while let Ok(message) = rx.try_recv() {
        let party = match message {
            ServerMessage::GameStarted { party }
            | ServerMessage::GameUpdated { party, .. }
            | ServerMessage::GameEnded { party, .. } => party,
            _ => continue,
        };
        assert!(party.state_version > last, "Version went backwards");
        last = party.state_version;
    }
    assert_eq!(last, StateVersion(3));
}

async fn stored_turn_order(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<String> {
    let ServerMessage::GameStarted { party } = rx.recv().await.unwrap() else {
        panic!("Expected game-started");
    };
    party.game_state.unwrap().turn_order.into_iter().map(|u| u.0).collect()
}

#[tokio::test]
async fn finished_game_back_writes_winners() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    submit(&handle, "a", GameCommand::StartGame { seed: Some(2) }.into()).await.unwrap();

    let order: Vec<String> = stored(&database)
        .game_state
        .unwrap()
        .turn_order
        .into_iter()
        .map(|u| u.0)
        .collect();
    submit(&handle, &order[0], GameCommand::Pick { gift_id: gift("g1") }.into()).await.unwrap();
    submit(&handle, &order[1], GameCommand::Pick { gift_id: gift("g2") }.into()).await.unwrap();

    let party = stored(&database);
    assert_eq!(party.status, PartyStatus::Ended);
    let winner = database
        .stored_gift(&PartyId::new(TEST_PARTY), &gift("g1"))
        .unwrap()
        .winner_id
        .unwrap();
    assert_eq!(winner, user(&order[0]));
}

#[tokio::test]
async fn conflicting_store_write_reloads_and_retries() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    // Wake the actor once so it has loaded version 0 into memory.
    let (_session, _rx) = subscribe(&handle, "a", 16).await;

    // An external reconfiguration bumps the stored document behind the
    // actor's back.
    let mut reconfigured = stored(&database);
    reconfigured.state_version = StateVersion(4);
    database.overwrite_party(reconfigured);

    submit(&handle, "a", GameCommand::StartGame { seed: Some(1) }.into()).await.unwrap();
    let party = stored(&database);
    assert_eq!(party.status, PartyStatus::Active);
    assert_eq!(party.state_version, StateVersion(5));
}

#[tokio::test]
async fn subscribe_is_refused_for_non_members() {
    let (_database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (sink, _rx) = mpsc::channel(4);
    let (reply_tx, reply_rx) = oneshot::channel();
    handle
        .submit(ActorMessage::Subscribe(SubscribeRequest {
            session_id: SessionId::generate(),
            user_id: user("stranger"),
            sink,
            reply: reply_tx,
        }))
        .unwrap();

    let error = reply_rx.await.unwrap().unwrap_err();
    assert!(matches!(error, CommandError::Rule(RuleViolation::Unauthorized(_))));
}

#[tokio::test]
async fn expired_deadlines_are_dropped() {
    let (_database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (reply_tx, reply_rx) = oneshot::channel();
    handle
        .submit(ActorMessage::Command(CommandEnvelope {
            actor_id: user("a"),
            session_id: Some(SessionId::generate()),
            action: GameCommand::StartGame { seed: None }.into(),
            deadline: Some(Instant::now() - Duration::from_secs(1)),
            reply: Some(reply_tx),
        }))
        .unwrap();
    assert!(matches!(reply_rx.await.unwrap(), Err(CommandError::Timeout)));
}

#[tokio::test]
async fn registry_returns_one_live_actor_per_party() {
    let (_database, registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let again = registry.resolve(&PartyId::new(TEST_PARTY)).await.unwrap();
    assert!(handle.same_channel(&again));
    assert_eq!(registry.live_count(), 1);
}

#[tokio::test]
async fn slow_consumers_are_dropped() {
    let (_database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    // Capacity one: the join snapshot fills the queue immediately.
    let (_session, mut rx) = subscribe(&handle, "a", 1).await;

    submit(&handle, "a", GameCommand::StartGame { seed: Some(1) }.into()).await.unwrap();

    assert!(matches!(rx.recv().await.unwrap(), ServerMessage::GameState { .. }));
    // The overflowing broadcast dropped this session, closing its sink.
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn reactions_fan_out_without_mutating_state() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let (_s1, mut rx1) = subscribe(&handle, "a", 16).await;
    let (_s2, mut rx2) = subscribe(&handle, "b", 16).await;
    assert!(matches!(rx1.recv().await.unwrap(), ServerMessage::GameState { .. }));
    assert!(matches!(rx2.recv().await.unwrap(), ServerMessage::GameState { .. }));

    handle
        .submit(ActorMessage::Reaction {
            user_id: user("a"),
            kind: "emoji".to_string(),
            value: "🎁".to_string(),
        })
        .unwrap();

    for rx in [&mut rx1, &mut rx2] {
        let ServerMessage::Reaction { player_id, kind, value } = rx.recv().await.unwrap() else {
            panic!("Expected reaction");
        };
        assert_eq!(player_id, user("a"));
        assert_eq!(kind, "emoji");
        assert_eq!(value, "🎁");
    }
    assert_eq!(stored(&database).state_version, StateVersion(0));
}

/// Builds a party whose admin runs the room but does not play, so every
/// player can be synthetic.
async fn bot_only_party() -> (Arc<FakeDatabase>, Arc<PartyRegistry>, PartyHandle) {
    let database = Arc::new(FakeDatabase::new());
    let (mut party, mut roster) = lobby_party(&["admin"], PartyConfig::default());
    party.admin_id = user("admin");
    roster.participants.clear();
    roster.gifts.clear();
    database.seed(party, roster);

    let registry =
        PartyRegistry::new(database.clone(), ActorSettings::default(), bot_settings());
    let handle = registry.resolve(&PartyId::new(TEST_PARTY)).await.unwrap();
    (database, registry, handle)
}

#[tokio::test]
async fn added_bots_can_play_a_forced_move() {
    let (database, _registry, handle) = bot_only_party().await;

    submit(&handle, "admin", AdminAction::BatchAddBots { count: 3 }.into()).await.unwrap();
    submit(&handle, "admin", GameCommand::StartGame { seed: Some(11) }.into()).await.unwrap();

    let party = stored(&database);
    assert_eq!(party.game_state.as_ref().unwrap().turn_order.len(), 3);
    assert!(party.game_state.as_ref().unwrap().turn_order.iter().all(UserId::is_bot));

    submit(&handle, "admin", AdminAction::ForceBotPick.into()).await.unwrap();
    let party = stored(&database);
    assert_eq!(party.game_state.unwrap().unwrapped_gifts.len(), 1);
}

#[tokio::test]
async fn autoplay_drives_a_bot_game_to_completion() {
    let (database, _registry, handle) = bot_only_party().await;

    submit(&handle, "admin", AdminAction::BatchAddBots { count: 3 }.into()).await.unwrap();
    submit(&handle, "admin", GameCommand::StartGame { seed: Some(5) }.into()).await.unwrap();
    submit(&handle, "admin", AdminAction::ToggleAutoplay { active: true }.into()).await.unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if stored(&database).status == PartyStatus::Ended {
            break;
        }
        assert!(Instant::now() < deadline, "Autoplay never finished the game");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let state = stored(&database).game_state.unwrap();
    assert_eq!(state.unwrapped_gifts.len(), 3);
}

#[tokio::test]
async fn reset_returns_the_party_to_the_lobby() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    submit(&handle, "a", GameCommand::StartGame { seed: Some(2) }.into()).await.unwrap();

    let order: Vec<String> = stored(&database)
        .game_state
        .unwrap()
        .turn_order
        .into_iter()
        .map(|u| u.0)
        .collect();
    submit(&handle, &order[0], GameCommand::Pick { gift_id: gift("g1") }.into()).await.unwrap();
    submit(&handle, &order[1], GameCommand::Pick { gift_id: gift("g2") }.into()).await.unwrap();
    assert_eq!(stored(&database).status, PartyStatus::Ended);

    submit(&handle, "a", AdminAction::ResetGame.into()).await.unwrap();
    let party = stored(&database);
    assert_eq!(party.status, PartyStatus::Lobby);
    assert!(party.game_state.is_none());
    let gift_after =
        database.stored_gift(&PartyId::new(TEST_PARTY), &gift("g1")).unwrap();
    assert_eq!(gift_after.winner_id, None);
}

#[tokio::test]
async fn admin_actions_require_the_admin() {
    let (_database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    let error =
        submit(&handle, "b", AdminAction::BatchAddBots { count: 1 }.into()).await.unwrap_err();
    assert!(matches!(error, CommandError::Rule(RuleViolation::Unauthorized(_))));
}

#[tokio::test]
async fn external_roster_mutations_reach_start_game() {
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    // Wake the actor so its subscription is live before the external write.
    let (_session, _rx) = subscribe(&handle, "a", 16).await;

    // A third guest signs up through the lobby flow, outside the actor.
    let (_, extra_roster) = lobby_party(&["a", "b", "c"], PartyConfig::default());
    for participant in &extra_roster.participants {
        database.write_participant(participant).await.unwrap();
    }
    for gift_record in &extra_roster.gifts {
        database.write_gift(gift_record).await.unwrap();
    }
    // Give the subscription a beat to drain into the actor mailbox.
    tokio::time::sleep(Duration::from_millis(50)).await;

    submit(&handle, "a", GameCommand::StartGame { seed: Some(3) }.into()).await.unwrap();
    let party = stored(&database);
    assert_eq!(party.game_state.unwrap().turn_order.len(), 3);
}

#[tokio::test]
async fn mutation_survives_a_dropped_reply_sink() {
    // A session that disconnects mid-command loses its reply, not the
    // mutation.
    let (database, _registry, handle) = setup(&["a", "b"], PartyConfig::default()).await;
    handle
        .submit(ActorMessage::Command(CommandEnvelope {
            actor_id: user("a"),
            session_id: Some(SessionId::generate()),
            action: GameCommand::StartGame { seed: Some(9) }.into(),
            deadline: None,
            reply: None,
        }))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while stored(&database).status != PartyStatus::Active {
        assert!(Instant::now() < deadline, "Mutation never landed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(stored(&database).updated_at > Timestamp(0));
}
