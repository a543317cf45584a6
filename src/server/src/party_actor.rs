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
use std::time::Instant;

use data::actions::admin_action::AdminAction;
use data::actions::game_command::GameCommand;
use data::actions::party_action::PartyAction;
use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{GiftId, PartyId, SessionId, Timestamp, UserId};
use data::game_states::game_event::GameEvent;
use data::gifts::gift::Gift;
use data::parties::participant::{Participant, ParticipantStatus};
use data::parties::party::{Party, PartyStatus};
use data::parties::roster::Roster;
use database::database::{Database, ExternalMutation, WriteOutcome};
use rules::action_handlers::actions;
use rules::legality::legal_actions;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::time;
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::config::{ActorSettings, BotSettings};
use crate::errors::CommandError;
use crate::protocol::ServerMessage;
use crate::registry::PartyRegistry;

/// A command addressed to one party, with everything needed to authorize it
/// and reply to its originator.
#[derive(Debug)]
pub struct CommandEnvelope {
    /// Authenticated user the command acts as.
    pub actor_id: UserId,

    /// Originating session, absent for internally scheduled bot moves and
    /// HTTP-submitted commands.
    pub session_id: Option<SessionId>,

    pub action: PartyAction,

    /// Commands whose deadline has passed are dropped with a Timeout error.
    pub deadline: Option<Instant>,

    /// Reply sink; a session that disconnected mid-command simply has its
    /// reply discarded, the mutation still happens.
    pub reply: Option<oneshot::Sender<Result<(), CommandError>>>,
}

/// Request to join a session to a party's broadcasts.
pub struct SubscribeRequest {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub sink: mpsc::Sender<ServerMessage>,
    pub reply: oneshot::Sender<Result<JoinAck, CommandError>>,
}

/// Successful subscription acknowledgement.
#[derive(Debug, Clone)]
pub struct JoinAck {
    pub room_name: String,
}

/// Anything that can land in a party actor's mailbox. All mutation paths go
/// through here, so they are linearized by the actor's single-threaded loop.
pub enum ActorMessage {
    Command(CommandEnvelope),
    Subscribe(SubscribeRequest),
    Unsubscribe { session_id: SessionId },
    Reaction { user_id: UserId, kind: String, value: String },
    External(ExternalMutation),
}

/// Cheaply cloneable handle for submitting messages to a party actor.
#[derive(Clone)]
pub struct PartyHandle {
    party_id: PartyId,
    sender: mpsc::Sender<ActorMessage>,
}

impl PartyHandle {
    pub fn party_id(&self) -> &PartyId {
        &self.party_id
    }

    /// True once the actor has terminated and can no longer receive.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn same_channel(&self, other: &PartyHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Non-blocking submission; a full inbox is a Busy error, a closed one a
    /// Transient error (the registry will respawn the actor on demand).
    pub fn submit(&self, message: ActorMessage) -> Result<(), CommandError> {
        self.sender.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => CommandError::Busy,
            TrySendError::Closed(_) => {
                CommandError::Transient("the party is restarting".to_string())
            }
        })
    }
}

/// One logical single-threaded worker owning the authoritative state for one
/// party.
///
/// The actor is the sole writer of the party document: commands are dequeued
/// in order, validated by the rule engine, persisted with a version CAS, and
/// only then committed to memory and fanned out.
pub struct PartyActor {
    party: Party,
    roster: Roster,
    autoplay: bool,
    bot_move_pending: bool,
    database: Arc<dyn Database>,
    registry: Arc<PartyRegistry>,
    broadcaster: Broadcaster,
    inbox: mpsc::Receiver<ActorMessage>,
    handle: PartyHandle,
    settings: ActorSettings,
    bot_settings: BotSettings,
}

impl PartyActor {
    /// Loads the party and its roster from the store and builds a not yet
    /// running actor. The caller decides whether to spawn it (the registry
    /// discards the loser of a concurrent-spawn race).
    pub async fn load(
        party_id: &PartyId,
        database: Arc<dyn Database>,
        registry: Arc<PartyRegistry>,
        settings: ActorSettings,
        bot_settings: BotSettings,
    ) -> Result<(Self, PartyHandle, UnboundedReceiver<ExternalMutation>), CommandError> {
        let party = database
            .fetch_party(party_id)
            .await
            .map_err(|err| CommandError::Transient(err.to_string()))?
            .ok_or_else(|| CommandError::Transport(format!("unknown party {party_id}")))?;

        let participants = database
            .fetch_participants(party_id)
            .await
            .map_err(|err| CommandError::Transient(err.to_string()))?;
        let gifts = database
            .fetch_gifts(party_id)
            .await
            .map_err(|err| CommandError::Transient(err.to_string()))?;

        let external = database.subscribe_external(party_id);
        let (sender, inbox) = mpsc::channel(settings.inbox_capacity);
        let handle = PartyHandle { party_id: party_id.clone(), sender };

        let actor = Self {
            party,
            roster: Roster { participants, gifts },
            autoplay: false,
            bot_move_pending: false,
            database,
            registry,
            broadcaster: Broadcaster::default(),
            inbox,
            handle: handle.clone(),
            settings,
            bot_settings,
        };
        Ok((actor, handle, external))
    }

    /// The actor loop: strictly ordered message processing, with store
    /// subscription events interleaved and idle reaping when the room goes
    /// quiet.
    pub async fn run(mut self, mut external: UnboundedReceiver<ExternalMutation>) {
        info!(party_id = %self.party.id, "Party actor started");
        let mut external_open = true;
        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message).await,
                    None => break,
                },
                mutation = external.recv(), if external_open => match mutation {
                    Some(mutation) => self.apply_external(mutation),
                    None => external_open = false,
                },
                _ = time::sleep(self.settings.idle_timeout()) => {
                    if self.broadcaster.is_empty() {
                        debug!(party_id = %self.party.id, "Reaping idle party actor");
                        break;
                    }
                }
            }
        }
        self.registry.retire(&self.handle);
        info!(party_id = %self.party.id, "Party actor stopped");
    }

    async fn handle_message(&mut self, message: ActorMessage) {
        match message {
            ActorMessage::Command(envelope) => self.handle_command(envelope).await,
            ActorMessage::Subscribe(request) => self.handle_subscribe(request),
            ActorMessage::Unsubscribe { session_id } => self.broadcaster.remove(session_id),
            ActorMessage::Reaction { user_id, kind, value } => {
                let message = ServerMessage::Reaction { player_id: user_id, kind, value };
                self.broadcaster.publish(&self.party.id, &message);
            }
            ActorMessage::External(mutation) => self.apply_external(mutation),
        }
    }

    fn handle_subscribe(&mut self, request: SubscribeRequest) {
        if !self.party.is_admin(&request.user_id) && !self.roster.is_member(&request.user_id) {
            let _ = request
                .reply
                .send(Err(CommandError::Rule(RuleViolation::Unauthorized(request.user_id))));
            return;
        }

        self.broadcaster.insert(request.session_id, request.sink);
        let room_name =
            self.party.title.clone().unwrap_or_else(|| self.party.id.to_string());
        let _ = request.reply.send(Ok(JoinAck { room_name }));
        self.broadcaster
            .send_to(request.session_id, ServerMessage::GameState { party: self.party.clone() });
    }

    async fn handle_command(&mut self, envelope: CommandEnvelope) {
        if envelope.session_id.is_none() {
            self.bot_move_pending = false;
        }
        if let Some(deadline) = envelope.deadline {
            if Instant::now() > deadline {
                if let Some(reply) = envelope.reply {
                    let _ = reply.send(Err(CommandError::Timeout));
                }
                return;
            }
        }

        let result = match &envelope.action {
            PartyAction::Game(command) => {
                self.apply_game_command(&envelope.actor_id, command).await
            }
            PartyAction::Admin(action) => {
                self.apply_admin_action(&envelope.actor_id, *action).await
            }
        };

        if let Err(error) = &result {
            debug!(party_id = %self.party.id, actor = %envelope.actor_id, %error, "Command failed");
        }
        if let Some(reply) = envelope.reply {
            let _ = reply.send(result);
        }
    }

    /// Runs a command through the rule engine against a cloned snapshot, then
    /// persists with a compare-and-set on the state version. The in-memory
    /// state changes only after the write confirms.
    ///
    /// CAS conflicts are rare (this actor is the sole authoritative writer)
    /// and come from external reconfiguration, so the budget is one reload
    /// and retry.
    async fn apply_game_command(
        &mut self,
        actor_id: &UserId,
        command: &GameCommand,
    ) -> Result<(), CommandError> {
        let now = Timestamp::now();
        let mut reloaded = false;
        loop {
            let mut candidate = self.party.clone();
            let events = actions::execute(&mut candidate, &self.roster, actor_id, command, now)
                .map_err(CommandError::Rule)?;

            let expected = candidate.state_version;
            candidate.state_version = candidate.state_version.next();
            candidate.updated_at = now;

            match self.database.write_party(&candidate, Some(expected)).await {
                Ok(WriteOutcome::Written) => {
                    self.commit(candidate, events).await;
                    return Ok(());
                }
                Ok(WriteOutcome::Conflict) if !reloaded => {
                    reloaded = true;
                    let latest = self
                        .database
                        .fetch_party(&self.party.id)
                        .await
                        .map_err(|err| CommandError::Transient(err.to_string()))?
                        .ok_or_else(|| {
                            CommandError::Transient("party document disappeared".to_string())
                        })?;
                    warn!(party_id = %self.party.id, "Write conflict, reloading and retrying");
                    self.party = latest;
                }
                Ok(WriteOutcome::Conflict) => {
                    return Err(CommandError::Transient("persistent write conflict".to_string()))
                }
                Err(err) => return Err(CommandError::Transient(err.to_string())),
            }
        }
    }

    /// Installs a successfully persisted snapshot and fans it out.
    async fn commit(&mut self, new_party: Party, events: Vec<GameEvent>) {
        let previous_status = self.party.status;
        self.party = new_party;

        let message = match (previous_status, self.party.status) {
            (PartyStatus::Lobby, PartyStatus::Active) => {
                ServerMessage::GameStarted { party: self.party.clone() }
            }
            (_, PartyStatus::Ended) => {
                ServerMessage::GameEnded { party: self.party.clone(), events: events.clone() }
            }
            _ => ServerMessage::GameUpdated { party: self.party.clone(), events: events.clone() },
        };
        self.broadcaster.publish(&self.party.id, &message);

        if previous_status != PartyStatus::Ended && self.party.status == PartyStatus::Ended {
            self.finalize_winners().await;
            if self.autoplay {
                self.autoplay = false;
                self.broadcaster
                    .publish(&self.party.id, &ServerMessage::AutoplayUpdated { active: false });
            }
        } else {
            self.maybe_schedule_bot();
        }
    }

    async fn finalize_winners(&self) {
        let Some(state) = &self.party.game_state else {
            return;
        };
        if let Err(error) =
            self.database.finalize_gift_winners(&self.party.id, &state.winners()).await
        {
            warn!(party_id = %self.party.id, %error, "Winner back-write failed");
        }
    }

    async fn apply_admin_action(
        &mut self,
        actor_id: &UserId,
        action: AdminAction,
    ) -> Result<(), CommandError> {
        if !self.party.is_admin(actor_id) {
            return Err(CommandError::Rule(RuleViolation::Unauthorized(actor_id.clone())));
        }
        if !self.bot_settings.enabled && !matches!(action, AdminAction::ResetGame) {
            return Err(CommandError::Transport("bot simulation is disabled".to_string()));
        }

        match action {
            AdminAction::BatchAddBots { count } => self.add_bots(count).await,
            AdminAction::ToggleAutoplay { active } => {
                self.autoplay = active;
                if active {
                    // Re-toggling also unsticks a scheduled move that was lost
                    // to a dropped selection.
                    self.bot_move_pending = false;
                }
                self.broadcaster
                    .publish(&self.party.id, &ServerMessage::AutoplayToggled { active });
                self.maybe_schedule_bot();
                Ok(())
            }
            AdminAction::ForceBotMove => self.force_bot(bots::agent::select).await,
            AdminAction::ForceBotSteal => self.force_bot(bots::agent::select_steal).await,
            AdminAction::ForceBotPick => self.force_bot(bots::agent::select_pick).await,
            AdminAction::ForceBotSkip => self.force_bot(bots::agent::select_skip).await,
            AdminAction::ResetGame => self.reset_game().await,
        }
    }

    /// Adds synthetic GOING participants to the lobby roster, each with one
    /// placeholder gift, writing both to the store.
    async fn add_bots(&mut self, count: u32) -> Result<(), CommandError> {
        if self.party.status != PartyStatus::Lobby {
            return Err(CommandError::Rule(RuleViolation::GameNotActive));
        }

        let now = Timestamp::now();
        for _ in 0..count {
            let bot_id = UserId::new_bot();
            let participant = Participant {
                party_id: self.party.id.clone(),
                user_id: bot_id.clone(),
                status: ParticipantStatus::Going,
                joined_at: now,
            };
            let gift = Gift {
                id: GiftId::new(format!("gift-{bot_id}")),
                party_id: self.party.id.clone(),
                submitter_id: bot_id,
                metadata: bots::naming::placeholder_gift(),
                submitted_at: now,
                winner_id: None,
            };

            self.database
                .write_participant(&participant)
                .await
                .map_err(|err| CommandError::Transient(err.to_string()))?;
            self.database
                .write_gift(&gift)
                .await
                .map_err(|err| CommandError::Transient(err.to_string()))?;

            // The store subscription will echo these, but the cache update is
            // applied eagerly so an immediate StartGame sees the bots.
            self.roster.upsert_participant(participant);
            self.roster.upsert_gift(gift);
        }

        info!(party_id = %self.party.id, count, "Added bots");
        self.broadcaster.publish(&self.party.id, &ServerMessage::BotsAdded { count });
        Ok(())
    }

    /// Runs one bot command immediately, chosen by the provided selector.
    async fn force_bot(
        &mut self,
        select: impl Fn(&Party, &UserId) -> Option<GameCommand>,
    ) -> Result<(), CommandError> {
        let active = legal_actions::next_to_act(&self.party)
            .cloned()
            .ok_or_else(|| CommandError::Transport("no player is active".to_string()))?;
        if !active.is_bot() {
            return Err(CommandError::Transport(format!(
                "active player {active} is not a bot"
            )));
        }

        let command = select(&self.party, &active)
            .ok_or_else(|| CommandError::Transport("no legal bot action".to_string()))?;
        self.apply_game_command(&active, &command).await?;
        self.broadcaster.publish(&self.party.id, &ServerMessage::BotMoveForced);
        Ok(())
    }

    /// Discards the game state and returns the party to the lobby, clearing
    /// any winner assignments from an earlier run.
    async fn reset_game(&mut self) -> Result<(), CommandError> {
        let now = Timestamp::now();
        let mut candidate = self.party.clone();
        candidate.status = PartyStatus::Lobby;
        candidate.game_state = None;
        let expected = candidate.state_version;
        candidate.state_version = candidate.state_version.next();
        candidate.updated_at = now;

        match self.database.write_party(&candidate, Some(expected)).await {
            Ok(WriteOutcome::Written) => {}
            Ok(WriteOutcome::Conflict) => {
                return Err(CommandError::Transient("write conflict".to_string()))
            }
            Err(err) => return Err(CommandError::Transient(err.to_string())),
        }
        if let Err(error) = self.database.clear_gift_winners(&self.party.id).await {
            warn!(party_id = %self.party.id, %error, "Clearing winners failed");
        }

        self.party = candidate;
        info!(party_id = %self.party.id, "Game reset");
        self.broadcaster
            .publish(&self.party.id, &ServerMessage::GameReset { party: self.party.clone() });
        Ok(())
    }

    /// Keeps the roster cache current with externally-originated mutations.
    /// These only matter the next time a game starts.
    fn apply_external(&mut self, mutation: ExternalMutation) {
        match mutation {
            ExternalMutation::Participant(participant) => {
                self.roster.upsert_participant(participant);
            }
            ExternalMutation::ParticipantRemoved(user_id) => {
                self.roster.participants.retain(|p| p.user_id != user_id);
            }
            ExternalMutation::Gift(gift) => self.roster.upsert_gift(gift),
            ExternalMutation::GiftRemoved(gift_id) => {
                self.roster.gifts.retain(|g| g.id != gift_id);
            }
            ExternalMutation::Invite(_) => {}
        }
    }

    /// Schedules a delayed autoplay move when the active player is a bot.
    ///
    /// The selection runs against the snapshot taken now; the rule engine
    /// revalidates when the command is dequeued, so a stale selection is
    /// rejected rather than misapplied.
    fn maybe_schedule_bot(&mut self) {
        if !self.bot_settings.enabled
            || !self.autoplay
            || self.bot_move_pending
            || self.party.status != PartyStatus::Active
        {
            return;
        }
        let Some(active) = legal_actions::next_to_act(&self.party).cloned() else {
            return;
        };
        if !active.is_bot() {
            return;
        }

        self.bot_move_pending = true;
        let party = self.party.clone();
        let handle = self.handle.clone();
        let delay = self.bot_settings.think_delay();
        tokio::spawn(async move {
            if let Some(command) = bots::agent::select_delayed(&party, &active, delay).await {
                let envelope = CommandEnvelope {
                    actor_id: active,
                    session_id: None,
                    action: command.into(),
                    deadline: None,
                    reply: None,
                };
                let _ = handle.submit(ActorMessage::Command(envelope));
            }
        });
    }
}
