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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use data::actions::admin_action::AdminAction;
use data::actions::game_command::GameCommand;
use data::actions::party_action::PartyAction;
use data::core::primitives::{PartyId, SessionId, UserId};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::errors::CommandError;
use crate::party_actor::{ActorMessage, CommandEnvelope, PartyHandle, SubscribeRequest};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::rate_limit::RateLimiter;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    token: Option<String>,
}

/// WebSocket entry point: the bearer token (header or `token` query
/// parameter) must resolve to a user before the upgrade completes.
pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = bearer_token(&headers).or(params.token) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match state.auth.verify(&token).await {
        Ok(Some(user_id)) => ws.on_upgrade(move |socket| {
            let (session, out_rx) = Session::new(state, user_id);
            session.run(socket, out_rx)
        }),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(error) => {
            warn!(%error, "Auth provider failure");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Extracts `Authorization: Bearer <token>` if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Per-connection adapter between one client and the party actors.
///
/// Owns the authenticated identity, the set of joined parties, and the
/// bounded outbound queue that broadcasters write into.
struct Session {
    state: Arc<AppState>,
    session_id: SessionId,
    user_id: UserId,
    joined: HashMap<PartyId, PartyHandle>,
    limiter: RateLimiter,
    out_tx: mpsc::Sender<ServerMessage>,
}

impl Session {
    fn new(state: Arc<AppState>, user_id: UserId) -> (Self, mpsc::Receiver<ServerMessage>) {
        let settings = &state.config.actor;
        let (out_tx, out_rx) = mpsc::channel(settings.session_queue);
        let limiter =
            RateLimiter::new(settings.rate_limit_burst, settings.rate_limit_per_second);
        let session = Self {
            state,
            session_id: SessionId::generate(),
            user_id,
            joined: HashMap::new(),
            limiter,
            out_tx,
        };
        (session, out_rx)
    }

    async fn run(mut self, socket: WebSocket, mut out_rx: mpsc::Receiver<ServerMessage>) {
        info!(session_id = %self.session_id, user_id = %self.user_id, "Session connected");
        let (mut ws_tx, mut ws_rx) = socket.split();

        loop {
            tokio::select! {
                outbound = out_rx.recv() => match outbound {
                    Some(message) => {
                        if forward(&mut ws_tx, &message).await.is_err() {
                            break;
                        }
                    }
                    // All senders gone means every actor dropped us as a slow
                    // consumer; the client reconnects for a fresh snapshot.
                    None => break,
                },
                inbound = ws_rx.next() => match inbound {
                    Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        debug!(session_id = %self.session_id, %error, "Socket error");
                        break;
                    }
                },
            }
        }

        for handle in self.joined.values() {
            let _ = handle.submit(ActorMessage::Unsubscribe { session_id: self.session_id });
        }
        info!(session_id = %self.session_id, "Session disconnected");
    }

    async fn handle_text(&mut self, text: &str) {
        if !self.limiter.try_acquire() {
            self.send_error(&CommandError::Busy);
            return;
        }
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                self.send_error(&CommandError::Transport(format!("malformed message: {error}")));
                return;
            }
        };
        self.handle_client_message(message).await;
    }

    async fn handle_client_message(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::JoinParty { party_id } => self.join_party(party_id).await,
            ClientMessage::PickGift { party_id, gift_id } => {
                self.submit_action(&party_id, GameCommand::Pick { gift_id }.into());
            }
            ClientMessage::StealGift { party_id, gift_id } => {
                self.submit_action(&party_id, GameCommand::Steal { gift_id }.into());
            }
            ClientMessage::EndTurn { party_id } => {
                self.submit_action(&party_id, GameCommand::EndTurn.into());
            }
            ClientMessage::SendReaction { party_id, kind, value } => {
                match self.joined_handle(&party_id) {
                    Ok(handle) => {
                        let _ = handle.submit(ActorMessage::Reaction {
                            user_id: self.user_id.clone(),
                            kind,
                            value,
                        });
                    }
                    Err(error) => self.send_error(&error),
                }
            }
            ClientMessage::AdminBatchAddBots { party_id, count } => {
                self.submit_action(&party_id, AdminAction::BatchAddBots { count }.into());
            }
            ClientMessage::AdminToggleAutoplay { party_id, active } => {
                self.submit_action(&party_id, AdminAction::ToggleAutoplay { active }.into());
            }
            ClientMessage::AdminForceBotMove { party_id } => {
                self.submit_action(&party_id, AdminAction::ForceBotMove.into());
            }
            ClientMessage::AdminForceBotSteal { party_id } => {
                self.submit_action(&party_id, AdminAction::ForceBotSteal.into());
            }
            ClientMessage::AdminForceBotPick { party_id } => {
                self.submit_action(&party_id, AdminAction::ForceBotPick.into());
            }
            ClientMessage::AdminForceBotSkip { party_id } => {
                self.submit_action(&party_id, AdminAction::ForceBotSkip.into());
            }
            ClientMessage::AdminResetGame { party_id } => {
                self.submit_action(&party_id, AdminAction::ResetGame.into());
            }
        }
    }

    /// Subscribes this session to a party. Membership is validated by the
    /// actor against its roster; on success the snapshot arrives through the
    /// broadcast sink and the ack is sent here.
    async fn join_party(&mut self, party_id: PartyId) {
        let handle = match self.state.registry.resolve(&party_id).await {
            Ok(handle) => handle,
            Err(error) => {
                self.send_error(&error);
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = SubscribeRequest {
            session_id: self.session_id,
            user_id: self.user_id.clone(),
            sink: self.out_tx.clone(),
            reply: reply_tx,
        };
        if let Err(error) = handle.submit(ActorMessage::Subscribe(request)) {
            self.send_error(&error);
            return;
        }

        let timeout = self.state.config.actor.command_timeout();
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(Ok(ack))) => {
                self.joined.insert(party_id.clone(), handle);
                self.send(ServerMessage::PartyJoined { party_id, room_name: ack.room_name });
            }
            Ok(Ok(Err(error))) => self.send_error(&error),
            Ok(Err(_)) | Err(_) => self.send_error(&CommandError::Timeout),
        }
    }

    /// Queues a command envelope to a joined party and forwards any failure
    /// reply back to this session without blocking the socket loop.
    fn submit_action(&mut self, party_id: &PartyId, action: PartyAction) {
        let handle = match self.joined_handle(party_id) {
            Ok(handle) => handle,
            Err(error) => {
                self.send_error(&error);
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = CommandEnvelope {
            actor_id: self.user_id.clone(),
            session_id: Some(self.session_id),
            action,
            deadline: Some(Instant::now() + self.state.config.actor.command_timeout()),
            reply: Some(reply_tx),
        };
        if let Err(error) = handle.submit(ActorMessage::Command(envelope)) {
            self.send_error(&error);
            return;
        }

        let out_tx = self.out_tx.clone();
        tokio::spawn(async move {
            if let Ok(Err(error)) = reply_rx.await {
                let _ = out_tx
                    .send(ServerMessage::Error {
                        message: error.to_string(),
                        code: Some(error.code()),
                    })
                    .await;
            }
        });
    }

    fn joined_handle(&self, party_id: &PartyId) -> Result<PartyHandle, CommandError> {
        self.joined
            .get(party_id)
            .cloned()
            .ok_or_else(|| CommandError::Transport(format!("join party {party_id} first")))
    }

    fn send(&mut self, message: ServerMessage) {
        let _ = self.out_tx.try_send(message);
    }

    fn send_error(&mut self, error: &CommandError) {
        self.send(ServerMessage::Error {
            message: error.to_string(),
            code: Some(error.code()),
        });
    }
}

async fn forward(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).unwrap_or_else(|_| {
        "{\"event\":\"error\",\"data\":{\"message\":\"encoding failure\"}}".to_string()
    });
    ws_tx.send(Message::Text(json.into())).await
}
