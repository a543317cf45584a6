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

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use data::actions::game_command::GameCommand;
use data::actions::rule_violation::RuleViolation;
use data::core::primitives::{PartyId, UserId};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;
use tracing::warn;

use crate::errors::CommandError;
use crate::gateway::bearer_token;
use crate::party_actor::{ActorMessage, CommandEnvelope};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGameRequest {
    party_id: PartyId,
}

/// `POST /api/game/end` — admin override that immediately ends the game.
///
/// Rides the party mailbox like any other command, so it is serialized with
/// in-flight socket commands rather than bypassing the actor.
pub async fn end_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<EndGameRequest>,
) -> Response {
    let Some(user_id) = authenticate(&state, &headers).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let handle = match state.registry.resolve(&request.party_id).await {
        Ok(handle) => handle,
        Err(error) => return error_response(&error),
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    let envelope = CommandEnvelope {
        actor_id: user_id,
        session_id: None,
        action: GameCommand::EndGame.into(),
        deadline: Some(Instant::now() + state.config.actor.command_timeout()),
        reply: Some(reply_tx),
    };
    if let Err(error) = handle.submit(ActorMessage::Command(envelope)) {
        return error_response(&error);
    }

    match tokio::time::timeout(state.config.actor.command_timeout(), reply_rx).await {
        Ok(Ok(Ok(()))) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Ok(Ok(Err(error))) => error_response(&error),
        Ok(Err(_)) | Err(_) => error_response(&CommandError::Timeout),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersBatchRequest {
    user_ids: Vec<UserId>,
}

/// `POST /api/users/batch` — display-profile lookup for client rendering.
pub async fn users_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<UsersBatchRequest>,
) -> Response {
    if authenticate(&state, &headers).await.is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.auth.lookup_users(&request.user_ids).await {
        Ok(profiles) => (StatusCode::OK, Json(profiles)).into_response(),
        Err(error) => {
            warn!(%error, "Profile lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<UserId> {
    let token = bearer_token(headers)?;
    state.auth.verify(&token).await.ok().flatten()
}

fn error_response(error: &CommandError) -> Response {
    let status = match error {
        CommandError::Rule(RuleViolation::Unauthorized(_)) => StatusCode::FORBIDDEN,
        CommandError::Rule(RuleViolation::GameNotActive) => StatusCode::CONFLICT,
        CommandError::Rule(_) => StatusCode::BAD_REQUEST,
        CommandError::Transport(_) => StatusCode::NOT_FOUND,
        CommandError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        CommandError::Busy => StatusCode::SERVICE_UNAVAILABLE,
        CommandError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    };
    (status, Json(json!({ "message": error.to_string(), "code": error.code() }))).into_response()
}
