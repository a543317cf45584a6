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

use axum::routing::{get, post};
use axum::Router;
use color_eyre::Result;
use database::database::Database;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::AuthProvider;
use crate::config::ServerConfig;
use crate::registry::PartyRegistry;
use crate::{gateway, http_api};

/// Shared dependencies handed to every request handler.
pub struct AppState {
    pub registry: Arc<PartyRegistry>,
    pub database: Arc<dyn Database>,
    pub auth: Arc<dyn AuthProvider>,
    pub config: ServerConfig,
}

/// Builds the router over the given collaborators.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(gateway::ws_handler))
        .route("/api/game/end", post(http_api::end_game))
        .route("/api/users/batch", post(http_api::users_batch))
        .with_state(state)
}

/// Runs the server until the process is stopped.
pub async fn run(
    config: ServerConfig,
    database: Arc<dyn Database>,
    auth: Arc<dyn AuthProvider>,
) -> Result<()> {
    let registry =
        PartyRegistry::new(database.clone(), config.actor.clone(), config.bots.clone());
    let port = config.port();
    let state = Arc::new(AppState { registry, database, auth, config });

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
