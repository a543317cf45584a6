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

use async_trait::async_trait;
use color_eyre::Result;
use data::core::primitives::UserId;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Display information for one user, served by `POST /api/users/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The authentication collaborator.
///
/// The gateway resolves every connection's opaque bearer token through this
/// trait before any message is processed; the core never sees credentials.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a bearer token to a user id, or None for unknown/expired
    /// tokens.
    async fn verify(&self, token: &str) -> Result<Option<UserId>>;

    /// Display profiles for the given users, for client rendering.
    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<UserProfile>>;
}

/// Token-table auth for development and tests, loaded from configuration.
pub struct StaticTokenAuth {
    tokens: HashMap<String, UserId>,
    names: HashMap<UserId, String>,
    emails: HashMap<UserId, String>,
}

impl StaticTokenAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: config
                .tokens
                .iter()
                .map(|(token, user)| (token.clone(), UserId::new(user.clone())))
                .collect(),
            names: config
                .names
                .iter()
                .map(|(user, name)| (UserId::new(user.clone()), name.clone()))
                .collect(),
            emails: config
                .emails
                .iter()
                .map(|(user, email)| (UserId::new(user.clone()), email.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn verify(&self, token: &str) -> Result<Option<UserId>> {
        Ok(self.tokens.get(token).cloned())
    }

    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<UserProfile>> {
        Ok(ids
            .iter()
            .map(|id| {
                let name = if id.is_bot() {
                    bots::naming::display_name(id)
                } else {
                    self.names.get(id).cloned().unwrap_or_else(|| id.to_string())
                };
                UserProfile { id: id.clone(), name, email: self.emails.get(id).cloned() }
            })
            .collect())
    }
}
