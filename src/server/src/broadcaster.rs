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

use data::core::primitives::{PartyId, SessionId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::protocol::ServerMessage;

/// Per-party fan-out of state snapshots and events to subscribed sessions.
///
/// Owned by the party actor, so publication order is exactly the actor's
/// mutation order and every session observes a strictly monotone state
/// version. Delivery never blocks the actor: a session whose outbound queue
/// is full is dropped and must reconnect for a fresh snapshot.
#[derive(Default)]
pub struct Broadcaster {
    sinks: HashMap<SessionId, Sender<ServerMessage>>,
}

impl Broadcaster {
    /// Registers a session sink, replacing any previous sink for the id.
    pub fn insert(&mut self, session_id: SessionId, sink: Sender<ServerMessage>) {
        self.sinks.insert(session_id, sink);
    }

    pub fn remove(&mut self, session_id: SessionId) {
        self.sinks.remove(&session_id);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Sends a message to every subscribed session, dropping slow consumers.
    pub fn publish(&mut self, party_id: &PartyId, message: &ServerMessage) {
        let mut dropped = vec![];
        for (session_id, sink) in &self.sinks {
            match sink.try_send(message.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(%party_id, %session_id, "Dropping slow consumer");
                    dropped.push(*session_id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(%party_id, %session_id, "Dropping disconnected session");
                    dropped.push(*session_id);
                }
            }
        }
        for session_id in dropped {
            self.sinks.remove(&session_id);
        }
    }

    /// Sends a message to a single session, applying the same drop policy.
    pub fn send_to(&mut self, session_id: SessionId, message: ServerMessage) {
        let Some(sink) = self.sinks.get(&session_id) else {
            return;
        };
        if sink.try_send(message).is_err() {
            self.sinks.remove(&session_id);
        }
    }
}
