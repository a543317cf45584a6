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

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use data::core::primitives::PartyId;
use database::database::Database;
use tracing::debug;

use crate::config::{ActorSettings, BotSettings};
use crate::errors::CommandError;
use crate::party_actor::{PartyActor, PartyHandle};

/// Process-wide map from party id to the live actor handle.
///
/// At most one live actor exists per party id: the spawn race is settled
/// under the map's entry lock, and losers of the race discard their
/// freshly-loaded actor without ever running it.
pub struct PartyRegistry {
    parties: DashMap<PartyId, PartyHandle>,
    database: Arc<dyn Database>,
    settings: ActorSettings,
    bot_settings: BotSettings,
}

impl PartyRegistry {
    pub fn new(
        database: Arc<dyn Database>,
        settings: ActorSettings,
        bot_settings: BotSettings,
    ) -> Arc<Self> {
        Arc::new(Self { parties: DashMap::new(), database, settings, bot_settings })
    }

    /// Returns the live handle for the party, lazily spawning an actor on
    /// first use or after an idle reap.
    pub async fn resolve(self: &Arc<Self>, party_id: &PartyId) -> Result<PartyHandle, CommandError> {
        if let Some(existing) = self.parties.get(party_id) {
            if !existing.is_closed() {
                return Ok(existing.value().clone());
            }
        }

        // Load outside the map lock; the entry lock below settles the race.
        let (actor, handle, external) = PartyActor::load(
            party_id,
            self.database.clone(),
            self.clone(),
            self.settings.clone(),
            self.bot_settings.clone(),
        )
        .await?;

        match self.parties.entry(party_id.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_closed() {
                    occupied.insert(handle.clone());
                    tokio::spawn(actor.run(external));
                    Ok(handle)
                } else {
                    // Another resolver won; our unspawned actor is dropped.
                    Ok(occupied.get().clone())
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(handle.clone());
                tokio::spawn(actor.run(external));
                Ok(handle)
            }
        }
    }

    /// Removes a terminated actor's entry. Keyed to the exact channel so a
    /// respawned successor is never evicted by its predecessor's shutdown.
    pub fn retire(&self, handle: &PartyHandle) {
        let removed =
            self.parties.remove_if(handle.party_id(), |_, stored| stored.same_channel(handle));
        if removed.is_some() {
            debug!(party_id = %handle.party_id(), "Retired party actor");
        }
    }

    /// Number of live actors, for diagnostics.
    pub fn live_count(&self) -> usize {
        self.parties.iter().filter(|entry| !entry.value().is_closed()).count()
    }
}
