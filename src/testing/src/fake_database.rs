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

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use color_eyre::Result;
use data::core::primitives::{GiftId, PartyId, StateVersion, UserId};
use data::gifts::gift::Gift;
use data::parties::participant::Participant;
use data::parties::party::Party;
use data::parties::pending_invite::PendingInvite;
use data::parties::roster::Roster;
use database::database::{Database, ExternalMutation, WriteOutcome};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// In-memory [Database] with the same compare-and-set and subscription
/// contract as the production store.
#[derive(Default)]
pub struct FakeDatabase {
    parties: Mutex<HashMap<PartyId, Party>>,
    participants: Mutex<HashMap<(PartyId, UserId), Participant>>,
    gifts: Mutex<HashMap<(PartyId, GiftId), Gift>>,
    invites: Mutex<Vec<PendingInvite>>,
    subscribers: Mutex<HashMap<PartyId, Vec<UnboundedSender<ExternalMutation>>>>,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a party document and its roster collections.
    pub fn seed(&self, party: Party, roster: Roster) {
        for participant in roster.participants {
            self.participants
                .lock()
                .unwrap()
                .insert((participant.party_id.clone(), participant.user_id.clone()), participant);
        }
        for gift in roster.gifts {
            self.gifts.lock().unwrap().insert((gift.party_id.clone(), gift.id.clone()), gift);
        }
        self.parties.lock().unwrap().insert(party.id.clone(), party);
    }

    /// Overwrites the stored party unconditionally, simulating an external
    /// reconfiguration racing the actor.
    pub fn overwrite_party(&self, party: Party) {
        self.parties.lock().unwrap().insert(party.id.clone(), party);
    }

    pub fn stored_party(&self, id: &PartyId) -> Option<Party> {
        self.parties.lock().unwrap().get(id).cloned()
    }

    pub fn stored_gift(&self, id: &PartyId, gift_id: &GiftId) -> Option<Gift> {
        self.gifts.lock().unwrap().get(&(id.clone(), gift_id.clone())).cloned()
    }

    fn notify(&self, id: &PartyId, mutation: ExternalMutation) {
        if let Some(senders) = self.subscribers.lock().unwrap().get_mut(id) {
            senders.retain(|sender| sender.send(mutation.clone()).is_ok());
        }
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn fetch_party(&self, id: &PartyId) -> Result<Option<Party>> {
        Ok(self.parties.lock().unwrap().get(id).cloned())
    }

    async fn write_party(
        &self,
        party: &Party,
        expected: Option<StateVersion>,
    ) -> Result<WriteOutcome> {
        let mut parties = self.parties.lock().unwrap();
        let stored = parties.get(&party.id).map(|p| p.state_version);
        if stored != expected {
            return Ok(WriteOutcome::Conflict);
        }
        parties.insert(party.id.clone(), party.clone());
        Ok(WriteOutcome::Written)
    }

    async fn fetch_participants(&self, id: &PartyId) -> Result<Vec<Participant>> {
        let mut participants: Vec<Participant> = self
            .participants
            .lock()
            .unwrap()
            .iter()
            .filter(|((party_id, _), _)| party_id == id)
            .map(|(_, p)| p.clone())
            .collect();
        participants.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(participants)
    }

    async fn write_participant(&self, participant: &Participant) -> Result<()> {
        self.participants
            .lock()
            .unwrap()
            .insert((participant.party_id.clone(), participant.user_id.clone()), participant.clone());
        self.notify(&participant.party_id, ExternalMutation::Participant(participant.clone()));
        Ok(())
    }

    async fn fetch_gifts(&self, id: &PartyId) -> Result<Vec<Gift>> {
        let mut gifts: Vec<Gift> = self
            .gifts
            .lock()
            .unwrap()
            .iter()
            .filter(|((party_id, _), _)| party_id == id)
            .map(|(_, g)| g.clone())
            .collect();
        gifts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(gifts)
    }

    async fn write_gift(&self, gift: &Gift) -> Result<()> {
        self.gifts.lock().unwrap().insert((gift.party_id.clone(), gift.id.clone()), gift.clone());
        self.notify(&gift.party_id, ExternalMutation::Gift(gift.clone()));
        Ok(())
    }

    async fn fetch_pending_invites(&self, id: &PartyId) -> Result<Vec<PendingInvite>> {
        Ok(self.invites.lock().unwrap().iter().filter(|i| i.party_id == *id).cloned().collect())
    }

    async fn finalize_gift_winners(
        &self,
        id: &PartyId,
        winners: &BTreeMap<GiftId, UserId>,
    ) -> Result<()> {
        let mut gifts = self.gifts.lock().unwrap();
        for (gift_id, winner_id) in winners {
            if let Some(gift) = gifts.get_mut(&(id.clone(), gift_id.clone())) {
                gift.winner_id = Some(winner_id.clone());
            }
        }
        Ok(())
    }

    async fn clear_gift_winners(&self, id: &PartyId) -> Result<()> {
        let mut gifts = self.gifts.lock().unwrap();
        for ((party_id, _), gift) in gifts.iter_mut() {
            if party_id == id {
                gift.winner_id = None;
            }
        }
        Ok(())
    }

    fn subscribe_external(&self, id: &PartyId) -> UnboundedReceiver<ExternalMutation> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().entry(id.clone()).or_default().push(tx);
        rx
    }
}
