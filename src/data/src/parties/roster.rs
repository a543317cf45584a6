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

use serde::{Deserialize, Serialize};

use crate::core::primitives::UserId;
use crate::gifts::gift::Gift;
use crate::parties::participant::Participant;

/// Snapshot of the externally-owned collections a party's turn engine reads.
///
/// The party actor keeps one of these current via the store subscription and
/// hands it to the rule engine, which consults it only when the game starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub participants: Vec<Participant>,
    pub gifts: Vec<Gift>,
}

impl Roster {
    /// Ids of all GOING participants, in a canonical order (sorted by id) so
    /// that the seeded start-of-game shuffle is deterministic.
    pub fn going_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> =
            self.participants.iter().filter(|p| p.is_going()).map(|p| p.user_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// True if the user appears in the participant list with any status.
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| p.user_id == *user_id)
    }

    /// Gifts submitted by the named user, oldest first.
    pub fn gifts_by(&self, user_id: &UserId) -> Vec<&Gift> {
        let mut gifts: Vec<&Gift> =
            self.gifts.iter().filter(|g| g.submitter_id == *user_id).collect();
        gifts.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        gifts
    }

    /// Inserts or replaces a participant record.
    pub fn upsert_participant(&mut self, participant: Participant) {
        match self.participants.iter_mut().find(|p| p.user_id == participant.user_id) {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// Inserts or replaces a gift record.
    pub fn upsert_gift(&mut self, gift: Gift) {
        match self.gifts.iter_mut().find(|g| g.id == gift.id) {
            Some(existing) => *existing = gift,
            None => self.gifts.push(gift),
        }
    }
}
