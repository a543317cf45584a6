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

use crate::core::primitives::{PartyId, Timestamp, UserId};

/// A user's membership in one party.
///
/// Participants are primarily owned by the lobby/invite collaborators; the
/// core consumes a snapshot of the GOING set when the game starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub party_id: PartyId,
    pub user_id: UserId,
    pub status: ParticipantStatus,
    pub joined_at: Timestamp,
}

impl Participant {
    /// True if this participant will play when the game starts.
    pub fn is_going(&self) -> bool {
        self.status == ParticipantStatus::Going
    }
}

/// RSVP state for a participant.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// Invited but has not responded.
    Pending,

    /// Confirmed attendance; included in the turn order at game start.
    Going,

    /// Declined; never included in play.
    Declined,
}
