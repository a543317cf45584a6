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

use std::collections::BTreeMap;

use async_trait::async_trait;
use color_eyre::Result;
use data::core::primitives::{GiftId, PartyId, StateVersion, UserId};
use data::gifts::gift::Gift;
use data::parties::participant::Participant;
use data::parties::party::Party;
use data::parties::pending_invite::PendingInvite;
use tokio::sync::mpsc::UnboundedReceiver;

/// Result of a compare-and-set party write.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteOutcome {
    /// The stored version matched and the new snapshot was written.
    Written,

    /// The stored version did not match `expected`; nothing was written. The
    /// caller should reload and retry within its budget.
    Conflict,
}

/// A mutation of a party's externally-owned collections (lobby signups,
/// invite flows, gift submissions) observed through a store subscription.
///
/// The party actor receives these through its mailbox, serialized with client
/// commands, and uses them only to keep its roster cache current.
#[derive(Debug, Clone)]
pub enum ExternalMutation {
    Participant(Participant),
    ParticipantRemoved(UserId),
    Gift(Gift),
    GiftRemoved(GiftId),
    Invite(PendingInvite),
}

/// Narrow interface over the persistence backend.
///
/// The party document is written exclusively through [Self::write_party]'s
/// version CAS; everything else is either read-only from the core's
/// perspective or the narrow winner back-write at game end.
#[async_trait]
pub trait Database: Send + Sync {
    async fn fetch_party(&self, id: &PartyId) -> Result<Option<Party>>;

    /// Writes the party snapshot iff the stored `state_version` equals
    /// `expected` (`None` = the document must not exist yet).
    async fn write_party(
        &self,
        party: &Party,
        expected: Option<StateVersion>,
    ) -> Result<WriteOutcome>;

    async fn fetch_participants(&self, id: &PartyId) -> Result<Vec<Participant>>;

    async fn write_participant(&self, participant: &Participant) -> Result<()>;

    async fn fetch_gifts(&self, id: &PartyId) -> Result<Vec<Gift>>;

    async fn write_gift(&self, gift: &Gift) -> Result<()>;

    async fn fetch_pending_invites(&self, id: &PartyId) -> Result<Vec<PendingInvite>>;

    /// Back-writes the final owner onto each participating gift at game end.
    async fn finalize_gift_winners(
        &self,
        id: &PartyId,
        winners: &BTreeMap<GiftId, UserId>,
    ) -> Result<()>;

    /// Clears any winner assignments, used when the admin resets a game.
    async fn clear_gift_winners(&self, id: &PartyId) -> Result<()>;

    /// Streams mutations of the party's participant/gift/invite collections
    /// that originate outside the party actor.
    fn subscribe_external(&self, id: &PartyId) -> UnboundedReceiver<ExternalMutation>;
}
