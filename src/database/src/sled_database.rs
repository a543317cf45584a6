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
use std::path::Path;

use async_trait::async_trait;
use color_eyre::eyre::Context;
use color_eyre::Result;
use data::core::primitives::{GiftId, PartyId, StateVersion, UserId};
use data::gifts::gift::Gift;
use data::parties::participant::Participant;
use data::parties::party::Party;
use data::parties::pending_invite::PendingInvite;
use serde::de::DeserializeOwned;
use serde_json::{de, ser};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Event, Subscriber, Tree};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::database::{Database, ExternalMutation, WriteOutcome};

/// Production [Database] implementation over an embedded sled store.
///
/// Tree layout: `parties` keyed by party id; `participants`, `gifts` and
/// `invites` keyed by `<party id>/<item id>` so that per-party subscriptions
/// are a single prefix watch.
pub struct SledDatabase {
    db: Db,
}

impl SledDatabase {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { db: sled::open(path).expect("Unable to open database") }
    }

    fn parties(&self) -> Result<Tree> {
        self.db.open_tree("parties").with_context(|| "Error opening the 'parties' tree")
    }

    fn participants(&self) -> Result<Tree> {
        self.db.open_tree("participants").with_context(|| "Error opening the 'participants' tree")
    }

    fn gifts(&self) -> Result<Tree> {
        self.db.open_tree("gifts").with_context(|| "Error opening the 'gifts' tree")
    }

    fn invites(&self) -> Result<Tree> {
        self.db.open_tree("invites").with_context(|| "Error opening the 'invites' tree")
    }

    fn scan_scoped<T: DeserializeOwned>(&self, tree: &Tree, id: &PartyId) -> Result<Vec<T>> {
        let mut values = vec![];
        for entry in tree.scan_prefix(scope_prefix(id)) {
            let (_, value) = entry?;
            values.push(
                de::from_slice::<T>(&value)
                    .with_context(|| format!("Error deserializing record for party {id}"))?,
            );
        }
        Ok(values)
    }
}

#[async_trait]
impl Database for SledDatabase {
    async fn fetch_party(&self, id: &PartyId) -> Result<Option<Party>> {
        self.parties()?
            .get(id.0.as_bytes())
            .with_context(|| format!("Error fetching party {id}"))?
            .map(|slice| {
                de::from_slice::<Party>(&slice)
                    .with_context(|| format!("Error deserializing party {id}"))
            })
            .transpose()
    }

    async fn write_party(
        &self,
        party: &Party,
        expected: Option<StateVersion>,
    ) -> Result<WriteOutcome> {
        let tree = self.parties()?;
        let key = party.id.0.clone().into_bytes();
        let bytes = ser::to_vec(party)
            .with_context(|| format!("Error serializing party {}", party.id))?;

        let outcome = tree.transaction(|tx| {
            let stored = match tx.get(&key)? {
                Some(slice) => Some(
                    de::from_slice::<Party>(&slice)
                        .map_err(ConflictableTransactionError::Abort)?,
                ),
                None => None,
            };
            if stored.map(|p| p.state_version) != expected {
                return Ok(WriteOutcome::Conflict);
            }
            tx.insert(key.as_slice(), bytes.as_slice())?;
            Ok(WriteOutcome::Written)
        });

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(TransactionError::Abort(err)) => {
                return Err(err).with_context(|| format!("Corrupt party document {}", party.id))
            }
            Err(TransactionError::Storage(err)) => {
                return Err(err).with_context(|| format!("Error writing party {}", party.id))
            }
        };
        self.db.flush_async().await?;
        Ok(outcome)
    }

    async fn fetch_participants(&self, id: &PartyId) -> Result<Vec<Participant>> {
        self.scan_scoped(&self.participants()?, id)
    }

    async fn write_participant(&self, participant: &Participant) -> Result<()> {
        self.participants()?.insert(
            scoped_key(&participant.party_id, &participant.user_id.0),
            ser::to_vec(participant).with_context(|| {
                format!("Error serializing participant {}", participant.user_id)
            })?,
        )?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn fetch_gifts(&self, id: &PartyId) -> Result<Vec<Gift>> {
        self.scan_scoped(&self.gifts()?, id)
    }

    async fn write_gift(&self, gift: &Gift) -> Result<()> {
        self.gifts()?.insert(
            scoped_key(&gift.party_id, &gift.id.0),
            ser::to_vec(gift).with_context(|| format!("Error serializing gift {}", gift.id))?,
        )?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn fetch_pending_invites(&self, id: &PartyId) -> Result<Vec<PendingInvite>> {
        self.scan_scoped(&self.invites()?, id)
    }

    async fn finalize_gift_winners(
        &self,
        id: &PartyId,
        winners: &BTreeMap<GiftId, UserId>,
    ) -> Result<()> {
        let mut gifts = self.fetch_gifts(id).await?;
        for (gift_id, winner_id) in winners {
            if let Some(gift) = gifts.iter_mut().find(|g| g.id == *gift_id) {
                gift.winner_id = Some(winner_id.clone());
                self.write_gift(gift).await?;
            } else {
                warn!(%id, %gift_id, "Winner back-write for unknown gift");
            }
        }
        Ok(())
    }

    async fn clear_gift_winners(&self, id: &PartyId) -> Result<()> {
        for mut gift in self.fetch_gifts(id).await? {
            if gift.winner_id.take().is_some() {
                self.write_gift(&gift).await?;
            }
        }
        Ok(())
    }

    fn subscribe_external(&self, id: &PartyId) -> UnboundedReceiver<ExternalMutation> {
        let (tx, rx) = mpsc::unbounded_channel();
        let prefix = scope_prefix(id);

        if let Ok(tree) = self.participants() {
            forward_events(tree.watch_prefix(&prefix), prefix.len(), tx.clone(), |value| {
                de::from_slice::<Participant>(value).ok().map(ExternalMutation::Participant)
            }, |item_id| Some(ExternalMutation::ParticipantRemoved(UserId::new(item_id))));
        }
        if let Ok(tree) = self.gifts() {
            forward_events(tree.watch_prefix(&prefix), prefix.len(), tx.clone(), |value| {
                de::from_slice::<Gift>(value).ok().map(ExternalMutation::Gift)
            }, |item_id| Some(ExternalMutation::GiftRemoved(GiftId::new(item_id))));
        }
        if let Ok(tree) = self.invites() {
            forward_events(tree.watch_prefix(&prefix), prefix.len(), tx, |value| {
                de::from_slice::<PendingInvite>(value).ok().map(ExternalMutation::Invite)
            }, |_| None);
        }
        rx
    }
}

/// Pumps one sled prefix subscription into the shared mutation channel until
/// either side closes.
fn forward_events(
    mut subscriber: Subscriber,
    prefix_len: usize,
    tx: UnboundedSender<ExternalMutation>,
    on_insert: impl Fn(&[u8]) -> Option<ExternalMutation> + Send + 'static,
    on_remove: impl Fn(String) -> Option<ExternalMutation> + Send + 'static,
) {
    tokio::spawn(async move {
        while let Some(event) = (&mut subscriber).await {
            let mutation = match &event {
                Event::Insert { value, .. } => on_insert(value),
                Event::Remove { key } => String::from_utf8(key[prefix_len..].to_vec())
                    .ok()
                    .and_then(&on_remove),
            };
            let Some(mutation) = mutation else {
                warn!("Ignoring undecodable store event");
                continue;
            };
            if tx.send(mutation).is_err() {
                break;
            }
        }
    });
}

fn scoped_key(party: &PartyId, item: &str) -> Vec<u8> {
    format!("{party}/{item}").into_bytes()
}

fn scope_prefix(party: &PartyId) -> Vec<u8> {
    format!("{party}/").into_bytes()
}
