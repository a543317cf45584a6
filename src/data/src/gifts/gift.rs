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

use crate::core::primitives::{GiftId, PartyId, Timestamp, UserId};

/// A gift submitted to a party.
///
/// Gift metadata is supplied by external collaborators (URL scraping, manual
/// entry) and is opaque to the turn engine. The core mutates a gift record in
/// exactly one way: assigning `winner_id` when the game ends (and clearing it
/// again on an admin reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: GiftId,
    pub party_id: PartyId,
    pub submitter_id: UserId,
    pub metadata: GiftMetadata,
    pub submitted_at: Timestamp,

    /// Final owner, written once at game end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<UserId>,
}

/// Display metadata for a gift. Never interpreted by the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}
