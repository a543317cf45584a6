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

use crate::actions::party_action::PartyAction;
use crate::core::primitives::GiftId;

/// A state-mutating action proposed against a party's turn engine.
///
/// Every command is validated by the rule engine against the current state
/// before anything is persisted or broadcast; the actor id of the issuer
/// travels separately in the command envelope.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameCommand {
    /// Transition the party from lobby to active play. Admin only.
    ///
    /// The optional seed fixes the turn-order shuffle; when absent the current
    /// instant seeds it.
    StartGame { seed: Option<u64> },

    /// Open the identified wrapped gift.
    Pick { gift_id: GiftId },

    /// Take the identified opened gift from its current owner.
    Steal { gift_id: GiftId },

    /// Decline to act and release the turn. Only legal for a player who
    /// already holds a gift.
    EndTurn,

    /// Immediately end the game, freezing current ownership. Admin only.
    EndGame,
}

impl From<GameCommand> for PartyAction {
    fn from(value: GameCommand) -> Self {
        PartyAction::Game(value)
    }
}
