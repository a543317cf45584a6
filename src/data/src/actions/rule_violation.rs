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

use enum_kinds::EnumKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::primitives::{GiftId, UserId};

/// A command rejected by the rule engine.
///
/// Violations are reported only to the originating session; state is never
/// mutated and nothing is broadcast. [RuleViolationKind] supplies the stable
/// machine-readable code carried in wire errors.
#[derive(Debug, Clone, Eq, PartialEq, Error, Serialize, Deserialize, EnumKind)]
#[enum_kind(RuleViolationKind, derive(Serialize, Deserialize))]
#[serde(rename_all = "camelCase")]
pub enum RuleViolation {
    #[error("it is not {0}'s turn to act")]
    NotYourTurn(UserId),

    #[error("the party is not accepting this command in its current status")]
    GameNotActive,

    #[error("gift {0} was not found")]
    GiftNotFound(GiftId),

    #[error("gift {0} cannot be stolen")]
    GiftNotStealable(GiftId),

    #[error("gift {0} cannot be stolen straight back by the player it was just taken from")]
    UTurnForbidden(GiftId),

    #[error("{0} already holds a gift")]
    AlreadyHoldsGift(UserId),

    #[error("{0} holds no gift and must pick or steal")]
    SkipRequiresGift(UserId),

    #[error("no wrapped gifts remain")]
    NoWrappedGifts,

    #[error("{0} is not authorized to issue this command")]
    Unauthorized(UserId),

    #[error("at least 2 going participants are required, found {going}")]
    InsufficientPlayers { going: usize },

    #[error("every going participant needs a gift: {players} players, {gifts} have one")]
    InsufficientGifts { players: usize, gifts: usize },
}

impl RuleViolation {
    /// Returns the [RuleViolationKind] for this violation.
    pub fn kind(&self) -> RuleViolationKind {
        self.into()
    }
}

impl RuleViolationKind {
    /// Stable wire code for this violation kind.
    pub fn code(self) -> &'static str {
        match self {
            RuleViolationKind::NotYourTurn => "NotYourTurn",
            RuleViolationKind::GameNotActive => "GameNotActive",
            RuleViolationKind::GiftNotFound => "GiftNotFound",
            RuleViolationKind::GiftNotStealable => "GiftNotStealable",
            RuleViolationKind::UTurnForbidden => "UTurnForbidden",
            RuleViolationKind::AlreadyHoldsGift => "AlreadyHoldsGift",
            RuleViolationKind::SkipRequiresGift => "SkipRequiresGift",
            RuleViolationKind::NoWrappedGifts => "NoWrappedGifts",
            RuleViolationKind::Unauthorized => "Unauthorized",
            RuleViolationKind::InsufficientPlayers => "InsufficientPlayers",
            RuleViolationKind::InsufficientGifts => "InsufficientGifts",
        }
    }
}
