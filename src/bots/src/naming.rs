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

use data::core::primitives::UserId;
use data::gifts::gift::GiftMetadata;
use rand::seq::SliceRandom;

const FIRST_NAMES: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dahlia", "Elm", "Fern", "Hazel", "Ivy", "Juniper", "Laurel",
    "Maple", "Olive", "Rowan", "Sage", "Willow",
];

const GIFT_TITLES: &[&str] = &[
    "Mystery box", "Novelty mug", "Desk plant", "Puzzle cube", "Scented candle", "Board game",
    "Cozy blanket", "Gadget organizer", "Cookbook", "Travel tumbler",
];

/// Display name for a synthetic player, derived stably from its id so every
/// room member renders the same name.
pub fn display_name(id: &UserId) -> String {
    let seed: usize = id.0.bytes().map(usize::from).sum();
    let name = FIRST_NAMES[seed % FIRST_NAMES.len()];
    format!("{name} (bot)")
}

/// Placeholder metadata for the gift a synthetic player brings to the party.
pub fn placeholder_gift() -> GiftMetadata {
    let title = GIFT_TITLES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Mystery box");
    GiftMetadata { title: title.to_string(), image_url: None, link_url: None, price: None }
}
