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

//! The rule engine: the only place in the repository where game rules live.
//!
//! Every function here is pure over its arguments. Callers own the state
//! snapshot being mutated and commit it only after a successful result; no
//! I/O happens in this crate and the clock enters solely as a `now`
//! parameter.

pub mod action_handlers;
pub mod legality;
pub mod mutations;
pub mod queries;
pub mod replay;
