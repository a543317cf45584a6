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

/// Immediately returns from the enclosing function with the provided error
/// value.
///
/// Equivalent in spirit to color_eyre::bail, but for typed domain errors: the
/// expression is converted with [From] into the function's error type.
#[macro_export]
macro_rules! fail {
    ($err:expr $(,)?) => {
        return std::result::Result::Err(std::convert::From::from($err))
    };
}

/// Returns with the provided error value if the predicate evaluates to false.
///
/// Equivalent in spirit to color_eyre::ensure, but for typed domain errors.
#[macro_export]
macro_rules! verify {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return std::result::Result::Err(std::convert::From::from($err));
        }
    };
}
