// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rules of Go: stone placement, group/liberty tracking, ko, ladders,
//! territory/owner scoring, and the fixed-shape feature tensor the model
//! is evaluated on.

mod board;
mod color;
mod history;
mod pattern;
mod ren;
mod rule;

pub mod features;

pub use self::board::Board;
pub use self::color::Color;
pub use self::history::History;
pub use self::pattern::Pattern;
pub use self::ren::Ren;
pub use self::rule::Rule;
