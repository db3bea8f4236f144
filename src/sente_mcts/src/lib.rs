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

//! The parallel best-first search on top of `sente_go` boards and
//! `sente_infer` inference (§4.3, §4.4). `Evaluator` turns one board
//! position into policy priors and a value; `Node`/`NodePool` hold the
//! resulting tree; `search::run_descent` is the unit of work worker
//! threads in a `Player`'s `ThreadPool` repeat.

mod evaluator;
mod node;
mod player;
mod pool;
mod search;
mod thread_pool;

pub use self::evaluator::{Evaluator, Policy};
pub use self::node::{c_puct, position_index, ChildPolicy, Node, SearchOptions, StepOutcome, PASS_INDEX};
pub use self::player::{Candidate, Player, PlayerConfig};
pub use self::pool::{NodeId, NodePool};
pub use self::search::run_descent;
pub use self::thread_pool::ThreadPool;
