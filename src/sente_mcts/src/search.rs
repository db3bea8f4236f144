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

//! A single descent through the tree, from a root down to a leaf and back
//! (§4.3 "Descent"). This is the unit of work a `Player`'s worker threads
//! repeat; `Player` itself only owns scheduling and lifecycle.

use rand::rngs::SmallRng;

use sente_infer::Processor;

use crate::node::{NodeId, SearchOptions, StepOutcome};
use crate::pool::NodePool;

/// Runs one playout from `root`, returns the leaf value it found (the
/// caller doesn't need this beyond tests -- production callers only care
/// that the tree's statistics were updated).
pub fn run_descent(pool: &NodePool, processor: &Processor, root: NodeId, rng: &mut SmallRng, opts: SearchOptions) -> f32 {
    let mut path = vec![root];
    let mut current = root;

    loop {
        let node = pool.get(current);

        match node.step(pool, processor, rng, opts) {
            StepOutcome::Leaf { value } => {
                backprop(pool, &path, value);
                add_playouts(pool, &path);
                return value;
            }
            StepOutcome::Descend { next, cancel } => {
                if cancel {
                    cancel_ancestors(pool, &path, node.evaluator_value());
                }
                path.push(next);
                current = next;
            }
        }
    }
}

/// Adds `value` to every node on `path`, root included (§4.3 "the same
/// absolute-frame value is added to every ancestor, the sign of the child
/// move is only applied when comparing siblings").
fn backprop(pool: &NodePool, path: &[NodeId], value: f32) {
    for &id in path {
        pool.get(id).add_value(value);
    }
}

/// Counts this playout at every node on the descent path -- a node's
/// `playouts` is the number of leaf evaluations reached anywhere below it
/// (§3 "Node"), not just at the root.
fn add_playouts(pool: &NodePool, path: &[NodeId]) {
    for &id in path {
        pool.get(id).add_playout();
    }
}

/// Undoes an earlier `add_value` contribution on every node strictly
/// above the branching parent -- `path` still ends at that parent, so
/// everything but the last entry is an ancestor of it (§4.3
/// "evalLeafOnly", §9 open question 4).
fn cancel_ancestors(pool: &NodePool, path: &[NodeId], value: f32) {
    if path.is_empty() {
        return;
    }

    for &id in &path[..path.len() - 1] {
        pool.get(id).cancel_value(value);
    }
}
