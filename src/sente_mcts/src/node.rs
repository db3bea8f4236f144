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

//! The search-tree node (§4.3). A `Node` owns a `Board`, an `Evaluator`,
//! and the statistics the selection/expansion rule reads and writes.
//! Structural mutation (children, the policy list, the expansion queue)
//! and statistical mutation (the value accumulator, the playout counter)
//! are guarded by two separate `RwLock`s so that many workers can
//! backpropagate concurrently while a few are expanding or reading
//! children elsewhere in the tree (§5 "Two locks per Node").

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use concurrent_queue::ConcurrentQueue;
use ordered_float::OrderedFloat;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Gumbel};

use sente_go::{Board, Color};
use sente_infer::Processor;

use crate::evaluator::Evaluator;
use crate::pool::{NodeId, NodePool};

/// Flattened board index used as a child map key; `PASS_INDEX` stands in
/// for the synthetic pass move, which has no `(x, y)` of its own.
pub const PASS_INDEX: usize = usize::MAX;

pub fn position_index(width: usize, x: i32, y: i32) -> usize {
    if x < 0 || y < 0 {
        PASS_INDEX
    } else {
        (y as usize) * width + (x as usize)
    }
}

/// A transient per-child policy record (§3 "Policy"): the prior the
/// evaluator assigned to this candidate move, and how many times the
/// parent's selection rule has chosen it for expansion so far.
#[derive(Clone, Copy, Debug)]
pub struct ChildPolicy {
    pub x: i32,
    pub y: i32,
    pub prior: f32,
    pub visits_from_parent: usize
}

/// Root-only selection/expansion settings (§4.3 "Root-only settings").
/// Deeper in a descent these always revert to their defaults.
#[derive(Clone, Copy, Debug)]
pub struct SearchOptions {
    pub equally: bool,
    pub use_ucb1: bool,
    pub width: usize,
    pub temperature: f32,
    pub noise: f32,
    pub eval_leaf_only: bool
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions { equally: false, use_ucb1: false, width: 0, temperature: 1.0, noise: 0.0, eval_leaf_only: false }
    }
}

/// What a single call to `Node::step` asks the descending worker to do
/// next (§4.3 "First-visit and leaf handling").
pub enum StepOutcome {
    /// This node was a leaf (first visit, or no legal policies at all).
    /// `value` is backpropagated to every node on the path.
    Leaf { value: f32 },

    /// Descend into `next`. `cancel` is set when `eval_leaf_only` is on
    /// and this is the parent's first child being born -- the caller
    /// should then cancel the value it previously added to every
    /// ancestor above (not including) the current node.
    Descend { next: NodeId, cancel: bool }
}

struct Structural {
    children: HashMap<usize, NodeId>,
    policies: Vec<ChildPolicy>,
    queued: HashSet<usize>
}

struct Stats {
    value_sum: f64,
    count: usize,
    playouts: usize
}

pub struct Node {
    board: Board,
    evaluator: RwLock<Evaluator>,

    x: i32,
    y: i32,
    color: Color,
    captured: i32,
    prior: f32,

    visits: AtomicUsize,
    structural: RwLock<Structural>,
    expansion_queue: ConcurrentQueue<usize>,
    stats: RwLock<Stats>
}

impl Node {
    /// The root has no stone of its own; its color is fixed at `White`
    /// so that the first candidate move (Black) is its child (§3
    /// invariants).
    pub fn new_root(board: Board) -> Node {
        Node::new(board, -1, -1, Color::White, 0, 1.0)
    }

    pub fn new_child(board: Board, x: i32, y: i32, color: Color, captured: i32, prior: f32) -> Node {
        Node::new(board, x, y, color, captured, prior)
    }

    fn new(board: Board, x: i32, y: i32, color: Color, captured: i32, prior: f32) -> Node {
        Node {
            board,
            evaluator: RwLock::new(Evaluator::new()),
            x, y, color, captured, prior,
            visits: AtomicUsize::new(0),
            structural: RwLock::new(Structural { children: HashMap::new(), policies: Vec::new(), queued: HashSet::new() }),
            expansion_queue: ConcurrentQueue::unbounded(),
            stats: RwLock::new(Stats { value_sum: 0.0, count: 0, playouts: 0 })
        }
    }

    pub fn board(&self) -> &Board { &self.board }
    pub fn xy(&self) -> (i32, i32) { (self.x, self.y) }
    pub fn color(&self) -> Color { self.color }
    pub fn captured(&self) -> i32 { self.captured }
    pub fn prior(&self) -> f32 { self.prior }
    pub fn visits(&self) -> usize { self.visits.load(Ordering::SeqCst) }
    pub fn playouts(&self) -> usize { self.stats.read().unwrap().playouts }
    pub fn count(&self) -> usize { self.stats.read().unwrap().count }

    pub fn mean_value(&self) -> f32 {
        let stats = self.stats.read().unwrap();
        if stats.count == 0 { 0.0 } else { (stats.value_sum / stats.count as f64) as f32 }
    }

    /// Lower confidence bound on this node's own mean value, in the same
    /// (absolute) sign convention as `mean_value` -- never larger than it
    /// (§8 "getValueLCB of any node never exceeds its mean value").
    pub fn get_value_lcb(&self) -> f32 {
        value_lcb(self.mean_value(), self.visits())
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluator.read().unwrap().is_evaluated()
    }

    pub fn policy_for(&self) -> f32 {
        self.prior
    }

    pub fn children(&self) -> Vec<(usize, NodeId)> {
        self.structural.read().unwrap().children.iter().map(|(&k, &v)| (k, v)).collect()
    }

    pub fn child_by_position(&self, pos: usize) -> Option<NodeId> {
        self.structural.read().unwrap().children.get(&pos).copied()
    }

    /// Used by `getRandom` (§4.1): the raw, un-expanded policy list from
    /// this node's own evaluator.
    pub fn raw_policies(&self) -> Vec<ChildPolicy> {
        self.structural.read().unwrap().policies.clone()
    }

    fn ensure_evaluated(&self, processor: &Processor) {
        let mut evaluator = self.evaluator.write().unwrap();
        if !evaluator.is_evaluated() {
            let to_move = -self.color;
            evaluator.evaluate(processor, &self.board, to_move);

            let mut structural = self.structural.write().unwrap();
            structural.policies = evaluator.policies().iter()
                .map(|p| ChildPolicy { x: p.x, y: p.y, prior: p.prior, visits_from_parent: 0 })
                .collect();
        }
    }

    pub(crate) fn evaluator_value(&self) -> f32 {
        self.evaluator.read().unwrap().value()
    }

    pub fn add_value(&self, value: f32) {
        let mut stats = self.stats.write().unwrap();
        stats.value_sum += value as f64;
        stats.count += 1;
    }

    pub fn add_playout(&self) {
        self.stats.write().unwrap().playouts += 1;
    }

    /// Undoes a previously-added value contribution (§4.3, §9 open
    /// question 4). An approximation: the value subtracted is whatever
    /// the owning evaluator returns *now*, which may differ from what was
    /// added if another worker re-evaluated meanwhile -- accepted by the
    /// spec rather than strengthened with extra synchronization.
    pub fn cancel_value(&self, value: f32) {
        let mut stats = self.stats.write().unwrap();
        stats.value_sum -= value as f64;
        stats.count = stats.count.saturating_sub(1);
    }

    /// Picks the best existing child by the configured selection rule
    /// (§4.3). Returns `None` if there are no children yet.
    pub fn select_child(&self, pool: &NodePool, use_ucb1: bool) -> Option<NodeId> {
        let n = self.visits() as f64;
        let structural = self.structural.read().unwrap();

        structural.children.values().copied().max_by_key(|&child_id| {
            let child = pool.get(child_id);
            let priority = if child.count() == 0 {
                -99.0
            } else if use_ucb1 {
                ucb1_priority(n, child.visits(), child.mean_value(), child.color)
            } else {
                pucb_priority(n, child.visits(), child.mean_value(), child.color, child.prior())
            };
            OrderedFloat(priority)
        })
    }

    /// The equally-branch ordering (§4.3): prefers under-sampled,
    /// higher-valued children, breaking ties with the LCB.
    pub fn select_child_equally(&self, pool: &NodePool) -> Option<NodeId> {
        let structural = self.structural.read().unwrap();

        structural.children.values().copied().max_by_key(|&child_id| {
            let child = pool.get(child_id);
            let priority = if child.count() == 0 {
                -99.0
            } else {
                equally_priority(child.visits(), child.mean_value(), child.color)
            };
            OrderedFloat(priority)
        })
    }

    /// The chain starting at this node's own move and recursing into the
    /// most-visited child (§4.3 "Principal variation").
    pub fn variations(&self, pool: &NodePool) -> Vec<(i32, i32)> {
        let mut path = vec![self.xy()];
        let mut current_children = self.children();

        loop {
            let best = current_children.iter()
                .map(|&(_, id)| pool.get(id))
                .max_by_key(|node| node.visits());

            match best {
                None => break,
                Some(node) => {
                    path.push(node.xy());
                    current_children = node.children();
                }
            }
        }

        path
    }

    /// One selection/expansion step at this node (§4.3). `rng` supplies
    /// the Gumbel noise draws used by the expansion rule.
    pub fn step(&self, pool: &NodePool, processor: &Processor, rng: &mut SmallRng, opts: SearchOptions) -> StepOutcome {
        let visits = self.visits.fetch_add(1, Ordering::SeqCst) + 1;

        self.ensure_evaluated(processor);

        if visits == 1 {
            return StepOutcome::Leaf { value: self.evaluator_value() };
        }

        let num_policies = self.structural.read().unwrap().policies.len();
        if num_policies == 0 {
            return StepOutcome::Leaf { value: self.evaluator_value() };
        }

        self.schedule_expansion(rng, opts);

        if let Some((pos, policy)) = self.pop_expansion_candidate() {
            let first_child = self.structural.read().unwrap().children.is_empty();
            let next = self.materialize_child(pool, pos, policy);
            let cancel = opts.eval_leaf_only && first_child;

            return StepOutcome::Descend { next, cancel: cancel };
        }

        let existing = if opts.equally {
            self.select_child_equally(pool)
        } else {
            self.select_child(pool, opts.use_ucb1)
        };

        match existing {
            Some(next) => StepOutcome::Descend { next, cancel: false },
            None => StepOutcome::Leaf { value: self.evaluator_value() }
        }
    }

    /// Picks the temperature- and noise-adjusted highest-priority policy
    /// entry and enqueues it for expansion (§4.3). The already-expanded-or-
    /// in-flight count and the width cap are checked under the same write
    /// lock that reserves the slot, so two racing callers can't both pass
    /// the cap for the same unfilled width (§4.3 line 110).
    fn schedule_expansion(&self, rng: &mut SmallRng, opts: SearchOptions) {
        let win_chance = (self.mean_value() * (-self.color).as_i8() as f32) / 2.0 + 0.5;
        let temperature_power = win_chance + (1.0 / opts.temperature.max(1e-3)) * (1.0 - win_chance);

        let mut structural = self.structural.write().unwrap();

        let num_committed = structural.children.len() + structural.queued.len();
        let under_width_cap = opts.width == 0 || num_committed < opts.width;
        if num_committed >= structural.policies.len() || !under_width_cap {
            return;
        }

        let noise_scale = if structural.policies.len() <= 4 { 0.0 } else { opts.noise };
        let gumbel = Gumbel::new(0.0f32, noise_scale.max(1e-6)).expect("gumbel distribution parameters are valid");

        let num_candidates = structural.policies.len();
        let mut best: Option<(usize, i32, f32)> = None; // (index, type, adjusted priority)

        for i in 0..num_candidates {
            let (x, y, prior) = {
                let p = &structural.policies[i];
                (p.x, p.y, p.prior)
            };
            let pos = position_index(self.board.width(), x, y);
            let already_expanded = structural.children.contains_key(&pos) || structural.queued.contains(&pos);

            let g: f32 = if noise_scale > 0.0 { gumbel.sample(rng) } else { 0.0 };
            let adjusted = prior.max(1e-9).powf(temperature_power) * g.exp();
            let priority_type = if already_expanded { if opts.equally { -1 } else { 0 } } else { 1 };

            let is_better = match best {
                None => true,
                Some((_, best_type, best_value)) => (priority_type, OrderedFloat(adjusted)) > (best_type, OrderedFloat(best_value))
            };

            if is_better {
                best = Some((i, priority_type, adjusted));
            }
        }

        if let Some((index, _, _)) = best {
            let pos = position_index(self.board.width(), structural.policies[index].x, structural.policies[index].y);
            structural.policies[index].visits_from_parent += 1;

            if !structural.children.contains_key(&pos) && !structural.queued.contains(&pos) {
                structural.queued.insert(pos);
                let _ = self.expansion_queue.push(index);
            }
        }
    }

    fn pop_expansion_candidate(&self) -> Option<(usize, ChildPolicy)> {
        loop {
            let index = self.expansion_queue.pop().ok()?;
            let mut structural = self.structural.write().unwrap();
            let policy = structural.policies[index];
            let pos = position_index(self.board.width(), policy.x, policy.y);

            structural.queued.remove(&pos);
            if structural.children.contains_key(&pos) {
                continue; // another worker materialized it first
            }

            return Some((pos, policy));
        }
    }

    fn materialize_child(&self, pool: &NodePool, pos: usize, policy: ChildPolicy) -> NodeId {
        let mut child_board = self.board.clone();
        let child_color = -self.color;
        let captured = child_board.play(policy.x, policy.y, child_color);
        debug_assert!(captured >= 0, "the expansion rule only ever schedules legal policy candidates");

        let child = Node::new_child(child_board, policy.x, policy.y, child_color, captured.max(0), policy.prior);
        let id = pool.insert(child);

        self.structural.write().unwrap().children.insert(pos, id);
        id
    }
}

/// `c_puct(N) = ln((1 + N + 19652) / 19652) + 1.25` (§4.3).
pub fn c_puct(n: f64) -> f32 {
    (((1.0 + n + 19652.0) / 19652.0).ln() + 1.25) as f32
}

fn signed_q(mean_value: f32, color: Color) -> f32 {
    mean_value * color.as_i8() as f32
}

/// PUCB selection priority (§4.3).
pub fn pucb_priority(n: f64, visits_c: usize, mean_value_c: f32, color_c: Color, prior_c: f32) -> f32 {
    let q = signed_q(mean_value_c, color_c);
    q + 2.0 * c_puct(n) * prior_c * (n as f32).sqrt() / (1.0 + visits_c as f32)
}

/// UCB1 selection priority (§4.3), no prior term.
pub fn ucb1_priority(n: f64, visits_c: usize, mean_value_c: f32, color_c: Color) -> f32 {
    let q = signed_q(mean_value_c, color_c);
    q + 0.5 * ((n as f32).ln() / (visits_c as f32 + 1.0)).sqrt()
}

/// The Gumbel-root "equally" priority (§4.3): prefers under-sampled,
/// higher-valued children.
pub fn equally_priority(visits_c: usize, mean_value_c: f32, color_c: Color) -> f32 {
    let q = signed_q(mean_value_c, color_c);
    1.0 / (visits_c as f32 + 1.0 - 0.5 * q)
}

/// `mean - 1.96 * 0.5 / sqrt(visits + 1)`, always `<= mean` (§4.3, §8).
pub fn value_lcb(mean_value: f32, visits: usize) -> f32 {
    mean_value - (1.96 * 0.5) / ((visits + 1) as f32).sqrt()
}
