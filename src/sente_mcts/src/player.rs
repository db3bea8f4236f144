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

//! The search orchestrator (§4.1): a dispatcher thread feeds a
//! `ThreadPool` of search workers, each running one `search::run_descent`
//! at a time, while the public API below mutates the tree only inside a
//! pause-drain-mutate-resume section so no worker ever observes a
//! half-updated root (§5 "Resource discipline").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use sente_go::{Board, Color, Rule};
use sente_infer::Processor;
use sente_utils::config;

use crate::node::{position_index, ChildPolicy, Node, SearchOptions};
use crate::pool::{NodeId, NodePool};
use crate::search::run_descent;
use crate::thread_pool::ThreadPool;

/// One entry of `getCandidates`/`getPass`/`getRandom` (§4.1).
#[derive(Clone, Debug)]
pub struct Candidate {
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub visits: usize,
    pub playouts: usize,
    pub policy: f32,
    pub value: f32,
    pub variations: Vec<(i32, i32)>
}

/// Settings a caller passes to `startEvaluation` (§4.1, §4.3
/// "Root-only settings").
#[derive(Clone, Copy, Debug)]
pub struct PlayerConfig {
    pub equally: bool,
    pub use_ucb1: bool,
    pub width: usize,
    pub temperature: f32,
    pub noise: f32,
    pub eval_leaf_only: bool
}

impl Default for PlayerConfig {
    fn default() -> PlayerConfig {
        PlayerConfig {
            equally: false,
            use_ucb1: *config::USE_UCB1,
            width: 0,
            temperature: *config::TEMPERATURE,
            noise: *config::RANDOMNESS,
            eval_leaf_only: *config::EVAL_LEAF_ONLY
        }
    }
}

impl From<PlayerConfig> for SearchOptions {
    fn from(cfg: PlayerConfig) -> SearchOptions {
        SearchOptions {
            equally: cfg.equally,
            use_ucb1: cfg.use_ucb1,
            width: cfg.width,
            temperature: cfg.temperature,
            noise: cfg.noise,
            eval_leaf_only: cfg.eval_leaf_only
        }
    }
}

/// The flags and counters the dispatcher and every public API method read
/// or write, all behind one mutex (§5 "Player: ... guarded by Player
/// mutex").
struct ControlState {
    paused: bool,
    stopped: bool,
    terminated: bool,
    runnings: usize,
    search_visits: usize,
    search_playouts: usize
}

/// Orchestrates a search over a single game (§4.1, §4.4). Owns the
/// `NodePool`, the current root, and (once `startEvaluation` is first
/// called) the dispatcher thread that keeps the worker pool fed while
/// `!stopped && !paused`.
pub struct Player {
    pool: Arc<NodePool>,
    processor: Arc<Processor>,
    workers: Arc<ThreadPool>,
    root: Arc<Mutex<NodeId>>,
    board_width: usize,
    board_height: usize,
    rule: Rule,
    komi: f32,
    superko: bool,

    state: Arc<Mutex<ControlState>>,
    condvar: Arc<Condvar>,
    cfg: Arc<Mutex<PlayerConfig>>,
    dispatcher_spawned: AtomicBool,
    pool_size: usize
}

impl Player {
    pub fn new(processor: Arc<Processor>, board_width: usize, board_height: usize, rule: Rule, komi: f32, superko: bool) -> Player {
        let pool = Arc::new(NodePool::new());
        let board = Board::new(board_width, board_height, rule, komi, superko);
        let root = pool.insert(Node::new_root(board));
        let pool_size = (*config::NUM_THREADS).max(1);

        Player {
            pool,
            processor,
            workers: Arc::new(ThreadPool::new(pool_size)),
            root: Arc::new(Mutex::new(root)),
            board_width,
            board_height,
            rule,
            komi,
            superko,
            state: Arc::new(Mutex::new(ControlState {
                paused: true,
                stopped: true,
                terminated: false,
                runnings: 0,
                search_visits: 0,
                search_playouts: 0
            })),
            condvar: Arc::new(Condvar::new()),
            cfg: Arc::new(Mutex::new(PlayerConfig::default())),
            dispatcher_spawned: AtomicBool::new(false),
            pool_size
        }
    }

    pub fn root_id(&self) -> NodeId {
        *self.root.lock().unwrap()
    }

    pub fn root_node(&self) -> Arc<Node> {
        self.pool.get(self.root_id())
    }

    pub fn search_visits(&self) -> usize {
        self.state.lock().unwrap().search_visits
    }

    pub fn search_playouts(&self) -> usize {
        self.state.lock().unwrap().search_playouts
    }

    /// `initialize()` (§4.1): drop the current subtree, start a fresh
    /// empty-board root, keep configuration.
    pub fn initialize(&self) {
        self.pause_drain(|| {
            let old_root = *self.root.lock().unwrap();
            let board = Board::new(self.board_width, self.board_height, self.rule, self.komi, self.superko);
            let new_root = self.pool.insert(Node::new_root(board));

            *self.root.lock().unwrap() = new_root;
            self.pool.release_subtree(old_root, None);
        });
    }

    /// `play(x, y) -> captured` (§4.1): descend to, or materialize, the
    /// child for this move and make it the new root. Returns `-1` without
    /// mutating anything if the move is illegal.
    pub fn play(&self, x: i32, y: i32) -> i32 {
        let mut result = -1;

        self.pause_drain(|| {
            let old_root = *self.root.lock().unwrap();
            let root_node = self.pool.get(old_root);
            let pos = position_index(self.board_width, x, y);
            let color = -root_node.color();

            let new_root = if let Some(existing) = root_node.child_by_position(pos) {
                result = self.pool.get(existing).captured();
                Some(existing)
            } else {
                let mut board = root_node.board().clone();
                let captured = board.play(x, y, color);

                if captured < 0 {
                    None
                } else {
                    result = captured;
                    Some(self.pool.insert(Node::new_child(board, x, y, color, captured, 0.0)))
                }
            };

            if let Some(new_root) = new_root {
                *self.root.lock().unwrap() = new_root;
                self.pool.release_subtree(old_root, Some(new_root));
            }
        });

        result
    }

    /// `getPass() -> [Candidate]` (§4.1): a synthetic pass candidate with
    /// the current root's value.
    pub fn get_pass(&self) -> Vec<Candidate> {
        let root = self.root_node();
        vec![Candidate {
            x: -1, y: -1,
            color: -root.color(),
            visits: 0, playouts: 0,
            policy: 0.0,
            value: root.mean_value(),
            variations: vec![(-1, -1)]
        }]
    }

    /// `getRandom(temperature) -> [Candidate]` (§4.1): samples one legal
    /// move from the root's raw policy distribution raised to
    /// `1 / max(temperature, 0.1)`. Never runs search.
    pub fn get_random(&self, temperature: f32) -> Vec<Candidate> {
        let root = self.root_node();
        let policies = root.raw_policies();

        if policies.is_empty() {
            return self.get_pass();
        }

        let power = 1.0 / temperature.max(0.1);
        let weights: Vec<f32> = policies.iter().map(|p| p.prior.max(1e-9).powf(power)).collect();
        let total: f32 = weights.iter().sum();

        let mut rng = SmallRng::from_entropy();
        let mut pick = rng.gen::<f32>() * total;
        let mut chosen: ChildPolicy = policies[policies.len() - 1];

        for (policy, weight) in policies.iter().zip(weights.iter()) {
            if pick <= *weight {
                chosen = *policy;
                break;
            }
            pick -= *weight;
        }

        vec![Candidate {
            x: chosen.x, y: chosen.y,
            color: -root.color(),
            visits: 0, playouts: 0,
            policy: chosen.prior,
            value: root.mean_value(),
            variations: vec![(chosen.x, chosen.y)]
        }]
    }

    /// `startEvaluation(...)` (§4.1): switch search mode and unpause.
    /// `searchVisits`/`searchPlayouts` seed from the current root so
    /// pondering carries over across calls.
    pub fn start_evaluation(&self, cfg: PlayerConfig) {
        self.ensure_dispatcher();

        self.pause_drain(|| {
            *self.cfg.lock().unwrap() = cfg;

            let root = self.root_node();
            let mut state = self.state.lock().unwrap();
            state.search_visits = root.visits();
            state.search_playouts = root.playouts();
            state.stopped = false;
        });
    }

    /// `waitEvaluation(targetVisits, targetPlayouts, timelimitSec, stop)`
    /// (§4.1): blocks until both counters reach their targets or the
    /// timelimit elapses, then optionally stops the search.
    pub fn wait_evaluation(&self, target_visits: usize, target_playouts: usize, timelimit_sec: f32, stop: bool) {
        let deadline = Instant::now() + Duration::from_secs_f32(timelimit_sec.max(0.0));

        let mut state = self.state.lock().unwrap();
        loop {
            if state.search_visits >= target_visits && state.search_playouts >= target_playouts {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            let (guard, timeout) = self.condvar.wait_timeout(state, deadline - now).unwrap();
            state = guard;
            if timeout.timed_out() {
                break;
            }
        }
        drop(state);

        if stop {
            self.state.lock().unwrap().stopped = true;
            self.condvar.notify_all();
        }
    }

    /// `getCandidates() -> [Candidate]` (§4.1): the root's children with
    /// their statistics, or (if the root has none yet) a single
    /// policy-network best move.
    pub fn get_candidates(&self) -> Vec<Candidate> {
        let root = self.root_node();
        let children = root.children();

        if children.is_empty() {
            return self.best_policy_candidate(&root);
        }

        let mut candidates: Vec<Candidate> = children.iter().map(|&(_, id)| {
            let child = self.pool.get(id);
            let (x, y) = child.xy();
            Candidate {
                x, y,
                color: child.color(),
                visits: child.visits(),
                playouts: child.playouts(),
                policy: child.policy_for(),
                value: child.mean_value(),
                variations: child.variations(&self.pool)
            }
        }).collect();

        candidates.sort_by(|a, b| b.visits.cmp(&a.visits));
        candidates
    }

    fn best_policy_candidate(&self, root: &Node) -> Vec<Candidate> {
        let policies = root.raw_policies();

        match policies.iter().max_by(|a, b| a.prior.partial_cmp(&b.prior).unwrap()) {
            Some(best) => vec![Candidate {
                x: best.x, y: best.y,
                color: -root.color(),
                visits: 0, playouts: 0,
                policy: best.prior,
                value: root.mean_value(),
                variations: vec![(best.x, best.y)]
            }],
            None => self.get_pass()
        }
    }

    /// Blocks the calling thread until no worker is mid-descent, runs
    /// `body` with exclusive access to the tree, then resumes search
    /// (§4.1 "pause-drain-mutate-resume").
    fn pause_drain<F: FnOnce()>(&self, body: F) {
        let mut state = self.state.lock().unwrap();
        state.paused = true;
        while state.runnings > 0 {
            state = self.condvar.wait(state).unwrap();
        }
        drop(state);

        body();

        self.state.lock().unwrap().paused = false;
        self.condvar.notify_all();
    }

    /// Spawns the long-lived dispatcher thread the first time search is
    /// requested (§4.1 "A long-lived controller thread"). A no-op on
    /// every call after the first.
    fn ensure_dispatcher(&self) {
        if self.dispatcher_spawned.swap(true, Ordering::SeqCst) {
            return;
        }

        let pool = self.pool.clone();
        let processor = self.processor.clone();
        let workers = self.workers.clone();
        let state = self.state.clone();
        let condvar = self.condvar.clone();
        let root = self.root.clone();
        let cfg = self.cfg.clone();
        let pool_size = self.pool_size;

        std::thread::spawn(move || {
            let mut rng = SmallRng::from_entropy();

            loop {
                let mut guard = state.lock().unwrap();
                loop {
                    if guard.terminated {
                        return;
                    }
                    if !guard.stopped && !guard.paused && guard.runnings < pool_size {
                        break;
                    }
                    guard = condvar.wait(guard).unwrap();
                }

                guard.runnings += 1;
                guard.search_visits += 1;
                drop(guard);

                let pool = pool.clone();
                let processor = processor.clone();
                let state = state.clone();
                let condvar = condvar.clone();
                let root_id = *root.lock().unwrap();
                let opts: SearchOptions = (*cfg.lock().unwrap()).into();
                let mut task_rng = SmallRng::from_seed(rng.gen());

                workers.submit(move || {
                    // one descent always contributes exactly one playout at
                    // the root, once it reaches a leaf (§4.3 "First-visit
                    // and leaf handling").
                    run_descent(&pool, &processor, root_id, &mut task_rng, opts);

                    let mut state = state.lock().unwrap();
                    state.runnings -= 1;
                    state.search_playouts += 1;
                    drop(state);
                    condvar.notify_all();
                });
            }
        });
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.terminated = true;
        state.stopped = true;
        drop(state);
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sente_nn::testing::UniformPredictor;

    fn player(width: usize, height: usize) -> Player {
        let predictors: Vec<Arc<dyn sente_nn::Predictor>> =
            vec![Arc::new(UniformPredictor::new(sente_go::features::MODEL_INPUT_SIZE, sente_go::features::MODEL_OUTPUT_SIZE, 0.2))];
        let processor = Arc::new(Processor::new(predictors, 8).unwrap());
        Player::new(processor, width, height, Rule::Japanese, 7.5, false)
    }

    #[test]
    fn initialize_then_get_candidates_returns_one_policy_move() {
        let player = player(5, 5);
        player.initialize();

        let candidates = player.get_candidates();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn play_materializes_a_child_and_returns_non_negative_captures() {
        let player = player(5, 5);
        let captured = player.play(2, 2);

        assert!(captured >= 0);
        assert_eq!(player.root_node().xy(), (2, 2));
    }

    #[test]
    fn play_rejects_an_illegal_move_without_mutating_the_root() {
        let player = player(5, 5);
        player.play(0, 0);
        let before = player.root_id();

        let result = player.play(0, 0);
        assert_eq!(result, -1);
        assert_eq!(player.root_id(), before);
        assert_eq!(player.root_node().xy(), (0, 0));
    }

    #[test]
    fn candidates_after_a_move_belong_to_the_opposite_color() {
        let player = player(5, 5);
        player.play(2, 2);

        let candidates = player.get_candidates();
        for candidate in candidates {
            assert_eq!(candidate.color, Color::White);
        }
    }

    #[test]
    fn get_pass_reports_the_root_value() {
        let player = player(5, 5);
        let pass = player.get_pass();

        assert_eq!(pass.len(), 1);
        assert_eq!(pass[0].x, -1);
        assert_eq!(pass[0].y, -1);
    }

    #[test]
    fn wait_evaluation_with_a_short_timelimit_returns_promptly() {
        let player = player(5, 5);
        player.start_evaluation(PlayerConfig::default());

        let started = Instant::now();
        player.wait_evaluation(1_000_000_000, 1_000_000_000, 0.2, true);

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn initialize_after_stopping_completes_without_blocking() {
        let player = player(5, 5);
        player.start_evaluation(PlayerConfig::default());
        player.wait_evaluation(1_000_000_000, 1_000_000_000, 0.1, true);

        let started = Instant::now();
        player.initialize();

        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
