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

//! The literal end-to-end scenarios of §8.

use std::sync::Arc;

use sente_go::{features, Board, Color, Rule};
use sente_infer::Processor;
use sente_mcts::{Player, PlayerConfig};
use sente_nn::testing::UniformPredictor;
use sente_nn::Predictor;

/// Scenario 1: a uniform-policy, zero-value mock evaluator with
/// `visits=50` ends with the root's children together holding 49 visits.
#[test]
fn genmove_with_a_uniform_mock_accounts_for_every_non_root_visit() {
    let predictors: Vec<Arc<dyn Predictor>> =
        vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.0))];
    let processor = Arc::new(Processor::new(predictors, 16).unwrap());
    let player = Player::new(processor, 9, 9, Rule::Japanese, 7.5, false);

    player.initialize();
    player.start_evaluation(PlayerConfig::default());
    player.wait_evaluation(50, 50, 30.0, true);

    let root = player.root_node();
    let total_child_visits: usize = player.get_candidates().iter().map(|c| c.visits).sum();

    assert!(root.visits() >= 50);
    assert_eq!(total_child_visits, root.visits() - 1);
}

/// Scenario 2: after playing two moves, every candidate is Black and on
/// the board.
#[test]
fn candidates_after_genmove_are_the_movers_color_and_on_board() {
    let predictors: Vec<Arc<dyn Predictor>> =
        vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.0))];
    let processor = Arc::new(Processor::new(predictors, 16).unwrap());
    let player = Player::new(processor, 9, 9, Rule::Japanese, 7.5, false);

    player.play(4, 4);
    player.play(4, 5);

    for candidate in player.get_candidates() {
        assert_eq!(candidate.color, Color::Black);
        assert!(candidate.x < 0 || (0..9).contains(&candidate.x));
        assert!(candidate.y < 0 || (0..9).contains(&candidate.y));
    }
}

/// Scenario 3: `play (0,0) B`, `play (0,1) W`, `play (1,0) W` captures
/// the lone Black stone. Exercised directly against `Board` since the
/// move sequence is not strictly alternating.
#[test]
fn a_surrounded_lone_stone_is_captured() {
    let mut board = Board::new(9, 9, Rule::Japanese, 7.5, false);
    board.play(0, 0, Color::Black);
    board.play(0, 1, Color::White);
    let captured = board.play(1, 0, Color::White);

    assert_eq!(board.color_at(0, 0), Color::Empty);
    assert_eq!(captured, 1);
}

/// Scenario 4: cancelling an in-flight search via a short `timelimit`
/// returns promptly, and a subsequent `initialize` does not block.
#[test]
fn a_short_timelimit_cancel_is_followed_by_a_non_blocking_initialize() {
    use std::time::{Duration, Instant};

    let predictors: Vec<Arc<dyn Predictor>> =
        vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.0))];
    let processor = Arc::new(Processor::new(predictors, 16).unwrap());
    let player = Player::new(processor, 9, 9, Rule::Japanese, 7.5, false);

    player.start_evaluation(PlayerConfig::default());
    std::thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    player.wait_evaluation(1_000_000_000, 1_000_000_000, 0.2, true);
    assert!(started.elapsed() < Duration::from_millis(500));

    let started = Instant::now();
    player.initialize();
    assert!(started.elapsed() < Duration::from_millis(500));
}
