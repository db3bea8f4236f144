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

use sente_go::{features, Board, Color};
use sente_infer::Processor;

/// One legal, non-own-territory candidate move surfaced by the last
/// `evaluate` call, together with the raw prior the model assigned to it.
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    pub x: i32,
    pub y: i32,
    pub prior: f32
}

/// Owns the last inference result for a single board+color (§4.5).
/// `evaluate` is idempotent -- a second call while already evaluated is a
/// no-op -- and `reset` clears it back to its initial state so a `Node`
/// can hand its storage to a fresh board position.
#[derive(Default)]
pub struct Evaluator {
    policies: Vec<Policy>,
    value: f32,
    evaluated: bool
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator { policies: Vec::new(), value: 0.0, evaluated: false }
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn reset(&mut self) {
        self.policies.clear();
        self.value = 0.0;
        self.evaluated = false;
    }

    /// Runs the board's input builder, calls into the inference service,
    /// and keeps only legal non-own-territory moves (§4.5). `color` is the
    /// side to move at `board`.
    pub fn evaluate(&mut self, processor: &Processor, board: &Board, color: Color) {
        if self.evaluated {
            return;
        }

        let inputs = features::get_inputs(board, color);
        let outputs = processor.execute(inputs, 1);

        let width = board.width();
        let height = board.height();
        let canvas = features::MODEL_SIZE;
        let offset_x = (canvas as i32 - width as i32) / 2;
        let offset_y = (canvas as i32 - height as i32) / 2;
        let territories = board.get_territories();

        let mut policies = Vec::with_capacity(width * height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if !board.is_enabled(x, y, color, true) {
                    continue;
                }
                if territories[(y as usize) * width + (x as usize)] == color {
                    continue;
                }

                let canvas_index = ((y + offset_y) as usize) * canvas + (x + offset_x) as usize;
                policies.push(Policy { x, y, prior: outputs[canvas_index] });
            }
        }

        let value_offset = outputs.len() - 1;
        let raw_value = outputs[value_offset] * 2.0 - 1.0;

        self.value = if color == Color::Black { raw_value } else { -raw_value };
        self.policies = policies;
        self.evaluated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sente_go::Rule;
    use sente_nn::testing::UniformPredictor;
    use std::sync::Arc;

    #[test]
    fn evaluate_is_idempotent() {
        let predictors: Vec<Arc<dyn sente_nn::Predictor>> =
            vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.3))];
        let processor = Processor::new(predictors, 8).unwrap();
        let board = Board::new(9, 9, Rule::Japanese, 7.5, false);

        let mut evaluator = Evaluator::new();
        evaluator.evaluate(&processor, &board, Color::Black);
        let first_value = evaluator.value();
        let first_len = evaluator.policies().len();

        evaluator.evaluate(&processor, &board, Color::Black);
        assert_eq!(evaluator.value(), first_value);
        assert_eq!(evaluator.policies().len(), first_len);
    }

    #[test]
    fn evaluate_fills_every_empty_cell_on_an_empty_board() {
        let predictors: Vec<Arc<dyn sente_nn::Predictor>> =
            vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.0))];
        let processor = Processor::new(predictors, 8).unwrap();
        let board = Board::new(9, 9, Rule::Japanese, 7.5, false);

        let mut evaluator = Evaluator::new();
        evaluator.evaluate(&processor, &board, Color::Black);

        assert_eq!(evaluator.policies().len(), 81);
    }

    #[test]
    fn value_is_negated_for_white() {
        let predictors: Vec<Arc<dyn sente_nn::Predictor>> =
            vec![Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.6))];
        let processor = Processor::new(predictors, 8).unwrap();
        let board = Board::new(9, 9, Rule::Japanese, 7.5, false);

        let mut black_eval = Evaluator::new();
        black_eval.evaluate(&processor, &board, Color::Black);

        let mut white_eval = Evaluator::new();
        white_eval.evaluate(&processor, &board, Color::White);

        assert!((black_eval.value() + white_eval.value()).abs() < 1e-6);
    }
}
