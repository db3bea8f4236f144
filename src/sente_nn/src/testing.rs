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

//! Deterministic `Predictor` test doubles, shared across this crate's own
//! tests and the cross-crate integration tests in `sente_tests`. Not
//! `#[cfg(test)]`-gated since they need to be usable from other crates.

use std::sync::atomic::{AtomicUsize, Ordering};

use sente_utils::Error;

use crate::predictor::Predictor;

/// Returns a uniform policy over every cell and a fixed value, regardless
/// of input. Used by the literal end-to-end scenarios in §8, which call
/// for "a deterministic mock evaluator that returns uniform policy 1/N and
/// value 0".
pub struct UniformPredictor {
    input_size: usize,
    output_size: usize,
    value: f32
}

impl UniformPredictor {
    pub fn new(input_size: usize, output_size: usize, value: f32) -> UniformPredictor {
        UniformPredictor { input_size, output_size, value }
    }
}

impl Predictor for UniformPredictor {
    fn input_size(&self) -> usize { self.input_size }
    fn output_size(&self) -> usize { self.output_size }

    fn predict(&self, inputs: &[f32], outputs: &mut [f32], batch: usize) -> Result<(), Error> {
        debug_assert_eq!(inputs.len(), batch * self.input_size);
        debug_assert_eq!(outputs.len(), batch * self.output_size);

        let policy_size = self.output_size - 1;
        let uniform = 1.0 / (policy_size as f32);

        for row in 0..batch {
            let out = &mut outputs[row * self.output_size..(row + 1) * self.output_size];
            for slot in out.iter_mut().take(policy_size) {
                *slot = uniform;
            }
            out[policy_size] = (self.value + 1.0) / 2.0; // Evaluator undoes the *2-1 mapping
        }

        Ok(())
    }
}

/// A `Predictor` that counts how many times `predict` is called, useful
/// for verifying batching behaviour (§8 "Inference batching").
pub struct CountingPredictor {
    input_size: usize,
    output_size: usize,
    calls: AtomicUsize
}

impl CountingPredictor {
    pub fn new(input_size: usize, output_size: usize) -> CountingPredictor {
        CountingPredictor { input_size, output_size, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for CountingPredictor {
    fn input_size(&self) -> usize { self.input_size }
    fn output_size(&self) -> usize { self.output_size }

    fn predict(&self, inputs: &[f32], outputs: &mut [f32], batch: usize) -> Result<(), Error> {
        debug_assert_eq!(inputs.len(), batch * self.input_size);
        debug_assert_eq!(outputs.len(), batch * self.output_size);

        self.calls.fetch_add(1, Ordering::SeqCst);
        for slot in outputs.iter_mut() {
            *slot = 0.0;
        }

        Ok(())
    }
}

/// Always fails. Used to exercise the neutral-valued-output failure path
/// of §7.
pub struct FailingPredictor {
    input_size: usize,
    output_size: usize
}

impl FailingPredictor {
    pub fn new(input_size: usize, output_size: usize) -> FailingPredictor {
        FailingPredictor { input_size, output_size }
    }
}

impl Predictor for FailingPredictor {
    fn input_size(&self) -> usize { self.input_size }
    fn output_size(&self) -> usize { self.output_size }

    fn predict(&self, _inputs: &[f32], _outputs: &mut [f32], _batch: usize) -> Result<(), Error> {
        Err(Error::InvalidModel("FailingPredictor always fails".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_predictor_fills_every_row() {
        let predictor = UniformPredictor::new(4, 5, 0.0);
        let inputs = vec![0.0; 8];
        let mut outputs = vec![0.0; 10];

        predictor.predict(&inputs, &mut outputs, 2).unwrap();

        assert!((outputs[0] - 0.25).abs() < 1e-6);
        assert!((outputs[5] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn counting_predictor_counts_calls() {
        let predictor = CountingPredictor::new(4, 5);
        let inputs = vec![0.0; 4];
        let mut outputs = vec![0.0; 5];

        predictor.predict(&inputs, &mut outputs, 1).unwrap();
        predictor.predict(&inputs, &mut outputs, 1).unwrap();

        assert_eq!(predictor.calls(), 2);
    }

    #[test]
    fn failing_predictor_always_errors() {
        let predictor = FailingPredictor::new(4, 5);
        let inputs = vec![0.0; 4];
        let mut outputs = vec![0.0; 5];

        assert!(predictor.predict(&inputs, &mut outputs, 1).is_err());
    }
}
