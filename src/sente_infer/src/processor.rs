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

use std::sync::{Arc, Mutex};

use sente_nn::Predictor;
use sente_utils::Error;

use crate::executor::Executor;

/// Dispatches inference requests across a fixed pool of `Executor`s -- one
/// per (device, thread-on-device) slot -- by always picking the least
/// loaded one (§4.2). The pick-then-reserve sequence is serialized by
/// `dispatch` so two concurrent callers never both target the same
/// momentarily-idle executor.
pub struct Processor {
    executors: Vec<Arc<Executor>>,
    dispatch: Mutex<()>,
    input_size: usize,
    output_size: usize
}

impl Processor {
    /// `predictors` must contain one already-constructed model instance
    /// per executor slot -- the processor does not clone or share model
    /// instances across executors, each owns its own (§4.2).
    pub fn new(predictors: Vec<Arc<dyn Predictor>>, batch_size: usize) -> Result<Processor, Error> {
        if predictors.is_empty() {
            return Err(Error::DeviceUnavailable("no predictors given to Processor::new".to_string()));
        }

        let input_size = predictors[0].input_size();
        let output_size = predictors[0].output_size();

        let executors = predictors.into_iter()
            .map(|predictor| Executor::new(predictor, batch_size))
            .collect();

        Ok(Processor { executors, dispatch: Mutex::new(()), input_size, output_size })
    }

    pub fn input_size(&self) -> usize { self.input_size }
    pub fn output_size(&self) -> usize { self.output_size }
    pub fn num_executors(&self) -> usize { self.executors.len() }

    /// Runs one forward pass over `n` rows of `inputs`, blocking the
    /// calling thread until the result is ready. Safe to call from many
    /// search threads concurrently.
    pub fn execute(&self, inputs: Vec<f32>, n: usize) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), n * self.input_size);

        let executor = {
            let _guard = self.dispatch.lock().unwrap();
            let chosen = self.executors.iter()
                .min_by_key(|executor| executor.waiting_count() + executor.reserved_count())
                .expect("Processor is constructed with at least one executor")
                .clone();
            chosen.reserve(n);
            chosen
        };

        executor.execute(inputs, n)
    }

    /// Tears down every executor, releasing any callers still blocked on
    /// a queued job with neutral (zero-filled) outputs (§5, §7).
    pub fn shutdown(&self) {
        for executor in &self.executors {
            executor.shutdown();
        }
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sente_nn::testing::{CountingPredictor, UniformPredictor};

    #[test]
    fn execute_round_trips_through_some_executor() {
        let predictors: Vec<Arc<dyn Predictor>> = vec![Arc::new(UniformPredictor::new(4, 5, 0.0))];
        let processor = Processor::new(predictors, 8).unwrap();

        let outputs = processor.execute(vec![0.0; 4], 1);
        assert_eq!(outputs.len(), 5);
    }

    #[test]
    fn dispatch_spreads_load_across_executors() {
        use std::sync::Barrier;
        use std::thread;

        let predictors: Vec<Arc<dyn Predictor>> = vec![
            Arc::new(CountingPredictor::new(4, 5)),
            Arc::new(CountingPredictor::new(4, 5))
        ];
        let processor = Arc::new(Processor::new(predictors, 1).unwrap());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2).map(|_| {
            let processor = processor.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                processor.execute(vec![0.0; 4], 1)
            })
        }).collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 5);
        }
    }

    #[test]
    fn new_rejects_an_empty_executor_pool() {
        let predictors: Vec<Arc<dyn Predictor>> = vec![];
        assert!(Processor::new(predictors, 8).is_err());
    }
}
