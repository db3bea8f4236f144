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

//! Bounded-batcher properties (§8 "Inference batching").

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use sente_infer::Processor;
use sente_nn::testing::{CountingPredictor, UniformPredictor};
use sente_nn::Predictor;

#[test]
fn concurrent_callers_cause_at_most_ceil_total_over_batch_size_forward_calls() {
    const INPUT_SIZE: usize = 8;
    const OUTPUT_SIZE: usize = 9;
    const K: usize = 16;
    const BATCH_SIZE: usize = 4;

    let counting = Arc::new(CountingPredictor::new(INPUT_SIZE, OUTPUT_SIZE));
    let predictors: Vec<Arc<dyn Predictor>> = vec![counting.clone() as Arc<dyn Predictor>];
    let processor = Arc::new(Processor::new(predictors, BATCH_SIZE).unwrap());
    let barrier = Arc::new(Barrier::new(K));

    let handles: Vec<_> = (0..K).map(|_| {
        let processor = processor.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            processor.execute(vec![0.0; INPUT_SIZE], 1)
        })
    }).collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), OUTPUT_SIZE);
    }

    let max_expected_calls = (K + BATCH_SIZE - 1) / BATCH_SIZE;
    assert!(counting.calls() <= max_expected_calls, "{} calls, expected at most {}", counting.calls(), max_expected_calls);
}

#[test]
fn every_caller_returns_promptly_after_the_service_is_torn_down_mid_queue() {
    let predictors: Vec<Arc<dyn Predictor>> = vec![Arc::new(UniformPredictor::new(4, 5, 0.0))];
    let processor = Arc::new(Processor::new(predictors, 1024).unwrap());

    let handles: Vec<_> = (0..8).map(|_| {
        let processor = processor.clone();
        thread::spawn(move || processor.execute(vec![0.0; 4], 1))
    }).collect();

    thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    processor.shutdown();

    for handle in handles {
        let outputs = handle.join().unwrap();
        assert_eq!(outputs.len(), 5);
    }
    assert!(started.elapsed() < Duration::from_secs(2));
}
