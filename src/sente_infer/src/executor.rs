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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::thread::JoinHandle;

use crossbeam_channel::bounded;

use sente_nn::Predictor;

use crate::job::Job;

struct State {
    queue: VecDeque<Job>,
    waiting_count: usize,
    terminated: bool
}

/// One model instance on one device, and the single thread that drives it.
/// Callers enqueue `Job`s and block on their own completion channel; the
/// device-worker thread drains the queue, concatenates rows into one
/// batch of up to `batch_size`, runs the model once, and scatters the
/// outputs back out (§4.2).
pub struct Executor {
    state: Mutex<State>,
    condvar: Condvar,
    reserved_count: AtomicUsize,
    batch_size: usize,
    input_size: usize,
    output_size: usize,
    worker: Mutex<Option<JoinHandle<()>>>
}

impl Executor {
    pub fn new(predictor: Arc<dyn Predictor>, batch_size: usize) -> Arc<Executor> {
        let input_size = predictor.input_size();
        let output_size = predictor.output_size();

        let executor = Arc::new(Executor {
            state: Mutex::new(State { queue: VecDeque::new(), waiting_count: 0, terminated: false }),
            condvar: Condvar::new(),
            reserved_count: AtomicUsize::new(0),
            batch_size,
            input_size,
            output_size,
            worker: Mutex::new(None)
        });

        let worker_executor = executor.clone();
        let handle = thread::spawn(move || worker_executor.run(predictor));
        *executor.worker.lock().unwrap() = Some(handle);

        executor
    }

    pub fn input_size(&self) -> usize { self.input_size }
    pub fn output_size(&self) -> usize { self.output_size }

    /// Sum of the sizes of every `Job` currently queued (not yet picked up
    /// by the device-worker thread).
    pub fn waiting_count(&self) -> usize {
        self.state.lock().unwrap().waiting_count
    }

    /// Sum of the sizes reserved by `Processor::execute` calls that have
    /// picked this executor but not yet pushed their `Job` onto the queue.
    pub fn reserved_count(&self) -> usize {
        self.reserved_count.load(Ordering::SeqCst)
    }

    pub fn reserve(&self, n: usize) {
        self.reserved_count.fetch_add(n, Ordering::SeqCst);
    }

    /// Submits `n` rows of `inputs` and blocks until the device-worker
    /// thread has produced `n * output_size` outputs for them. If the
    /// executor is torn down with this job still queued, a zero-filled
    /// (neutral) output is returned instead (§7).
    pub fn execute(&self, inputs: Vec<f32>, n: usize) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), n * self.input_size);

        let (done_tx, done_rx) = bounded(1);

        {
            let mut state = self.state.lock().unwrap();
            state.queue.push_back(Job { inputs, n, done: done_tx });
            state.waiting_count += n;
        }
        self.reserved_count.fetch_sub(n, Ordering::SeqCst);
        self.condvar.notify_one();

        done_rx.recv().unwrap_or_else(|_| vec![0.0; n * self.output_size])
    }

    /// Signals the device-worker thread to drain and exit, and joins it.
    /// Any jobs still queued at that point are notified with zero-filled
    /// outputs so their callers are never left blocked (§5, §7).
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.terminated = true;
        }
        self.condvar.notify_all();

        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn run(self: Arc<Self>, predictor: Arc<dyn Predictor>) {
        loop {
            let mut state = self.state.lock().unwrap();
            while state.queue.is_empty() && !state.terminated {
                state = self.condvar.wait(state).unwrap();
            }

            if state.terminated {
                let remaining: Vec<Job> = state.queue.drain(..).collect();
                state.waiting_count = 0;
                drop(state);

                for job in remaining {
                    let zeros = vec![0.0f32; job.n * self.output_size];
                    let _ = job.done.send(zeros);
                }
                break;
            }

            let mut batch = Vec::new();
            let mut total = 0;

            while total < self.batch_size {
                let job = match state.queue.pop_front() {
                    Some(job) => job,
                    None => break,
                };

                total += job.n;
                batch.push(job);
            }
            state.waiting_count -= total;
            drop(state);

            let mut combined_inputs = Vec::with_capacity(total * self.input_size);
            for job in &batch {
                combined_inputs.extend_from_slice(&job.inputs);
            }
            let mut combined_outputs = vec![0.0f32; total * self.output_size];

            if let Err(err) = predictor.predict(&combined_inputs, &mut combined_outputs, total) {
                eprintln!("sente_infer: inference failed, returning neutral outputs -- {}", err);
            }

            let mut offset = 0;
            for job in batch {
                let start = offset * self.output_size;
                let end = (offset + job.n) * self.output_size;
                let _ = job.done.send(combined_outputs[start..end].to_vec());
                offset += job.n;
            }
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sente_nn::testing::{CountingPredictor, FailingPredictor, UniformPredictor};

    #[test]
    fn execute_returns_a_row_per_input() {
        let executor = Executor::new(Arc::new(UniformPredictor::new(4, 5, 0.0)), 8);
        let outputs = executor.execute(vec![0.0; 8], 2);

        assert_eq!(outputs.len(), 10);
    }

    #[test]
    fn waiting_count_is_zero_once_idle() {
        let executor = Executor::new(Arc::new(CountingPredictor::new(4, 5)), 8);
        let _ = executor.execute(vec![0.0; 4], 1);

        assert_eq!(executor.waiting_count(), 0);
    }

    #[test]
    fn failing_predictor_yields_neutral_outputs_instead_of_hanging() {
        let executor = Executor::new(Arc::new(FailingPredictor::new(4, 5)), 8);
        let outputs = executor.execute(vec![0.0; 4], 1);

        assert_eq!(outputs, vec![0.0; 5]);
    }

    #[test]
    fn shutdown_releases_queued_callers() {
        use std::thread;

        let executor = Executor::new(Arc::new(UniformPredictor::new(4, 5, 0.0)), 1024);
        let blocked = executor.clone();
        let handle = thread::spawn(move || blocked.execute(vec![0.0; 4], 1));

        // give the job a chance to reach the queue before tearing down
        thread::sleep(std::time::Duration::from_millis(20));
        executor.shutdown();

        let outputs = handle.join().unwrap();
        assert_eq!(outputs.len(), 5);
    }
}
