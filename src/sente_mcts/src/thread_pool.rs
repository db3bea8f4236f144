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

//! A fixed-size pool of worker threads that run boxed closures (§4.4
//! "Worker pool"). `Player` uses one of these to drive the descents that
//! make up a search; it is deliberately generic so `sente_tests` can
//! exercise it on its own.

use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};

type Task = Box<dyn FnOnce() + Send + 'static>;

pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    handles: Mutex<Vec<JoinHandle<()>>>
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> ThreadPool {
        let (sender, receiver): (Sender<Task>, Receiver<Task>) = unbounded();
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads.max(1) {
            let receiver = receiver.clone();
            handles.push(thread::spawn(move || {
                while let Ok(task) = receiver.recv() {
                    task();
                }
            }));
        }

        ThreadPool { sender: Some(sender), handles: Mutex::new(handles) }
    }

    pub fn submit<F>(&self, task: F) where F: FnOnce() + Send + 'static {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Box::new(task));
        }
    }

    pub fn num_threads(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.sender = None;

        for handle in self.handles.lock().unwrap().drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[test]
    fn submitted_tasks_all_run() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(9));

        for _ in 0..8 {
            let counter = counter.clone();
            let barrier = barrier.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                barrier.wait();
            });
        }
        barrier.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn num_threads_matches_construction() {
        let pool = ThreadPool::new(3);
        assert_eq!(pool.num_threads(), 3);
    }

    #[test]
    fn zero_is_promoted_to_one_worker() {
        let pool = ThreadPool::new(0);
        assert_eq!(pool.num_threads(), 1);
    }
}
