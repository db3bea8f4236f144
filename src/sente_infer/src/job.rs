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

use crossbeam_channel::Sender;

/// One caller's request, queued on an `Executor` and completed by its
/// device-worker thread. `n` is the number of rows this job contributes to
/// a batch; `done` is notified exactly once, with `n * output_size` floats.
pub struct Job {
    pub inputs: Vec<f32>,
    pub n: usize,
    pub done: Sender<Vec<f32>>
}
