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

//! A bounded producer/consumer batcher sitting in front of one or more
//! `sente_nn::Predictor` instances (§4.2). Search threads call
//! `Processor::execute` and block; device-worker threads owned by each
//! `Executor` drain queued `Job`s into batches and run them through the
//! model.

mod executor;
mod job;
mod processor;

pub use self::executor::Executor;
pub use self::job::Job;
pub use self::processor::Processor;
pub use sente_utils::Error;
