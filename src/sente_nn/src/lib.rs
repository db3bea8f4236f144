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

//! The boundary between the search core and the neural network. A real
//! accelerator-backed implementation of `Predictor` -- the model file
//! format, CUDA/cuDNN, the forward pass itself -- is an external
//! collaborator and is not part of this crate; only the trait and a
//! deterministic test double live here.

pub mod predictor;
pub mod testing;

pub use self::predictor::Predictor;
pub use sente_utils::Error;
