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

use sente_utils::Error;

/// The external inference service contract (§6): a synchronous forward
/// pass over row-major `batch * MODEL_INPUT_SIZE` inputs, filling
/// `batch * MODEL_OUTPUT_SIZE` outputs. Implementations must be safe to
/// call from many threads concurrently -- the device worker in
/// `sente_infer` is the only caller, but it is shared across every search
/// thread that dispatches to it.
pub trait Predictor: Send + Sync {
    /// Size, in floats, of one input row.
    fn input_size(&self) -> usize;

    /// Size, in floats, of one output row.
    fn output_size(&self) -> usize;

    /// Runs the model forward over `batch` rows. `inputs` has length
    /// `batch * input_size()`; `outputs` has length `batch * output_size()`
    /// and must be fully written on success.
    fn predict(&self, inputs: &[f32], outputs: &mut [f32], batch: usize) -> Result<(), Error>;
}
