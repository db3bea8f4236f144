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

//! Thin entry point wiring a `Predictor`, a `Processor`, and a `Player`
//! together (§2 "sente (thin binary)"). The GTP command loop, argument
//! parsing, and SGF loading are external collaborators this crate does
//! not implement (§1 "Deliberately out of scope") -- this binary only
//! proves the wiring by running one search to the configured targets and
//! printing the chosen move, the way a controller built on top of
//! `Player` would.

use std::process::ExitCode;
use std::sync::Arc;

use cpu_time::ProcessTime;

use sente_go::{features, Rule};
use sente_infer::Processor;
use sente_mcts::{Player, PlayerConfig};
use sente_nn::testing::UniformPredictor;
use sente_nn::Predictor;
use sente_utils::config;

/// Builds the one `Predictor` this crate can provide on its own (§6: "a
/// real CUDA/cuDNN implementation of that trait ... [is an] external
/// collaborator and [is] not part of this crate"). A deployment wiring in
/// a real model only needs to swap this function's body for a different
/// `Predictor` implementation -- everything downstream is unaffected.
fn build_predictors(num_devices: usize) -> Vec<Arc<dyn Predictor>> {
    (0..num_devices.max(1))
        .map(|_| Arc::new(UniformPredictor::new(features::MODEL_INPUT_SIZE, features::MODEL_OUTPUT_SIZE, 0.0)) as Arc<dyn Predictor>)
        .collect()
}

fn rule_from_config() -> Rule {
    Rule::from_config_str(&config::RULE)
}

fn run() -> Result<(), sente_utils::Error> {
    let num_devices = (*config::GPU).len().max(1) * (*config::THREADS_PER_DEVICE);
    let processor = Arc::new(Processor::new(build_predictors(num_devices), *config::BATCH_SIZE)?);

    let board_size = *config::BOARD_SIZE;
    let player = Player::new(processor, board_size, board_size, rule_from_config(), *config::KOMI, *config::SUPERKO);

    player.initialize();
    player.start_evaluation(PlayerConfig::default());

    let started = ProcessTime::now();
    player.wait_evaluation(*config::NUM_VISITS, *config::NUM_PLAYOUTS, *config::TIMELIMIT, true);
    let elapsed = started.elapsed();

    let candidates = player.get_candidates();
    match candidates.first() {
        Some(best) if best.x >= 0 => {
            println!("{} {} visits={} playouts={} value={:.3} [{:.2}s cpu]",
                best.x, best.y, best.visits, best.playouts, best.value, elapsed.as_secs_f32());
        },
        _ => println!("pass")
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sente: fatal error during startup -- {}", err);
            ExitCode::FAILURE
        }
    }
}
