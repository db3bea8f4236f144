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

//! Process-wide configuration, read once from the environment.
//!
//! Every entry in the "Player configuration" table is read here exactly
//! once, behind a `lazy_static!`, and accessed elsewhere as `*config::NAME`.
//! There is no configuration file format and no `serde` -- this mirrors how
//! the reference engine's own `config` module works, just with the option
//! set this specification calls for.

use regex::Regex;
use std::env;
use std::str::FromStr;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(value.trim(), "1" | "true" | "yes" | "on"),
        Err(_) => default
    }
}

/// Parses a comma- or whitespace-separated list of non-negative integers,
/// e.g. the `GPU` environment variable `"0,1,2"`.
fn env_usize_list(name: &str, default: Vec<usize>) -> Vec<usize> {
    let separators = Regex::new(r"[,\s]+").unwrap();

    match env::var(name) {
        Ok(value) => {
            let parsed: Vec<usize> = separators.split(value.trim())
                .filter(|part| !part.is_empty())
                .filter_map(|part| part.parse().ok())
                .collect();

            if parsed.is_empty() { default } else { parsed }
        },
        Err(_) => default
    }
}

lazy_static! {
    /// Number of search worker threads in the `Player`'s thread pool.
    pub static ref NUM_THREADS: usize = env_or("NUM_THREADS", 16);

    /// Maximum number of requests an `Executor` concatenates into a single
    /// model forward call.
    pub static ref BATCH_SIZE: usize = env_or("BATCH_SIZE", 16);

    /// Devices to run inference on. An empty list means "CPU only", which
    /// this crate's own `Predictor` implementations always are.
    pub static ref GPU: Vec<usize> = env_usize_list("GPU", vec![]);

    /// Number of `Executor` threads to start per device.
    pub static ref THREADS_PER_DEVICE: usize = env_or("THREADS_PER_DEVICE", 2);

    /// Whether the model should be queried for half-precision inputs. This
    /// crate's `Predictor`s are always `f32`; the flag is carried only for
    /// interface completeness (§6).
    pub static ref FP16: bool = env_bool("FP16", false);

    /// Default policy-sharpening temperature for the expansion rule.
    pub static ref TEMPERATURE: f32 = env_or("TEMPERATURE", 1.0);

    /// Default Gumbel noise scale for the expansion rule.
    pub static ref RANDOMNESS: f32 = env_or("RANDOMNESS", 0.25);

    /// Default target visit count for `waitEvaluation`.
    pub static ref NUM_VISITS: usize = env_or("NUM_VISITS", 1600);

    /// Default target playout count for `waitEvaluation`.
    pub static ref NUM_PLAYOUTS: usize = env_or("NUM_PLAYOUTS", 1600);

    /// Default wall-clock budget (seconds) for `waitEvaluation`.
    pub static ref TIMELIMIT: f32 = env_or("TIMELIMIT", 60.0);

    /// Whether ponder (search continues between moves) is enabled.
    pub static ref PONDER: bool = env_bool("PONDER", false);

    /// Selection rule: `true` selects UCB1 over PUCB at the descent root.
    pub static ref USE_UCB1: bool = env_or::<String>("SEARCH", "pucb".to_string()) == "ucb1";

    /// Final-move-selection criterion exposed to the controller, `lcb` or
    /// `visits`. The core does not interpret this; it is read back by the
    /// (out of scope) controller.
    pub static ref CRITERION: String = env_or("CRITERION", "visits".to_string());

    /// Board size (one side of a square board).
    pub static ref BOARD_SIZE: usize = env_or("BOARD_SIZE", 19);

    /// Komi, from White's perspective.
    pub static ref KOMI: f32 = env_or("KOMI", 7.5);

    /// Scoring rule: `ch`, `jp`, or `com`.
    pub static ref RULE: String = env_or("RULE", "jp".to_string());

    /// Whether positional superko is signalled to the model (§9 open
    /// question 1 -- never enforced as illegal regardless of this flag).
    pub static ref SUPERKO: bool = env_bool("SUPERKO", false);

    /// Whether only leaf evaluations (not every node on a descent) should
    /// contribute to ancestor value accumulators.
    pub static ref EVAL_LEAF_ONLY: bool = env_bool("EVAL_LEAF_ONLY", false);

    /// Resignation threshold: if the root's value estimate drops below
    /// `-RESIGN`, the (out of scope) controller may resign.
    pub static ref RESIGN: f32 = env_or("RESIGN", 0.95);

    /// Minimum estimated score margin before `RESIGN` is honored.
    pub static ref MIN_SCORE: f32 = env_or("MIN_SCORE", 0.0);

    /// Minimum move number before `RESIGN` is honored.
    pub static ref MIN_TURN: usize = env_or("MIN_TURN", 1);

    /// Move number the game is assumed to start at (non-zero for engines
    /// resuming a handicap or partial game record).
    pub static ref INITIAL_TURN: usize = env_or("INITIAL_TURN", 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default_when_unset() {
        assert_eq!(env_or::<usize>("SENTE_UTILS_TEST_UNSET_VAR", 42), 42);
    }

    #[test]
    fn env_or_parses_present_value() {
        env::set_var("SENTE_UTILS_TEST_NUM_THREADS", "7");
        assert_eq!(env_or::<usize>("SENTE_UTILS_TEST_NUM_THREADS", 1), 7);
        env::remove_var("SENTE_UTILS_TEST_NUM_THREADS");
    }

    #[test]
    fn env_bool_accepts_common_truthy_spellings() {
        for spelling in &["1", "true", "yes", "on"] {
            env::set_var("SENTE_UTILS_TEST_FLAG", spelling);
            assert!(env_bool("SENTE_UTILS_TEST_FLAG", false));
        }
        env::remove_var("SENTE_UTILS_TEST_FLAG");
    }

    #[test]
    fn env_usize_list_splits_on_commas_and_whitespace() {
        env::set_var("SENTE_UTILS_TEST_GPU", "0, 1 2,3");
        assert_eq!(env_usize_list("SENTE_UTILS_TEST_GPU", vec![]), vec![0, 1, 2, 3]);
        env::remove_var("SENTE_UTILS_TEST_GPU");
    }

    #[test]
    fn env_usize_list_falls_back_on_unset() {
        assert_eq!(env_usize_list("SENTE_UTILS_TEST_UNSET_GPU", vec![9]), vec![9]);
    }
}
