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

//! Construction of the fixed-shape feature tensor fed to the model, and the
//! compiled-in model shape constants (§6).

use crate::board::Board;
use crate::color::Color;
use crate::rule::Rule;

/// Square canvas side length every board is centered into, regardless of
/// its own size.
pub const MODEL_SIZE: usize = 19;

/// Number of per-cell board planes, not counting the padding-mask plane.
pub const MODEL_FEATURES: usize = 32;

/// Number of scalar game-state infos appended after the planes.
pub const MODEL_INFOS: usize = 7;

/// Number of policy planes in the model's output.
pub const MODEL_PREDICTIONS: usize = 1;

/// Number of scalar value outputs in the model's output.
pub const MODEL_VALUES: usize = 1;

pub const MODEL_INPUT_SIZE: usize = (MODEL_FEATURES + 1) * MODEL_SIZE * MODEL_SIZE + MODEL_INFOS;
pub const MODEL_OUTPUT_SIZE: usize = MODEL_PREDICTIONS * MODEL_SIZE * MODEL_SIZE + MODEL_VALUES;

const PLANE_SIZE: usize = MODEL_SIZE * MODEL_SIZE;

fn plane_mut(planes: &mut [f32], plane: usize) -> &mut [f32] {
    &mut planes[plane * PLANE_SIZE..(plane + 1) * PLANE_SIZE]
}

fn clamp_liberties(n: usize) -> usize {
    n.clamp(1, 8)
}

/// Builds the `MODEL_INPUT_SIZE`-long feature tensor for `board` from
/// `color`'s perspective (§4.4). The board is centered into the
/// `MODEL_SIZE` canvas; cells outside the real board are left at zero
/// except for the padding-mask plane.
pub fn get_inputs(board: &Board, color: Color) -> Vec<f32> {
    let mut inputs = vec![0.0f32; MODEL_INPUT_SIZE];
    let (planes, infos) = inputs.split_at_mut((MODEL_FEATURES + 1) * PLANE_SIZE);

    let width = board.width();
    let height = board.height();
    let offset_x = (MODEL_SIZE as i32 - width as i32) / 2;
    let offset_y = (MODEL_SIZE as i32 - height as i32) / 2;
    let opponent = -color;

    for cy in 0..MODEL_SIZE as i32 {
        for cx in 0..MODEL_SIZE as i32 {
            let canvas_index = (cy as usize) * MODEL_SIZE + (cx as usize);
            let bx = cx - offset_x;
            let by = cy - offset_y;
            let on_board = bx >= 0 && by >= 0 && (bx as usize) < width && (by as usize) < height;

            if !on_board {
                continue;
            }

            plane_mut(planes, MODEL_FEATURES)[canvas_index] = 1.0;

            let here = board.color_at(bx, by);

            if here == Color::Empty {
                plane_mut(planes, 0)[canvas_index] = 1.0;
            } else if here == color {
                plane_mut(planes, 1)[canvas_index] = 1.0;
                if board.is_shicho(bx, by) {
                    plane_mut(planes, 2)[canvas_index] = 1.0;
                }
                let liberties = clamp_liberties(board.ren_space(bx, by));
                plane_mut(planes, 3 + (liberties - 1))[canvas_index] = 1.0;
            } else if here == opponent {
                plane_mut(planes, 14)[canvas_index] = 1.0;
                if board.is_shicho(bx, by) {
                    plane_mut(planes, 15)[canvas_index] = 1.0;
                }
                let liberties = clamp_liberties(board.ren_space(bx, by));
                plane_mut(planes, 16 + (liberties - 1))[canvas_index] = 1.0;
            }

            let line = (bx.min(by).min(width as i32 - 1 - bx).min(height as i32 - 1 - by) + 1).max(1);
            if line <= 4 {
                plane_mut(planes, 27 + (line as usize - 1))[canvas_index] = 1.0;
            }
        }
    }

    for n in 0..3 {
        if let Some((hx, hy)) = board.get_history(color, n) {
            let cx = hx + offset_x;
            let cy = hy + offset_y;
            if cx >= 0 && cy >= 0 && (cx as usize) < MODEL_SIZE && (cy as usize) < MODEL_SIZE {
                let canvas_index = (cy as usize) * MODEL_SIZE + (cx as usize);
                plane_mut(planes, 11 + n)[canvas_index] = 1.0;
            }
        }
        if let Some((hx, hy)) = board.get_history(opponent, n) {
            let cx = hx + offset_x;
            let cy = hy + offset_y;
            if cx >= 0 && cy >= 0 && (cx as usize) < MODEL_SIZE && (cy as usize) < MODEL_SIZE {
                let canvas_index = (cy as usize) * MODEL_SIZE + (cx as usize);
                plane_mut(planes, 24 + n)[canvas_index] = 1.0;
            }
        }
    }

    if let Some((kx, ky)) = board.get_ko(color) {
        let cx = kx + offset_x;
        let cy = ky + offset_y;
        if cx >= 0 && cy >= 0 && (cx as usize) < MODEL_SIZE && (cy as usize) < MODEL_SIZE {
            let canvas_index = (cy as usize) * MODEL_SIZE + (cx as usize);
            plane_mut(planes, 31)[canvas_index] = 1.0;
        }
    }

    infos[0] = if color == Color::Black { 1.0 } else { 0.0 };
    infos[1] = if color == Color::White { 1.0 } else { 0.0 };
    infos[2] = board.komi() * (color.as_i8() as f32) / 13.0;
    infos[3] = if board.superko() { 1.0 } else { 0.0 };
    infos[4] = if board.has_ko() { 1.0 } else { 0.0 };
    infos[5] = if board.rule() == Rule::Japanese { 0.0 } else { 1.0 };
    infos[6] = if board.rule() == Rule::Japanese { 1.0 } else { 0.0 };

    inputs
}
