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

//! The literal ladder scenario from §8 "Ladder", including the locality
//! check (a distant stone must not flip the result).

use sente_go::{Board, Color, Rule};

#[test]
fn a_chased_group_in_the_corner_is_a_ladder() {
    let mut board = Board::new(9, 9, Rule::Japanese, 7.5, false);
    board.play(2, 2, Color::Black);
    board.play(2, 1, Color::White);
    board.play(3, 2, Color::White);
    board.play(1, 2, Color::Black);

    assert!(board.is_shicho(1, 2));
}

#[test]
fn a_distant_stone_does_not_change_a_local_ladder_result() {
    let mut board = Board::new(9, 9, Rule::Japanese, 7.5, false);
    board.play(6, 6, Color::Black);

    board.play(2, 2, Color::Black);
    board.play(2, 1, Color::White);
    board.play(3, 2, Color::White);
    board.play(1, 2, Color::Black);

    assert!(board.is_shicho(1, 2));
}

#[test]
fn a_group_with_more_than_one_liberty_is_never_a_ladder() {
    let mut board = Board::new(9, 9, Rule::Japanese, 7.5, false);
    board.play(4, 4, Color::Black);
    board.play(4, 5, Color::Black);

    assert!(!board.is_shicho(4, 4));
}
