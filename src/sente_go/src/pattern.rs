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

use crate::color::Color;

const EMPTY: u32 = 0b00;
const BLACK: u32 = 0b01;
const WHITE: u32 = 0b10;

/// A packed bitmap of the real (non-padding) board cells, two bits per
/// cell: `00` empty, `01` black, `10` white. Maintained incrementally on
/// every stone placed or removed, and used both for `Board::get_state` /
/// `load_state` and as the raw material for a future position-hash key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    width: usize,
    height: usize,
    words: Vec<u32>
}

impl Pattern {
    const BITS_PER_WORD: usize = 16; // 32 bits / 2 bits per cell

    pub fn new(width: usize, height: usize) -> Pattern {
        let num_cells = width * height;
        let num_words = (num_cells + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD;

        Pattern { width, height, words: vec![0; num_words] }
    }

    fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn code_at(&self, cell: usize) -> u32 {
        let word = cell / Self::BITS_PER_WORD;
        let shift = 2 * (cell % Self::BITS_PER_WORD);

        (self.words[word] >> shift) & 0b11
    }

    fn set_code(&mut self, cell: usize, code: u32) {
        let word = cell / Self::BITS_PER_WORD;
        let shift = 2 * (cell % Self::BITS_PER_WORD);

        self.words[word] &= !(0b11 << shift);
        self.words[word] |= code << shift;
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        match self.code_at(self.cell_index(x, y)) {
            BLACK => Color::Black,
            WHITE => Color::White,
            _ => Color::Empty
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        let cell = self.cell_index(x, y);
        let code = match color {
            Color::Black => BLACK,
            Color::White => WHITE,
            _ => EMPTY
        };

        self.set_code(cell, code);
    }

    pub fn clear(&mut self, x: usize, y: usize) {
        self.set(x, y, Color::Empty);
    }

    /// Number of packed `u32` words backing this pattern -- `ceil(W*H / 16)`,
    /// matching the persisted-state layout in the data model.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn from_words(width: usize, height: usize, words: Vec<u32>) -> Pattern {
        let expected = Pattern::new(width, height).words.len();
        debug_assert_eq!(words.len(), expected);

        Pattern { width, height, words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let mut pattern = Pattern::new(9, 9);
        pattern.set(0, 0, Color::Black);
        pattern.set(8, 8, Color::White);
        pattern.set(4, 4, Color::Black);

        assert_eq!(pattern.get(0, 0), Color::Black);
        assert_eq!(pattern.get(8, 8), Color::White);
        assert_eq!(pattern.get(4, 4), Color::Black);
        assert_eq!(pattern.get(1, 1), Color::Empty);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut pattern = Pattern::new(9, 9);
        pattern.set(3, 3, Color::White);
        pattern.clear(3, 3);

        assert_eq!(pattern.get(3, 3), Color::Empty);
    }

    #[test]
    fn num_words_matches_persisted_state_layout() {
        let pattern = Pattern::new(19, 19);

        assert_eq!(pattern.num_words(), (19 * 19 + 15) / 16);
    }

    #[test]
    fn from_words_round_trips_through_words() {
        let mut pattern = Pattern::new(9, 9);
        pattern.set(2, 2, Color::Black);
        pattern.set(5, 6, Color::White);

        let restored = Pattern::from_words(9, 9, pattern.words().to_vec());

        assert_eq!(restored, pattern);
    }
}
