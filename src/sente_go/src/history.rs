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

/// A bounded ring buffer of the last three move indices played by one
/// color. `None` means no move has been played yet in that slot. Index 0
/// is always the most recent move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct History {
    moves: [Option<usize>; 3]
}

impl History {
    pub fn new() -> History {
        History { moves: [None; 3] }
    }

    /// Pushes a new move to the front, discarding the oldest.
    pub fn push(&mut self, vertex: usize) {
        self.moves[2] = self.moves[1];
        self.moves[1] = self.moves[0];
        self.moves[0] = Some(vertex);
    }

    /// The `n`th most recent move (0 = newest), if any.
    pub fn get(&self, n: usize) -> Option<usize> {
        self.moves[n]
    }

    /// Packs the three slots into a single `u32`, 10 bits per slot with
    /// `0` meaning "no move" and `vertex + 1` otherwise. Used by
    /// `Board::get_state` / `Board::load_state`.
    pub fn pack(&self) -> u32 {
        let mut packed = 0u32;

        for (i, slot) in self.moves.iter().enumerate() {
            let code = slot.map_or(0, |v| (v as u32 + 1) & 0x3ff);
            packed |= code << (10 * i);
        }

        packed
    }

    pub fn unpack(packed: u32) -> History {
        let mut moves = [None; 3];

        for (i, slot) in moves.iter_mut().enumerate() {
            let code = (packed >> (10 * i)) & 0x3ff;
            *slot = if code == 0 { None } else { Some((code - 1) as usize) };
        }

        History { moves }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_three_most_recent_newest_first() {
        let mut history = History::new();
        history.push(1);
        history.push(2);
        history.push(3);
        history.push(4);

        assert_eq!(history.get(0), Some(4));
        assert_eq!(history.get(1), Some(3));
        assert_eq!(history.get(2), Some(2));
    }

    #[test]
    fn pack_unpack_round_trips() {
        let mut history = History::new();
        history.push(5);
        history.push(200);

        let packed = history.pack();
        let restored = History::unpack(packed);

        assert_eq!(restored, history);
    }

    #[test]
    fn empty_history_round_trips() {
        let history = History::new();

        assert_eq!(History::unpack(history.pack()), history);
    }
}
