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

use std::ops::Neg;

/// A stone color, plus the two sentinels used internally by `Board`: `Empty`
/// for unoccupied intersections and `Edge` for the padding ring around the
/// playable area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Empty,
    Edge
}

impl Color {
    /// Returns the integer code used by the feature tensor and the
    /// persisted-state format: `Black = +1, White = -1, Empty = 0, Edge = +-2`.
    pub fn as_i8(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
            Color::Empty => 0,
            Color::Edge => 2
        }
    }

    pub fn is_stone(self) -> bool {
        matches!(self, Color::Black | Color::White)
    }
}

impl Neg for Color {
    type Output = Color;

    /// The opposite operator. `Empty` and `Edge` are their own opposite --
    /// they never participate in liberties or captures, so negating them
    /// is only ever done defensively.
    fn neg(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
            Color::Edge => Color::Edge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for &c in &[Color::Black, Color::White, Color::Empty, Color::Edge] {
            assert_eq!(-(-c), c);
        }
    }

    #[test]
    fn codes_match_data_model() {
        assert_eq!(Color::Black.as_i8(), 1);
        assert_eq!(Color::White.as_i8(), -1);
        assert_eq!(Color::Empty.as_i8(), 0);
        assert_eq!(Color::Edge.as_i8(), 2);
    }
}
