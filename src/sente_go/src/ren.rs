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

use std::collections::HashSet;

use crate::color::Color;

/// A group ("ren") of same-color stones connected 4-adjacently. Identified
/// by a "leader" vertex -- every stone in the group maps to the leader
/// through `Board::ren_id`, and the group's own data lives here, keyed by
/// that same leader in `Board::groups`.
#[derive(Clone, Debug)]
pub struct Ren {
    pub color: Color,
    pub positions: HashSet<usize>,
    pub liberties: HashSet<usize>,
    pub adjacent_empty_regions: HashSet<usize>,

    /// Set by `Board::is_shicho` and invalidated on every mutation.
    pub shicho: bool,

    /// Life-confirmed flag used by the territory/owner algorithm.
    pub fixed: bool
}

impl Ren {
    pub fn new(color: Color, leader: usize) -> Ren {
        let mut positions = HashSet::with_capacity(4);
        positions.insert(leader);

        Ren {
            color,
            positions,
            liberties: HashSet::with_capacity(4),
            adjacent_empty_regions: HashSet::new(),
            shicho: false,
            fixed: false
        }
    }

    pub fn size(&self) -> usize {
        self.positions.len()
    }

    pub fn num_liberties(&self) -> usize {
        self.liberties.len()
    }

    /// Absorbs `other` into `self`. The caller is responsible for updating
    /// `Board::ren_id` for every position that moved.
    pub fn merge(&mut self, other: Ren) {
        debug_assert_eq!(self.color, other.color);

        for p in other.positions {
            self.positions.insert(p);
        }
        for p in other.liberties {
            self.liberties.insert(p);
        }
        for r in other.adjacent_empty_regions {
            self.adjacent_empty_regions.insert(r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_positions_and_liberties() {
        let mut a = Ren::new(Color::Black, 10);
        a.liberties.insert(11);
        a.liberties.insert(9);

        let mut b = Ren::new(Color::Black, 20);
        b.liberties.insert(21);
        b.liberties.insert(11);

        a.merge(b);

        assert_eq!(a.size(), 2);
        assert_eq!(a.num_liberties(), 3);
    }
}
