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

use std::collections::{HashMap, HashSet};

use crate::color::Color;
use crate::history::History;
use crate::pattern::Pattern;
use crate::ren::Ren;
use crate::rule::Rule;

fn color_index(color: Color) -> usize {
    match color {
        Color::Black => 0,
        Color::White => 1,
        _ => unreachable!("history is only kept for stone colors")
    }
}

/// The Go board. Coordinates `(x, y)` are zero-based with `0 <= x < width`,
/// `0 <= y < height`. Internally the board is padded with a one-cell ring
/// of `Color::Edge` sentinels on every side so that `neighbors4` never has
/// to bounds-check (§4.4, §9 "Sentinel edge group").
#[derive(Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    padded_width: usize,

    colors: Vec<Color>,
    ren_id: Vec<i32>,
    groups: HashMap<i32, Ren>,
    pattern: Pattern,
    history: [History; 2],

    ko_index: Option<usize>,
    ko_color: Option<Color>,

    rule: Rule,
    komi: f32,
    superko: bool,
    move_number: usize
}

impl Board {
    pub fn new(width: usize, height: usize, rule: Rule, komi: f32, superko: bool) -> Board {
        let padded_width = width + 2;
        let padded_height = height + 2;
        let size = padded_width * padded_height;
        let mut colors = vec![Color::Empty; size];

        for col in 0..padded_width {
            colors[col] = Color::Edge;
            colors[(padded_height - 1) * padded_width + col] = Color::Edge;
        }
        for row in 0..padded_height {
            colors[row * padded_width] = Color::Edge;
            colors[row * padded_width + padded_width - 1] = Color::Edge;
        }

        Board {
            width,
            height,
            padded_width,
            colors,
            ren_id: vec![-1; size],
            groups: HashMap::new(),
            pattern: Pattern::new(width, height),
            history: [History::new(), History::new()],
            ko_index: None,
            ko_color: None,
            rule,
            komi,
            superko,
            move_number: 0
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn rule(&self) -> Rule { self.rule }
    pub fn komi(&self) -> f32 { self.komi }
    pub fn superko(&self) -> bool { self.superko }
    pub fn move_number(&self) -> usize { self.move_number }

    fn vertex(&self, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && (x as usize) < self.width);
        debug_assert!(y >= 0 && (y as usize) < self.height);

        ((y + 1) as usize) * self.padded_width + (x + 1) as usize
    }

    fn xy(&self, v: usize) -> (i32, i32) {
        let row = v / self.padded_width;
        let col = v % self.padded_width;

        (col as i32 - 1, row as i32 - 1)
    }

    fn neighbors4(&self, v: usize) -> [usize; 4] {
        [v - 1, v + 1, v - self.padded_width, v + self.padded_width]
    }

    fn leader_of(&self, v: usize) -> Option<i32> {
        let id = self.ren_id[v];
        if id < 0 { None } else { Some(id) }
    }

    fn group_at(&self, v: usize) -> Option<&Ren> {
        self.leader_of(v).and_then(|id| self.groups.get(&id))
    }

    pub fn color_at(&self, x: i32, y: i32) -> Color {
        self.colors[self.vertex(x, y)]
    }

    /// Size of the 4-connected same-color group at `(x, y)`, or 0 if empty.
    pub fn ren_size(&self, x: i32, y: i32) -> usize {
        let v = self.vertex(x, y);
        self.group_at(v).map_or(0, |g| g.size())
    }

    /// Number of distinct empty 4-neighbors of the group at `(x, y)`.
    pub fn ren_space(&self, x: i32, y: i32) -> usize {
        let v = self.vertex(x, y);
        self.group_at(v).map_or(0, |g| g.num_liberties())
    }

    pub fn get_ko(&self, color: Color) -> Option<(i32, i32)> {
        match (self.ko_index, self.ko_color) {
            (Some(v), Some(c)) if c == color => Some(self.xy(v)),
            _ => None
        }
    }

    pub fn get_history(&self, color: Color, n: usize) -> Option<(i32, i32)> {
        self.history[color_index(color)].get(n).map(|v| self.xy(v))
    }

    pub fn has_ko(&self) -> bool {
        self.ko_index.is_some()
    }

    /// Heuristic seki predicate: `p` is considered a seki point when exactly
    /// two adjacent groups of opposite color each have exactly two
    /// liberties and those liberty sets are identical (the classic
    /// shared-two-liberty mutual-life shape). This is a simplification of
    /// full seki recognition, documented as a judgment call rather than one
    /// of the spec's declared open questions.
    fn is_seki(&self, v: usize) -> bool {
        let mut black_group: Option<&Ren> = None;
        let mut white_group: Option<&Ren> = None;

        for &q in &self.neighbors4(v) {
            if let Some(g) = self.group_at(q) {
                if g.num_liberties() != 2 { continue }

                match g.color {
                    Color::Black => black_group = Some(g),
                    Color::White => white_group = Some(g),
                    _ => {}
                }
            }
        }

        match (black_group, white_group) {
            (Some(b), Some(w)) => b.liberties == w.liberties,
            _ => false
        }
    }

    fn is_enabled_at(&self, v: usize, color: Color, check_seki: bool) -> bool {
        if self.colors[v] != Color::Empty {
            return false;
        }
        if self.ko_index == Some(v) && self.ko_color == Some(color) {
            return false;
        }
        if check_seki && self.is_seki(v) {
            return false;
        }

        let opposite = -color;

        self.neighbors4(v).iter().any(|&q| {
            match self.colors[q] {
                Color::Empty => true,
                c if c == color => self.group_at(q).map_or(false, |g| g.num_liberties() >= 2),
                c if c == opposite => self.group_at(q).map_or(false, |g| g.num_liberties() == 1),
                _ => false
            }
        })
    }

    pub fn is_enabled(&self, x: i32, y: i32, color: Color, check_seki: bool) -> bool {
        if x < 0 || y < 0 {
            return false;
        }

        self.is_enabled_at(self.vertex(x, y), color, check_seki)
    }

    fn clear_ko(&mut self) {
        self.ko_index = None;
        self.ko_color = None;
    }

    /// Plays a move. Returns the number of captured stones, `0` for a pass,
    /// or `-1` if the move is illegal (§4.4).
    pub fn play(&mut self, x: i32, y: i32, color: Color) -> i32 {
        if x < 0 || y < 0 {
            self.clear_ko();
            return 0;
        }

        let v = self.vertex(x, y);

        if !self.is_enabled_at(v, color, false) {
            return -1;
        }

        self.colors[v] = color;
        self.pattern.set(x as usize, y as usize, color);

        let mut new_group = Ren::new(color, v);
        for &q in &self.neighbors4(v) {
            if self.colors[q] == Color::Empty {
                new_group.liberties.insert(q);
            }
        }

        let leader = v as i32;
        self.ren_id[v] = leader;
        self.groups.insert(leader, new_group);

        // merge same-color neighbor groups into the one we just created.
        let same_color_leaders: HashSet<i32> = self.neighbors4(v).iter()
            .filter(|&&q| self.colors[q] == color)
            .filter_map(|&q| self.leader_of(q))
            .filter(|&id| id != leader)
            .collect();

        for other_leader in same_color_leaders {
            if let Some(mut other) = self.groups.remove(&other_leader) {
                other.liberties.remove(&v);
                let positions: Vec<usize> = other.positions.iter().cloned().collect();

                let mut current = self.groups.remove(&leader).expect("current group missing during merge");
                current.merge(other);

                for p in positions {
                    self.ren_id[p] = leader;
                }
                self.groups.insert(leader, current);
            }
        }

        // remove `v` as a liberty from every opposing neighbor group, then
        // capture any that reach zero liberties.
        let opposite = -color;
        let opponent_leaders: HashSet<i32> = self.neighbors4(v).iter()
            .filter(|&&q| self.colors[q] == opposite)
            .filter_map(|&q| self.leader_of(q))
            .collect();

        for &opp_leader in &opponent_leaders {
            if let Some(group) = self.groups.get_mut(&opp_leader) {
                group.liberties.remove(&v);
            }
        }

        let mut captured_positions = Vec::new();

        for &opp_leader in &opponent_leaders {
            let is_dead = self.groups.get(&opp_leader).map_or(false, |g| g.num_liberties() == 0);
            if !is_dead { continue }

            let group = self.groups.remove(&opp_leader).expect("opponent group missing during capture");
            for &p in &group.positions {
                self.colors[p] = Color::Empty;
                self.ren_id[p] = -1;
                let (px, py) = self.xy(p);
                self.pattern.clear(px as usize, py as usize);
                captured_positions.push(p);
            }
        }

        for &p in &captured_positions {
            for &q in &self.neighbors4(p) {
                if self.colors[q].is_stone() {
                    if let Some(leader) = self.leader_of(q) {
                        if let Some(group) = self.groups.get_mut(&leader) {
                            group.liberties.insert(p);
                        }
                    }
                }
            }
        }

        let captured_count = captured_positions.len();
        let own_group = self.groups.get(&leader).expect("own group missing after play");

        if captured_count == 1 && own_group.size() == 1 && own_group.num_liberties() == 1 {
            self.ko_index = Some(captured_positions[0]);
            self.ko_color = Some(opposite);
        } else {
            self.clear_ko();
        }

        self.history[color_index(color)].push(v);
        self.move_number += 1;

        for group in self.groups.values_mut() {
            group.shicho = false;
            group.fixed = false;
        }

        captured_count as i32
    }

    /// Maximum number of explicit-stack frames explored by `is_shicho`
    /// before a branch is conservatively treated as "not ladder" (§9 open
    /// question 2).
    fn max_ladder_depth(&self) -> usize {
        2 * self.width * self.height
    }

    /// Ladder (shicho) detection, iterative DFS bounded by
    /// `max_ladder_depth` stack frames (§4.4).
    pub fn is_shicho(&self, x: i32, y: i32) -> bool {
        let v = self.vertex(x, y);
        let group = match self.group_at(v) {
            Some(g) => g,
            None => return false
        };
        if group.num_liberties() != 1 {
            return false;
        }

        let defender = group.color;
        let attacker = -defender;
        let max_depth = self.max_ladder_depth();

        let mut stack = vec![(self.clone(), v, 0usize)];

        while let Some((board, target, depth)) = stack.pop() {
            if depth > max_depth {
                continue;
            }

            let group = match board.group_at(target) {
                Some(g) => g,
                None => continue
            };
            debug_assert_eq!(group.num_liberties(), 1);

            // Step 1: can the defender capture an adjacent attacker group
            // to gain a liberty instead of running?
            let can_escape_by_capture = group.positions.iter().any(|&p| {
                board.neighbors4(p).iter().any(|&q| {
                    board.colors[q] == attacker &&
                        board.group_at(q).map_or(false, |g| g.num_liberties() == 1)
                })
            });
            if can_escape_by_capture {
                continue;
            }

            // Step 2: defender plays its unique liberty.
            let liberty = *group.liberties.iter().next().expect("one-liberty group has a liberty");
            let (lx, ly) = board.xy(liberty);

            let mut extended = board.clone();
            if extended.play(lx, ly, defender) < 0 {
                return true; // illegal (e.g. ko) -- defender cannot escape
            }

            // Step 3: look at the new liberty count of the extended group.
            let new_group = extended.group_at(liberty).expect("just-played group exists");
            match new_group.num_liberties() {
                0 => unreachable!("a group that just gained a liberty cannot have zero"),
                1 => return true,
                2 => {
                    let liberties: Vec<usize> = new_group.liberties.iter().cloned().collect();

                    for &lib in &liberties {
                        let (ax, ay) = extended.xy(lib);
                        let mut chased = extended.clone();

                        if chased.play(ax, ay, attacker) < 0 {
                            continue;
                        }

                        stack.push((chased, liberty, depth + 1));
                    }
                },
                _ => continue // escaped with room to spare
            }
        }

        false
    }

    /// Connected components of empty vertices on the real board, together
    /// with the set of stone colors bordering each component.
    fn compute_empty_regions(&self) -> (HashMap<usize, usize>, Vec<HashSet<Color>>) {
        let mut region_of: HashMap<usize, usize> = HashMap::new();
        let mut region_colors: Vec<HashSet<Color>> = Vec::new();

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let start = self.vertex(x, y);
                if self.colors[start] != Color::Empty || region_of.contains_key(&start) {
                    continue;
                }

                let region_id = region_colors.len();
                let mut colors = HashSet::new();
                let mut stack = vec![start];
                region_of.insert(start, region_id);

                while let Some(v) = stack.pop() {
                    for &q in &self.neighbors4(v) {
                        match self.colors[q] {
                            Color::Empty => {
                                if !region_of.contains_key(&q) {
                                    region_of.insert(q, region_id);
                                    stack.push(q);
                                }
                            },
                            Color::Black => { colors.insert(Color::Black); },
                            Color::White => { colors.insert(Color::White); },
                            Color::Edge => {}
                        }
                    }
                }

                region_colors.push(colors);
            }
        }

        (region_of, region_colors)
    }

    /// Territory scoring via the iterative seed-fill + fixed-group demotion
    /// algorithm of §4.4. Returns one color per real board cell, row-major.
    pub fn get_territories(&self) -> Vec<Color> {
        let (region_of, region_colors) = self.compute_empty_regions();
        let num_regions = region_colors.len();

        // a region only ever *can* be fixed if it borders exactly one color.
        let mut region_fixed: Vec<bool> = region_colors.iter()
            .map(|colors| colors.len() == 1)
            .collect();
        let mut group_fixed: HashMap<i32, bool> = self.groups.keys().map(|&k| (k, true)).collect();

        // groups adjacent to each region, and regions adjacent to each group.
        let mut group_regions: HashMap<i32, HashSet<usize>> = HashMap::new();
        for (&leader, group) in &self.groups {
            let mut adjacent = HashSet::new();
            for &p in &group.positions {
                for &q in &self.neighbors4(p) {
                    if let Some(&region_id) = region_of.get(&q) {
                        adjacent.insert(region_id);
                    }
                }
            }
            group_regions.insert(leader, adjacent);
        }

        loop {
            let mut changed = false;

            for (&leader, group) in &self.groups {
                if !group_fixed[&leader] { continue }

                let fixed_same_color_regions = group_regions[&leader].iter()
                    .filter(|&&region_id| region_colors[region_id].len() == 1)
                    .filter(|&&region_id| region_colors[region_id].iter().next() == Some(&group.color))
                    .filter(|&&region_id| region_fixed[region_id])
                    .count();

                if fixed_same_color_regions < 2 {
                    group_fixed.insert(leader, false);
                    changed = true;
                }
            }

            for region_id in 0..num_regions {
                if !region_fixed[region_id] { continue }
                if region_colors[region_id].len() != 1 { continue }

                let all_bordering_groups_fixed = self.groups.iter()
                    .filter(|(leader, _)| group_regions[leader].contains(&region_id))
                    .all(|(leader, _)| group_fixed[leader]);

                if !all_bordering_groups_fixed {
                    region_fixed[region_id] = false;
                    changed = true;
                }
            }

            if !changed { break }
        }

        let mut output = vec![Color::Empty; self.width * self.height];

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let v = self.vertex(x, y);
                let out_index = (y as usize) * self.width + (x as usize);

                match self.colors[v] {
                    Color::Empty => {
                        if let Some(&region_id) = region_of.get(&v) {
                            if region_fixed[region_id] && region_colors[region_id].len() == 1 {
                                output[out_index] = *region_colors[region_id].iter().next().unwrap();
                            }
                        }
                    },
                    Color::Black | Color::White => {
                        if let Some(leader) = self.leader_of(v) {
                            if group_fixed.get(&leader).copied().unwrap_or(false) {
                                output[out_index] = self.colors[v];
                            }
                        }
                    },
                    Color::Edge => unreachable!("real board cells are never Edge")
                }
            }
        }

        output
    }

    /// Owner map (§4.4): territories, plus unresolved stones assigned to
    /// their own current color, plus (for non-Japanese rules) any
    /// single-color-bordered empty region regardless of fixed status.
    pub fn get_owners(&self) -> Vec<Color> {
        let mut owners = self.get_territories();
        let (region_of, region_colors) = self.compute_empty_regions();

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let v = self.vertex(x, y);
                let out_index = (y as usize) * self.width + (x as usize);

                if owners[out_index] != Color::Empty { continue }

                match self.colors[v] {
                    Color::Black | Color::White => {
                        owners[out_index] = self.colors[v];
                    },
                    Color::Empty if !self.rule.is_japanese() => {
                        if let Some(&region_id) = region_of.get(&v) {
                            if region_colors[region_id].len() == 1 {
                                owners[out_index] = *region_colors[region_id].iter().next().unwrap();
                            }
                        }
                    },
                    _ => {}
                }
            }
        }

        owners
    }

    /// Packs the current position into the persisted-state layout of §6:
    /// the `Pattern` words, one word for ko, then two words for history.
    pub fn get_state(&self) -> Vec<u32> {
        let mut words = self.pattern.words().to_vec();

        let ko_word = {
            let ko_index_code = self.ko_index.map_or(0, |v| {
                let (x, y) = self.xy(v);
                (y as u32) * (self.width as u32) + (x as u32) + 1
            });
            let ko_color_code = match self.ko_color {
                None => 0,
                Some(Color::White) => 1,
                Some(Color::Black) => 2,
                Some(_) => 0
            };

            (ko_index_code << 2) | ko_color_code
        };
        words.push(ko_word);

        words.push(self.history[0].pack());
        words.push(self.history[1].pack());

        words
    }

    /// Restores a position from `get_state`'s layout by replaying stones in
    /// row-major order through `play`, then restoring ko and history
    /// directly. Intentionally does not preserve group identities.
    pub fn load_state(&mut self, words: &[u32]) {
        let num_pattern_words = Pattern::new(self.width, self.height).num_words();
        debug_assert_eq!(words.len(), num_pattern_words + 3);

        let pattern = Pattern::from_words(self.width, self.height, words[..num_pattern_words].to_vec());

        *self = Board::new(self.width, self.height, self.rule, self.komi, self.superko);

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                match pattern.get(x as usize, y as usize) {
                    Color::Black => { self.play(x, y, Color::Black); },
                    Color::White => { self.play(x, y, Color::White); },
                    _ => {}
                }
            }
        }

        let ko_word = words[num_pattern_words];
        let ko_color_code = ko_word & 0b11;
        let ko_index_code = ko_word >> 2;

        if ko_index_code > 0 {
            let flat = (ko_index_code - 1) as usize;
            let (x, y) = ((flat % self.width) as i32, (flat / self.width) as i32);
            self.ko_index = Some(self.vertex(x, y));
        } else {
            self.ko_index = None;
        }

        self.ko_color = match ko_color_code {
            0 => None,
            2 => Some(Color::Black),
            1 => Some(Color::White),
            _ => None
        };

        self.history[0] = History::unpack(words[num_pattern_words + 1]);
        self.history[1] = History::unpack(words[num_pattern_words + 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_board() -> Board {
        Board::new(9, 9, Rule::Japanese, 7.5, false)
    }

    #[test]
    fn play_places_a_stone() {
        let mut board = new_board();

        assert_eq!(board.play(4, 4, Color::Black), 0);
        assert_eq!(board.color_at(4, 4), Color::Black);
        assert_eq!(board.ren_size(4, 4), 1);
        assert_eq!(board.ren_space(4, 4), 4);
    }

    #[test]
    fn occupied_cell_is_illegal() {
        let mut board = new_board();
        board.play(4, 4, Color::Black);

        assert_eq!(board.play(4, 4, Color::White), -1);
    }

    #[test]
    fn capture_removes_stones_and_restores_liberties() {
        let mut board = new_board();

        board.play(0, 0, Color::Black);
        board.play(0, 1, Color::White);
        assert_eq!(board.play(1, 0, Color::White), 1);

        assert_eq!(board.color_at(0, 0), Color::Empty);
        assert_eq!(board.ren_space(0, 1), 2);
    }

    #[test]
    fn merges_same_color_groups() {
        let mut board = new_board();

        board.play(3, 3, Color::Black);
        board.play(4, 3, Color::Black);

        assert_eq!(board.ren_size(3, 3), 2);
        assert_eq!(board.ren_size(4, 3), 2);
    }

    #[test]
    fn suicide_is_illegal() {
        let mut board = Board::new(3, 3, Rule::Japanese, 0.0, false);

        board.play(1, 0, Color::Black);
        board.play(0, 1, Color::Black);
        board.play(2, 1, Color::Black);
        board.play(1, 2, Color::Black);

        assert_eq!(board.play(1, 1, Color::White), -1);
    }

    #[test]
    fn ko_forbids_immediate_recapture() {
        let mut board = new_board();

        board.play(3, 3, Color::Black);
        board.play(4, 3, Color::White);
        board.play(4, 4, Color::Black);
        board.play(3, 4, Color::White);
        board.play(2, 3, Color::Black);
        assert_eq!(board.play(3, 3, Color::White), 1);

        assert_eq!(board.get_ko(Color::Black), Some((4, 3)));
        assert!(!board.is_enabled(4, 3, Color::Black, false));

        board.play(0, 0, Color::Black);
        board.play(8, 8, Color::White);
        assert!(board.is_enabled(4, 3, Color::Black, false));
    }

    #[test]
    fn get_state_load_state_round_trips() {
        let mut board = new_board();
        board.play(3, 3, Color::Black);
        board.play(4, 3, Color::White);
        board.play(4, 4, Color::Black);

        let state = board.get_state();
        let mut restored = new_board();
        restored.load_state(&state);

        for y in 0..9 {
            for x in 0..9 {
                assert_eq!(restored.color_at(x, y), board.color_at(x, y));
            }
        }
        assert_eq!(restored.get_history(Color::Black, 0), board.get_history(Color::Black, 0));
        assert_eq!(restored.get_ko(Color::Black), board.get_ko(Color::Black));
        assert_eq!(restored.get_ko(Color::White), board.get_ko(Color::White));
    }

    #[test]
    fn ladder_captures_in_a_corner_chase() {
        let mut board = new_board();

        board.play(2, 2, Color::Black);
        board.play(2, 1, Color::White);
        board.play(3, 2, Color::White);
        board.play(1, 2, Color::Black);

        assert!(board.is_shicho(1, 2));
    }

    #[test]
    fn ladder_is_local_and_ignores_distant_stones() {
        let mut board = new_board();
        board.play(6, 6, Color::Black); // ladder breaker, far away

        board.play(2, 2, Color::Black);
        board.play(2, 1, Color::White);
        board.play(3, 2, Color::White);
        board.play(1, 2, Color::Black);

        assert!(board.is_shicho(1, 2));
    }

    #[test]
    fn group_with_more_than_one_liberty_is_not_a_ladder() {
        let mut board = new_board();
        board.play(4, 4, Color::Black);

        assert!(!board.is_shicho(4, 4));
    }

    #[test]
    fn enabled_cell_is_always_playable() {
        let board = new_board();

        for y in 0..9 {
            for x in 0..9 {
                if board.is_enabled(x, y, Color::Black, false) {
                    let mut copy = board.clone();
                    assert!(copy.play(x, y, Color::Black) >= 0);
                }
            }
        }
    }

    #[test]
    fn history_includes_most_recent_move() {
        let mut board = new_board();
        board.play(4, 4, Color::Black);

        assert_eq!(board.get_history(Color::Black, 0), Some((4, 4)));
    }
}
