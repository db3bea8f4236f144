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

/// Scoring rule set. The integer codes only need to be distinct (§6); the
/// actual values are chosen to match the `RULE` configuration string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Chinese,
    Japanese,
    Combination
}

impl Rule {
    pub const RULE_CH: i32 = 0;
    pub const RULE_JP: i32 = 1;
    pub const RULE_COM: i32 = 2;

    pub fn as_i32(self) -> i32 {
        match self {
            Rule::Chinese => Rule::RULE_CH,
            Rule::Japanese => Rule::RULE_JP,
            Rule::Combination => Rule::RULE_COM
        }
    }

    pub fn is_japanese(self) -> bool {
        matches!(self, Rule::Japanese)
    }

    pub fn from_config_str(value: &str) -> Rule {
        match value {
            "ch" => Rule::Chinese,
            "com" => Rule::Combination,
            _ => Rule::Japanese
        }
    }
}

impl Default for Rule {
    fn default() -> Rule {
        Rule::Japanese
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        assert_ne!(Rule::RULE_CH, Rule::RULE_JP);
        assert_ne!(Rule::RULE_JP, Rule::RULE_COM);
        assert_ne!(Rule::RULE_CH, Rule::RULE_COM);
    }

    #[test]
    fn from_config_str_defaults_to_japanese() {
        assert_eq!(Rule::from_config_str("bogus"), Rule::Japanese);
        assert_eq!(Rule::from_config_str("ch"), Rule::Chinese);
        assert_eq!(Rule::from_config_str("com"), Rule::Combination);
    }
}
