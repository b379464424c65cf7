use serde::{Deserialize, Serialize};

/// Number of trailing entries compared against a single target and drawn in the strip.
pub const RECENT_LEN: usize = 7;

pub const SINGLE_TARGET_REWARD: f64 = 10.0;
pub const MULTI_TARGET_REWARD: f64 = 1.0;

/// Pads visited during an episode, consecutive repeats collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    visited: Vec<char>,
}

impl Sequence {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) { self.visited.clear(); }

    /// Record the tile under the player after a move. Only pads are recorded, and only
    /// when they differ from the last recorded pad. Returns whether an entry was appended.
    pub fn observe(&mut self, tile: Option<char>) -> bool {
        match tile {
            Some(pad) if self.last() != Some(pad) => {
                self.visited.push(pad);
                true
            }
            _ => false,
        }
    }

    pub fn as_slice(&self) -> &[char] { &self.visited }

    /// Trailing (up to) `RECENT_LEN` entries.
    pub fn recent(&self) -> &[char] {
        let start = self.visited.len().saturating_sub(RECENT_LEN);
        &self.visited[start..]
    }

    pub fn last(&self) -> Option<char> { self.visited.last().copied() }

    pub fn len(&self) -> usize { self.visited.len() }

    pub fn is_empty(&self) -> bool { self.visited.is_empty() }

    pub fn as_string(&self) -> String { self.visited.iter().collect() }
}

/// Reward pattern(s) fixed at construction. The two modes reward differently:
/// `Single` matches the trailing window and pays 10.0, `Multi` matches the whole
/// sequence against any pattern and pays 1.0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Single(Vec<char>),
    Multi(Vec<Vec<char>>),
}

impl Default for Target {
    fn default() -> Self { Target::Single(Vec::new()) }
}

impl Target {
    pub fn single(pattern: &str) -> Self { Target::Single(pattern.chars().collect()) }

    pub fn multi<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Target::Multi(patterns.into_iter().map(|p| p.as_ref().chars().collect()).collect())
    }

    pub fn reward(&self, sequence: &Sequence) -> f64 {
        match self {
            Target::Single(pattern) => {
                if sequence.recent() == pattern.as_slice() { SINGLE_TARGET_REWARD } else { 0.0 }
            }
            Target::Multi(patterns) => {
                if patterns.iter().any(|p| p.as_slice() == sequence.as_slice()) {
                    MULTI_TARGET_REWARD
                } else {
                    0.0
                }
            }
        }
    }
}
