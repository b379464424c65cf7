use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::Layout;
use crate::error::PinPadError;
use crate::preset::{preset_layout, LayoutName};
use crate::render::{render, Frame};
use crate::sequence::{Sequence, Target};

/// Grid-relative moves (gym action ids 0..=4).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Stay = 0,
    /// `y + 1`
    South = 1,
    /// `y - 1`
    North = 2,
    /// `x + 1`
    East = 3,
    /// `x - 1`
    West = 4,
}

impl Action {
    pub const ALL: [Action; 5] = [Action::Stay, Action::South, Action::North, Action::East, Action::West];

    pub fn delta(self) -> (i64, i64) {
        match self {
            Action::Stay => (0, 0),
            Action::South => (0, 1),
            Action::North => (0, -1),
            Action::East => (1, 0),
            Action::West => (-1, 0),
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = PinPadError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => Action::Stay,
            1 => Action::South,
            2 => Action::North,
            3 => Action::East,
            4 => Action::West,
            _ => return Err(PinPadError::InvalidAction(v)),
        })
    }
}

/// Discrete action space `{0, .., n-1}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrete {
    pub n: usize,
}

impl Discrete {
    pub fn contains(&self, action: i64) -> bool { action >= 0 && (action as usize) < self.n }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> i64 { rng.gen_range(0..self.n) as i64 }
}

/// Fixed-shape `u8` image space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpace {
    pub low: u8,
    pub high: u8,
    pub shape: [usize; 3],
}

pub const ACTION_SPACE: Discrete = Discrete { n: Action::ALL.len() };
pub const OBSERVATION_SPACE: ImageSpace = ImageSpace { low: 0, high: 255, shape: Frame::SHAPE };

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOptions {
    /// Place the player here instead of drawing a spawn.
    #[serde(default)]
    pub player: Option<(usize, usize)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub player: (usize, usize),
    pub sequence: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub observation: Frame,
    pub reward: f64,
    /// Never set; episode length belongs to the caller.
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

/// One Pin Pad episode: owns the map, the player, the visited sequence and the RNG.
#[derive(Clone, Debug)]
pub struct PinPad {
    layout: Layout,
    target: Target,
    rng: StdRng,
    player: (usize, usize),
    sequence: Sequence,
}

impl PinPad {
    /// Build from raw map text.
    pub fn new(layout_text: &str, target: Target) -> Result<Self, PinPadError> {
        Self::from_layout(Layout::parse(layout_text)?, target)
    }

    /// Build from a shipped map with an empty single target.
    pub fn make(name: LayoutName) -> Result<Self, PinPadError> {
        Self::from_layout(preset_layout(name)?, Target::default())
    }

    pub fn from_layout(layout: Layout, target: Target) -> Result<Self, PinPadError> {
        let mut rng = StdRng::from_entropy();
        let player = draw_spawn(&layout, &mut rng)?;
        tracing::debug!(
            width = layout.width(),
            height = layout.height(),
            pads = layout.pads().len(),
            "pinpad environment created"
        );
        Ok(Self { layout, target, rng, player, sequence: Sequence::new() })
    }

    pub fn reset(
        &mut self,
        seed: Option<u64>,
        options: Option<ResetOptions>,
    ) -> Result<(Frame, Info), PinPadError> {
        let requested = options.and_then(|o| o.player);
        if let Some((x, y)) = requested {
            let walkable = self.layout.get(x, y).is_some_and(|c| !c.is_wall());
            if !walkable {
                return Err(PinPadError::InvalidSpawn { x, y });
            }
        }
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        // Drawn even when overridden so the RNG stream does not depend on options.
        let drawn = draw_spawn(&self.layout, &mut self.rng)?;
        self.player = requested.unwrap_or(drawn);
        self.sequence.clear();
        tracing::debug!(?seed, player = ?self.player, "episode reset");
        Ok((self.render(), self.info()))
    }

    pub fn step(&mut self, action: i64) -> Result<StepOutcome, PinPadError> {
        let action = Action::try_from(action)?;
        Ok(self.apply(action))
    }

    pub fn apply(&mut self, action: Action) -> StepOutcome {
        let (x, y) = self.candidate(self.player, action);
        // The tracker sees the destination cell; a wall bump observes the wall.
        let tile = self.layout.cell(x, y);
        if !tile.is_wall() {
            self.player = (x, y);
        }
        let appended = self.sequence.observe(tile.pad());
        let reward = self.target.reward(&self.sequence);
        tracing::trace!(?action, player = ?self.player, appended, reward, "step");
        StepOutcome {
            observation: self.render(),
            reward,
            terminated: false,
            truncated: false,
            info: self.info(),
        }
    }

    /// Clamp the move to the grid, then refuse it if it lands on a wall.
    pub fn transition(&self, from: (usize, usize), action: Action) -> (usize, usize) {
        let (x, y) = self.candidate(from, action);
        if self.layout.cell(x, y).is_wall() { from } else { (x, y) }
    }

    /// Destination of a move with each axis clamped to the grid; may be a wall.
    fn candidate(&self, from: (usize, usize), action: Action) -> (usize, usize) {
        let (dx, dy) = action.delta();
        let x = (from.0 as i64 + dx).clamp(0, self.layout.width() as i64 - 1) as usize;
        let y = (from.1 as i64 + dy).clamp(0, self.layout.height() as i64 - 1) as usize;
        (x, y)
    }

    pub fn render(&self) -> Frame { render(&self.layout, self.player, self.sequence.as_slice()) }

    pub fn info(&self) -> Info {
        Info { player: self.player, sequence: self.sequence.as_string() }
    }

    pub fn player(&self) -> (usize, usize) { self.player }
    pub fn sequence(&self) -> &Sequence { &self.sequence }
    pub fn layout(&self) -> &Layout { &self.layout }
    pub fn target(&self) -> &Target { &self.target }
    pub fn action_space(&self) -> Discrete { ACTION_SPACE }
    pub fn observation_space(&self) -> ImageSpace { OBSERVATION_SPACE }
}

fn draw_spawn(layout: &Layout, rng: &mut StdRng) -> Result<(usize, usize), PinPadError> {
    layout
        .spawns()
        .choose(rng)
        .copied()
        .ok_or_else(|| PinPadError::MalformedLayout("layout has no walkable cell".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_ids_map_to_grid_offsets() {
        assert_eq!(Action::try_from(1).unwrap().delta(), (0, 1));
        assert_eq!(Action::try_from(2).unwrap().delta(), (0, -1));
        assert_eq!(Action::try_from(3).unwrap().delta(), (1, 0));
        assert_eq!(Action::try_from(4).unwrap().delta(), (-1, 0));
        assert_eq!(Action::try_from(5), Err(PinPadError::InvalidAction(5)));
        assert_eq!(Action::try_from(-1), Err(PinPadError::InvalidAction(-1)));
    }

    #[test]
    fn spaces_are_fixed() {
        assert_eq!(ACTION_SPACE.n, 5);
        assert!(ACTION_SPACE.contains(4) && !ACTION_SPACE.contains(5));
        assert_eq!(OBSERVATION_SPACE.shape, [64, 64, 3]);
    }

    #[test]
    fn transition_clamps_before_wall_check() {
        let env = PinPad::new(" #\n  ", Target::default()).unwrap();
        // leaving the grid clamps back onto the start cell
        assert_eq!(env.transition((0, 0), Action::North), (0, 0));
        assert_eq!(env.transition((0, 0), Action::West), (0, 0));
        // wall to the east
        assert_eq!(env.transition((0, 0), Action::East), (0, 0));
        assert_eq!(env.transition((0, 0), Action::South), (0, 1));
        assert_eq!(env.transition((0, 1), Action::East), (1, 1));
        assert_eq!(env.transition((1, 1), Action::North), (1, 1));
    }

    #[test]
    fn wall_bump_observes_the_wall_not_the_start_pad() {
        let mut env = PinPad::new("1#\n  ", Target::default()).unwrap();
        env.reset(Some(0), Some(ResetOptions { player: Some((0, 0)) })).unwrap();
        let out = env.apply(Action::East);
        assert_eq!(out.info.player, (0, 0));
        assert_eq!(out.info.sequence, "");
        // clamped off-grid move lands back on the pad and records it
        let out = env.apply(Action::North);
        assert_eq!(out.info.sequence, "1");
    }

    #[test]
    fn rejected_override_leaves_state_untouched() {
        let mut env = PinPad::new(" #\n1 ", Target::default()).unwrap();
        env.reset(Some(3), Some(ResetOptions { player: Some((0, 1)) })).unwrap();
        env.apply(Action::Stay);
        assert_eq!(env.info().sequence, "1");
        let wall = env.reset(None, Some(ResetOptions { player: Some((1, 0)) }));
        assert_eq!(wall.unwrap_err(), PinPadError::InvalidSpawn { x: 1, y: 0 });
        let outside = env.reset(None, Some(ResetOptions { player: Some((7, 0)) }));
        assert_eq!(outside.unwrap_err(), PinPadError::InvalidSpawn { x: 7, y: 0 });
        assert_eq!(env.player(), (0, 1));
        assert_eq!(env.info().sequence, "1");
    }
}
