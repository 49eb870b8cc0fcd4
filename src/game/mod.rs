//! Game simulation modules

pub mod arena;
pub mod collision;
pub mod events;
pub mod hazard;
pub mod input;
pub mod session;
pub mod vehicle;

pub use session::{GameConfig, GameSession, RoundPhase};

use serde::{Deserialize, Serialize};

/// One of the two local players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    /// Canonical evaluation order: player one is always checked first.
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerId::One => write!(f, "player 1"),
            PlayerId::Two => write!(f, "player 2"),
        }
    }
}

/// Directional input held by one player for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub left: bool,
    pub right: bool,
}

impl DriveInput {
    /// Net drive direction. Both keys held cancel out: each force still
    /// applies, they just sum to zero.
    pub fn axis(self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }
}
