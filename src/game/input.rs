//! Held-key tracking, written asynchronously by the host's key events and
//! read synchronously once per tick.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{DriveInput, PlayerId};

/// One player's fixed key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: String,
    pub right: String,
}

impl KeyBindings {
    /// Default bindings: WASD-style for player 1, arrows for player 2.
    pub fn default_for(player: PlayerId) -> Self {
        match player {
            PlayerId::One => Self {
                left: "KeyA".to_string(),
                right: "KeyD".to_string(),
            },
            PlayerId::Two => Self {
                left: "ArrowLeft".to_string(),
                right: "ArrowRight".to_string(),
            },
        }
    }
}

/// Tracks which key codes are currently held.
#[derive(Debug, Clone)]
pub struct InputSampler {
    held: HashSet<String>,
    bindings: [KeyBindings; 2],
}

impl InputSampler {
    pub fn new(bindings: [KeyBindings; 2]) -> Self {
        Self {
            held: HashSet::new(),
            bindings,
        }
    }

    pub fn key_down(&mut self, code: &str) {
        self.held.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Read the held state for one player. Bound keys only; anything else
    /// held is ignored.
    pub fn sample(&self, player: PlayerId) -> DriveInput {
        let bindings = &self.bindings[player.index()];
        DriveInput {
            left: self.held.contains(&bindings.left),
            right: self.held.contains(&bindings.right),
        }
    }

    /// Release every key (round restart keeps no stale holds).
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new([
            KeyBindings::default_for(PlayerId::One),
            KeyBindings::default_for(PlayerId::Two),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reflects_held_keys() {
        let mut sampler = InputSampler::default();
        assert_eq!(sampler.sample(PlayerId::One), DriveInput::default());

        sampler.key_down("KeyD");
        assert!(sampler.sample(PlayerId::One).right);
        assert!(!sampler.sample(PlayerId::Two).right);

        sampler.key_up("KeyD");
        assert_eq!(sampler.sample(PlayerId::One), DriveInput::default());
    }

    #[test]
    fn both_keys_may_be_held_at_once() {
        let mut sampler = InputSampler::default();
        sampler.key_down("ArrowLeft");
        sampler.key_down("ArrowRight");
        let input = sampler.sample(PlayerId::Two);
        assert!(input.left && input.right);
        assert_eq!(input.axis(), 0.0);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space");
        assert_eq!(sampler.sample(PlayerId::One), DriveInput::default());
        assert_eq!(sampler.sample(PlayerId::Two), DriveInput::default());
    }

    #[test]
    fn release_all_clears_holds() {
        let mut sampler = InputSampler::default();
        sampler.key_down("KeyA");
        sampler.key_down("ArrowRight");
        sampler.release_all();
        assert_eq!(sampler.sample(PlayerId::One), DriveInput::default());
        assert_eq!(sampler.sample(PlayerId::Two), DriveInput::default());
    }
}
