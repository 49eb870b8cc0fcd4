//! Configuration module - environment variable parsing

use std::env;

use tracing::warn;

use crate::game::arena::MapType;
use crate::game::hazard::{HazardConfig, HazardKind};
use crate::game::input::KeyBindings;
use crate::game::session::GameConfig;
use crate::game::vehicle::VehicleType;
use crate::util::time::unix_millis;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Session setup handed to the game
    pub game: GameConfig,
    /// Rounds the demo binary plays before exiting
    pub demo_rounds: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let game = GameConfig {
            arena_width: env_f32("ARENA_WIDTH", 1280.0)?,
            arena_height: env_f32("ARENA_HEIGHT", 720.0)?,
            gravity: env_f32("GRAVITY", 981.0)?,
            map: parse_map(&env_or("MAP", "stadium")),
            vehicles: [
                parse_vehicle(&env_or("P1_VEHICLE", "truck"))?,
                parse_vehicle(&env_or("P2_VEHICLE", "truck"))?,
            ],
            hazard: HazardConfig {
                kind: parse_hazard(&env_or("HAZARD", "water"))?,
                trigger_delay_secs: env_f32("HAZARD_DELAY_SECS", 10.0)?,
                rise_per_tick: env_f32("HAZARD_RISE_PER_TICK", 1.2)?,
            },
            bindings: [
                KeyBindings {
                    left: env_or("P1_KEY_LEFT", "KeyA"),
                    right: env_or("P1_KEY_RIGHT", "KeyD"),
                },
                KeyBindings {
                    left: env_or("P2_KEY_LEFT", "ArrowLeft"),
                    right: env_or("P2_KEY_RIGHT", "ArrowRight"),
                },
            ],
            seed: env_u64("SEED", unix_millis())?,
        };

        Ok(Self {
            log_level: env_or("LOG_LEVEL", "info"),
            game,
            demo_rounds: env_u32("DEMO_ROUNDS", 3)?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An unknown vehicle key would build a broken vehicle; fail before one exists.
    #[error("Unknown vehicle type: {0:?} (expected racer, truck or tank)")]
    UnknownVehicleType(String),

    #[error("Unknown hazard kind: {0:?} (expected water or bar)")]
    UnknownHazardKind(String),

    #[error("Invalid numeric value for {0}")]
    InvalidNumber(&'static str),
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &'static str, default: f32) -> Result<f32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

fn env_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

fn env_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Parse a vehicle type key. Unknown keys are a fatal configuration
/// error: there is no sensible vehicle to degrade to.
pub fn parse_vehicle(key: &str) -> Result<VehicleType, ConfigError> {
    match key.to_ascii_lowercase().as_str() {
        "racer" => Ok(VehicleType::Racer),
        "truck" => Ok(VehicleType::Truck),
        "tank" => Ok(VehicleType::Tank),
        _ => Err(ConfigError::UnknownVehicleType(key.to_string())),
    }
}

/// Parse a map key. Unknown keys degrade to the base arena - the map is
/// cosmetic, so this is a warning rather than an error.
pub fn parse_map(key: &str) -> MapType {
    match key.to_ascii_lowercase().as_str() {
        "stadium" => MapType::Stadium,
        "seesaw" => MapType::Seesaw,
        "ufo" => MapType::Ufo,
        "basic" => MapType::Basic,
        other => {
            warn!(map = other, "unknown map type, falling back to base walls");
            MapType::Basic
        }
    }
}

pub fn parse_hazard(key: &str) -> Result<HazardKind, ConfigError> {
    match key.to_ascii_lowercase().as_str() {
        "water" | "rising_water" => Ok(HazardKind::RisingWater),
        "bar" | "crush_bar" => Ok(HazardKind::CrushBar),
        _ => Err(ConfigError::UnknownHazardKind(key.to_string())),
    }
}
