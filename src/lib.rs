//! Crashpit - a local two-player physics car arena.
//!
//! Two vehicles drop into a walled arena and drive left or right. Each
//! carries a vulnerable head above its chassis: the round ends the moment
//! a head touches anything that is not its own vehicle, or sinks below
//! the rising water line. Rigid-body dynamics are delegated entirely to
//! rapier2d; this crate owns the round lifecycle, the vehicle and arena
//! catalogs, input sampling, hazard escalation and death resolution.
//!
//! The embedding UI shell drives a [`game::GameSession`]: forward the
//! host's key events, call [`game::GameSession::tick`] once per fixed
//! timestep, and render from the session's event stream and score pair.

pub mod config;
pub mod game;
pub mod physics;
pub mod util;

pub use config::{Config, ConfigError};
pub use game::events::{RoundEndReason, SessionEvent};
pub use game::{GameConfig, GameSession, PlayerId, RoundPhase};
