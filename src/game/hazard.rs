//! Time-driven hazard escalation.
//!
//! One hazard per round, armed a fixed delay after the round starts and
//! never disarmed. Rising water raises a scalar death threshold each tick
//! without cap; the crush bar variant instead lowers a spinning kinematic
//! bar into the arena.

use rapier2d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

use crate::physics::{BodyId, BodyRole, BodySpec, PhysicsWorld, Shape, GROUP_HAZARD};

/// Vertical drop of the crush bar per tick.
const BAR_DESCENT_PER_TICK: f32 = 1.0;
/// Rotation of the crush bar per tick (radians).
const BAR_SPIN_PER_TICK: f32 = 0.1;
const BAR_HALF_WIDTH: f32 = 300.0;
const BAR_HALF_HEIGHT: f32 = 20.0;

/// Which escalating hazard a round uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Water rises from the arena floor; a submerged head loses
    RisingWater,
    /// A heavy spinning bar descends from above
    CrushBar,
}

impl Default for HazardKind {
    fn default() -> Self {
        Self::RisingWater
    }
}

/// Hazard timing parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HazardConfig {
    pub kind: HazardKind,
    /// Seconds after round start before the hazard arms
    pub trigger_delay_secs: f32,
    /// Water level increase per tick once armed
    pub rise_per_tick: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            kind: HazardKind::RisingWater,
            trigger_delay_secs: 10.0,
            rise_per_tick: 1.2,
        }
    }
}

/// Per-round hazard state. Rebuilt from config on every round start.
#[derive(Debug)]
pub struct HazardClock {
    config: HazardConfig,
    elapsed: f32,
    triggered: bool,
    level: f32,
    bar: Option<BodyId>,
    bar_y: f32,
    bar_angle: f32,
}

impl HazardClock {
    pub fn new(config: HazardConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            triggered: false,
            level: 0.0,
            bar: None,
            bar_y: -2.0 * BAR_HALF_HEIGHT,
            bar_angle: 0.0,
        }
    }

    /// Advance the clock by one tick. Returns true on the tick the hazard
    /// arms. The arming tick is also the first escalation tick.
    pub fn tick(&mut self, dt: f32, world: &mut PhysicsWorld, arena_width: f32) -> bool {
        self.elapsed += dt;

        let mut just_triggered = false;
        if !self.triggered && self.elapsed >= self.config.trigger_delay_secs {
            self.triggered = true;
            just_triggered = true;
            if self.config.kind == HazardKind::CrushBar {
                self.spawn_bar(world, arena_width);
            }
        }

        if self.triggered {
            match self.config.kind {
                HazardKind::RisingWater => {
                    self.level += self.config.rise_per_tick;
                }
                HazardKind::CrushBar => {
                    self.bar_y += BAR_DESCENT_PER_TICK;
                    self.bar_angle += BAR_SPIN_PER_TICK;
                    if let Some(bar) = self.bar {
                        world.set_kinematic_pose(bar, arena_width / 2.0, self.bar_y, self.bar_angle);
                    }
                }
            }
        }

        just_triggered
    }

    fn spawn_bar(&mut self, world: &mut PhysicsWorld, arena_width: f32) {
        let bar = world.insert(
            BodySpec::kinematic(
                BodyRole::Hazard,
                Shape::Cuboid {
                    half_width: BAR_HALF_WIDTH,
                    half_height: BAR_HALF_HEIGHT,
                },
                arena_width / 2.0,
                self.bar_y,
            )
            .groups(InteractionGroups::new(GROUP_HAZARD, Group::ALL)),
        );
        self.bar = Some(bar);
    }

    /// Current water level. Stays zero for the crush bar variant.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn kind(&self) -> HazardKind {
        self.config.kind
    }
}
