//! Arena catalog and terrain builder.
//!
//! Every map gets a floor slab plus oversized side walls so vehicles can
//! never leave the viewport sideways; each map type layers one fixed
//! layout on top of that.

use rapier2d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

use crate::physics::{BodyRole, BodySpec, PhysicsWorld, Shape, GROUP_TERRAIN};

/// Map types available in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    /// Two angled ramps forming a shallow bowl
    Stadium,
    /// Static pivot with a dynamic plank balanced on it
    Seesaw,
    /// Elevated platforms with gaps
    Ufo,
    /// Base walls only
    Basic,
}

impl Default for MapType {
    fn default() -> Self {
        Self::Stadium
    }
}

fn terrain_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_TERRAIN, Group::ALL)
}

fn slab(x: f32, y: f32, half_width: f32, half_height: f32, rotation: f32) -> BodySpec {
    BodySpec::fixed(
        BodyRole::Terrain,
        Shape::Cuboid {
            half_width,
            half_height,
        },
        x,
        y,
    )
    .rotated(rotation)
    .friction(0.8)
    .groups(terrain_groups())
}

/// Build the selected map's terrain into the world.
pub fn build(world: &mut PhysicsWorld, map: MapType, width: f32, height: f32) {
    // Floor and side walls, oversized past the viewport edges.
    world.insert(slab(width / 2.0, height + 50.0, width / 2.0 + 100.0, 50.0, 0.0));
    world.insert(slab(-50.0, height / 2.0, 50.0, height, 0.0));
    world.insert(slab(width + 50.0, height / 2.0, 50.0, height, 0.0));

    match map {
        MapType::Stadium => {
            world.insert(slab(150.0, height - 100.0, 200.0, 10.0, 0.5));
            world.insert(slab(width - 150.0, height - 100.0, 200.0, 10.0, -0.5));
        }
        MapType::Seesaw => {
            let pivot_x = width / 2.0;
            let pivot_y = height - 160.0;
            let pivot = world.insert(
                BodySpec::fixed(
                    BodyRole::Terrain,
                    Shape::Ball { radius: 20.0 },
                    pivot_x,
                    pivot_y,
                )
                .groups(terrain_groups()),
            );
            let plank = world.insert(
                BodySpec::dynamic(
                    BodyRole::Terrain,
                    Shape::Cuboid {
                        half_width: 220.0,
                        half_height: 10.0,
                    },
                    pivot_x,
                    pivot_y - 30.0,
                )
                .density(0.004)
                .friction(0.8)
                .groups(terrain_groups()),
            );
            // Single stiff hinge, no damping: the plank's balance is left
            // entirely to the simulation.
            world.add_revolute_joint(pivot, plank, (0.0, -30.0), (0.0, 0.0));
        }
        MapType::Ufo => {
            world.insert(slab(width * 0.2, height - 250.0, 120.0, 10.0, 0.0));
            world.insert(slab(width * 0.5, height - 350.0, 120.0, 10.0, 0.0));
            world.insert(slab(width * 0.8, height - 250.0, 120.0, 10.0, 0.0));
        }
        MapType::Basic => {}
    }
}
