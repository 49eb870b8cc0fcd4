//! Vehicle catalog and factory.
//!
//! Each vehicle is a chassis, a vulnerable head rigidly mounted above it,
//! and 2-3 wheels hung on damped spring joints. All parts share the
//! owner's collision category so they never contact each other, while
//! still colliding with terrain, hazards and the enemy vehicle.

use rapier2d::prelude::InteractionGroups;
use serde::{Deserialize, Serialize};

use crate::physics::{
    BodyId, BodyRole, BodySpec, PhysicsWorld, Shape, GROUP_HAZARD, GROUP_PLAYER_ONE,
    GROUP_PLAYER_TWO, GROUP_TERRAIN,
};

use super::PlayerId;

/// Clearance between the chassis top edge and the head.
const HEAD_CLEARANCE: f32 = 6.0;
const SUSPENSION_STIFFNESS: f32 = 60.0;
const SUSPENSION_DAMPING: f32 = 6.0;

/// Vehicle types available in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Low and fast, easy to flip
    Racer,
    /// Balanced all-rounder
    Truck,
    /// Slow, heavy, three wheels
    Tank,
}

impl Default for VehicleType {
    fn default() -> Self {
        Self::Truck
    }
}

/// Shape and drive template for one vehicle type.
#[derive(Debug, Clone, Copy)]
pub struct VehicleSpec {
    pub chassis_half_width: f32,
    pub chassis_half_height: f32,
    pub head_radius: f32,
    pub wheel_radius: f32,
    /// Local chassis anchors the wheels hang from. The wheel count is the
    /// length of this list; the tank simply has one more entry.
    pub wheel_offsets: &'static [(f32, f32)],
    /// Horizontal force applied to the chassis while driving
    pub drive_force: f32,
    /// Wheel angular velocity while driving (rad/s)
    pub wheel_spin: f32,
    pub wheel_friction: f32,
    pub chassis_density: f32,
    pub head_density: f32,
    pub wheel_density: f32,
}

impl VehicleSpec {
    pub fn for_type(vehicle_type: VehicleType) -> Self {
        match vehicle_type {
            VehicleType::Racer => Self {
                chassis_half_width: 80.0,
                chassis_half_height: 10.0,
                head_radius: 15.0,
                wheel_radius: 24.0,
                wheel_offsets: &[(-70.0, 10.0), (70.0, 10.0)],
                drive_force: 42_000.0,
                wheel_spin: 30.0,
                wheel_friction: 0.9,
                chassis_density: 0.002,
                head_density: 0.001,
                wheel_density: 0.01,
            },
            VehicleType::Truck => Self {
                chassis_half_width: 70.0,
                chassis_half_height: 16.0,
                head_radius: 15.0,
                wheel_radius: 27.0,
                wheel_offsets: &[(-60.0, 16.0), (60.0, 16.0)],
                drive_force: 32_000.0,
                wheel_spin: 24.0,
                wheel_friction: 0.9,
                chassis_density: 0.0025,
                head_density: 0.001,
                wheel_density: 0.01,
            },
            VehicleType::Tank => Self {
                chassis_half_width: 85.0,
                chassis_half_height: 24.0,
                head_radius: 15.0,
                wheel_radius: 30.0,
                wheel_offsets: &[(-65.0, 24.0), (0.0, 24.0), (65.0, 24.0)],
                drive_force: 24_000.0,
                wheel_spin: 18.0,
                wheel_friction: 1.0,
                chassis_density: 0.003,
                head_density: 0.001,
                wheel_density: 0.012,
            },
        }
    }

    /// Vertical distance from chassis center to head center. Always puts
    /// the head strictly above the chassis top edge.
    pub fn head_offset(&self) -> f32 {
        self.chassis_half_height + HEAD_CLEARANCE + self.head_radius
    }

    pub fn wheel_count(&self) -> usize {
        self.wheel_offsets.len()
    }
}

/// Collision groups for one player's parts: member of the owner's
/// category, masked against everything except that category.
pub fn vehicle_groups(owner: PlayerId) -> InteractionGroups {
    let (own, enemy) = match owner {
        PlayerId::One => (GROUP_PLAYER_ONE, GROUP_PLAYER_TWO),
        PlayerId::Two => (GROUP_PLAYER_TWO, GROUP_PLAYER_ONE),
    };
    InteractionGroups::new(own, GROUP_TERRAIN | GROUP_HAZARD | enemy)
}

/// One player's fully wired vehicle, live in the physics world.
#[derive(Debug)]
pub struct Vehicle {
    pub owner: PlayerId,
    pub vehicle_type: VehicleType,
    pub chassis: BodyId,
    pub head: BodyId,
    pub wheels: Vec<BodyId>,
    spec: VehicleSpec,
}

impl Vehicle {
    /// Build a vehicle at `(x, y)` and insert every part into the world.
    pub fn spawn(
        world: &mut PhysicsWorld,
        owner: PlayerId,
        vehicle_type: VehicleType,
        x: f32,
        y: f32,
    ) -> Self {
        let spec = VehicleSpec::for_type(vehicle_type);
        let groups = vehicle_groups(owner);

        let chassis = world.insert(
            BodySpec::dynamic(
                BodyRole::Chassis(owner),
                Shape::Cuboid {
                    half_width: spec.chassis_half_width,
                    half_height: spec.chassis_half_height,
                },
                x,
                y,
            )
            .density(spec.chassis_density)
            .friction(0.3)
            .groups(groups),
        );

        // Head sits above the chassis on a rigid mount; the joint keeps it
        // kinematically coupled so it follows every bounce and flip.
        let head_offset = spec.head_offset();
        let head = world.insert(
            BodySpec::dynamic(
                BodyRole::Head(owner),
                Shape::Ball {
                    radius: spec.head_radius,
                },
                x,
                y - head_offset,
            )
            .density(spec.head_density)
            .groups(groups),
        );
        world.add_fixed_joint(chassis, head, (0.0, -head_offset), (0.0, 0.0));

        let mut wheels = Vec::with_capacity(spec.wheel_offsets.len());
        for &(wx, wy) in spec.wheel_offsets {
            let rest_length = spec.wheel_radius + 5.0;
            let wheel = world.insert(
                BodySpec::dynamic(
                    BodyRole::Wheel(owner),
                    Shape::Ball {
                        radius: spec.wheel_radius,
                    },
                    x + wx,
                    y + wy + rest_length,
                )
                .density(spec.wheel_density)
                .friction(spec.wheel_friction)
                .groups(groups),
            );
            world.add_spring_joint(
                chassis,
                wheel,
                (wx, wy),
                (0.0, 0.0),
                rest_length,
                SUSPENSION_STIFFNESS,
                SUSPENSION_DAMPING,
            );
            wheels.push(wheel);
        }

        Self {
            owner,
            vehicle_type,
            chassis,
            head,
            wheels,
            spec,
        }
    }

    /// Apply one tick of drive. `axis` is -1.0 (left), 0.0 or 1.0 (right).
    pub fn drive(&self, world: &mut PhysicsWorld, axis: f32) {
        if axis == 0.0 {
            return;
        }
        for &wheel in &self.wheels {
            world.set_angular_velocity(wheel, axis * self.spec.wheel_spin);
        }
        // Slight chassis push for air control, as the wheels alone do
        // nothing once airborne.
        world.apply_force(self.chassis, axis * self.spec.drive_force, 0.0);
    }

    /// Vertical position of the head, if it still exists.
    pub fn head_y(&self, world: &PhysicsWorld) -> Option<f32> {
        world.pose(self.head).map(|(_, y, _)| y)
    }

    /// Remove every part from the world. Joints go with their bodies.
    pub fn despawn(&self, world: &mut PhysicsWorld) {
        world.remove(self.head);
        for &wheel in &self.wheels {
            world.remove(wheel);
        }
        world.remove(self.chassis);
    }

    pub fn part_count(&self) -> usize {
        2 + self.wheels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: [VehicleType; 3] = [VehicleType::Racer, VehicleType::Truck, VehicleType::Tank];

    #[test]
    fn spawn_inserts_every_part_exactly_once() {
        for vehicle_type in TYPES {
            let mut world = PhysicsWorld::new(981.0);
            let vehicle = Vehicle::spawn(&mut world, PlayerId::One, vehicle_type, 300.0, 200.0);
            let spec = VehicleSpec::for_type(vehicle_type);

            // one chassis + one head + configured wheel count
            assert_eq!(vehicle.wheels.len(), spec.wheel_count());
            assert_eq!(world.body_count(), 2 + spec.wheel_count());
            // one mount joint + one suspension spring per wheel
            assert_eq!(world.joint_count(), 1 + spec.wheel_count());
        }
    }

    #[test]
    fn tank_has_three_wheels() {
        assert_eq!(VehicleSpec::for_type(VehicleType::Tank).wheel_count(), 3);
        assert_eq!(VehicleSpec::for_type(VehicleType::Racer).wheel_count(), 2);
    }

    #[test]
    fn head_spawns_strictly_above_chassis_top() {
        for vehicle_type in TYPES {
            let mut world = PhysicsWorld::new(981.0);
            let vehicle = Vehicle::spawn(&mut world, PlayerId::Two, vehicle_type, 300.0, 200.0);
            let spec = VehicleSpec::for_type(vehicle_type);

            let (_, chassis_y, _) = world.pose(vehicle.chassis).unwrap();
            let head_y = vehicle.head_y(&world).unwrap();
            let chassis_top = chassis_y - spec.chassis_half_height;
            // y-down: above means numerically smaller
            assert!(
                head_y < chassis_top,
                "{vehicle_type:?}: head_y={head_y}, chassis_top={chassis_top}"
            );
            assert!((chassis_y - head_y - spec.head_offset()).abs() < 1e-3);
        }
    }

    #[test]
    fn despawn_removes_all_parts() {
        let mut world = PhysicsWorld::new(981.0);
        let vehicle = Vehicle::spawn(&mut world, PlayerId::One, VehicleType::Truck, 300.0, 200.0);
        assert_eq!(world.body_count(), vehicle.part_count());
        vehicle.despawn(&mut world);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn drive_pushes_chassis_sideways() {
        let mut world = PhysicsWorld::new(0.0);
        world.set_dt(1.0 / 60.0);
        let vehicle = Vehicle::spawn(&mut world, PlayerId::One, VehicleType::Racer, 300.0, 200.0);

        let mut contacts = Vec::new();
        for _ in 0..30 {
            vehicle.drive(&mut world, 1.0);
            world.step(&mut contacts);
        }

        let (x, _, _) = world.pose(vehicle.chassis).unwrap();
        assert!(x > 300.0, "chassis should move right: x={x}");
    }

    #[test]
    fn own_groups_mask_out_own_category() {
        let g1 = vehicle_groups(PlayerId::One);
        assert!(!g1.test(g1), "own parts must not pass their own filter");
        let g2 = vehicle_groups(PlayerId::Two);
        assert!(g1.test(g2), "enemy parts must collide");
    }
}
