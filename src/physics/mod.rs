//! Thin ownership layer over the rapier2d rigid-body engine.
//!
//! The game never talks to rapier directly: it describes bodies with
//! [`BodySpec`], tags them with a [`BodyRole`], and reads back typed
//! [`ContactPair`]s drained after each step. Coordinates are screen-style
//! (y grows downward, gravity is positive y).

use std::sync::Mutex;

use rapier2d::prelude::*;

use crate::game::PlayerId;

/// Collision filter categories. Each player's parts share a category so
/// intra-vehicle contact can be masked out while car-vs-enemy and
/// car-vs-terrain stay enabled.
pub const GROUP_PLAYER_ONE: Group = Group::GROUP_1;
pub const GROUP_PLAYER_TWO: Group = Group::GROUP_2;
pub const GROUP_TERRAIN: Group = Group::GROUP_3;
pub const GROUP_HAZARD: Group = Group::GROUP_4;

/// What a rigid body is, for collision resolution. Stored in rapier's
/// `user_data` so contact events come back already classified instead of
/// being matched on label strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    Chassis(PlayerId),
    Head(PlayerId),
    Wheel(PlayerId),
    Terrain,
    Hazard,
    Debris,
}

impl BodyRole {
    /// The player this part belongs to, if any.
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            BodyRole::Chassis(p) | BodyRole::Head(p) | BodyRole::Wheel(p) => Some(*p),
            BodyRole::Terrain | BodyRole::Hazard | BodyRole::Debris => None,
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, BodyRole::Head(_))
    }

    fn encode(self) -> u128 {
        let (tag, owner) = match self {
            BodyRole::Chassis(p) => (1u128, p.index() as u128 + 1),
            BodyRole::Head(p) => (2, p.index() as u128 + 1),
            BodyRole::Wheel(p) => (3, p.index() as u128 + 1),
            BodyRole::Terrain => (4, 0),
            BodyRole::Hazard => (5, 0),
            BodyRole::Debris => (6, 0),
        };
        (tag << 8) | owner
    }

    fn decode(data: u128) -> Option<Self> {
        let owner = match data & 0xff {
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        };
        match data >> 8 {
            1 => Some(BodyRole::Chassis(owner?)),
            2 => Some(BodyRole::Head(owner?)),
            3 => Some(BodyRole::Wheel(owner?)),
            4 => Some(BodyRole::Terrain),
            5 => Some(BodyRole::Hazard),
            6 => Some(BodyRole::Debris),
            _ => None,
        }
    }
}

/// Collider shape description.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Fixed,
    Kinematic,
}

/// Everything needed to insert one body with one collider.
#[derive(Debug, Clone, Copy)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub role: BodyRole,
    pub shape: Shape,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub groups: InteractionGroups,
    pub sensor: bool,
}

impl BodySpec {
    pub fn dynamic(role: BodyRole, shape: Shape, x: f32, y: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            role,
            shape,
            x,
            y,
            rotation: 0.0,
            density: 1.0,
            friction: 0.5,
            restitution: 0.1,
            groups: InteractionGroups::all(),
            sensor: false,
        }
    }

    pub fn fixed(role: BodyRole, shape: Shape, x: f32, y: f32) -> Self {
        Self {
            kind: BodyKind::Fixed,
            ..Self::dynamic(role, shape, x, y)
        }
    }

    pub fn kinematic(role: BodyRole, shape: Shape, x: f32, y: f32) -> Self {
        Self {
            kind: BodyKind::Kinematic,
            ..Self::dynamic(role, shape, x, y)
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn groups(mut self, groups: InteractionGroups) -> Self {
        self.groups = groups;
        self
    }

    pub fn sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }
}

/// Handles referencing one inserted body.
#[derive(Debug, Clone, Copy)]
pub struct BodyId {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Handle to a joint, for later removal.
#[derive(Debug, Clone, Copy)]
pub struct JointId(ImpulseJointHandle);

/// A newly-started contact between two classified bodies.
#[derive(Debug, Clone, Copy)]
pub struct ContactPair {
    pub a: BodyRole,
    pub b: BodyRole,
    /// At least one collider in the pair is a pass-through sensor.
    pub sensor: bool,
}

/// Buffers rapier collision events raised during a step.
struct ContactCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle, bool)>>,
}

impl ContactCollector {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle, bool)> {
        std::mem::take(&mut *self.started.lock().unwrap())
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair2>,
    ) {
        // Only contact starts matter: a death is decided on first touch.
        if let CollisionEvent::Started(h1, h2, flags) = event {
            let sensor = flags.contains(CollisionEventFlags::SENSOR);
            self.started.lock().unwrap().push((h1, h2, sensor));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair2,
        _total_force_magnitude: f32,
    ) {
    }
}

// Rapier exports its own `ContactPair`; alias it away from ours.
use rapier2d::geometry::CollisionEventFlags;
use rapier2d::geometry::ContactPair as ContactPair2;

/// Owns every rapier set and pipeline for one arena.
pub struct PhysicsWorld {
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,
}

impl PhysicsWorld {
    /// Create an empty world. `gravity_y` is positive-down in screen
    /// coordinates (roughly 981.0 for a pixel-scaled arena).
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::new(),
        }
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Insert a body and its collider as described.
    pub fn insert(&mut self, spec: BodySpec) -> BodyId {
        let builder = match spec.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let rb = builder
            .translation(vector![spec.x, spec.y])
            .rotation(spec.rotation)
            .user_data(spec.role.encode())
            .build();
        let body = self.bodies.insert(rb);

        let collider_builder = match spec.shape {
            Shape::Ball { radius } => ColliderBuilder::ball(radius),
            Shape::Cuboid {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(half_width, half_height),
        };
        let collider = collider_builder
            .density(spec.density)
            .friction(spec.friction)
            .restitution(spec.restitution)
            .collision_groups(spec.groups)
            .sensor(spec.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        BodyId { body, collider }
    }

    /// Remove a body, its colliders and any joints attached to it.
    pub fn remove(&mut self, id: BodyId) {
        self.bodies.remove(
            id.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Drop every body and joint, keeping gravity and timestep settings.
    /// Used on round restart: the arena is rebuilt from scratch.
    pub fn clear(&mut self) {
        let gravity_y = self.gravity.y;
        let dt = self.integration_parameters.dt;
        *self = Self::new(gravity_y);
        self.integration_parameters.dt = dt;
    }

    /// Rigidly lock two bodies together at the given local anchors.
    pub fn add_fixed_joint(
        &mut self,
        a: BodyId,
        b: BodyId,
        anchor_a: (f32, f32),
        anchor_b: (f32, f32),
    ) -> JointId {
        let joint = FixedJointBuilder::new()
            .local_anchor1(point![anchor_a.0, anchor_a.1])
            .local_anchor2(point![anchor_b.0, anchor_b.1])
            .build();
        JointId(self.impulse_joints.insert(a.body, b.body, joint, true))
    }

    /// Damped spring between two bodies (wheel suspension).
    pub fn add_spring_joint(
        &mut self,
        a: BodyId,
        b: BodyId,
        anchor_a: (f32, f32),
        anchor_b: (f32, f32),
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    ) -> JointId {
        let joint = SpringJointBuilder::new(rest_length, stiffness, damping)
            .local_anchor1(point![anchor_a.0, anchor_a.1])
            .local_anchor2(point![anchor_b.0, anchor_b.1])
            .build();
        JointId(self.impulse_joints.insert(a.body, b.body, joint, true))
    }

    /// Hinge allowing free rotation around the anchors (seesaw pivot).
    pub fn add_revolute_joint(
        &mut self,
        a: BodyId,
        b: BodyId,
        anchor_a: (f32, f32),
        anchor_b: (f32, f32),
    ) -> JointId {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(point![anchor_a.0, anchor_a.1])
            .local_anchor2(point![anchor_b.0, anchor_b.1])
            .build();
        JointId(self.impulse_joints.insert(a.body, b.body, joint, true))
    }

    pub fn remove_joint(&mut self, joint: JointId) {
        self.impulse_joints.remove(joint.0, true);
    }

    /// Advance the simulation by one timestep, appending every contact that
    /// started during the step to `contacts`.
    pub fn step(&mut self, contacts: &mut Vec<ContactPair>) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );

        // Rapier accumulates added forces until told otherwise; drive
        // forces are per-tick, so wipe them once integrated.
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
        }

        for (h1, h2, sensor) in self.collector.drain() {
            let (Some(a), Some(b)) = (self.role_of(h1), self.role_of(h2)) else {
                continue;
            };
            contacts.push(ContactPair { a, b, sensor });
        }
    }

    /// Continuous force on a body, applied this step.
    pub fn apply_force(&mut self, id: BodyId, fx: f32, fy: f32) {
        if let Some(rb) = self.bodies.get_mut(id.body) {
            rb.add_force(vector![fx, fy], true);
        }
    }

    /// Instantaneous impulse (debris scatter).
    pub fn apply_impulse(&mut self, id: BodyId, ix: f32, iy: f32) {
        if let Some(rb) = self.bodies.get_mut(id.body) {
            rb.apply_impulse(vector![ix, iy], true);
        }
    }

    /// Drive a wheel by setting its spin directly.
    pub fn set_angular_velocity(&mut self, id: BodyId, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(id.body) {
            rb.set_angvel(angvel, true);
        }
    }

    /// Schedule a kinematic body's pose for the next step.
    pub fn set_kinematic_pose(&mut self, id: BodyId, x: f32, y: f32, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(id.body) {
            rb.set_next_kinematic_position(Isometry::new(vector![x, y], rotation));
        }
    }

    /// Current position and rotation, if the body still exists.
    pub fn pose(&self, id: BodyId) -> Option<(f32, f32, f32)> {
        self.bodies.get(id.body).map(|rb| {
            let iso = rb.position();
            (iso.translation.x, iso.translation.y, iso.rotation.angle())
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    fn role_of(&self, collider: ColliderHandle) -> Option<BodyRole> {
        let parent = self.colliders.get(collider)?.parent()?;
        BodyRole::decode(self.bodies.get(parent)?.user_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(role: BodyRole, x: f32, y: f32) -> BodySpec {
        BodySpec::dynamic(role, Shape::Ball { radius: 10.0 }, x, y)
    }

    #[test]
    fn role_encoding_round_trips() {
        let roles = [
            BodyRole::Chassis(PlayerId::One),
            BodyRole::Head(PlayerId::Two),
            BodyRole::Wheel(PlayerId::One),
            BodyRole::Terrain,
            BodyRole::Hazard,
            BodyRole::Debris,
        ];
        for role in roles {
            assert_eq!(BodyRole::decode(role.encode()), Some(role));
        }
        assert_eq!(BodyRole::decode(0), None);
    }

    #[test]
    fn insert_and_remove_body() {
        let mut world = PhysicsWorld::new(0.0);
        let id = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        assert_eq!(world.body_count(), 1);
        world.remove(id);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 60.0);
        let id = world.insert(ball(BodyRole::Debris, 0.0, 0.0));

        let mut contacts = Vec::new();
        for _ in 0..30 {
            world.step(&mut contacts);
        }

        let (_, y, _) = world.pose(id).unwrap();
        assert!(y > 1.0, "body should fall (y-down): y={y}");
    }

    #[test]
    fn fixed_bodies_stay_put() {
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 60.0);
        let id = world.insert(BodySpec::fixed(
            BodyRole::Terrain,
            Shape::Cuboid {
                half_width: 100.0,
                half_height: 10.0,
            },
            0.0,
            300.0,
        ));

        let mut contacts = Vec::new();
        for _ in 0..30 {
            world.step(&mut contacts);
        }

        let (_, y, _) = world.pose(id).unwrap();
        assert!((y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn contact_pairs_carry_roles() {
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 60.0);
        world.insert(BodySpec::fixed(
            BodyRole::Terrain,
            Shape::Cuboid {
                half_width: 500.0,
                half_height: 20.0,
            },
            0.0,
            200.0,
        ));
        world.insert(ball(BodyRole::Head(PlayerId::One), 0.0, 0.0));

        let mut contacts = Vec::new();
        for _ in 0..240 {
            world.step(&mut contacts);
            if !contacts.is_empty() {
                break;
            }
        }

        assert!(!contacts.is_empty(), "falling head should hit the slab");
        let pair = contacts[0];
        let roles = [pair.a, pair.b];
        assert!(roles.contains(&BodyRole::Head(PlayerId::One)));
        assert!(roles.contains(&BodyRole::Terrain));
        assert!(!pair.sensor);
    }

    #[test]
    fn sensors_flag_their_contacts() {
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 60.0);
        world.insert(
            BodySpec::fixed(
                BodyRole::Hazard,
                Shape::Cuboid {
                    half_width: 500.0,
                    half_height: 20.0,
                },
                0.0,
                200.0,
            )
            .sensor(true),
        );
        world.insert(ball(BodyRole::Head(PlayerId::One), 0.0, 0.0));

        let mut contacts = Vec::new();
        for _ in 0..240 {
            world.step(&mut contacts);
            if !contacts.is_empty() {
                break;
            }
        }

        assert!(!contacts.is_empty());
        assert!(contacts[0].sensor);
    }

    #[test]
    fn interaction_groups_suppress_contact() {
        // Both bodies belong to player one's filter group: a falling ball
        // must pass the slab's collision mask test, and the mask excludes
        // its own category.
        let own = InteractionGroups::new(GROUP_PLAYER_ONE, GROUP_TERRAIN);
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 60.0);
        world.insert(
            BodySpec::fixed(
                BodyRole::Chassis(PlayerId::One),
                Shape::Cuboid {
                    half_width: 500.0,
                    half_height: 20.0,
                },
                0.0,
                200.0,
            )
            .groups(own),
        );
        let ball_id = world.insert(ball(BodyRole::Head(PlayerId::One), 0.0, 0.0).groups(own));

        let mut contacts = Vec::new();
        for _ in 0..240 {
            world.step(&mut contacts);
        }

        assert!(contacts.is_empty(), "own parts must not collide");
        let (_, y, _) = world.pose(ball_id).unwrap();
        assert!(y > 220.0, "ball should fall through its own group: y={y}");
    }

    #[test]
    fn fixed_joint_drags_partner_along() {
        let mut world = PhysicsWorld::new(0.0);
        world.set_dt(1.0 / 60.0);
        let a = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        let b = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        world.add_fixed_joint(a, b, (0.0, 0.0), (0.0, 0.0));

        world.apply_impulse(a, 5000.0, 0.0);
        let mut contacts = Vec::new();
        for _ in 0..60 {
            world.step(&mut contacts);
        }

        let (ax, _, _) = world.pose(a).unwrap();
        let (bx, _, _) = world.pose(b).unwrap();
        assert!(ax > 1.0);
        assert!(bx > 1.0);
        assert!((ax - bx).abs() < 5.0);
    }

    #[test]
    fn spring_joint_pulls_toward_rest_length() {
        let mut world = PhysicsWorld::new(0.0);
        world.set_dt(1.0 / 60.0);
        let a = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        let b = world.insert(ball(BodyRole::Debris, 120.0, 0.0));
        world.add_spring_joint(a, b, (0.0, 0.0), (0.0, 0.0), 40.0, 400.0, 8.0);

        let mut contacts = Vec::new();
        for _ in 0..120 {
            world.step(&mut contacts);
        }

        let (ax, _, _) = world.pose(a).unwrap();
        let (bx, _, _) = world.pose(b).unwrap();
        assert!((bx - ax).abs() < 120.0, "spring should contract");
    }

    #[test]
    fn remove_joint_detaches_bodies() {
        let mut world = PhysicsWorld::new(0.0);
        let a = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        let b = world.insert(ball(BodyRole::Debris, 50.0, 0.0));
        let joint = world.add_fixed_joint(a, b, (0.0, 0.0), (0.0, 0.0));
        assert_eq!(world.joint_count(), 1);
        world.remove_joint(joint);
        assert_eq!(world.joint_count(), 0);
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let mut world = PhysicsWorld::new(981.0);
        world.set_dt(1.0 / 120.0);
        let a = world.insert(ball(BodyRole::Debris, 0.0, 0.0));
        let b = world.insert(ball(BodyRole::Debris, 50.0, 0.0));
        world.add_fixed_joint(a, b, (0.0, 0.0), (0.0, 0.0));
        assert_eq!(world.body_count(), 2);
        assert_eq!(world.joint_count(), 1);

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);

        // Timestep survives the wipe.
        assert!((world.integration_parameters.dt - 1.0 / 120.0).abs() < 1e-6);
    }
}
