//! Round state and the per-tick game loop.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::physics::{BodyRole, BodySpec, ContactPair, PhysicsWorld, Shape};
use crate::util::time::{tick_delta, unix_millis, Timer};

use super::arena::{self, MapType};
use super::collision;
use super::events::{RoundEndReason, SessionEvent};
use super::hazard::{HazardClock, HazardConfig};
use super::input::{InputSampler, KeyBindings};
use super::vehicle::{Vehicle, VehicleType};
use super::PlayerId;

/// Vertical spawn offset above the arena floor.
const SPAWN_HEIGHT: f32 = 220.0;
/// Horizontal spawn positions as fractions of the arena width.
const SPAWN_X_FRAC: [f32; 2] = [0.25, 0.75];
const DEBRIS_COUNT: usize = 6;

/// Everything needed to set up a session. The UI shell builds one of
/// these from its menu screens.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Positive-down gravity, pixel scale
    pub gravity: f32,
    pub map: MapType,
    /// Vehicle type per player, player 1 first
    pub vehicles: [VehicleType; 2],
    pub hazard: HazardConfig,
    pub bindings: [KeyBindings; 2],
    /// Seed for debris scatter
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 1280.0,
            arena_height: 720.0,
            gravity: 981.0,
            map: MapType::default(),
            vehicles: [VehicleType::default(), VehicleType::default()],
            hazard: HazardConfig::default(),
            bindings: [
                KeyBindings::default_for(PlayerId::One),
                KeyBindings::default_for(PlayerId::Two),
            ],
            seed: 0,
        }
    }
}

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Before the first round starts
    Idle,
    /// Gameplay ticking
    Active,
    /// Terminal per round; a new round re-enters Active
    Ended {
        winner: PlayerId,
        reason: RoundEndReason,
    },
}

/// One local two-player session: the physics world, both vehicles, the
/// hazard clock, input state and the across-round scores.
pub struct GameSession {
    id: Uuid,
    config: GameConfig,
    world: PhysicsWorld,
    phase: RoundPhase,
    vehicles: Vec<Vehicle>,
    hazard: HazardClock,
    input: InputSampler,
    scores: [u32; 2],
    round: u32,
    round_timer: Timer,
    rng: ChaCha8Rng,
    events_tx: broadcast::Sender<SessionEvent>,
    /// Scratch buffer reused across ticks
    contacts: Vec<ContactPair>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let mut world = PhysicsWorld::new(config.gravity);
        world.set_dt(tick_delta());
        let (events_tx, _) = broadcast::channel(64);

        Self {
            id: Uuid::new_v4(),
            hazard: HazardClock::new(config.hazard),
            input: InputSampler::new(config.bindings.clone()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            world,
            config,
            phase: RoundPhase::Idle,
            vehicles: Vec::new(),
            scores: [0, 0],
            round: 0,
            round_timer: Timer::new(),
            events_tx,
            contacts: Vec::new(),
        }
    }

    /// Subscribe to the session's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Start a round: wipe every body from the prior one, rebuild the
    /// arena, spawn both vehicles fresh, re-arm the hazard. Scores carry
    /// over; everything else resets.
    pub fn start_round(&mut self) {
        self.world.clear();
        self.vehicles.clear();
        self.hazard = HazardClock::new(self.config.hazard);
        self.input.release_all();

        arena::build(
            &mut self.world,
            self.config.map,
            self.config.arena_width,
            self.config.arena_height,
        );

        let spawn_y = self.config.arena_height - SPAWN_HEIGHT;
        for player in PlayerId::ALL {
            let x = self.config.arena_width * SPAWN_X_FRAC[player.index()];
            self.vehicles.push(Vehicle::spawn(
                &mut self.world,
                player,
                self.config.vehicles[player.index()],
                x,
                spawn_y,
            ));
        }

        self.round += 1;
        self.round_timer.reset();
        self.phase = RoundPhase::Active;

        let started_at = unix_millis();
        info!(
            session_id = %self.id,
            round = self.round,
            map = ?self.config.map,
            "round started"
        );
        let _ = self.events_tx.send(SessionEvent::RoundStarted {
            round: self.round,
            started_at,
        });
    }

    /// Start the next round after one has ended.
    pub fn next_round(&mut self) {
        self.start_round();
    }

    /// Key-down notification from the host.
    pub fn key_down(&mut self, code: &str) {
        self.input.key_down(code);
    }

    /// Key-up notification from the host.
    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Advance the simulation by one fixed timestep. A no-op unless a
    /// round is active.
    pub fn tick(&mut self) {
        if self.phase != RoundPhase::Active {
            return;
        }
        self.run_tick();
    }

    fn run_tick(&mut self) {
        let dt = tick_delta();

        // 1. Drive forces from held keys
        for vehicle in &self.vehicles {
            let axis = self.input.sample(vehicle.owner).axis();
            vehicle.drive(&mut self.world, axis);
        }

        // 2. Hazard escalation
        if self
            .hazard
            .tick(dt, &mut self.world, self.config.arena_width)
        {
            info!(
                session_id = %self.id,
                round = self.round,
                kind = ?self.hazard.kind(),
                "hazard triggered"
            );
            let _ = self.events_tx.send(SessionEvent::HazardTriggered {
                round: self.round,
                kind: self.hazard.kind(),
            });
        }

        // 3. Physics step, collecting contact starts
        self.contacts.clear();
        self.world.step(&mut self.contacts);

        if let Some(loser) = collision::first_death(&self.contacts) {
            self.end_round(loser, RoundEndReason::HeadContact);
            return;
        }

        // 4. Submersion check, player 1 first. The fixed order is the
        // tie-break for a simultaneous double submersion.
        let water_line = self.config.arena_height - self.hazard.level();
        for player in PlayerId::ALL {
            let head_y = self.vehicles[player.index()].head_y(&self.world);
            if matches!(head_y, Some(y) if y > water_line) {
                self.end_round(player, RoundEndReason::Submerged);
                return;
            }
        }
    }

    fn end_round(&mut self, loser: PlayerId, reason: RoundEndReason) {
        // A second death condition in the same tick is a no-op.
        if self.phase != RoundPhase::Active {
            return;
        }

        let winner = loser.opponent();
        self.scores[winner.index()] += 1;
        self.phase = RoundPhase::Ended { winner, reason };

        self.explode_vehicle(loser);

        info!(
            session_id = %self.id,
            round = self.round,
            %winner,
            %loser,
            ?reason,
            elapsed_ms = self.round_timer.elapsed_ms(),
            "round ended"
        );
        let _ = self.events_tx.send(SessionEvent::RoundEnded {
            round: self.round,
            winner,
            loser,
            reason,
            scores: self.scores,
        });
    }

    /// Replace the loser's vehicle with scattering debris.
    fn explode_vehicle(&mut self, loser: PlayerId) {
        let vehicle = &self.vehicles[loser.index()];
        let Some((x, y, _)) = self.world.pose(vehicle.chassis) else {
            return;
        };
        vehicle.despawn(&mut self.world);

        for _ in 0..DEBRIS_COUNT {
            let debris = self.world.insert(
                BodySpec::dynamic(BodyRole::Debris, Shape::Ball { radius: 6.0 }, x, y)
                    .density(0.005)
                    .restitution(0.4),
            );
            let ix = self.rng.gen_range(-600.0..600.0);
            let iy = self.rng.gen_range(-1500.0..-400.0);
            self.world.apply_impulse(debris, ix, iy);
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Win counts, player 1 first. Persist until the session is dropped.
    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn water_level(&self) -> f32 {
        self.hazard.level()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
