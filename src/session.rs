//! Host-facing simulation driver
//!
//! A `Session` owns the `World` and is the only way a host touches it. Every
//! mutating call takes `&mut self`, so a placement or upgrade can never land
//! in the middle of a physics step. The host feeds frame timestamps; the
//! session turns them into deltas, steps the world while running and hands
//! reward events to the caller and to any subscribed observers.

use crate::{Tuning, TuningError};
use crate::sim::economy::{self, EconomyError, UpgradeKind, UpgradeOutcome};
use crate::sim::placement::{self, PlacedBlock, PlacementError};
use crate::sim::rect::Rect;
use crate::sim::state::{Ball, Block, GamePhase, RewardEvent, Snapshot, World};
use crate::sim::tick;

/// Presentation hook for hit feedback (floating "+$" text, sounds, ...)
pub trait RewardObserver: Send {
    /// Called once per block hit, in the order the hits happened
    fn on_reward(&mut self, event: &RewardEvent);

    /// Called once when a frame wins the level
    fn on_victory(&mut self, _snapshot: &Snapshot) {}
}

/// Simulation driver: run control, frame timing and observer fan-out
pub struct Session {
    world: World,
    /// Timestamp (ms) of the previous frame while running
    last_timestamp: Option<f64>,
    observers: Vec<Box<dyn RewardObserver>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("last_timestamp", &self.last_timestamp)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Session {
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        Ok(Self::from_world(World::new(tuning, seed)?))
    }

    /// Drive an existing world (tests, tools)
    pub fn from_world(world: World) -> Self {
        Self {
            world,
            last_timestamp: None,
            observers: Vec::new(),
        }
    }

    // === Read-only views ===

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn balls(&self) -> &[Ball] {
        &self.world.balls
    }

    pub fn field_blocks(&self) -> &[Block] {
        &self.world.field
    }

    pub fn shop_blocks(&self) -> &[Block] {
        &self.world.shop
    }

    pub fn victory(&self) -> bool {
        self.world.check_victory()
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    pub fn snapshot(&self) -> Snapshot {
        self.world.snapshot()
    }

    /// Register a presentation observer
    pub fn subscribe(&mut self, observer: Box<dyn RewardObserver>) {
        self.observers.push(observer);
    }

    // === Run control ===

    /// Start (or restart after a level advance). Refused once the level is won.
    pub fn start(&mut self) -> bool {
        if self.world.check_victory() {
            self.world.phase = GamePhase::Victory;
            return false;
        }
        match self.world.phase {
            GamePhase::Idle | GamePhase::Paused => {
                log::info!("Simulation started (level {})", self.world.level);
                self.world.phase = GamePhase::Running;
                self.last_timestamp = None;
                true
            }
            GamePhase::Running => true,
            GamePhase::Victory => false,
        }
    }

    /// Halt a running simulation so it can resume later. Idempotent.
    pub fn pause(&mut self) {
        if self.world.phase == GamePhase::Running {
            log::debug!("Simulation paused");
            self.world.phase = GamePhase::Paused;
        }
        self.last_timestamp = None;
    }

    /// Continue after `pause`
    pub fn resume(&mut self) -> bool {
        if self.world.phase == GamePhase::Paused {
            self.start()
        } else {
            self.world.phase == GamePhase::Running
        }
    }

    /// Stop the loop outright. Idempotent; a victory latch is kept.
    pub fn stop(&mut self) {
        if matches!(self.world.phase, GamePhase::Running | GamePhase::Paused) {
            log::debug!("Simulation stopped");
            self.world.phase = GamePhase::Idle;
        }
        self.last_timestamp = None;
    }

    /// Back to a fresh run
    pub fn reset(&mut self) {
        economy::reset_all(&mut self.world);
        self.last_timestamp = None;
    }

    // === Frame driving ===

    /// Host tick with a monotonically increasing timestamp in milliseconds.
    ///
    /// The first frame after a (re)start only records the timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) -> Vec<RewardEvent> {
        if !self.world.running() {
            self.last_timestamp = None;
            return Vec::new();
        }

        let dt = match self.last_timestamp {
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);

        self.advance(dt)
    }

    /// Step the world by an explicit delta (seconds). No-op unless running.
    pub fn advance(&mut self, dt: f32) -> Vec<RewardEvent> {
        if !self.world.running() {
            return Vec::new();
        }

        let events = tick::step(&mut self.world, dt);
        for observer in &mut self.observers {
            for event in &events {
                observer.on_reward(event);
            }
        }

        if self.world.phase == GamePhase::Victory {
            self.last_timestamp = None;
            let snapshot = self.world.snapshot();
            for observer in &mut self.observers {
                observer.on_victory(&snapshot);
            }
        }

        events
    }

    // === World mutations (serialized with stepping through &mut self) ===

    /// Screen rectangle of the field, once the host has measured it
    pub fn set_field_layout(&mut self, layout: Rect) {
        self.world.set_layout(layout);
    }

    /// Drop a shop block at a screen coordinate
    pub fn place(&mut self, shop_id: u32, drop_x: f32, drop_y: f32) -> Result<PlacedBlock, PlacementError> {
        placement::place(&mut self.world, shop_id, drop_x, drop_y)
    }

    /// Buy an upgrade
    pub fn purchase(&mut self, kind: UpgradeKind) -> Result<UpgradeOutcome, EconomyError> {
        economy::purchase(&mut self.world, kind)
    }

    /// Refill the shop with fresh level-1 blocks
    pub fn refresh_shop(&mut self) {
        self.world.refresh_shop();
    }

    /// Remove every field block and ball, stopping the loop
    pub fn clear_field(&mut self) {
        self.world.clear_field();
        self.last_timestamp = None;
    }

    /// Next level; the host must call `start` again
    pub fn advance_level(&mut self) {
        economy::advance_level(&mut self.world);
        self.last_timestamp = None;
    }
}
