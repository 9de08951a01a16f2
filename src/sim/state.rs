//! World state and core simulation types
//!
//! The `World` is the single authoritative model. Kinematics are written by
//! the stepper, block population by placement/merge, counters by the economy.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::{Tuning, TuningError};
use crate::round_currency;

/// Current run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for an explicit start (new run or freshly advanced level)
    #[default]
    Idle,
    /// Simulation active
    Running,
    /// Halted by the host, resumable
    Paused,
    /// Level target reached, balls frozen until the level advances
    Victory,
}

/// A ball entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    /// Center, field-local coordinates
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self { id, pos, vel }
    }
}

/// A money block, either waiting in the shop or placed on the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Merge tier, starts at 1
    pub level: u32,
    /// Currency paid each time a ball strikes the block
    pub income_per_hit: u64,
    /// Top-left corner, field-local (unused while in the shop)
    pub pos: Vec2,
}

impl Block {
    /// Fresh level-1 block for the shop
    pub fn shop(id: u32, income_per_hit: u64) -> Self {
        Self {
            id,
            level: 1,
            income_per_hit,
            pos: Vec2::ZERO,
        }
    }

    /// Footprint on the field for a block of the given size
    #[inline]
    pub fn rect(&self, width: f32, height: f32) -> Rect {
        Rect::new(self.pos.x, self.pos.y, width, height)
    }
}

/// A ball struck a block and currency was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub block_id: u32,
    pub ball_id: u32,
    /// The block's income per hit
    pub amount: u64,
    /// What actually landed in the balance after the profit multiplier
    pub credited: u64,
}

/// Current price of each upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCosts {
    pub ball: u64,
    pub block_income: u64,
    pub multiplier: u64,
}

impl UpgradeCosts {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            ball: tuning.ball_upgrade.base_cost,
            block_income: tuning.block_income_upgrade.base_cost,
            multiplier: tuning.multiplier_upgrade.base_cost,
        }
    }
}

/// Currency counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    /// Spendable currency
    pub balance: u64,
    /// Currency earned during the current level
    pub collected: u64,
    /// Level is won once `collected` reaches this
    pub level_target: u64,
    /// Scales every reward before rounding
    pub profit_multiplier: f64,
    pub costs: UpgradeCosts,
}

impl Economy {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            balance: tuning.starting_balance,
            collected: 0,
            level_target: tuning.starting_target,
            profit_multiplier: 1.0,
            costs: UpgradeCosts::from_tuning(tuning),
        }
    }
}

/// Read-only economy/progression view for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub level: u32,
    pub phase: GamePhase,
    pub victory: bool,
    pub balance: u64,
    pub collected: u64,
    pub level_target: u64,
    pub profit_multiplier: f64,
    pub costs: UpgradeCosts,
    pub ball_count: u32,
    pub field_blocks: usize,
    pub shop_blocks: usize,
}

/// Complete simulation state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Run seed for reproducible ball spawns
    pub seed: u64,
    rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    pub economy: Economy,
    /// Balls owned by the player; this many spawn at each level start
    pub ball_count: u32,
    /// Active balls (sorted by id for determinism)
    pub balls: Vec<Ball>,
    /// Unplaced blocks (sorted by id)
    pub shop: Vec<Block>,
    /// Placed, collidable blocks (sorted by id for determinism)
    pub field: Vec<Block>,
    /// Measured screen rectangle of the field, required for placement
    pub layout: Option<Rect>,
    /// Next entity ID
    next_id: u32,
}

impl World {
    /// Create a new world with the given tuning and seed.
    ///
    /// Fails if the tuning does not validate (spawning relies on a ball that
    /// fits the field and a non-empty speed range).
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let economy = Economy::new(&tuning);
        let mut world = Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            phase: GamePhase::Idle,
            economy,
            ball_count: 1,
            balls: Vec::new(),
            shop: Vec::new(),
            field: Vec::new(),
            layout: None,
            next_id: 1,
        };

        world.respawn_balls();
        world.refresh_shop();
        Ok(world)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Credit a block hit, scaled by the multiplier in effect right now.
    ///
    /// Returns the whole-unit amount added to both balance and collected.
    pub fn apply_reward(&mut self, amount: u64) -> u64 {
        let credited = round_currency(amount as f64 * self.economy.profit_multiplier);
        self.economy.balance = self.economy.balance.saturating_add(credited);
        self.economy.collected = self.economy.collected.saturating_add(credited);
        credited
    }

    /// Atomically replace the ball set
    pub fn set_balls(&mut self, balls: Vec<Ball>) {
        self.balls = balls;
        self.balls.sort_by_key(|b| b.id);
    }

    /// Level target reached
    #[inline]
    pub fn check_victory(&self) -> bool {
        self.economy.collected >= self.economy.level_target
    }

    #[inline]
    pub fn running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Set the measured screen rectangle of the field
    pub fn set_layout(&mut self, layout: Rect) {
        log::debug!(
            "Field layout measured: ({}, {}) {}x{}",
            layout.x,
            layout.y,
            layout.width,
            layout.height
        );
        self.layout = Some(layout);
    }

    /// Replace the shop with a fresh set of level-1 blocks
    pub fn refresh_shop(&mut self) {
        let income = self.tuning.shop_block_income;
        let shop: Vec<Block> = (0..self.tuning.shop_size)
            .map(|_| Block::shop(self.next_entity_id(), income))
            .collect();
        self.shop = shop;
    }

    /// Drop every field block and ball and halt the simulation
    pub fn clear_field(&mut self) {
        log::info!(
            "Clearing field ({} blocks, {} balls)",
            self.field.len(),
            self.balls.len()
        );
        self.field.clear();
        self.balls.clear();
        self.phase = GamePhase::Idle;
    }

    /// Replace the ball set with `ball_count` level-start balls
    pub fn respawn_balls(&mut self) {
        let balls = spawn_level_balls(self.ball_count, &self.tuning, &mut self.rng, &mut self.next_id);
        self.set_balls(balls);
    }

    /// Spawn the ball granted by the "+1 ball" upgrade
    pub fn spawn_upgrade_ball(&mut self) -> Ball {
        let id = self.next_entity_id();
        let t = &self.tuning;
        let pos = clamp_into_field(Vec2::from(t.upgrade_ball_pos), t);
        let ball = Ball::new(id, pos, Vec2::from(t.upgrade_ball_vel));
        self.balls.push(ball);
        self.ball_count += 1;
        ball
    }

    /// Field block by id
    pub fn field_block(&self, id: u32) -> Option<&Block> {
        self.field.iter().find(|b| b.id == id)
    }

    /// Shop block by id
    pub fn shop_block(&self, id: u32) -> Option<&Block> {
        self.shop.iter().find(|b| b.id == id)
    }

    /// Footprint of a field block
    #[inline]
    pub fn block_rect(&self, block: &Block) -> Rect {
        block.rect(self.tuning.block_width, self.tuning.block_height)
    }

    /// Economy/progression view for presentation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level,
            phase: self.phase,
            victory: self.check_victory(),
            balance: self.economy.balance,
            collected: self.economy.collected,
            level_target: self.economy.level_target,
            profit_multiplier: self.economy.profit_multiplier,
            costs: self.economy.costs,
            ball_count: self.ball_count,
            field_blocks: self.field.len(),
            shop_blocks: self.shop.len(),
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.shop.sort_by_key(|b| b.id);
        self.field.sort_by_key(|b| b.id);
    }

    /// Reseed the spawn RNG (restarts the spawn sequence)
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }
}

/// Clamp a center point so a ball of the tuned radius lies inside the field
pub fn clamp_into_field(pos: Vec2, tuning: &Tuning) -> Vec2 {
    let r = tuning.ball_radius;
    Vec2::new(
        pos.x.clamp(r, tuning.field_width - r),
        pos.y.clamp(r, tuning.field_height - r),
    )
}

/// Level-start balls: alternating either side of the field center on the
/// spawn row, random horizontal direction, always launched upward.
///
/// Generic over the RNG so tests and hosts can plug in their own source.
pub fn spawn_level_balls<R: Rng + ?Sized>(
    count: u32,
    tuning: &Tuning,
    rng: &mut R,
    next_id: &mut u32,
) -> Vec<Ball> {
    let speed = tuning.spawn_speed_min..=tuning.spawn_speed_max;
    (0..count)
        .map(|i| {
            let id = *next_id;
            *next_id += 1;

            let offset = if i % 2 == 0 {
                -tuning.spawn_spread
            } else {
                tuning.spawn_spread
            };
            let pos = clamp_into_field(
                Vec2::new(tuning.field_width / 2.0 + offset, tuning.spawn_y),
                tuning,
            );

            let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let vx = dir * rng.random_range(speed.clone());
            let vy = -rng.random_range(speed.clone());
            Ball::new(id, pos, Vec2::new(vx, vy))
        })
        .collect()
}
