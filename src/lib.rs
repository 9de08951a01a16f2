//! Money Blocks - idle ball-and-merge-block game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, world state, placement, economy)
//! - `session`: Host-facing driver (frame timing, run control, reward observers)
//! - `tuning`: Data-driven game balance

pub mod session;
pub mod sim;
pub mod tuning;

pub use session::{RewardObserver, Session};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Largest frame delta the stepper will integrate (spiral of death guard)
    pub const MAX_DT: f32 = 1.0 / 30.0;
    /// Sub-steps per frame to keep fast balls from tunneling through blocks
    pub const SUBSTEPS: u32 = 2;

    /// Field dimensions (field-local units, origin top-left)
    pub const FIELD_WIDTH: f32 = 300.0;
    pub const FIELD_HEIGHT: f32 = 400.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 24.0;
    /// Level-start spawn row and horizontal spread around the field center
    pub const BALL_SPAWN_Y: f32 = 120.0;
    pub const BALL_SPAWN_SPREAD: f32 = 20.0;
    /// Level-start speed range per axis (units/s)
    pub const BALL_SPAWN_SPEED_MIN: f32 = 100.0;
    pub const BALL_SPAWN_SPEED_MAX: f32 = 180.0;
    /// Where the "+1 ball" upgrade drops its ball
    pub const UPGRADE_BALL_POS: (f32, f32) = (30.0, 150.0);
    pub const UPGRADE_BALL_VEL: (f32, f32) = (120.0, 140.0);

    /// Block defaults
    pub const BLOCK_WIDTH: f32 = 120.0;
    pub const BLOCK_HEIGHT: f32 = 50.0;
    /// Inset kept between a placed block and the field edge
    pub const PLACEMENT_MARGIN: f32 = 5.0;
    /// Max edge gap for two blocks to count as touching when merging
    pub const MERGE_TOLERANCE: f32 = 8.0;
    pub const MERGE_MULTIPLIER: f64 = 2.0;
    pub const SHOP_SIZE: usize = 3;
    pub const SHOP_BLOCK_INCOME: u64 = 35;

    /// Economy defaults
    pub const STARTING_BALANCE: u64 = 200;
    pub const STARTING_TARGET: u64 = 1000;
    pub const TARGET_GROWTH: f64 = 1.25;

    /// Upgrade prices and how much each grows after a purchase
    pub const BALL_COST: u64 = 100;
    pub const BALL_COST_GROWTH: f64 = 2.0;
    pub const BLOCK_INCOME_COST: u64 = 50;
    pub const BLOCK_INCOME_COST_GROWTH: f64 = 1.5;
    pub const BLOCK_INCOME_STEP: u64 = 10;
    pub const MULTIPLIER_COST: u64 = 150;
    pub const MULTIPLIER_COST_GROWTH: f64 = 1.75;
    pub const MULTIPLIER_STEP: f64 = 0.1;
}

/// Round a scaled currency amount to whole units (half away from zero, floored at 0)
#[inline]
pub fn round_currency(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Scale an integer amount by a factor and round back to currency units
#[inline]
pub fn scale_currency(amount: u64, factor: f64) -> u64 {
    round_currency(amount as f64 * factor)
}
