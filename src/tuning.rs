//! Game balance tuning
//!
//! Every number the simulation needs (field size, block footprint, prices and
//! growth factors) lives here so a host can ship a JSON override without a
//! rebuild. Missing keys fall back to [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Price and growth for one upgrade track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTuning {
    /// Price of the first purchase
    pub base_cost: u64,
    /// Price multiplier applied after every purchase
    pub cost_growth: f64,
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub field_width: f32,
    pub field_height: f32,
    pub ball_radius: f32,
    /// Upper bound on a single frame delta (seconds)
    pub max_dt: f32,
    /// Equal sub-steps per frame (>= 1)
    pub substeps: u32,

    // === Spawning ===
    pub spawn_y: f32,
    pub spawn_spread: f32,
    pub spawn_speed_min: f32,
    pub spawn_speed_max: f32,
    pub upgrade_ball_pos: (f32, f32),
    pub upgrade_ball_vel: (f32, f32),

    // === Blocks ===
    pub block_width: f32,
    pub block_height: f32,
    pub placement_margin: f32,
    pub merge_tolerance: f32,
    pub merge_multiplier: f64,
    pub shop_size: usize,
    pub shop_block_income: u64,

    // === Economy ===
    pub starting_balance: u64,
    pub starting_target: u64,
    pub target_growth: f64,
    pub ball_upgrade: UpgradeTuning,
    pub block_income_upgrade: UpgradeTuning,
    pub block_income_step: u64,
    pub multiplier_upgrade: UpgradeTuning,
    pub multiplier_step: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            ball_radius: BALL_RADIUS,
            max_dt: MAX_DT,
            substeps: SUBSTEPS,

            spawn_y: BALL_SPAWN_Y,
            spawn_spread: BALL_SPAWN_SPREAD,
            spawn_speed_min: BALL_SPAWN_SPEED_MIN,
            spawn_speed_max: BALL_SPAWN_SPEED_MAX,
            upgrade_ball_pos: UPGRADE_BALL_POS,
            upgrade_ball_vel: UPGRADE_BALL_VEL,

            block_width: BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            placement_margin: PLACEMENT_MARGIN,
            merge_tolerance: MERGE_TOLERANCE,
            merge_multiplier: MERGE_MULTIPLIER,
            shop_size: SHOP_SIZE,
            shop_block_income: SHOP_BLOCK_INCOME,

            starting_balance: STARTING_BALANCE,
            starting_target: STARTING_TARGET,
            target_growth: TARGET_GROWTH,
            ball_upgrade: UpgradeTuning {
                base_cost: BALL_COST,
                cost_growth: BALL_COST_GROWTH,
            },
            block_income_upgrade: UpgradeTuning {
                base_cost: BLOCK_INCOME_COST,
                cost_growth: BLOCK_INCOME_COST_GROWTH,
            },
            block_income_step: BLOCK_INCOME_STEP,
            multiplier_upgrade: UpgradeTuning {
                base_cost: MULTIPLIER_COST,
                cost_growth: MULTIPLIER_COST_GROWTH,
            },
            multiplier_step: MULTIPLIER_STEP,
        }
    }
}

impl Tuning {
    /// Parse a JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: field {}x{}, {} substeps",
            tuning.field_width,
            tuning.field_height,
            tuning.substeps
        );
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for shipping a template override file)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("ball_radius", self.ball_radius),
            ("max_dt", self.max_dt),
            ("block_width", self.block_width),
            ("block_height", self.block_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.substeps == 0 {
            return Err(TuningError::Invalid("substeps must be at least 1".into()));
        }
        if 2.0 * self.ball_radius > self.field_width.min(self.field_height) {
            return Err(TuningError::Invalid(format!(
                "ball diameter {} does not fit the {}x{} field",
                2.0 * self.ball_radius,
                self.field_width,
                self.field_height
            )));
        }
        if self.block_width + 2.0 * self.placement_margin > self.field_width
            || self.block_height + 2.0 * self.placement_margin > self.field_height
        {
            return Err(TuningError::Invalid(
                "block plus placement margin does not fit the field".into(),
            ));
        }
        if self.spawn_speed_min > self.spawn_speed_max {
            return Err(TuningError::Invalid(format!(
                "spawn speed range is empty ({}..{})",
                self.spawn_speed_min, self.spawn_speed_max
            )));
        }
        if self.merge_tolerance < 0.0 || self.placement_margin < 0.0 {
            return Err(TuningError::Invalid("tolerances must be non-negative".into()));
        }

        let growth = [
            ("target_growth", self.target_growth),
            ("merge_multiplier", self.merge_multiplier),
            ("ball_upgrade.cost_growth", self.ball_upgrade.cost_growth),
            (
                "block_income_upgrade.cost_growth",
                self.block_income_upgrade.cost_growth,
            ),
            (
                "multiplier_upgrade.cost_growth",
                self.multiplier_upgrade.cost_growth,
            ),
        ];
        for (name, value) in growth {
            if !(value.is_finite() && value >= 1.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be at least 1.0, got {value}"
                )));
            }
        }

        Ok(())
    }
}
