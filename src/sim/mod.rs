//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod economy;
pub mod placement;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{Axis, Overlap, circle_rect_overlap};
pub use economy::{
    EconomyError, UpgradeKind, UpgradeOutcome, advance_level, purchase, raise_block_income,
    raise_multiplier, reset_all, spend, upgrade_add_ball,
};
pub use placement::{MergeOutcome, PlacedBlock, PlacementError, place, try_merge};
pub use rect::{Rect, rects_adjacent, rects_overlap};
pub use state::{
    Ball, Block, Economy, GamePhase, RewardEvent, Snapshot, UpgradeCosts, World, spawn_level_balls,
};
pub use tick::step;
