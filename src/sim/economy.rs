//! Economy and progression
//!
//! Spending, upgrades and level transitions. Every operation either applies
//! completely or leaves the world untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Ball, Economy, GamePhase, UpgradeCosts, World};
use crate::scale_currency;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EconomyError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
}

/// Purchasable upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// One more ball on the field (and at every later level start)
    AddBall,
    /// Flat income bonus on every placed block
    BlockIncome,
    /// Raise the profit multiplier applied to every hit
    Multiplier,
}

impl UpgradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::AddBall => "add_ball",
            UpgradeKind::BlockIncome => "block_income",
            UpgradeKind::Multiplier => "multiplier",
        }
    }

    /// Current price of this upgrade
    pub fn cost(&self, costs: &UpgradeCosts) -> u64 {
        match self {
            UpgradeKind::AddBall => costs.ball,
            UpgradeKind::BlockIncome => costs.block_income,
            UpgradeKind::Multiplier => costs.multiplier,
        }
    }
}

/// Deduct `amount` from the balance if it is fully covered
pub fn spend(world: &mut World, amount: u64) -> Result<(), EconomyError> {
    let available = world.economy.balance;
    if available < amount {
        log::debug!("Spend of {amount} refused, balance {available}");
        return Err(EconomyError::InsufficientFunds {
            needed: amount,
            available,
        });
    }
    world.economy.balance = available - amount;
    Ok(())
}

/// What an upgrade purchase changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeOutcome {
    BallAdded(Ball),
    BlockIncomeRaised { blocks: usize },
    MultiplierRaised(f64),
}

/// Pay the current price of `kind` and raise that price by its growth factor
fn charge(world: &mut World, kind: UpgradeKind) -> Result<u64, EconomyError> {
    let cost = kind.cost(&world.economy.costs);
    spend(world, cost)?;

    let t = &world.tuning;
    let costs = &mut world.economy.costs;
    match kind {
        UpgradeKind::AddBall => {
            costs.ball = scale_currency(costs.ball, t.ball_upgrade.cost_growth);
        }
        UpgradeKind::BlockIncome => {
            costs.block_income = scale_currency(costs.block_income, t.block_income_upgrade.cost_growth);
        }
        UpgradeKind::Multiplier => {
            costs.multiplier = scale_currency(costs.multiplier, t.multiplier_upgrade.cost_growth);
        }
    }

    log::info!(
        "Bought {} for {cost}, balance now {}",
        kind.as_str(),
        world.economy.balance
    );
    Ok(cost)
}

/// Buy an upgrade by kind
pub fn purchase(world: &mut World, kind: UpgradeKind) -> Result<UpgradeOutcome, EconomyError> {
    match kind {
        UpgradeKind::AddBall => upgrade_add_ball(world).map(UpgradeOutcome::BallAdded),
        UpgradeKind::BlockIncome => {
            raise_block_income(world).map(|blocks| UpgradeOutcome::BlockIncomeRaised { blocks })
        }
        UpgradeKind::Multiplier => raise_multiplier(world).map(UpgradeOutcome::MultiplierRaised),
    }
}

/// "+1 ball": one more ball now and at every later level start
pub fn upgrade_add_ball(world: &mut World) -> Result<Ball, EconomyError> {
    charge(world, UpgradeKind::AddBall)?;
    Ok(world.spawn_upgrade_ball())
}

/// Flat income bonus on every field block. Returns how many blocks improved.
pub fn raise_block_income(world: &mut World) -> Result<usize, EconomyError> {
    charge(world, UpgradeKind::BlockIncome)?;
    let step = world.tuning.block_income_step;
    for block in &mut world.field {
        block.income_per_hit = block.income_per_hit.saturating_add(step);
    }
    Ok(world.field.len())
}

/// Raise the profit multiplier. Returns the new multiplier.
pub fn raise_multiplier(world: &mut World) -> Result<f64, EconomyError> {
    charge(world, UpgradeKind::Multiplier)?;
    world.economy.profit_multiplier += world.tuning.multiplier_step;
    Ok(world.economy.profit_multiplier)
}

/// Move to the next level: reset collected, grow the target, respawn the
/// level-start balls and wait for an explicit restart.
pub fn advance_level(world: &mut World) {
    world.level += 1;
    world.economy.collected = 0;
    world.economy.level_target = scale_currency(world.economy.level_target, world.tuning.target_growth);
    world.respawn_balls();
    world.phase = GamePhase::Idle;
    log::info!(
        "Advanced to level {} (target {}, {} balls)",
        world.level,
        world.economy.level_target,
        world.balls.len()
    );
}

/// Back to a fresh run: starting economy, level 1, one ball, empty field,
/// a new shop. The spawn RNG keeps its current sequence.
pub fn reset_all(world: &mut World) {
    world.economy = Economy::new(&world.tuning);
    world.level = 1;
    world.ball_count = 1;
    world.field.clear();
    world.respawn_balls();
    world.refresh_shop();
    world.phase = GamePhase::Idle;
    log::info!("Run reset");
}
