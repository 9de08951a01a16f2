//! Block placement and merging
//!
//! A shop block dropped on the field becomes a field block centered on the
//! drop point (clamped inside the field). If it lands next to a block of the
//! same level, the two merge into one block of the next level.

use glam::Vec2;
use thiserror::Error;

use super::rect::{Rect, rects_adjacent, rects_overlap};
use super::state::{Block, World};
use crate::scale_currency;

/// Why a drop was rejected. The world is untouched in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("field has not been measured yet")]
    FieldNotMeasured,
    #[error("drop point is outside the field")]
    OutOfBounds,
    #[error("block {0} is not in the shop")]
    UnknownBlock(u32),
    #[error("block would overlap field block {0}")]
    Collision(u32),
}

/// Two field blocks combined into one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    /// The block that triggered the merge
    pub source_id: u32,
    /// The neighbour it merged into (its position is kept)
    pub target_id: u32,
    /// The replacement block
    pub merged: Block,
}

/// Result of a successful drop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBlock {
    /// The block as it was inserted into the field
    pub block: Block,
    /// Set when the new block merged straight away
    pub merge: Option<MergeOutcome>,
}

impl PlacedBlock {
    /// Id of the block that is on the field after the drop
    pub fn resulting_id(&self) -> u32 {
        self.merge.map_or(self.block.id, |m| m.merged.id)
    }
}

/// Map a screen point into field-local coordinates through the measured layout
pub fn screen_to_field(layout: &Rect, point: Vec2, field_width: f32, field_height: f32) -> Vec2 {
    let rel = point - Vec2::new(layout.x, layout.y);
    let scale = Vec2::new(
        if layout.width > 0.0 { field_width / layout.width } else { 1.0 },
        if layout.height > 0.0 { field_height / layout.height } else { 1.0 },
    );
    rel * scale
}

/// Top-left for a block centered on `center`, clamped so the whole block
/// stays inside the field inset by `margin`
pub fn clamp_block_origin(center: Vec2, size: Vec2, field: Vec2, margin: f32) -> Vec2 {
    let max = field - size - Vec2::splat(margin);
    let origin = center - size / 2.0;
    Vec2::new(
        origin.x.min(max.x).max(margin),
        origin.y.min(max.y).max(margin),
    )
}

/// Place shop block `shop_id` at screen point (`drop_x`, `drop_y`)
pub fn place(world: &mut World, shop_id: u32, drop_x: f32, drop_y: f32) -> Result<PlacedBlock, PlacementError> {
    let layout = world.layout.ok_or(PlacementError::FieldNotMeasured)?;
    let drop = Vec2::new(drop_x, drop_y);

    if !layout.contains(drop) {
        log::debug!("Drop at ({drop_x}, {drop_y}) is outside the field");
        return Err(PlacementError::OutOfBounds);
    }

    let shop_index = world
        .shop
        .iter()
        .position(|b| b.id == shop_id)
        .ok_or(PlacementError::UnknownBlock(shop_id))?;

    let t = &world.tuning;
    let size = Vec2::new(t.block_width, t.block_height);
    let local = screen_to_field(&layout, drop, t.field_width, t.field_height);
    let origin = clamp_block_origin(local, size, Vec2::new(t.field_width, t.field_height), t.placement_margin);
    let candidate = Rect::new(origin.x, origin.y, size.x, size.y);

    if let Some(hit) = world
        .field
        .iter()
        .find(|b| rects_overlap(&candidate, &world.block_rect(b)))
    {
        log::debug!("Placement of shop block {shop_id} blocked by field block {}", hit.id);
        return Err(PlacementError::Collision(hit.id));
    }

    let picked = world.shop.remove(shop_index);
    let block = Block {
        id: world.next_entity_id(),
        level: picked.level,
        income_per_hit: picked.income_per_hit,
        pos: origin,
    };
    world.field.push(block);
    log::info!(
        "Placed block {} (level {}, {}/hit) at ({:.1}, {:.1})",
        block.id,
        block.level,
        block.income_per_hit,
        origin.x,
        origin.y
    );

    let merge = try_merge(world, block.id);
    Ok(PlacedBlock { block, merge })
}

/// Merge field block `block_id` into the first same-level neighbour (id order).
///
/// The merged block sits at the neighbour's position with the next level and
/// the neighbour's income scaled by the merge multiplier. At most one merge
/// happens per call.
pub fn try_merge(world: &mut World, block_id: u32) -> Option<MergeOutcome> {
    let source = *world.field_block(block_id)?;
    let source_rect = world.block_rect(&source);
    let tolerance = world.tuning.merge_tolerance;

    let target = *world.field.iter().find(|b| {
        b.id != source.id
            && b.level == source.level
            && rects_adjacent(&source_rect, &world.block_rect(b), tolerance)
    })?;

    let merged = Block {
        id: world.next_entity_id(),
        level: target.level + 1,
        income_per_hit: scale_currency(target.income_per_hit, world.tuning.merge_multiplier),
        pos: target.pos,
    };

    world.field.retain(|b| b.id != source.id && b.id != target.id);
    world.field.push(merged);
    world.normalize_order();

    log::info!(
        "Merged blocks {} + {} into {} (level {}, {}/hit)",
        source.id,
        target.id,
        merged.id,
        merged.level,
        merged.income_per_hit
    );

    Some(MergeOutcome {
        source_id: source.id,
        target_id: target.id,
        merged,
    })
}
