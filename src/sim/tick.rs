//! Physics stepper
//!
//! Advances every ball by one frame: integrate, bounce off walls, bounce off
//! field blocks and pay out for each block hit.

use glam::Vec2;

use super::collision::{center_bounds, circle_rect_overlap, clamp_to_walls, resolve_circle_rect};
use super::rect::Rect;
use super::state::{Block, GamePhase, RewardEvent, World};

/// Sanitize and clamp a raw frame delta
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(max_dt)
    } else {
        0.0
    }
}

/// Advance the world by `dt` seconds and return the rewards paid.
///
/// `dt` is clamped to `tuning.max_dt` and split into `tuning.substeps` equal
/// sub-steps. Once the level target is reached, balls are frozen and every
/// later call is a no-op until the level advances.
pub fn step(world: &mut World, dt: f32) -> Vec<RewardEvent> {
    let mut events = Vec::new();

    if world.check_victory() {
        freeze(world);
        return events;
    }

    let dt = clamp_dt(dt, world.tuning.max_dt);
    if dt == 0.0 {
        return events;
    }

    let substeps = world.tuning.substeps.max(1);
    let sub_dt = dt / substeps as f32;

    for _ in 0..substeps {
        if substep(world, sub_dt, &mut events) {
            log::info!(
                "Level {} target reached: {} / {}",
                world.level,
                world.economy.collected,
                world.economy.level_target
            );
            freeze(world);
            break;
        }
    }

    events
}

/// Block passes per ball per sub-step before falling back
const MAX_RESOLVE_PASSES: usize = 4;

/// One integration sub-step. Returns true once a reward wins the level.
///
/// Each ball is resolved against the field repeatedly until a full pass finds
/// no contact. A block pays at most once per ball per sub-step. A ball that is
/// still wedged after the last pass goes back to where the sub-step started
/// and reverses; if it was already inside a block there, it is pushed out of
/// the blocks it touches as one cluster.
fn substep(world: &mut World, dt: f32, events: &mut Vec<RewardEvent>) -> bool {
    let radius = world.tuning.ball_radius;
    let (width, height) = (world.tuning.field_width, world.tuning.field_height);
    let bounds = center_bounds(radius, width, height);
    let blocks: Vec<(Block, Rect)> = world.field.iter().map(|b| (*b, world.block_rect(b))).collect();

    let mut won = false;
    for i in 0..world.balls.len() {
        let start = world.balls[i];
        let mut ball = start;

        ball.pos += ball.vel * dt;
        clamp_to_walls(&mut ball.pos, &mut ball.vel, radius, width, height);

        let mut paid: Vec<u32> = Vec::new();
        for _ in 0..MAX_RESOLVE_PASSES {
            let mut touched = false;
            for (block, rect) in &blocks {
                let overlap = circle_rect_overlap(ball.pos, radius, rect);
                if !overlap.overlapping {
                    continue;
                }
                touched = true;
                resolve_circle_rect(&mut ball.pos, &mut ball.vel, radius, &overlap, rect, &bounds);

                if won || paid.contains(&block.id) {
                    continue;
                }
                paid.push(block.id);
                let credited = world.apply_reward(block.income_per_hit);
                events.push(RewardEvent {
                    block_id: block.id,
                    ball_id: ball.id,
                    amount: block.income_per_hit,
                    credited,
                });
                won = world.check_victory();
            }

            // Push-outs never leave the ball outside the field
            clamp_to_walls(&mut ball.pos, &mut ball.vel, radius, width, height);
            if !touched {
                break;
            }
        }

        if touches_any(ball.pos, radius, &blocks) {
            if touches_any(start.pos, radius, &blocks) {
                escape_cluster(&mut ball.pos, &mut ball.vel, radius, &blocks, &bounds);
                clamp_to_walls(&mut ball.pos, &mut ball.vel, radius, width, height);
            } else {
                log::debug!("Ball {} wedged between blocks, backing out", ball.id);
                ball.pos = start.pos;
                ball.vel = -start.vel;
            }
        }

        world.balls[i] = ball;
        if won {
            return true;
        }
    }

    false
}

fn touches_any(pos: Vec2, radius: f32, blocks: &[(Block, Rect)]) -> bool {
    blocks
        .iter()
        .any(|(_, rect)| circle_rect_overlap(pos, radius, rect).overlapping)
}

/// Push a ball out of the bounding box of every block it touches, growing the
/// box with any block the push lands on.
fn escape_cluster(pos: &mut Vec2, vel: &mut Vec2, radius: f32, blocks: &[(Block, Rect)], bounds: &Rect) {
    let mut cluster: Option<Rect> = None;
    for _ in 0..=blocks.len() {
        if !touches_any(*pos, radius, blocks) {
            break;
        }
        let covering = blocks
            .iter()
            .filter(|(_, rect)| circle_rect_overlap(*pos, radius, rect).overlapping)
            .fold(cluster, |acc, (_, rect)| Some(acc.map_or(*rect, |c| c.union(rect))));
        let Some(covering) = covering else {
            break;
        };
        cluster = Some(covering);

        let overlap = circle_rect_overlap(*pos, radius, &covering);
        resolve_circle_rect(pos, vel, radius, &overlap, &covering, bounds);
    }
}

/// Stop all motion and latch the victory phase
fn freeze(world: &mut World) {
    for ball in &mut world.balls {
        ball.vel = Vec2::ZERO;
    }
    world.phase = GamePhase::Victory;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::state::Ball;

    fn world_with(tuning: Tuning, balls: Vec<Ball>, field: Vec<Block>) -> World {
        let mut world = World::new(tuning, 1).unwrap();
        world.set_balls(balls);
        world.field = field;
        world.phase = GamePhase::Running;
        world
    }

    fn block(id: u32, x: f32, y: f32, income: u64) -> Block {
        Block {
            id,
            level: 1,
            income_per_hit: income,
            pos: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.1, 1.0 / 30.0), 1.0 / 30.0);
        assert_eq!(clamp_dt(0.01, 1.0 / 30.0), 0.01);
        assert_eq!(clamp_dt(-1.0, 1.0 / 30.0), 0.0);
        assert_eq!(clamp_dt(f32::NAN, 1.0 / 30.0), 0.0);
    }

    #[test]
    fn test_left_wall_bounce_single_substep() {
        let tuning = Tuning {
            substeps: 1,
            ..Tuning::default()
        };
        let ball = Ball::new(100, Vec2::new(24.0, 200.0), Vec2::new(-50.0, 0.0));
        let mut world = world_with(tuning, vec![ball], Vec::new());

        let events = step(&mut world, 0.1);
        assert!(events.is_empty());
        assert_eq!(world.balls[0].pos.x, 24.0);
        assert_eq!(world.balls[0].vel, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_free_flight() {
        let ball = Ball::new(100, Vec2::new(150.0, 200.0), Vec2::new(30.0, -60.0));
        let mut world = world_with(Tuning::default(), vec![ball], Vec::new());
        step(&mut world, 1.0 / 60.0);
        let b = world.balls[0];
        assert!((b.pos.x - 150.5).abs() < 1e-4);
        assert!((b.pos.y - 199.0).abs() < 1e-4);
        assert_eq!(b.vel, Vec2::new(30.0, -60.0));
    }

    #[test]
    fn test_block_hit_pays_and_bounces() {
        // Ball falling onto the top face of a block
        let ball = Ball::new(100, Vec2::new(160.0, 75.0), Vec2::new(0.0, 120.0));
        let mut world = world_with(Tuning::default(), vec![ball], vec![block(50, 100.0, 100.0, 35)]);
        let before = world.economy.balance;

        let events = step(&mut world, 1.0 / 30.0);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            RewardEvent {
                block_id: 50,
                ball_id: 100,
                amount: 35,
                credited: 35
            }
        );
        assert_eq!(world.economy.balance, before + 35);
        assert_eq!(world.economy.collected, 35);
        assert!(world.balls[0].vel.y < 0.0);
        assert!(world.balls[0].pos.y < 100.0 - 24.0);
    }

    #[test]
    fn test_reward_scaled_by_multiplier() {
        let ball = Ball::new(100, Vec2::new(160.0, 75.0), Vec2::new(0.0, 120.0));
        let mut world = world_with(Tuning::default(), vec![ball], vec![block(50, 100.0, 100.0, 35)]);
        world.economy.profit_multiplier = 1.2;
        let events = step(&mut world, 1.0 / 30.0);
        assert_eq!(events[0].amount, 35);
        assert_eq!(events[0].credited, 42);
    }

    #[test]
    fn test_victory_freezes_and_stops_rewards() {
        let ball = Ball::new(100, Vec2::new(160.0, 75.0), Vec2::new(0.0, 120.0));
        let mut world = world_with(Tuning::default(), vec![ball], vec![block(50, 100.0, 100.0, 60)]);
        world.economy.collected = 950;
        world.economy.level_target = 1000;

        let events = step(&mut world, 1.0 / 30.0);
        assert_eq!(events.len(), 1);
        assert_eq!(world.economy.collected, 1010);
        assert!(world.check_victory());
        assert_eq!(world.phase, GamePhase::Victory);
        assert_eq!(world.balls[0].vel, Vec2::ZERO);

        let frozen = world.balls[0].pos;
        for _ in 0..10 {
            assert!(step(&mut world, 1.0 / 30.0).is_empty());
        }
        assert_eq!(world.balls[0].pos, frozen);
        assert_eq!(world.economy.collected, 1010);
    }

    #[test]
    fn test_victory_mid_step_skips_remaining_hits() {
        // Two balls each about to hit a block; the first hit wins the level
        let balls = vec![
            Ball::new(100, Vec2::new(160.0, 75.0), Vec2::new(0.0, 120.0)),
            Ball::new(101, Vec2::new(160.0, 275.0), Vec2::new(0.0, 120.0)),
        ];
        let field = vec![block(50, 100.0, 100.0, 60), block(51, 100.0, 300.0, 60)];
        let mut world = world_with(Tuning::default(), balls, field);
        world.economy.collected = 950;

        let events = step(&mut world, 1.0 / 30.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ball_id, 100);
        assert!(world.balls.iter().all(|b| b.vel == Vec2::ZERO));
    }

    #[test]
    fn test_seam_between_blocks_pays_once() {
        // Ball falling onto the seam of two touching blocks; the first block
        // in id order takes the hit and the push-out clears the second
        let ball = Ball::new(100, Vec2::new(125.0, 80.0), Vec2::new(0.0, 90.0));
        let field = vec![block(50, 5.0, 100.0, 35), block(51, 125.0, 100.0, 70)];
        let mut world = world_with(Tuning::default(), vec![ball], field);

        let events = step(&mut world, 1.0 / 30.0);
        let ids: Vec<u32> = events.iter().map(|e| e.block_id).collect();
        assert_eq!(ids, vec![50]);
        assert!(world.balls[0].vel.y < 0.0);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let make = || {
            let mut world = World::new(tuning.clone(), 99).unwrap();
            world.field = vec![block(50, 20.0, 250.0, 35), block(51, 160.0, 40.0, 70)];
            world.phase = GamePhase::Running;
            world
        };
        let mut a = make();
        let mut b = make();

        let dts = [0.016, 0.017, 0.2, 0.001, 0.033, 0.016];
        for _ in 0..50 {
            for dt in dts {
                assert_eq!(step(&mut a, dt), step(&mut b, dt));
            }
        }
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.economy, b.economy);
    }

    fn overlapping_any(world: &World) -> bool {
        world.balls.iter().any(|ball| {
            world.field.iter().any(|b| {
                circle_rect_overlap(ball.pos, world.tuning.ball_radius, &world.block_rect(b)).overlapping
            })
        })
    }

    #[test]
    fn test_one_ball_two_blocks_in_id_order() {
        // Ball driven into the corner between a block on its left and one
        // below: the first push clears the left block, the second the lower
        let tuning = Tuning {
            substeps: 1,
            ..Tuning::default()
        };
        let ball = Ball::new(100, Vec2::new(150.0, 130.0), Vec2::new(-600.0, 600.0));
        let field = vec![block(50, 5.0, 100.0, 35), block(51, 130.0, 160.0, 70)];
        let mut world = world_with(tuning, vec![ball], field);

        let events = step(&mut world, 1.0 / 60.0);
        let ids: Vec<u32> = events.iter().map(|e| e.block_id).collect();
        assert_eq!(ids, vec![50, 51]);
        assert_eq!(world.economy.collected, 105);

        let b = world.balls[0];
        assert!(b.vel.x > 0.0);
        assert!(b.vel.y < 0.0);
        assert!(!overlapping_any(&world));
    }

    #[test]
    fn test_corridor_narrower_than_ball_backs_out() {
        // 40-unit gap between two blocks; the ball is 48 across
        let ball = Ball::new(100, Vec2::new(60.0, 75.0), Vec2::new(150.0, 0.0));
        let field = vec![block(50, 100.0, 5.0, 35), block(51, 100.0, 95.0, 35)];
        let mut world = world_with(Tuning::default(), vec![ball], field);

        let mut events = Vec::new();
        for _ in 0..60 {
            events.extend(step(&mut world, 1.0 / 60.0));
            assert!(!overlapping_any(&world), "ball wedged at {:?}", world.balls[0]);
        }

        // Each approach pays both blocks once, not every sub-step
        assert!(events.len() >= 2 && events.len() <= 4, "{} rewards", events.len());
        assert!(world.economy.collected < world.economy.level_target);
    }

    #[test]
    fn test_ball_inside_corridor_is_pushed_clear() {
        // A ball that starts wedged (block placed on top of it) leaves the pair
        let ball = Ball::new(100, Vec2::new(160.0, 75.0), Vec2::ZERO);
        let field = vec![block(50, 100.0, 5.0, 35), block(51, 100.0, 95.0, 35)];
        let mut world = world_with(Tuning::default(), vec![ball], field);

        let events = step(&mut world, 1.0 / 60.0);
        assert_eq!(events.len(), 2);
        assert!(!overlapping_any(&world));
        assert!(world.balls[0].pos.x > 220.0);
    }
}
