use glam::Vec2;
use money_blocks::sim::{
    Ball, Block, EconomyError, GamePhase, PlacementError, Rect, UpgradeKind, UpgradeOutcome, World, spend,
};
use money_blocks::{Session, Tuning};

fn measured_session(seed: u64) -> Session {
    let mut session = Session::new(Tuning::default(), seed).unwrap();
    session.set_field_layout(Rect::new(0.0, 0.0, 300.0, 400.0));
    session
}

#[test]
fn new_run_defaults() {
    let session = Session::new(Tuning::default(), 11).unwrap();
    let snap = session.snapshot();
    assert_eq!(snap.level, 1);
    assert_eq!(snap.balance, 200);
    assert_eq!(snap.collected, 0);
    assert_eq!(snap.level_target, 1000);
    assert_eq!(snap.ball_count, 1);
    assert_eq!(snap.shop_blocks, 3);
    assert_eq!(snap.phase, GamePhase::Idle);
    assert!(!snap.victory);
    assert_eq!(session.balls().len(), 1);
}

#[test]
fn add_ball_purchase() {
    let mut session = Session::new(Tuning::default(), 11).unwrap();
    let outcome = session.purchase(UpgradeKind::AddBall).expect("affordable");
    assert!(matches!(outcome, UpgradeOutcome::BallAdded(_)));

    let snap = session.snapshot();
    assert_eq!(snap.balance, 100);
    assert_eq!(snap.costs.ball, 200);
    assert_eq!(session.balls().len(), 2);

    assert_eq!(
        session.purchase(UpgradeKind::AddBall),
        Err(EconomyError::InsufficientFunds {
            needed: 200,
            available: 100
        })
    );
    assert_eq!(session.balls().len(), 2);
}

#[test]
fn spend_exact_balance_twice() {
    let mut world = World::new(Tuning::default(), 1).unwrap();
    world.economy.balance = 120;
    assert!(spend(&mut world, 120).is_ok());
    assert!(spend(&mut world, 120).is_err());
    assert_eq!(world.economy.balance, 0);
}

#[test]
fn rejected_placement_changes_nothing() {
    let mut session = measured_session(3);
    let first = session.shop_blocks()[0].id;
    session.place(first, 150.0, 200.0).expect("empty field");

    let before_shop = session.shop_blocks().to_vec();
    let before_field = session.field_blocks().to_vec();
    let before_snap = session.snapshot();

    let second = before_shop[0].id;
    assert!(matches!(session.place(second, 160.0, 210.0), Err(PlacementError::Collision(_))));
    assert_eq!(session.place(second, -5.0, 210.0), Err(PlacementError::OutOfBounds));
    assert_eq!(session.place(4242, 20.0, 20.0), Err(PlacementError::UnknownBlock(4242)));

    assert_eq!(session.shop_blocks(), before_shop.as_slice());
    assert_eq!(session.field_blocks(), before_field.as_slice());
    assert_eq!(session.snapshot(), before_snap);
}

#[test]
fn adjacent_blocks_merge_into_next_level() {
    let mut session = measured_session(3);
    let a = session.shop_blocks()[0].id;
    let b = session.shop_blocks()[1].id;

    // Top-left corner, then directly underneath
    session.place(a, 0.0, 0.0).expect("first drop");
    assert_eq!(session.field_blocks().len(), 1);
    let placed = session.place(b, 65.0, 80.0).expect("second drop");

    let merge = placed.merge.expect("neighbours merge");
    assert_eq!(merge.merged.level, 2);
    assert_eq!(merge.merged.income_per_hit, 70);
    assert_eq!(session.field_blocks().len(), 1);
    assert_eq!(session.shop_blocks().len(), 1);
}

#[test]
fn victory_freezes_the_run() {
    let mut world = World::new(Tuning::default(), 5).unwrap();
    world.set_balls(vec![Ball::new(100, Vec2::new(160.0, 75.0), Vec2::new(0.0, 120.0))]);
    world.field.push(Block {
        id: 50,
        level: 1,
        income_per_hit: 60,
        pos: Vec2::new(100.0, 100.0),
    });
    world.economy.collected = 950;

    let mut session = Session::from_world(world);
    assert!(session.start());
    session.frame(0.0);
    let events = session.frame(33.0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].credited, 60);

    let snap = session.snapshot();
    assert_eq!(snap.collected, 1010);
    assert!(snap.victory);
    assert_eq!(snap.phase, GamePhase::Victory);

    let frozen = session.balls().to_vec();
    assert!(frozen.iter().all(|b| b.vel == Vec2::ZERO));
    for i in 2..20 {
        assert!(session.frame(i as f64 * 33.0).is_empty());
    }
    assert_eq!(session.balls(), frozen.as_slice());
    assert_eq!(session.snapshot().collected, 1010);

    session.advance_level();
    let snap = session.snapshot();
    assert_eq!(snap.level, 2);
    assert_eq!(snap.level_target, 1250);
    assert_eq!(snap.collected, 0);
    assert_eq!(snap.balance, 200 + 60);
    assert_eq!(session.field_blocks().len(), 1);
    assert!(session.start());
}

#[test]
fn long_run_earns_money() {
    let mut session = measured_session(8);
    let ids: Vec<u32> = session.shop_blocks().iter().map(|b| b.id).collect();
    let drops = [(75.0, 100.0), (225.0, 100.0), (150.0, 300.0)];
    for (id, (x, y)) in ids.into_iter().zip(drops) {
        session.place(id, x, y).expect("free slot");
    }
    assert_eq!(session.field_blocks().len(), 3);

    session.start();
    let mut paid = 0;
    for frame in 0..3600 {
        paid += session
            .frame(frame as f64 * 1000.0 / 60.0)
            .iter()
            .map(|e| e.credited)
            .sum::<u64>();
        for ball in session.balls() {
            assert!(ball.pos.x >= 24.0 && ball.pos.x <= 276.0);
            assert!(ball.pos.y >= 24.0 && ball.pos.y <= 376.0);
        }
    }

    assert!(paid > 0);
    assert_eq!(session.snapshot().balance, 200 + paid);
}
