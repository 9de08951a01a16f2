//! Money Blocks headless runner
//!
//! Drives a scripted session at a fixed 60 Hz frame clock and logs what
//! happens. Pass a tuning JSON path as the first argument to override the
//! default balance.

use money_blocks::sim::{Rect, RewardEvent, Snapshot, UpgradeKind};
use money_blocks::{RewardObserver, Session, Tuning};

/// Host frame interval (ms)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Simulated play time per run
const RUN_SECONDS: f64 = 600.0;

/// Logs each payout the way a HUD would pop "+$" text
struct PayoutLog;

impl RewardObserver for PayoutLog {
    fn on_reward(&mut self, event: &RewardEvent) {
        log::debug!(
            "Ball {} hit block {}: +{}",
            event.ball_id,
            event.block_id,
            event.credited
        );
    }

    fn on_victory(&mut self, snapshot: &Snapshot) {
        log::info!(
            "Level {} cleared with balance {}",
            snapshot.level,
            snapshot.balance
        );
    }
}

fn load_tuning() -> Result<Tuning, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let tuning = Tuning::from_json(&json)?;
            log::info!("Loaded tuning from {path}");
            Ok(tuning)
        }
        None => Ok(Tuning::default()),
    }
}

/// Drop every shop block onto the first free slot of a coarse grid
fn place_shop(session: &mut Session, layout: &Rect) {
    let ids: Vec<u32> = session.shop_blocks().iter().map(|b| b.id).collect();
    for id in ids {
        let mut placed = false;
        'grid: for row in 0..8 {
            for col in 0..2 {
                let x = layout.x + layout.width * (0.25 + 0.5 * col as f32);
                let y = layout.y + layout.height * (0.0625 + 0.125 * row as f32);
                if let Ok(result) = session.place(id, x, y) {
                    if let Some(merge) = result.merge {
                        log::info!("Merge produced a level {} block", merge.merged.level);
                    }
                    placed = true;
                    break 'grid;
                }
            }
        }
        if !placed {
            log::warn!("No room for shop block {id}");
        }
    }
}

/// Spend spare money, cheapest upgrade first
fn buy_upgrades(session: &mut Session) {
    let kinds = [UpgradeKind::BlockIncome, UpgradeKind::AddBall, UpgradeKind::Multiplier];
    loop {
        let costs = session.snapshot().costs;
        let Some(kind) = kinds.iter().copied().min_by_key(|k| k.cost(&costs)) else {
            break;
        };
        if session.purchase(kind).is_err() {
            break;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let tuning = load_tuning()?;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Money Blocks starting with seed {seed}");

    let layout = Rect::new(0.0, 0.0, tuning.field_width, tuning.field_height);
    let mut session = Session::new(tuning, seed)?;
    session.subscribe(Box::new(PayoutLog));
    session.set_field_layout(layout);
    place_shop(&mut session, &layout);
    session.start();

    let frames = (RUN_SECONDS * 1000.0 / FRAME_MS) as u64;
    let mut earned = 0u64;
    for frame in 0..frames {
        let events = session.frame(frame as f64 * FRAME_MS);
        earned += events.iter().map(|e| e.credited).sum::<u64>();

        if session.victory() {
            buy_upgrades(&mut session);
            session.advance_level();
            session.refresh_shop();
            place_shop(&mut session, &layout);
            session.start();
        }
    }

    log::info!("Earned {earned} over {RUN_SECONDS} simulated seconds");
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}
