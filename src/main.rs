//! Wave Arena headless runner
//!
//! Plays a run with a simple autopilot against a manual clock. Useful for
//! balance checks and for reproducing a seed from the log.
//!
//! Usage: `wave-arena [seed] [champion] [max_wave]`
//!
//! Set `WAVE_ARENA_TUNING` to a JSON file to override balance values.

use glam::Vec2;

use wave_arena::Engine;
use wave_arena::Settings;
use wave_arena::Tuning;
use wave_arena::audio::LogAudio;
use wave_arena::consts::TARGET_FRAME_MS;
use wave_arena::sim::{ChampionId, GamePhase, GameState, ManualClock, PcgSource, TickInput};

/// Give up after this much simulated time
const MAX_RUN_MS: u64 = 30 * 60 * 1000;
/// Autopilot backs off from enemies closer than this
const KITE_RADIUS: f32 = 220.0;

struct Args {
    seed: u64,
    champion: ChampionId,
    max_wave: u32,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let champion = args
        .next()
        .and_then(|s| ChampionId::parse(&s))
        .unwrap_or_default();
    let max_wave = args.next().and_then(|s| s.parse().ok()).unwrap_or(20);
    Args {
        seed,
        champion,
        max_wave,
    }
}

/// Balance from `WAVE_ARENA_TUNING`, falling back to defaults
fn load_tuning() -> Tuning {
    let Ok(path) = std::env::var("WAVE_ARENA_TUNING") else {
        return Tuning::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Using default tuning, {} unusable: {}", path, e);
            Tuning::default()
        }
    }
}

/// Aim at the nearest enemy, back away when crowded, otherwise collect loot
fn autopilot(world: &GameState) -> TickInput {
    let player = world.player().pos;
    let nearest = world
        .store
        .enemies
        .iter()
        .filter(|e| e.entered)
        .map(|e| e.pos)
        .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));

    let loot = world
        .store
        .orbs
        .iter()
        .map(|o| o.pos)
        .chain(world.store.chests.iter().map(|c| c.pos))
        .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));

    let movement = match (nearest, loot) {
        (Some(enemy), _) if enemy.distance(player) < KITE_RADIUS => {
            (player - enemy).normalize_or_zero()
        }
        (_, Some(target)) => (target - player).normalize_or_zero(),
        _ => Vec2::ZERO,
    };

    TickInput {
        movement,
        aim: nearest,
    }
}

/// Buy the cheapest affordable entry, then leave
fn visit_shop(engine: &mut Engine) {
    if !engine.open_shop() {
        return;
    }
    let money = engine.snapshot().money;
    let cheapest = engine
        .world()
        .shop
        .offer
        .iter()
        .filter(|slot| slot.price <= money)
        .min_by_key(|slot| slot.price)
        .map(|slot| slot.id.clone());
    if let Some(id) = cheapest {
        engine.purchase(&id);
    }
    engine.close_shop();
}

fn main() {
    env_logger::init();
    let args = parse_args();
    let rng = PcgSource::new(args.seed);
    log::info!(
        "Wave Arena (headless) seed {} as {}",
        rng.seed(),
        args.champion.name()
    );

    let clock = ManualClock::new(0);
    let mut engine = Engine::new(
        load_tuning(),
        Settings::default(),
        Box::new(rng),
        Box::new(clock.clone()),
    )
    .with_audio(Box::new(LogAudio));

    engine.select_champion(args.champion);
    engine.start();

    let frame_ms = TARGET_FRAME_MS.round() as u64;
    let mut shopped_wave = 0;
    let mut elapsed = 0;
    while elapsed < MAX_RUN_MS {
        match engine.state() {
            GamePhase::GameOver => break,
            GamePhase::LevelUp => {
                let Some(choice) = engine.pending_upgrades().first().copied() else {
                    log::error!("Level-up without choices");
                    break;
                };
                if let Err(e) = engine.apply_upgrade(choice.id.as_str(), choice.tier.level()) {
                    log::error!("Autopilot upgrade failed: {}", e);
                    break;
                }
                continue;
            }
            GamePhase::Countdown => {
                let hud = engine.snapshot();
                if hud.wave > args.max_wave {
                    break;
                }
                if hud.shop_available && shopped_wave != hud.wave {
                    shopped_wave = hud.wave;
                    visit_shop(&mut engine);
                }
            }
            _ => {}
        }

        engine.set_input(autopilot(engine.world()));
        clock.advance(frame_ms);
        engine.update(frame_ms as f32);
        engine.drain_events();
        elapsed += frame_ms;
    }

    let hud = engine.snapshot();
    log::info!(
        "Finished in {:?}: wave {}, level {}, {} kills, {} gold, {:.1}s survived",
        hud.phase,
        hud.wave,
        hud.level,
        hud.kill_count,
        hud.money,
        hud.survival_ms as f32 / 1000.0
    );
    match serde_json::to_string_pretty(&hud) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize summary: {}", e),
    }
}
