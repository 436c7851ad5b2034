//! Simulation tick
//!
//! Per tick: resolve phase transitions, advance the world, resolve combat,
//! then re-check wave clear and level-up. Nothing runs while paused.

use glam::Vec2;

use super::chests;
use super::clock::Clock;
use super::collision::clamp_to_bounds;
use super::combat;
use super::rng::RandomSource;
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use super::waves;
use super::weapons;
use super::xp;
use crate::frame_factor;
use crate::tuning::Tuning;

/// Player intent for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement direction; longer than 1 is clamped
    pub movement: Vec2,
    /// World-space aim point (None = hold fire)
    pub aim: Option<Vec2>,
}

/// Everything a tick needs besides the state itself
pub struct Frame<'a> {
    pub now: u64,
    pub dt_ms: f32,
    pub tuning: &'a Tuning,
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> Frame<'a> {
    pub fn new(
        clock: &dyn Clock,
        dt_ms: f32,
        tuning: &'a Tuning,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            now: clock.now_ms(),
            dt_ms,
            tuning,
            rng,
        }
    }
}

/// Begin a run: short "get ready" pause, then the first break
pub fn start_run(state: &mut GameState, now: u64, tuning: &Tuning) {
    state.phase = GamePhase::GetReady;
    state.get_ready_until = now + tuning.timing.get_ready_ms;
    log::info!(
        "Run started with {} ({})",
        state.store.player.champion.name(),
        state.store.player.champion.description()
    );
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, frame: &mut Frame<'_>) {
    if state.pause.paused {
        return;
    }
    let (now, dt_ms, tuning) = (frame.now, frame.dt_ms, frame.tuning);
    let rng = &mut *frame.rng;

    if !waves::advance_phase(state, now, tuning, rng) {
        return;
    }
    let factor = frame_factor(dt_ms);
    let play_ms = state.play_ms(now);

    // Player upkeep
    let player = &mut state.store.player;
    player.update_iframes(now);
    player.boosts.expire(play_ms);
    player.regenerate(now, dt_ms, tuning.player.regen_delay_ms);
    move_player(state, input.movement, factor, tuning);
    state.wave.update_banner(now);

    // World
    if state.phase == GamePhase::Playing {
        spawn::update_spawning(state, now, tuning, rng);
    }
    spawn::move_enemies(&mut state.store, factor, tuning);
    spawn::separate_enemies(&mut state.store.enemies, tuning.waves.separation_strength);
    spawn::enforce_bounds(&mut state.store.enemies, &tuning.arena);
    spawn::update_shooters(&mut state.store, now, &tuning.shooter);
    spawn::move_projectiles(&mut state.store, factor, tuning);

    if let Some(aim) = input.aim {
        weapons::fire_volley(state, aim, now, tuning);
    }
    weapons::fire_hurricane(state, now, tuning);
    weapons::move_bullets(&mut state.store, factor, tuning);

    // Combat
    combat::resolve_bullet_hits(state, now, tuning, rng);
    let contact = combat::resolve_enemy_contact(state, now, tuning);
    let shot = combat::resolve_projectile_hits(state, now, tuning);
    if contact || shot {
        game_over(state, now);
        return;
    }

    // Progression
    let collected = xp::update_orbs(&mut state.store, factor, &tuning.xp);
    let mut leveled = collected > 0 && state.store.player.add_xp(collected, &tuning.level);
    leveled |= chests::update_chests(state, now, tuning, rng);

    waves::check_wave_clear(state, now, tuning);
    if leveled {
        waves::begin_level_up(state, now, tuning, rng);
    }
}

fn move_player(state: &mut GameState, movement: Vec2, factor: f32, tuning: &Tuning) {
    let player = &mut state.store.player;
    let dir = movement.clamp_length_max(1.0);
    if dir == Vec2::ZERO {
        return;
    }
    let step = dir * player.move_speed() * tuning.player.move_scale * factor;
    let world = Vec2::new(tuning.arena.width, tuning.arena.height);
    player.pos = clamp_to_bounds(player.pos + step, player.radius, world);
}

fn game_over(state: &mut GameState, now: u64) {
    state.phase = GamePhase::GameOver;
    state.store.player.health = 0.0;
    let survived = state.play_ms(now);
    log::info!(
        "Game over on wave {} after {:.1}s: level {}, {} kills",
        state.wave.current_wave,
        survived as f32 / 1000.0,
        state.store.player.level,
        state.store.player.kill_count
    );
    state.emit(GameEvent::GameOver);
}
