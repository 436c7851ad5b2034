//! Spawn director and enemy behaviour
//!
//! Enemies appear just beyond a random world edge and walk in. Once inside
//! they are kept inside by `enforce_bounds`.

use glam::Vec2;

use super::collision::{circle_overlap_depth, clamp_to_bounds, inside_bounds};
use super::rng::RandomSource;
use super::state::{Enemy, EnemyKind, EnemyProjectile, EntityStore, GameState};
use super::waves::{ModifierStat, WaveState};
use crate::direction_to;
use crate::tuning::{ArenaTuning, EnemyTuning, ScalingTuning, ShooterTuning, Tuning};

/// Extra distance beyond the edge a new enemy is placed at
const SPAWN_OFFSET_MIN: f32 = 20.0;
const SPAWN_OFFSET_MAX: f32 = 40.0;

/// Base stats of `kind` scaled geometrically for `wave`
pub fn scaled_stats(base: &EnemyTuning, wave: u32, scaling: &ScalingTuning) -> EnemyTuning {
    let steps = wave.saturating_sub(scaling.scaling_floor) as i32;
    EnemyTuning {
        health: (base.health * scaling.hp_growth.powi(steps)).ceil(),
        damage: (base.damage * scaling.damage_growth.powi(steps)).ceil(),
        ..*base
    }
}

fn base_stats(kind: EnemyKind, tuning: &Tuning) -> &EnemyTuning {
    match kind {
        EnemyKind::Chaser => &tuning.chaser,
        EnemyKind::Shooter => &tuning.shooter.base,
    }
}

/// Random point just outside one of the four world edges
pub fn edge_position(size: f32, arena: &ArenaTuning, rng: &mut dyn RandomSource) -> Vec2 {
    let edge = rng.index(4);
    let offset = size + rng.range(SPAWN_OFFSET_MIN, SPAWN_OFFSET_MAX);
    match edge {
        0 => Vec2::new(rng.range(0.0, arena.width), -offset),
        1 => Vec2::new(arena.width + offset, rng.range(0.0, arena.height)),
        2 => Vec2::new(rng.range(0.0, arena.width), arena.height + offset),
        _ => Vec2::new(-offset, rng.range(0.0, arena.height)),
    }
}

/// Create one enemy of `kind` for the current wave, applying the active modifier
pub fn spawn_enemy(
    store: &mut EntityStore,
    wave: &mut WaveState,
    kind: EnemyKind,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) {
    let stats = scaled_stats(base_stats(kind, tuning), wave.current_wave, &tuning.scaling);
    let pos = edge_position(stats.size, &tuning.arena, rng);
    let health = (stats.health * wave.modifier_factor(ModifierStat::Health)).ceil();

    let enemy = Enemy {
        id: store.next_entity_id(),
        kind,
        pos,
        health,
        max_health: health,
        speed: stats.speed * wave.modifier_factor(ModifierStat::Speed),
        damage: (stats.damage * wave.modifier_factor(ModifierStat::Damage)).ceil(),
        size: stats.size,
        xp_value: stats.xp_value,
        money_value: stats.money_value,
        hit_flash_until: 0,
        last_shot_at: None,
        entered: false,
    };
    log::debug!("Spawned {:?} #{} at {:?}", kind, enemy.id, pos);
    store.enemies.push(enemy);

    match kind {
        EnemyKind::Chaser => wave.chasers_spawned += 1,
        EnemyKind::Shooter => wave.shooters_spawned += 1,
    }
}

/// Spawn whatever is due this tick. Each type has its own deadline.
pub fn update_spawning(state: &mut GameState, now: u64, tuning: &Tuning, rng: &mut dyn RandomSource) {
    if !state.wave.wave_active {
        return;
    }
    let interval = (tuning.waves.spawn_interval_ms as f32
        * state.wave.modifier_factor(ModifierStat::SpawnInterval))
    .round() as u64;

    if state.wave.chasers_spawned < state.wave.chasers_to_spawn
        && now >= state.wave.next_chaser_spawn_at
    {
        spawn_enemy(&mut state.store, &mut state.wave, EnemyKind::Chaser, tuning, rng);
        state.wave.next_chaser_spawn_at = now + interval;
    }
    if state.wave.shooters_spawned < state.wave.shooters_to_spawn
        && now >= state.wave.next_shooter_spawn_at
    {
        spawn_enemy(&mut state.store, &mut state.wave, EnemyKind::Shooter, tuning, rng);
        state.wave.next_shooter_spawn_at = now + interval;
    }
}

/// Desired movement direction for one enemy
fn steer(enemy: &Enemy, target: Vec2, shooter: &ShooterTuning) -> Vec2 {
    let Some((dir, distance)) = direction_to(enemy.pos, target) else {
        return Vec2::ZERO;
    };
    match enemy.kind {
        EnemyKind::Chaser => dir,
        EnemyKind::Shooter => {
            if distance > shooter.preferred_distance + shooter.distance_threshold {
                dir
            } else if distance < shooter.preferred_distance - shooter.distance_threshold {
                -dir
            } else {
                Vec2::ZERO
            }
        }
    }
}

/// Move every enemy according to its behaviour
pub fn move_enemies(store: &mut EntityStore, frame_factor: f32, tuning: &Tuning) {
    let target = store.player.pos;
    let world = Vec2::new(tuning.arena.width, tuning.arena.height);
    for enemy in &mut store.enemies {
        let dir = steer(enemy, target, &tuning.shooter);
        enemy.pos += dir * enemy.speed * frame_factor;
        if !enemy.entered && inside_bounds(enemy.pos, world, -enemy.size) {
            enemy.entered = true;
        }
    }
}

/// Push overlapping enemies apart, each taking half of the correction
pub fn separate_enemies(enemies: &mut [Enemy], strength: f32) {
    let n = enemies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&enemies[i], &enemies[j]);
            let depth = circle_overlap_depth(a.pos, a.size, b.pos, b.size);
            if depth <= 0.0 {
                continue;
            }
            // Coincident centers get an arbitrary axis
            let axis = (b.pos - a.pos).try_normalize().unwrap_or(Vec2::X);
            let push = axis * depth * strength * 0.5;
            enemies[i].pos -= push;
            enemies[j].pos += push;
        }
    }
}

/// Clamp enemies that have already entered the world inside its bounds
pub fn enforce_bounds(enemies: &mut [Enemy], arena: &ArenaTuning) {
    let world = Vec2::new(arena.width, arena.height);
    for enemy in enemies.iter_mut().filter(|e| e.entered) {
        enemy.pos = clamp_to_bounds(enemy.pos, enemy.size, world);
    }
}

/// Fire shooter projectiles where the cooldown allows and the player is in range
pub fn update_shooters(store: &mut EntityStore, now: u64, tuning: &ShooterTuning) {
    let target = store.player.pos;
    for enemy in store.enemies.iter_mut().filter(|e| e.kind == EnemyKind::Shooter) {
        let ready = enemy
            .last_shot_at
            .is_none_or(|t| now.saturating_sub(t) >= tuning.cooldown_ms);
        if !ready {
            continue;
        }
        let Some((dir, distance)) = direction_to(enemy.pos, target) else {
            continue;
        };
        if distance > tuning.max_range {
            continue;
        }
        store.projectiles.push(EnemyProjectile {
            pos: enemy.pos,
            vel: dir * tuning.projectile_speed,
            damage: enemy.damage,
            radius: tuning.projectile_radius,
        });
        enemy.last_shot_at = Some(now);
    }
}

/// Advance shooter projectiles and drop those that left the world
pub fn move_projectiles(store: &mut EntityStore, frame_factor: f32, tuning: &Tuning) {
    let world = Vec2::new(tuning.arena.width, tuning.arena.height);
    let margin = tuning.bullet.cull_margin;
    store.projectiles.retain_mut(|p| {
        p.pos += p.vel * frame_factor;
        inside_bounds(p.pos, world, margin)
    });
}
