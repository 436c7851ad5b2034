//! XP orb magnetism and pickup

use super::state::EntityStore;
use crate::direction_to;
use crate::tuning::XpTuning;

/// Pull orbs within the magnet radius toward the player and collect those
/// touching it. Returns the XP collected this tick.
pub fn update_orbs(store: &mut EntityStore, frame_factor: f32, tuning: &XpTuning) -> u32 {
    let player = &store.player;
    let magnet = player.magnet_radius(tuning.magnet_radius);
    let (target, radius) = (player.pos, player.radius);
    let mut collected = 0;

    store.orbs.retain_mut(|orb| {
        if let Some((dir, distance)) = direction_to(orb.pos, target) {
            if distance < magnet {
                orb.magnetized = true;
                if distance > radius {
                    orb.pos += dir * tuning.move_speed * frame_factor;
                }
            }
        }
        if orb.pos.distance(target) < radius + tuning.orb_size {
            collected += orb.value;
            return false;
        }
        true
    });
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::champion::ChampionId;
    use crate::tuning::Tuning;
    use glam::Vec2;

    #[test]
    fn test_orb_pulled_then_collected() {
        let tuning = Tuning::default();
        let mut store = EntityStore::new(ChampionId::Sascha, &tuning);
        let start = store.player.pos + Vec2::new(100.0, 0.0);
        store.spawn_orb(start, 10);

        assert_eq!(update_orbs(&mut store, 1.0, &tuning.xp), 0);
        assert!(store.orbs[0].magnetized);
        assert!(store.orbs[0].pos.x < start.x);

        let mut total = 0;
        for _ in 0..10 {
            total += update_orbs(&mut store, 1.0, &tuning.xp);
        }
        assert_eq!(total, 10);
        assert!(store.orbs.is_empty());
    }

    #[test]
    fn test_orb_outside_magnet_stays() {
        let tuning = Tuning::default();
        let mut store = EntityStore::new(ChampionId::Sascha, &tuning);
        let start = store.player.pos + Vec2::new(1000.0, 0.0);
        store.spawn_orb(start, 10);
        update_orbs(&mut store, 1.0, &tuning.xp);
        assert_eq!(store.orbs[0].pos, start);
        assert!(!store.orbs[0].magnetized);

        store.player.magnet_multiplier = 3.0;
        update_orbs(&mut store, 1.0, &tuning.xp);
        assert!(store.orbs[0].magnetized);
    }
}
