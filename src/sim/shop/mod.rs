//! Shop economy
//!
//! A merchant may show up once per break (pity driven). While open, the
//! player can buy from a three-entry offer or pay to reroll it. Visit-scoped
//! counters reset whenever the shop opens or closes.

pub mod catalog;

use serde::{Deserialize, Serialize};

use self::catalog::{CATALOG, EntryKind, ShopEntry};
use super::rng::{RandomSource, shuffle};
use super::state::{GameState, Player};
use crate::consts::SHOP_OFFER_SIZE;
use crate::error::ShopError;
use crate::tuning::{ShopTuning, Tuning};

pub use catalog::{ShopEffect, ShopRarity, find};

/// One entry of the current offer, priced when generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSlot {
    pub id: String,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopState {
    /// Probability the merchant shows up at the next eligible break
    pub appearance_chance: f32,
    pub breaks_since_last_shop: u32,
    pub is_open: bool,
    pub offer: Vec<OfferSlot>,
    pub purchases_made: u32,
    pub reroll_cost: u32,
    pub total_rerolls: u32,
}

impl ShopState {
    pub fn new(tuning: &ShopTuning) -> Self {
        Self {
            appearance_chance: tuning.base_chance,
            breaks_since_last_shop: 0,
            is_open: false,
            offer: Vec::new(),
            purchases_made: 0,
            reroll_cost: tuning.base_reroll_cost,
            total_rerolls: 0,
        }
    }

    fn reset_visit(&mut self, tuning: &ShopTuning) {
        self.purchases_made = 0;
        self.reroll_cost = tuning.base_reroll_cost;
        self.total_rerolls = 0;
    }
}

/// Whether the merchant appears this break, without touching pity state
pub fn should_appear(shop: &ShopState, tuning: &ShopTuning, rng: &mut dyn RandomSource) -> bool {
    shop.breaks_since_last_shop >= tuning.guaranteed_after || rng.chance(shop.appearance_chance)
}

/// Reset pity after an appearance, otherwise raise the odds for next time
pub fn update_appearance(shop: &mut ShopState, appeared: bool, tuning: &ShopTuning) {
    if appeared {
        shop.appearance_chance = tuning.base_chance;
        shop.breaks_since_last_shop = 0;
    } else {
        shop.appearance_chance = (shop.appearance_chance + tuning.pity_increment).min(1.0);
        shop.breaks_since_last_shop += 1;
    }
}

/// One-shot roll at the start of a break. No merchant (and no pity) before
/// the minimum wave.
pub fn roll_appearance(
    shop: &mut ShopState,
    wave: u32,
    tuning: &ShopTuning,
    rng: &mut dyn RandomSource,
) -> bool {
    if wave < tuning.min_wave {
        return false;
    }
    let appeared = should_appear(shop, tuning, rng);
    update_appearance(shop, appeared, tuning);
    log::debug!(
        "Shop roll for wave {}: appeared={} next_chance={:.2} dry_breaks={}",
        wave,
        appeared,
        shop.appearance_chance,
        shop.breaks_since_last_shop
    );
    appeared
}

/// `ceil(base * multiplier^floor((wave - min_wave) / scaling_waves))`
pub fn calculate_price(base_cost: u32, wave: u32, tuning: &ShopTuning) -> u32 {
    let offset = wave as i64 - tuning.min_wave as i64;
    let intervals = offset.div_euclid(tuning.price_scaling_waves as i64) as i32;
    (base_cost as f32 * tuning.price_multiplier.powi(intervals)).ceil() as u32
}

/// Rarity-weighted pick; `None` if `pool` is empty
fn weighted_pick(pool: &[&'static ShopEntry], rng: &mut dyn RandomSource) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }
    let total: f32 = pool.iter().map(|e| e.rarity.weight()).sum();
    let mut roll = rng.unit() * total;
    for (i, entry) in pool.iter().enumerate() {
        roll -= entry.rarity.weight();
        if roll < 0.0 {
            return Some(i);
        }
    }
    Some(pool.len() - 1)
}

/// Draw a fresh offer: one perk, one item, then one more from whatever is
/// still eligible, in shuffled order.
pub fn generate_offer(
    player: &Player,
    wave: u32,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> Vec<OfferSlot> {
    let eligible: Vec<&'static ShopEntry> = CATALOG
        .iter()
        .filter(|e| e.is_available(player, tuning))
        .collect();
    let mut chosen: Vec<&'static ShopEntry> = Vec::with_capacity(SHOP_OFFER_SIZE);

    for kind in [EntryKind::Perk, EntryKind::Item] {
        let pool: Vec<_> = eligible.iter().copied().filter(|e| e.kind == kind).collect();
        if let Some(i) = weighted_pick(&pool, rng) {
            chosen.push(pool[i]);
        }
    }
    while chosen.len() < SHOP_OFFER_SIZE {
        let rest: Vec<_> = eligible
            .iter()
            .copied()
            .filter(|e| chosen.iter().all(|c| c.id != e.id))
            .collect();
        match weighted_pick(&rest, rng) {
            Some(i) => chosen.push(rest[i]),
            None => break,
        }
    }

    shuffle(&mut chosen, rng);
    chosen
        .into_iter()
        .map(|e| OfferSlot {
            id: e.id.to_string(),
            price: calculate_price(e.base_cost, wave, &tuning.shop),
        })
        .collect()
}

pub fn open(shop: &mut ShopState, offer: Vec<OfferSlot>, tuning: &ShopTuning) {
    shop.reset_visit(tuning);
    shop.offer = offer;
    shop.is_open = true;
}

pub fn close(shop: &mut ShopState, tuning: &ShopTuning) {
    shop.reset_visit(tuning);
    shop.offer.clear();
    shop.is_open = false;
}

/// Open the merchant's shop if one is present this break
pub fn open_visit(
    state: &mut GameState,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> Result<(), ShopError> {
    if !state.wave.shop_available {
        return Err(ShopError::NotAvailable);
    }
    let offer = generate_offer(&state.store.player, state.wave.current_wave, tuning, rng);
    open(&mut state.shop, offer, &tuning.shop);
    Ok(())
}

/// Buy an offered entry. Returns the price paid.
pub fn purchase(state: &mut GameState, id: &str, tuning: &Tuning) -> Result<u32, ShopError> {
    let shop = &state.shop;
    if !shop.is_open {
        return Err(ShopError::ShopClosed);
    }
    if shop.purchases_made >= tuning.shop.purchase_limit {
        return Err(ShopError::LimitReached);
    }
    let not_offered = || ShopError::NotOffered(id.to_string());
    let slot = shop.offer.iter().find(|s| s.id == id).ok_or_else(not_offered)?;
    let entry = catalog::find(id).ok_or_else(not_offered)?;
    let player = &mut state.store.player;
    if !entry.is_available(player, tuning) {
        return Err(not_offered());
    }

    let price = slot.price;
    if !player.try_spend(price) {
        return Err(ShopError::InsufficientFunds {
            needed: price,
            available: player.money,
        });
    }
    entry.apply(player, &mut state.upgrade_count, tuning);
    state.shop.purchases_made += 1;
    log::info!("Purchased {} for {}", entry.name, price);
    Ok(price)
}

/// Pay to replace the offer. Returns the cost paid.
pub fn reroll(
    state: &mut GameState,
    tuning: &Tuning,
    rng: &mut dyn RandomSource,
) -> Result<u32, ShopError> {
    if !state.shop.is_open {
        return Err(ShopError::ShopClosed);
    }
    let cost = state.shop.reroll_cost;
    let player = &mut state.store.player;
    if !player.try_spend(cost) {
        return Err(ShopError::InsufficientFunds {
            needed: cost,
            available: player.money,
        });
    }
    state.shop.offer = generate_offer(&state.store.player, state.wave.current_wave, tuning, rng);
    state.shop.reroll_cost += tuning.shop.reroll_cost_increment;
    state.shop.total_rerolls += 1;
    Ok(cost)
}
