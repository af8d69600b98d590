//! Per-tick production and consumption.
//!
//! One tick turns a nation's stats into stockpile deltas. Output is scaled
//! by an administrative efficiency factor that drops as territory and
//! population outgrow the nation's administrative capacity:
//!
//! 1. `load = territory * 5 + population * 0.01`
//! 2. `efficiency = max(0.5, 1 - (load - cap) / cap)` when `load > cap`,
//!    otherwise `1`
//! 3. effective stat = `max(0, base + policy modifier)`
//! 4. base yields from stats, each scaled by efficiency
//! 5. `gold_income` modifiers applied as a percentage to scaled gold
//! 6. military upkeep and food consumption subtracted after efficiency
//!
//! All arithmetic is [`Decimal`]. Results are floored to whole units. The
//! calculation is total: negative inputs clamp, nothing fails.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sovereign_types::{EffectTarget, Nation, ResourceKind, StatKind, YieldResult};

use crate::policy::aggregate_modifiers;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Administrative load contributed by each owned cell.
pub const LOAD_PER_TERRITORY: i64 = 5;

/// Administrative capacity used when the stat is absent or non-positive.
pub const BASE_ADMIN_CAP: i64 = 50;

/// Gold per effective economy point.
pub const GOLD_PER_ECONOMY: i64 = 10;

/// Food per effective sustainability point.
pub const FOOD_PER_SUSTAINABILITY: i64 = 10;

/// Research per effective technology point.
pub const RESEARCH_PER_TECHNOLOGY: i64 = 5;

/// Culture points (and mana) per effective culture point.
pub const CULTURE_PER_CULTURE: i64 = 2;

/// Intel per effective intelligence point.
pub const INTEL_PER_INTELLIGENCE: i64 = 2;

/// Growth points needed per new citizen.
pub const GROWTH_DIVISOR: i64 = 10;

/// Gold upkeep per effective military point.
pub const MILITARY_UPKEEP: i64 = 2;

/// Administrative load contributed by each citizen (0.01).
pub fn load_per_capita() -> Decimal {
    Decimal::new(1, 2)
}

/// Floor on the efficiency factor (0.5).
pub fn min_efficiency() -> Decimal {
    Decimal::new(5, 1)
}

/// Food eaten by each citizen per tick (0.1).
pub fn food_per_capita() -> Decimal {
    Decimal::new(1, 1)
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Administrative load of a nation.
pub fn admin_load(nation: &Nation) -> Decimal {
    let territory = Decimal::from(nation.territory().max(0));
    let population = Decimal::from(nation.resource(ResourceKind::Population).max(0));
    territory
        .saturating_mul(Decimal::from(LOAD_PER_TERRITORY))
        .saturating_add(population.saturating_mul(load_per_capita()))
}

/// Efficiency factor for a given load and capacity, in `[0.5, 1]`.
pub fn efficiency(load: Decimal, admin_cap: i64) -> Decimal {
    let cap = Decimal::from(if admin_cap > 0 { admin_cap } else { BASE_ADMIN_CAP });
    if load <= cap {
        return Decimal::ONE;
    }
    let overage = load
        .saturating_sub(cap)
        .checked_div(cap)
        .unwrap_or(Decimal::MAX);
    Decimal::ONE.saturating_sub(overage).max(min_efficiency())
}

/// `max(0, base + modifier)` for one stat.
pub fn effective_stat(
    nation: &Nation,
    modifiers: &BTreeMap<EffectTarget, i64>,
    kind: StatKind,
) -> i64 {
    let modifier: i64 = modifiers
        .iter()
        .filter(|(target, _)| target.as_stat() == Some(kind))
        .map(|(_, delta)| *delta)
        .fold(0, i64::saturating_add);
    nation.stat(kind).saturating_add(modifier).max(0)
}

fn floor_to_i64(value: Decimal) -> i64 {
    value.floor().to_i64().unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn scaled(stat: i64, rate: i64, eff: Decimal) -> Decimal {
    Decimal::from(stat)
        .saturating_mul(Decimal::from(rate))
        .saturating_mul(eff)
}

// ---------------------------------------------------------------------------
// Tick calculation
// ---------------------------------------------------------------------------

/// Compute one tick of yields for `nation`.
///
/// Returns net deltas for gold, food, mana, culture points, intel,
/// population and research, plus effective stability and legitimacy.
pub fn calculate_yields(nation: &Nation) -> YieldResult {
    let modifiers = aggregate_modifiers(&nation.policies);
    let stat = |kind| effective_stat(nation, &modifiers, kind);

    let eff = efficiency(admin_load(nation), stat(StatKind::AdminCap));

    let base_gold = scaled(stat(StatKind::Economy), GOLD_PER_ECONOMY, eff);
    let base_food = scaled(stat(StatKind::Sustainability), FOOD_PER_SUSTAINABILITY, eff);
    let research = scaled(stat(StatKind::Technology), RESEARCH_PER_TECHNOLOGY, eff);
    let culture = scaled(stat(StatKind::Culture), CULTURE_PER_CULTURE, eff);
    let intel = scaled(stat(StatKind::Intelligence), INTEL_PER_INTELLIGENCE, eff);
    let growth = Decimal::from(stat(StatKind::Growth))
        .checked_div(Decimal::from(GROWTH_DIVISOR))
        .unwrap_or(Decimal::ZERO)
        .saturating_mul(eff);

    let gold_income_pct = modifiers
        .get(&EffectTarget::GoldIncome)
        .copied()
        .unwrap_or(0);
    let gold = if gold_income_pct == 0 {
        base_gold
    } else {
        let factor = Decimal::ONE.saturating_add(Decimal::new(gold_income_pct, 2));
        base_gold.saturating_mul(factor)
    };

    let upkeep = Decimal::from(stat(StatKind::Military)).saturating_mul(Decimal::from(MILITARY_UPKEEP));
    let population = Decimal::from(nation.resource(ResourceKind::Population).max(0));
    let eaten = population.saturating_mul(food_per_capita());

    let mut resource_deltas = BTreeMap::new();
    resource_deltas.insert(ResourceKind::Gold, floor_to_i64(gold.saturating_sub(upkeep)));
    resource_deltas.insert(ResourceKind::Food, floor_to_i64(base_food.saturating_sub(eaten)));
    resource_deltas.insert(ResourceKind::Mana, floor_to_i64(culture));
    resource_deltas.insert(ResourceKind::CulturePoints, floor_to_i64(culture));
    resource_deltas.insert(ResourceKind::Intel, floor_to_i64(intel));
    resource_deltas.insert(ResourceKind::Population, floor_to_i64(growth));
    resource_deltas.insert(ResourceKind::Research, floor_to_i64(research));

    let mut stat_snapshots = BTreeMap::new();
    stat_snapshots.insert(StatKind::Stability, stat(StatKind::Stability));
    stat_snapshots.insert(StatKind::Legitimacy, stat(StatKind::Legitimacy));

    YieldResult {
        resource_deltas,
        stat_snapshots,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use sovereign_types::{NationId, NationIdentity, NationStatus, PolicyCategory};

    use super::*;

    fn nation(stats: &[(StatKind, i64)], resources: &[(ResourceKind, i64)]) -> Nation {
        Nation {
            id: NationId::new(),
            identity: NationIdentity {
                name: "Testland".to_owned(),
                ruler_title: "Regent".to_owned(),
                description: None,
                ideology: None,
            },
            stats: stats.iter().copied().collect(),
            resources: resources.iter().copied().collect(),
            status: NationStatus {
                is_alive: true,
                founded_at: Utc::now(),
                last_action_at: None,
                cooldown_seconds: 180,
                shield_until: None,
                fallen_at: None,
            },
            policies: BTreeMap::new(),
            tags: Vec::new(),
            capital: None,
            holdings: BTreeSet::new(),
        }
    }

    fn delta(result: &YieldResult, kind: ResourceKind) -> i64 {
        *result.resource_deltas.get(&kind).unwrap()
    }

    #[test]
    fn overextended_nation_hits_the_efficiency_floor() {
        let n = nation(
            &[
                (StatKind::Economy, 60),
                (StatKind::Sustainability, 40),
                (StatKind::AdminCap, 50),
            ],
            &[(ResourceKind::Territory, 20), (ResourceKind::Population, 1000)],
        );
        assert_eq!(admin_load(&n), Decimal::from(110));
        assert_eq!(efficiency(admin_load(&n), 50), Decimal::new(5, 1));

        let result = calculate_yields(&n);
        // 60 * 10 * 0.5, no military upkeep.
        assert_eq!(delta(&result, ResourceKind::Gold), 300);
        // 40 * 10 * 0.5 - 1000 * 0.1
        assert_eq!(delta(&result, ResourceKind::Food), 100);
    }

    #[test]
    fn efficiency_never_drops_below_half() {
        for load in [0_i64, 50, 51, 75, 99, 100, 500, 1_000_000] {
            for cap in [-10_i64, 0, 1, 10, 50, 1000] {
                let eff = efficiency(Decimal::from(load), cap);
                assert!(eff >= min_efficiency(), "load {load} cap {cap}: {eff}");
                assert!(eff <= Decimal::ONE);
            }
        }
    }

    #[test]
    fn efficiency_degrades_linearly_with_overage() {
        // 60 load on 50 cap: 1 - 10/50 = 0.8
        assert_eq!(efficiency(Decimal::from(60), 50), Decimal::new(8, 1));
        assert_eq!(efficiency(Decimal::from(50), 50), Decimal::ONE);
    }

    #[test]
    fn missing_admin_cap_uses_base_capacity() {
        assert_eq!(
            efficiency(Decimal::from(60), 0),
            efficiency(Decimal::from(60), BASE_ADMIN_CAP)
        );
    }

    #[test]
    fn policy_modifiers_cannot_push_stats_negative() {
        let mut n = nation(&[(StatKind::Economy, 10)], &[]);
        n.policies
            .insert(PolicyCategory::Conscription, "total_war".to_owned());
        let mods = aggregate_modifiers(&n.policies);
        assert_eq!(effective_stat(&n, &mods, StatKind::Economy), 0);
        assert_eq!(effective_stat(&n, &mods, StatKind::Military), 50);
    }

    #[test]
    fn gold_income_is_a_percentage_of_scaled_gold() {
        let mut n = nation(&[(StatKind::Economy, 10)], &[]);
        n.policies.insert(PolicyCategory::Tax, "heavy".to_owned());
        // 10 * 10 * 1.0 * 1.2
        assert_eq!(delta(&calculate_yields(&n), ResourceKind::Gold), 120);

        n.policies.insert(PolicyCategory::Tax, "low".to_owned());
        assert_eq!(delta(&calculate_yields(&n), ResourceKind::Gold), 80);
    }

    #[test]
    fn upkeep_and_consumption_apply_after_efficiency() {
        let n = nation(
            &[(StatKind::Economy, 5), (StatKind::Military, 40)],
            &[(ResourceKind::Population, 2000)],
        );
        // load 20 < cap 50, efficiency 1. gold 50 - 80 upkeep.
        let result = calculate_yields(&n);
        assert_eq!(delta(&result, ResourceKind::Gold), -30);
        assert_eq!(delta(&result, ResourceKind::Food), -200);
    }

    #[test]
    fn secondary_outputs_follow_their_stats() {
        let n = nation(
            &[
                (StatKind::Technology, 30),
                (StatKind::Culture, 25),
                (StatKind::Intelligence, 7),
                (StatKind::Growth, 45),
            ],
            &[],
        );
        let result = calculate_yields(&n);
        assert_eq!(delta(&result, ResourceKind::Research), 150);
        assert_eq!(delta(&result, ResourceKind::CulturePoints), 50);
        assert_eq!(delta(&result, ResourceKind::Mana), 50);
        assert_eq!(delta(&result, ResourceKind::Intel), 14);
        // 45 / 10 floored
        assert_eq!(delta(&result, ResourceKind::Population), 4);
    }

    #[test]
    fn snapshots_report_effective_stability_and_legitimacy() {
        let mut n = nation(&[(StatKind::Stability, 20), (StatKind::Legitimacy, 10)], &[]);
        n.policies.insert(PolicyCategory::Tax, "plunder".to_owned());
        let result = calculate_yields(&n);
        assert_eq!(result.stat_snapshots.get(&StatKind::Stability), Some(&0));
        assert_eq!(result.stat_snapshots.get(&StatKind::Legitimacy), Some(&0));
    }

    #[test]
    fn negative_stats_are_clamped_not_rejected() {
        let n = nation(&[(StatKind::Economy, -40), (StatKind::Military, -5)], &[]);
        let result = calculate_yields(&n);
        assert_eq!(delta(&result, ResourceKind::Gold), 0);
    }
}
