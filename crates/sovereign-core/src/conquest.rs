//! Claim and attack.
//!
//! Both run as one optimistic transaction. Every document a decision depends
//! on (actor, target cell, the six neighbors, defender) is read inside the
//! attempt that commits, so two actions on the same cell serialize and the
//! loser sees the winner's writes as a rejection.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sovereign_types::{
    CellCoord, CellResource, CellType, ClaimOutcome, CommandKind, ConquestOutcome, Nation,
    NationDelta, NationId, ResourceKind, StatKind,
};
use sovereign_world::neighbors;
use tracing::info;

use crate::atomic::{Transaction, run_atomic};
use crate::engine::{Engine, trace_failure};
use crate::error::{ConquestError, Rejection};
use crate::history::HistorySink;
use crate::random::RandomSource;
use crate::store::DocumentStore;

/// Military gained by the attacker on an ordinary victory.
const VICTORY_MILITARY_GAIN: i64 = 1;
/// Military gained by the attacker when a capital falls.
const CAPITAL_MILITARY_GAIN: i64 = 5;
/// Influence gained by the attacker when a capital falls.
const CAPITAL_INFLUENCE_GAIN: i64 = 10;
/// Stability lost by a defender that loses a cell.
const DEFENDER_STABILITY_LOSS: i64 = 5;
/// Military lost by a defender that loses a cell.
const DEFENDER_MILITARY_LOSS: i64 = 2;
/// Military gained by a defender that holds.
const DEFENDER_HOLD_GAIN: i64 = 1;
/// Military lost by a repelled attacker.
const REPELLED_MILITARY_LOSS: i64 = 2;
/// Stability lost by a repelled attacker.
const REPELLED_STABILITY_LOSS: i64 = 2;

// ---------------------------------------------------------------------------
// Combat arithmetic
// ---------------------------------------------------------------------------

/// `percent / 100` as a decimal.
fn percent(value: u32) -> Decimal {
    Decimal::new(i64::from(value), 2)
}

/// Whether the attacker wins.
///
/// Attacker power is `military * attacker_noise`. Defender power is
/// `military * defender_noise * defense_bonus`. Ties go to the defender.
/// Negative military counts as zero.
pub fn attacker_prevails(
    attacker_military: i64,
    defender_military: i64,
    attacker_noise: Decimal,
    defender_noise: Decimal,
    defense_bonus: Decimal,
) -> bool {
    let attack = Decimal::from(attacker_military.max(0)).saturating_mul(attacker_noise);
    let defense = Decimal::from(defender_military.max(0))
        .saturating_mul(defender_noise)
        .saturating_mul(defense_bonus);
    attack > defense
}

/// Gold taken on an ordinary victory: `floor(min(gold * cap%, absolute_cap))`.
pub fn loot_for(defender_gold: i64, cap_percent: u32, absolute_cap: i64) -> i64 {
    let share = Decimal::from(defender_gold.max(0)).saturating_mul(percent(cap_percent));
    let capped = share.min(Decimal::from(absolute_cap.max(0)));
    capped.floor().to_i64().unwrap_or(0)
}

fn shield_expiry(now: DateTime<Utc>, hours: u32) -> Option<DateTime<Utc>> {
    TimeDelta::try_hours(i64::from(hours)).and_then(|d| now.checked_add_signed(d))
}

fn living(nation: Option<Nation>) -> Result<Nation, Rejection> {
    let nation = nation.ok_or(Rejection::NationNotFound)?;
    if nation.is_alive() {
        Ok(nation)
    } else {
        Err(Rejection::NationFallen)
    }
}

/// What an attack attempt decided, before history is written.
struct Resolved {
    outcome: ConquestOutcome,
    at: DateTime<Utc>,
    news: Option<String>,
}

impl<S, R, H> Engine<S, R, H>
where
    S: DocumentStore,
    R: RandomSource,
    H: HistorySink,
{
    // -----------------------------------------------------------------------
    // Claim
    // -----------------------------------------------------------------------

    /// Take an unowned land cell for `actor`.
    ///
    /// A nation with no territory may settle anywhere. Otherwise the target
    /// must touch one of the actor's cells.
    pub async fn claim(
        &self,
        actor: NationId,
        target: CellCoord,
    ) -> Result<ClaimOutcome, ConquestError> {
        let store = &self.store;
        let cost = self.rules.claim_cost;

        let (outcome, at) = run_atomic(store, self.rules.max_conflict_retries, || async move {
            let now = Utc::now();
            let mut txn = Transaction::begin(store);
            let (nation, cell) = txn.read_nation_and_cell(actor, target).await?;
            let mut nation = living(nation)?;

            let available = nation.resource(ResourceKind::Gold);
            if available < cost {
                return Err(Rejection::InsufficientGold {
                    required: cost,
                    available,
                }
                .into());
            }

            let mut cell = cell.ok_or(Rejection::CellNotFound)?;
            if cell.is_ocean() {
                return Err(Rejection::OceanCell.into());
            }
            if cell.owner.is_some() {
                return Err(Rejection::AlreadyOwned.into());
            }
            if nation.territory() > 0 {
                let around = txn.read_cells(&neighbors(target)).await?;
                if !around.iter().flatten().any(|c| c.owner == Some(actor)) {
                    return Err(Rejection::NotAdjacent.into());
                }
            }

            cell.owner = Some(actor);
            cell.cell_type = CellType::Territory;
            nation.adjust_resource(ResourceKind::Gold, cost.saturating_neg());
            nation.gain_cell(target);
            nation.status.last_action_at = Some(now);

            txn.write_cell(&cell)?;
            txn.write_nation(&nation)?;

            let deltas = NationDelta::default()
                .resource(ResourceKind::Gold, cost.saturating_neg())
                .resource(ResourceKind::Territory, 1);
            let narrative = format!(
                "금 {cost}을 사용하여 새로운 영토({})를 개척했습니다.",
                target.key()
            );
            Ok(txn.finish((
                ClaimOutcome {
                    cell,
                    narrative,
                    deltas,
                },
                now,
            )))
        })
        .await
        .inspect_err(|err| trace_failure("claim", actor, err))?;

        info!(%actor, cell = %target, "territory claimed");
        self.record_log(
            actor,
            CommandKind::Expansion,
            outcome.narrative.clone(),
            outcome.deltas.clone(),
            at,
        )
        .await;
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Attack
    // -----------------------------------------------------------------------

    /// Attack an enemy cell.
    ///
    /// Losing the battle is an `Ok` outcome with `success == false`. Taking
    /// the defender's capital destroys the defender: its gold goes to the
    /// attacker and its remaining cells become unowned.
    pub async fn attack(
        &self,
        attacker: NationId,
        target: CellCoord,
    ) -> Result<ConquestOutcome, ConquestError> {
        let store = &self.store;
        let rules = &self.rules;

        let resolved = run_atomic(store, rules.max_conflict_retries, || async move {
            let now = Utc::now();
            let mut txn = Transaction::begin(store);
            let (actor, cell) = txn.read_nation_and_cell(attacker, target).await?;
            let mut actor = living(actor)?;
            let mut cell = cell.ok_or(Rejection::CellNotFound)?;

            let defender_id = cell.owner.ok_or(Rejection::TargetUnowned)?;
            if defender_id == attacker {
                return Err(Rejection::OwnTerritory.into());
            }

            let energy = rules.attack_energy_cost;
            let food = rules.attack_food_cost;
            if actor.resource(ResourceKind::Energy) < energy
                || actor.resource(ResourceKind::Food) < food
            {
                return Err(Rejection::InsufficientSupplies {
                    energy_required: energy,
                    food_required: food,
                }
                .into());
            }

            let around = txn.read_batch(&neighbors(target), &[defender_id]).await?;
            if !around.cells.iter().flatten().any(|c| c.owner == Some(attacker)) {
                return Err(Rejection::NotAdjacent.into());
            }
            let mut defender = around
                .nations
                .into_iter()
                .flatten()
                .find(Nation::is_alive)
                .ok_or(Rejection::DefenderUnavailable)?;
            if let Some(until) = defender.status.shield_until.filter(|until| *until > now) {
                return Err(Rejection::ShieldActive { until }.into());
            }

            let at_capital = defender.capital == Some(target);
            let bonus = if at_capital {
                percent(rules.capital_defense_bonus_percent)
            } else {
                Decimal::ONE
            };
            let (attacker_noise, defender_noise) = self.with_rng(|r| (r.noise(), r.noise()));
            let won = attacker_prevails(
                actor.stat(StatKind::Military),
                defender.stat(StatKind::Military),
                attacker_noise,
                defender_noise,
                bonus,
            );

            actor.adjust_resource(ResourceKind::Energy, energy.saturating_neg());
            actor.adjust_resource(ResourceKind::Food, food.saturating_neg());
            actor.status.last_action_at = Some(now);
            let mut deltas = NationDelta::default()
                .resource(ResourceKind::Energy, energy.saturating_neg())
                .resource(ResourceKind::Food, food.saturating_neg());

            let mut resolved = if won && at_capital {
                let plunder = defender.resource(ResourceKind::Gold).max(0);

                cell.owner = Some(attacker);
                cell.cell_type = CellType::Capital;
                cell.resource = CellResource::Gold;
                txn.write_cell(&cell)?;

                let remaining: Vec<CellCoord> = defender
                    .holdings
                    .iter()
                    .copied()
                    .filter(|c| *c != target)
                    .collect();
                for mut orphan in txn.read_cells(&remaining).await?.into_iter().flatten() {
                    if orphan.owner == Some(defender_id) {
                        orphan.owner = None;
                        txn.write_cell(&orphan)?;
                    }
                }

                actor.adjust_resource(ResourceKind::Gold, plunder);
                actor.gain_cell(target);
                actor.adjust_stat(StatKind::Military, CAPITAL_MILITARY_GAIN, false);
                actor.adjust_stat(StatKind::Influence, CAPITAL_INFLUENCE_GAIN, false);
                deltas = deltas
                    .resource(ResourceKind::Gold, plunder)
                    .resource(ResourceKind::Territory, 1)
                    .stat(StatKind::Military, CAPITAL_MILITARY_GAIN)
                    .stat(StatKind::Influence, CAPITAL_INFLUENCE_GAIN);

                defender.set_resource(ResourceKind::Gold, 0);
                defender.holdings.clear();
                defender.set_resource(ResourceKind::Territory, 0);
                defender.capital = None;
                defender.status.is_alive = false;
                defender.status.fallen_at = Some(now);

                Resolved {
                    outcome: ConquestOutcome {
                        success: true,
                        capital_fallen: true,
                        narrative: format!(
                            "👑 대승리! 적의 수도를 함락시켰습니다! {}은(는) 역사 속으로 사라졌습니다. (약탈: {plunder}G)",
                            defender.identity.name
                        ),
                        loot: plunder,
                        shield_hours: None,
                        deltas: NationDelta::default(),
                    },
                    at: now,
                    news: Some(format!(
                        "[비보] {}의 침공으로 인해 긴 역사를 자랑하던 한 제국이 멸망했습니다.",
                        actor.identity.name
                    )),
                }
            } else if won {
                let loot = loot_for(
                    defender.resource(ResourceKind::Gold),
                    rules.loot_cap_percent,
                    rules.loot_absolute_cap,
                );
                let hours = self.with_rng(|r| {
                    r.shield_hours(rules.shield_min_hours, rules.shield_max_hours)
                });

                cell.owner = Some(attacker);
                cell.cell_type = CellType::Territory;
                txn.write_cell(&cell)?;

                actor.adjust_resource(ResourceKind::Gold, loot);
                actor.gain_cell(target);
                actor.adjust_stat(StatKind::Military, VICTORY_MILITARY_GAIN, false);
                deltas = deltas
                    .resource(ResourceKind::Gold, loot)
                    .resource(ResourceKind::Territory, 1)
                    .stat(StatKind::Military, VICTORY_MILITARY_GAIN);

                defender.adjust_resource(ResourceKind::Gold, loot.saturating_neg());
                defender.lose_cell(target);
                defender.adjust_stat(
                    StatKind::Stability,
                    DEFENDER_STABILITY_LOSS.saturating_neg(),
                    true,
                );
                defender.adjust_stat(
                    StatKind::Military,
                    DEFENDER_MILITARY_LOSS.saturating_neg(),
                    true,
                );
                defender.status.shield_until = shield_expiry(now, hours);

                Resolved {
                    outcome: ConquestOutcome {
                        success: true,
                        capital_fallen: false,
                        narrative: format!("승리! 적의 영토를 점령하고 {loot}G를 약탈했습니다."),
                        loot,
                        shield_hours: Some(hours),
                        deltas: NationDelta::default(),
                    },
                    at: now,
                    news: Some(format!(
                        "[속보] {}군이 적의 영토를 점령했습니다!",
                        actor.identity.name
                    )),
                }
            } else {
                let hours = self.with_rng(|r| {
                    r.shield_hours(rules.shield_min_hours, rules.shield_max_hours)
                });

                actor.adjust_stat(
                    StatKind::Military,
                    REPELLED_MILITARY_LOSS.saturating_neg(),
                    true,
                );
                actor.adjust_stat(
                    StatKind::Stability,
                    REPELLED_STABILITY_LOSS.saturating_neg(),
                    true,
                );
                actor.status.shield_until = shield_expiry(now, hours);
                deltas = deltas
                    .stat(StatKind::Military, REPELLED_MILITARY_LOSS.saturating_neg())
                    .stat(StatKind::Stability, REPELLED_STABILITY_LOSS.saturating_neg());

                defender.adjust_stat(StatKind::Military, DEFENDER_HOLD_GAIN, false);

                Resolved {
                    outcome: ConquestOutcome {
                        success: false,
                        capital_fallen: false,
                        narrative: "패배... 적의 방어선이 견고하여 퇴각했습니다.".to_owned(),
                        loot: 0,
                        shield_hours: Some(hours),
                        deltas: NationDelta::default(),
                    },
                    at: now,
                    news: None,
                }
            };

            txn.write_nation(&actor)?;
            txn.write_nation(&defender)?;

            resolved.outcome.deltas = deltas;
            Ok(txn.finish(resolved))
        })
        .await
        .inspect_err(|err| trace_failure("attack", attacker, err))?;

        let Resolved { outcome, at, news } = resolved;
        info!(
            %attacker,
            cell = %target,
            success = outcome.success,
            capital_fallen = outcome.capital_fallen,
            loot = outcome.loot,
            "attack resolved"
        );
        self.record_log(
            attacker,
            CommandKind::Invasion,
            outcome.narrative.clone(),
            outcome.deltas.clone(),
            at,
        )
        .await;
        if let Some(message) = news {
            self.record_news(message, at).await;
        }
        Ok(outcome)
    }
}
