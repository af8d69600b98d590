//! Founding a nation and changing its policies.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use sovereign_economy::{default_policies, definition, effects_for};
use sovereign_types::{
    CellCoord, CellResource, CellType, CommandKind, Ideology, Nation, NationDelta, NationId,
    NationIdentity, NationStatus, PolicyCategory, ResourceKind, StatKind,
};
use sovereign_world::in_bounds;
use tracing::{debug, info};

use crate::atomic::{Transaction, run_atomic};
use crate::config::RulesConfig;
use crate::engine::{Engine, trace_failure};
use crate::error::{ConquestError, Rejection};
use crate::history::HistorySink;
use crate::random::RandomSource;
use crate::store::DocumentStore;

/// A player's request to found their nation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FoundingRequest {
    /// The founding player. Becomes the nation id.
    pub player: NationId,
    /// Nation name.
    pub name: String,
    /// Title of the ruler.
    pub ruler_title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Founding ideology.
    #[serde(default)]
    pub ideology: Option<Ideology>,
}

const STARTING_STATS: [(StatKind, i64); 9] = [
    (StatKind::Military, 30),
    (StatKind::Economy, 30),
    (StatKind::Technology, 30),
    (StatKind::Culture, 30),
    (StatKind::Stability, 50),
    (StatKind::Legitimacy, 50),
    (StatKind::AdminCap, 10),
    (StatKind::Corruption, 0),
    (StatKind::Reputation, 50),
];

const STARTING_RESOURCES: [(ResourceKind, i64); 6] = [
    (ResourceKind::Gold, 500),
    (ResourceKind::Food, 1000),
    (ResourceKind::Mana, 100),
    (ResourceKind::Population, 1000),
    (ResourceKind::Materials, 500),
    (ResourceKind::Energy, 100),
];

/// Stats an ideology raises above the common baseline.
pub const fn ideology_bonus(ideology: Ideology) -> [(StatKind, i64); 2] {
    match ideology {
        Ideology::Authority => [(StatKind::Military, 60), (StatKind::Stability, 70)],
        Ideology::Liberty => [(StatKind::Economy, 60), (StatKind::Happiness, 70)],
        Ideology::Tradition => [(StatKind::Culture, 60), (StatKind::Legitimacy, 70)],
        Ideology::Progress => [(StatKind::Technology, 60), (StatKind::Innovation, 70)],
    }
}

/// Build a new nation seated at `capital`.
pub fn new_nation(
    request: &FoundingRequest,
    capital: CellCoord,
    rules: &RulesConfig,
    now: DateTime<Utc>,
) -> Nation {
    let mut stats: BTreeMap<StatKind, i64> = STARTING_STATS.into_iter().collect();
    if let Some(ideology) = request.ideology {
        stats.extend(ideology_bonus(ideology));
    }
    let mut resources: BTreeMap<ResourceKind, i64> = STARTING_RESOURCES.into_iter().collect();
    resources.insert(ResourceKind::Territory, 1);

    Nation {
        id: request.player,
        identity: NationIdentity {
            name: request.name.trim().to_owned(),
            ruler_title: request.ruler_title.trim().to_owned(),
            description: request.description.clone(),
            ideology: request.ideology,
        },
        stats,
        resources,
        status: NationStatus {
            is_alive: true,
            founded_at: now,
            last_action_at: Some(now),
            cooldown_seconds: rules.turn_cooldown_seconds,
            shield_until: TimeDelta::try_hours(i64::from(rules.founding_shield_hours))
                .and_then(|d| now.checked_add_signed(d)),
            fallen_at: None,
        },
        policies: default_policies(),
        tags: Vec::new(),
        capital: Some(capital),
        holdings: BTreeSet::from([capital]),
    }
}

fn validate(request: &FoundingRequest) -> Result<(), ConquestError> {
    for (field, value) in [("name", &request.name), ("ruler_title", &request.ruler_title)] {
        if value.trim().is_empty() {
            return Err(ConquestError::Validation {
                message: format!("{field} must not be empty"),
            });
        }
    }
    Ok(())
}

/// How one capital candidate turned out.
enum Site {
    Founded(Box<Nation>, DateTime<Utc>),
    Unusable,
}

impl<S, R, H> Engine<S, R, H>
where
    S: DocumentStore,
    R: RandomSource,
    H: HistorySink,
{
    /// Found a nation for `request.player` on a random free land cell.
    ///
    /// A player founds at most once. A fallen nation's document still blocks
    /// refounding.
    pub async fn found_nation(&self, request: FoundingRequest) -> Result<Nation, ConquestError> {
        validate(&request).inspect_err(|err| trace_failure("found_nation", request.player, err))?;

        let store = &self.store;
        let rules = &self.rules;
        let size = self.world.size;
        let request = &request;

        for attempt in 1..=rules.capital_site_attempts.max(1) {
            let candidate = self.with_rng(|r| r.coordinate(size));
            if !in_bounds(candidate, size) {
                debug!(attempt, cell = %candidate, "capital site off the map");
                continue;
            }
            let site = run_atomic(store, rules.max_conflict_retries, || async move {
                let now = Utc::now();
                let mut txn = Transaction::begin(store);
                let (existing, cell) = txn.read_nation_and_cell(request.player, candidate).await?;
                if existing.is_some() {
                    return Err(Rejection::NationExists.into());
                }
                let Some(mut cell) = cell.filter(|c| !c.is_ocean() && c.owner.is_none()) else {
                    return Ok(txn.finish(Site::Unusable));
                };

                let nation = new_nation(request, candidate, rules, now);
                cell.owner = Some(nation.id);
                cell.cell_type = CellType::Capital;
                cell.resource = CellResource::Gold;
                txn.write_cell(&cell)?;
                txn.write_nation(&nation)?;
                Ok(txn.finish(Site::Founded(Box::new(nation), now)))
            })
            .await
            .inspect_err(|err| trace_failure("found_nation", request.player, err))?;

            match site {
                Site::Founded(nation, at) => {
                    info!(nation = %nation.id, name = %nation.identity.name, capital = %candidate, "nation founded");
                    let deltas = NationDelta {
                        resources: nation.resources.clone(),
                        stats: BTreeMap::new(),
                    };
                    self.record_log(
                        nation.id,
                        CommandKind::Founding,
                        format!(
                            "{}이(가) {}에 수도를 세우고 건국했습니다.",
                            nation.identity.name,
                            candidate.key()
                        ),
                        deltas,
                        at,
                    )
                    .await;
                    return Ok(*nation);
                }
                Site::Unusable => {
                    debug!(attempt, cell = %candidate, "capital site unusable");
                }
            }
        }

        let err = ConquestError::from(Rejection::NoCapitalSite);
        trace_failure("found_nation", request.player, &err);
        Err(err)
    }

    /// Switch one policy category to `option`.
    pub async fn change_policy(
        &self,
        nation_id: NationId,
        category: PolicyCategory,
        option: &str,
    ) -> Result<Nation, ConquestError> {
        effects_for(category, option)
            .map_err(ConquestError::from)
            .inspect_err(|err| trace_failure("change_policy", nation_id, err))?;

        let store = &self.store;
        let (nation, at) = run_atomic(store, self.rules.max_conflict_retries, || async move {
            let now = Utc::now();
            let mut txn = Transaction::begin(store);
            let mut nation = txn
                .read_nation(nation_id)
                .await?
                .ok_or(Rejection::NationNotFound)?;
            if !nation.is_alive() {
                return Err(Rejection::NationFallen.into());
            }
            nation.policies.insert(category, option.to_owned());
            nation.status.last_action_at = Some(now);
            txn.write_nation(&nation)?;
            Ok(txn.finish((nation, now)))
        })
        .await
        .inspect_err(|err| trace_failure("change_policy", nation_id, err))?;

        info!(nation = %nation_id, %category, option, "policy changed");
        let def = definition(category);
        let label = def.option(option).map_or(option, |o| o.label);
        self.record_log(
            nation_id,
            CommandKind::PolicyChange,
            format!("{} 정책을 '{label}'(으)로 변경했습니다.", def.label),
            NationDelta::default(),
            at,
        )
        .await;
        Ok(nation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ideology: Option<Ideology>) -> FoundingRequest {
        FoundingRequest {
            player: NationId::new(),
            name: "  Goguryeo ".to_owned(),
            ruler_title: "Taewang".to_owned(),
            description: None,
            ideology,
        }
    }

    #[test]
    fn new_nation_starts_with_baseline_stats_and_resources() {
        let now = Utc::now();
        let nation = new_nation(&request(None), CellCoord::new(2, 3), &RulesConfig::default(), now);
        assert_eq!(nation.identity.name, "Goguryeo");
        assert_eq!(nation.stat(StatKind::Military), 30);
        assert_eq!(nation.stat(StatKind::AdminCap), 10);
        assert_eq!(nation.resource(ResourceKind::Gold), 500);
        assert_eq!(nation.resource(ResourceKind::Food), 1000);
        assert_eq!(nation.territory(), 1);
        assert_eq!(nation.capital, Some(CellCoord::new(2, 3)));
        assert_eq!(nation.status.cooldown_seconds, 180);
        assert_eq!(nation.policies, default_policies());
        let shield = nation.status.shield_until.map(|u| u.signed_duration_since(now).num_hours());
        assert_eq!(shield, Some(24));
    }

    #[test]
    fn ideology_overrides_the_baseline() {
        let nation = new_nation(
            &request(Some(Ideology::Authority)),
            CellCoord::new(0, 0),
            &RulesConfig::default(),
            Utc::now(),
        );
        assert_eq!(nation.stat(StatKind::Military), 60);
        assert_eq!(nation.stat(StatKind::Stability), 70);
        assert_eq!(nation.stat(StatKind::Economy), 30);
    }

    #[test]
    fn blank_names_are_invalid() {
        let mut req = request(None);
        req.name = "   ".to_owned();
        assert!(matches!(validate(&req), Err(ConquestError::Validation { .. })));
    }
}
