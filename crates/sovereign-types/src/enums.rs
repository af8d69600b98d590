//! Enumeration types for the Sovereign engine.
//!
//! Stat, resource, and policy names are closed vocabularies: every name the
//! engine reads or writes is a variant here, so an unknown name is a parse
//! error at the boundary instead of a silently ignored string.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Map cells
// ---------------------------------------------------------------------------

/// Terrain/role of a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CellType {
    /// Impassable water. Can never be owned.
    Ocean,
    /// Unclaimed land as generated with the world.
    Plains,
    /// A nation's home cell. Losing it ends the nation.
    Capital,
    /// Land held (or once held) by a nation.
    Territory,
}

/// Resource label carried by a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CellResource {
    /// Nothing of note.
    None,
    /// Farmland.
    Food,
    /// Treasury seat (capitals).
    Gold,
}

// ---------------------------------------------------------------------------
// Nation dials and stockpiles
// ---------------------------------------------------------------------------

/// A named 0--100-ish numeric dial on a nation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StatKind {
    /// Fighting strength; drives combat and upkeep.
    Military,
    /// Drives gold income.
    Economy,
    /// Drives research output.
    Technology,
    /// Drives culture points and mana.
    Culture,
    /// Internal order.
    Stability,
    /// Acceptance of the ruler.
    Legitimacy,
    /// Administrative capacity before efficiency degrades.
    AdminCap,
    /// Graft in the bureaucracy.
    Corruption,
    /// External standing.
    Reputation,
    /// Popular contentment.
    Happiness,
    /// Drives food production.
    Sustainability,
    /// Prestige among nations.
    Influence,
    /// Diplomatic reach.
    Diplomacy,
    /// Drives intel output.
    Intelligence,
    /// Supply capability.
    Logistics,
    /// Social cohesion.
    Cohesion,
    /// Inventiveness.
    Innovation,
    /// Internal security.
    Security,
    /// Drives population growth.
    Growth,
    /// Pool of recruitable citizens.
    Manpower,
}

/// A named numeric stockpile on a nation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Treasury.
    Gold,
    /// Granaries.
    Food,
    /// Arcane reserve.
    Mana,
    /// Citizens.
    Population,
    /// Construction materials.
    Materials,
    /// Campaign energy, spent on attacks.
    Energy,
    /// Supply capacity.
    LogisticsCap,
    /// Number of cells owned. Always equals the nation's holdings count.
    Territory,
    /// Accumulated research.
    Research,
    /// Accumulated culture.
    CulturePoints,
    /// Accumulated intelligence.
    Intel,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// A policy category. Each nation holds exactly one option per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PolicyCategory {
    /// Taxation level.
    Tax,
    /// Military recruitment.
    Conscription,
    /// Economic system.
    Economy,
    /// Border regime.
    Border,
}

impl PolicyCategory {
    /// Every category, in catalog order.
    pub const ALL: [Self; 4] = [Self::Tax, Self::Conscription, Self::Economy, Self::Border];

    /// The wire name of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tax => "tax",
            Self::Conscription => "conscription",
            Self::Economy => "economy",
            Self::Border => "border",
        }
    }

    /// Parse a wire name. Returns `None` for unknown categories.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl core::fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a policy option modifies.
///
/// Most targets are stats; `GoldIncome` is a percentage applied to the
/// efficiency-scaled gold yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EffectTarget {
    /// Additive stability.
    Stability,
    /// Additive happiness.
    Happiness,
    /// Additive legitimacy.
    Legitimacy,
    /// Additive military.
    Military,
    /// Additive manpower.
    Manpower,
    /// Additive administrative capacity.
    AdminCap,
    /// Additive economy.
    Economy,
    /// Additive corruption.
    Corruption,
    /// Additive culture.
    Culture,
    /// Additive security.
    Security,
    /// Additive diplomacy.
    Diplomacy,
    /// Percentage modifier on gold income.
    GoldIncome,
}

impl EffectTarget {
    /// The stat this target modifies, or `None` for income modifiers.
    pub const fn as_stat(self) -> Option<StatKind> {
        match self {
            Self::Stability => Some(StatKind::Stability),
            Self::Happiness => Some(StatKind::Happiness),
            Self::Legitimacy => Some(StatKind::Legitimacy),
            Self::Military => Some(StatKind::Military),
            Self::Manpower => Some(StatKind::Manpower),
            Self::AdminCap => Some(StatKind::AdminCap),
            Self::Economy => Some(StatKind::Economy),
            Self::Corruption => Some(StatKind::Corruption),
            Self::Culture => Some(StatKind::Culture),
            Self::Security => Some(StatKind::Security),
            Self::Diplomacy => Some(StatKind::Diplomacy),
            Self::GoldIncome => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Founding and history
// ---------------------------------------------------------------------------

/// Founding ideology, which sets the starting stat bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Ideology {
    /// Military 60, stability 70.
    Authority,
    /// Economy 60, happiness 70.
    Liberty,
    /// Culture 60, legitimacy 70.
    Tradition,
    /// Technology 60, innovation 70.
    Progress,
}

/// Category of a global news item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NewsCategory {
    /// Conquests and the fall of nations.
    War,
}

/// The command recorded in a nation's history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CommandKind {
    /// The nation was founded.
    Founding,
    /// An unowned cell was claimed.
    Expansion,
    /// An owned cell was attacked.
    Invasion,
    /// A policy option was changed.
    PolicyChange,
}

impl CommandKind {
    /// Human-readable label shown in the history log.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Founding => "국가 건국 (Founding)",
            Self::Expansion => "영토 확장 (Territorial Expansion)",
            Self::Invasion => "전쟁 선포 (Invasion)",
            Self::PolicyChange => "정책 변경 (Policy Change)",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn stat_keys_serialize_as_snake_case_map_keys() {
        let mut stats = BTreeMap::new();
        stats.insert(StatKind::AdminCap, 50_i64);
        let json = serde_json::to_string(&stats).unwrap_or_default();
        assert_eq!(json, r#"{"admin_cap":50}"#);
    }

    #[test]
    fn unknown_stat_name_fails_to_parse() {
        let parsed: Result<BTreeMap<StatKind, i64>, _> =
            serde_json::from_str(r#"{"charisma": 10}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn policy_category_parse_roundtrip() {
        for category in PolicyCategory::ALL {
            assert_eq!(PolicyCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(PolicyCategory::parse("religion"), None);
    }

    #[test]
    fn gold_income_is_not_a_stat() {
        assert_eq!(EffectTarget::GoldIncome.as_stat(), None);
        assert_eq!(EffectTarget::AdminCap.as_stat(), Some(StatKind::AdminCap));
    }
}
