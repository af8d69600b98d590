//! Persisted documents and outbound records.
//!
//! [`Cell`] and [`Nation`] are the two document kinds held by the territory
//! store. [`LogEntry`], [`NewsEvent`], [`ConquestOutcome`] and
//! [`YieldResult`] are produced by the engine and handed to callers or
//! history sinks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    CellResource, CellType, CommandKind, Ideology, NewsCategory, PolicyCategory, ResourceKind,
    StatKind,
};
use crate::ids::{LogEntryId, NationId, NewsEventId};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// An offset hex coordinate. `col` is the x axis, `row` the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellCoord {
    /// Column index.
    pub col: i32,
    /// Row index. Row parity selects the neighbor offsets.
    pub row: i32,
}

impl CellCoord {
    /// Construct a coordinate from a column and a row.
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The cell identifier used by clients and storage keys: `{row}_{col}`.
    pub fn key(self) -> String {
        format!("{}_{}", self.row, self.col)
    }
}

impl core::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}", self.row, self.col)
    }
}

/// Error returned when a cell identifier is not of the form `{row}_{col}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed cell id `{input}`: expected `{{row}}_{{col}}`")]
pub struct CoordParseError {
    /// The rejected input.
    pub input: String,
}

impl core::str::FromStr for CellCoord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CoordParseError {
            input: s.to_owned(),
        };
        let (row, col) = s.split_once('_').ok_or_else(err)?;
        let row = row.parse::<i32>().map_err(|_parse| err())?;
        let col = col.parse::<i32>().map_err(|_parse| err())?;
        Ok(Self { col, row })
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One hex of the world map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Position on the map.
    pub coord: CellCoord,
    /// Owning nation, if any. Always `None` for ocean.
    pub owner: Option<NationId>,
    /// Terrain/role of the cell.
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Resource label.
    pub resource: CellResource,
}

impl Cell {
    /// A fresh, unowned cell.
    pub const fn unowned(coord: CellCoord, cell_type: CellType, resource: CellResource) -> Self {
        Self {
            coord,
            owner: None,
            cell_type,
            resource,
        }
    }

    /// Whether the cell is water.
    pub fn is_ocean(&self) -> bool {
        self.cell_type == CellType::Ocean
    }
}

// ---------------------------------------------------------------------------
// Nation
// ---------------------------------------------------------------------------

/// Descriptive identity of a nation. Immutable after founding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NationIdentity {
    /// Display name.
    pub name: String,
    /// Title of the ruler.
    pub ruler_title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Founding ideology.
    pub ideology: Option<Ideology>,
}

/// Lifecycle and timing state of a nation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NationStatus {
    /// False once the capital has fallen. Terminal.
    pub is_alive: bool,
    /// When the nation was founded.
    pub founded_at: DateTime<Utc>,
    /// When the nation last took an action.
    pub last_action_at: Option<DateTime<Utc>>,
    /// Minimum seconds between turns, enforced by the turn scheduler.
    pub cooldown_seconds: u32,
    /// Attacks against this nation are refused until this instant.
    pub shield_until: Option<DateTime<Utc>>,
    /// When the capital fell.
    pub fallen_at: Option<DateTime<Utc>>,
}

/// A player's nation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Nation {
    /// Identifier, equal to the owning player's identity.
    pub id: NationId,
    /// Name, ruler title, description.
    pub identity: NationIdentity,
    /// Numeric dials.
    pub stats: BTreeMap<StatKind, i64>,
    /// Numeric stockpiles.
    pub resources: BTreeMap<ResourceKind, i64>,
    /// Lifecycle state.
    pub status: NationStatus,
    /// Active option key per category.
    pub policies: BTreeMap<PolicyCategory, String>,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Home cell. `None` once fallen.
    pub capital: Option<CellCoord>,
    /// Every cell this nation owns.
    pub holdings: BTreeSet<CellCoord>,
}

impl Nation {
    /// Current value of a stat (0 when absent).
    pub fn stat(&self, kind: StatKind) -> i64 {
        self.stats.get(&kind).copied().unwrap_or(0)
    }

    /// Current value of a resource stockpile (0 when absent).
    pub fn resource(&self, kind: ResourceKind) -> i64 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    /// Set a stat outright.
    pub fn set_stat(&mut self, kind: StatKind, value: i64) {
        self.stats.insert(kind, value);
    }

    /// Set a resource stockpile outright.
    pub fn set_resource(&mut self, kind: ResourceKind, value: i64) {
        self.resources.insert(kind, value);
    }

    /// Add a signed delta to a stat, optionally flooring the result at zero.
    pub fn adjust_stat(&mut self, kind: StatKind, delta: i64, floor_at_zero: bool) {
        let mut value = self.stat(kind).saturating_add(delta);
        if floor_at_zero {
            value = value.max(0);
        }
        self.stats.insert(kind, value);
    }

    /// Add a signed delta to a stockpile, flooring the result at zero.
    pub fn adjust_resource(&mut self, kind: ResourceKind, delta: i64) {
        let value = self.resource(kind).saturating_add(delta).max(0);
        self.resources.insert(kind, value);
    }

    /// Number of cells owned, as stored in the territory counter.
    pub fn territory(&self) -> i64 {
        self.resource(ResourceKind::Territory)
    }

    /// Record a newly owned cell and resync the territory counter.
    pub fn gain_cell(&mut self, coord: CellCoord) {
        self.holdings.insert(coord);
        self.sync_territory();
    }

    /// Forget a cell and resync the territory counter.
    pub fn lose_cell(&mut self, coord: CellCoord) {
        self.holdings.remove(&coord);
        if self.capital == Some(coord) {
            self.capital = None;
        }
        self.sync_territory();
    }

    fn sync_territory(&mut self) {
        let count = i64::try_from(self.holdings.len()).unwrap_or(i64::MAX);
        self.resources.insert(ResourceKind::Territory, count);
    }

    /// Whether an active shield blocks attacks at `now`.
    pub fn is_shielded(&self, now: DateTime<Utc>) -> bool {
        self.status.shield_until.is_some_and(|until| until > now)
    }

    /// Whether the nation is still in play.
    pub const fn is_alive(&self) -> bool {
        self.status.is_alive
    }
}

// ---------------------------------------------------------------------------
// Outbound records
// ---------------------------------------------------------------------------

/// Signed changes applied to one nation by a single action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NationDelta {
    /// Stockpile changes.
    pub resources: BTreeMap<ResourceKind, i64>,
    /// Stat changes.
    pub stats: BTreeMap<StatKind, i64>,
}

impl NationDelta {
    /// Accumulate a resource change.
    pub fn resource(mut self, kind: ResourceKind, delta: i64) -> Self {
        let entry = self.resources.entry(kind).or_insert(0);
        *entry = entry.saturating_add(delta);
        self
    }

    /// Accumulate a stat change.
    pub fn stat(mut self, kind: StatKind, delta: i64) -> Self {
        let entry = self.stats.entry(kind).or_insert(0);
        *entry = entry.saturating_add(delta);
        self
    }
}

/// Immutable entry in a nation's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Unique entry id.
    pub id: LogEntryId,
    /// Nation that acted.
    pub actor: NationId,
    /// Which command ran.
    pub command: CommandKind,
    /// Human-readable account of the result.
    pub narrative: String,
    /// Changes applied to the actor.
    pub deltas: NationDelta,
    /// When the action committed.
    pub created_at: DateTime<Utc>,
}

/// A global broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewsEvent {
    /// Unique news id.
    pub id: NewsEventId,
    /// Broadcast channel.
    pub category: NewsCategory,
    /// Headline text.
    pub message: String,
    /// When the triggering action committed.
    pub created_at: DateTime<Utc>,
}

/// Result of a committed claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClaimOutcome {
    /// The newly owned cell.
    pub cell: Cell,
    /// Human-readable account.
    pub narrative: String,
    /// Changes applied to the claimant.
    pub deltas: NationDelta,
}

/// Result of a committed attack. Defeat is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConquestOutcome {
    /// Whether the attacker took the cell.
    pub success: bool,
    /// Whether the target was the defender's capital and it fell.
    pub capital_fallen: bool,
    /// Human-readable account.
    pub narrative: String,
    /// Gold moved from defender to attacker.
    pub loot: i64,
    /// Length of the shield window granted, if any. Goes to the defender on
    /// an ordinary victory and to the attacker on defeat.
    pub shield_hours: Option<u32>,
    /// Changes applied to the attacker.
    pub deltas: NationDelta,
}

/// One tick of production and consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct YieldResult {
    /// Net stockpile changes for the tick.
    pub resource_deltas: BTreeMap<ResourceKind, i64>,
    /// Effective values of the display stats.
    pub stat_snapshots: BTreeMap<StatKind, i64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn coord_key_is_row_then_col() {
        let coord = CellCoord::new(7, 3);
        assert_eq!(coord.key(), "3_7");
        assert_eq!("3_7".parse::<CellCoord>().unwrap(), coord);
    }

    #[test]
    fn coord_accepts_negative_components() {
        assert_eq!(
            "-2_-5".parse::<CellCoord>().unwrap(),
            CellCoord::new(-5, -2)
        );
    }

    #[test]
    fn coord_rejects_garbage() {
        assert!("3-7".parse::<CellCoord>().is_err());
        assert!("a_1".parse::<CellCoord>().is_err());
        assert!("1_".parse::<CellCoord>().is_err());
    }

    #[test]
    fn cell_type_field_is_named_type_on_the_wire() {
        let cell = Cell::unowned(CellCoord::new(0, 0), CellType::Plains, CellResource::Food);
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["type"], "plains");
        assert_eq!(json["resource"], "food");
        assert!(json["owner"].is_null());
    }

    #[test]
    fn delta_builder_accumulates() {
        let delta = NationDelta::default()
            .resource(ResourceKind::Gold, -100)
            .resource(ResourceKind::Gold, 30)
            .stat(StatKind::Military, 1);
        assert_eq!(delta.resources.get(&ResourceKind::Gold), Some(&-70));
        assert_eq!(delta.stats.get(&StatKind::Military), Some(&1));
    }
}
