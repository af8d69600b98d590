//! Shared type definitions for the Sovereign territorial state engine.
//!
//! Every document the store persists and every record the engine hands to
//! callers is defined here. Types flow to `TypeScript` via `ts-rs` for the
//! web client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Closed vocabularies (cell types, stats, resources, policies)
//! - [`structs`] -- Cells, nations, history records, and action outcomes

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    CellResource, CellType, CommandKind, EffectTarget, Ideology, NewsCategory, PolicyCategory,
    ResourceKind, StatKind,
};
pub use ids::{LogEntryId, NationId, NewsEventId};
pub use structs::{
    Cell, CellCoord, ClaimOutcome, ConquestOutcome, CoordParseError, LogEntry, Nation,
    NationDelta, NationIdentity, NationStatus, NewsEvent, YieldResult,
};
