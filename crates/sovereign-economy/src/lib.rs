//! Policy catalog and yield engine for the Sovereign engine.
//!
//! Both modules are pure: they read a [`Nation`](sovereign_types::Nation)
//! and return values, never touching storage.
//!
//! # Modules
//!
//! - [`policy`] -- Static policy options and modifier aggregation.
//! - [`yields`] -- Administrative efficiency and per-tick yields.
//! - [`error`] -- Catalog lookup errors.

pub mod error;
pub mod policy;
pub mod yields;

pub use error::PolicyError;
pub use policy::{
    PolicyDefinition, PolicyEffect, PolicyOption, aggregate_modifiers, catalog, default_policies,
    definition, effects_for, effects_for_name,
};
pub use yields::{admin_load, calculate_yields, effective_stat, efficiency};
