//! Scrim statistics: flattens match and draft documents into polars frames and
//! computes winrate, gold, KDA, matchup and pick/ban tables for one team.

pub mod config;
pub mod draft;
pub mod draft_stats;
pub mod error;
pub mod features;
pub mod filters;
pub mod flatten;
pub mod history;
pub mod schema;
pub mod stats;
pub mod store;
pub mod summary;
pub mod team;

#[cfg(test)]
mod test_support;

pub use error::{Result, ScrimError};
pub use schema::{Role, Side};
pub use team::TeamDict;
