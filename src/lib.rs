//! Nanofactory
//!
//! Works out how much base resource a chain of reactions consumes, and how
//! much of a target a fixed budget of it can produce.

pub mod batch;
pub mod calculator;
pub mod capacity;
pub mod db;
pub mod logging;
pub mod models;
pub mod parse;

pub use calculator::{ore_for, resolve, summarize, ProductionSummary, ResolveError};
pub use capacity::{max_producible, Capacity};
pub use models::{BookError, Ingredient, Reaction, ReactionBook, SurplusLedger};
pub use parse::ParseError;
