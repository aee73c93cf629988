//! Declarative rule engine for tabmod.
//!
//! Applies an ordered list of [`RuleEntry`](tabmod_model::RuleEntry) values to a
//! Polars [`DataFrame`](polars::prelude::DataFrame) in place.
//!
//! # Example
//!
//! ```ignore
//! use tabmod_transform::apply_rules;
//!
//! let outcome = apply_rules(&mut df, &config.transformations)?;
//! for warning in &outcome.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! Unknown rule types and references to missing columns never abort the chain;
//! they are collected as [`RuleWarning`]s on the returned [`RuleOutcome`].

mod engine;
mod error;
mod executors;

pub mod normalization;
pub mod selectors;

pub use engine::{RuleOutcome, apply_rules};
pub use error::{Result, RuleWarning, TransformError};
