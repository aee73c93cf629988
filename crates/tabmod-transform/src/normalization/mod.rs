//! Value normalization used by the rule executors.

pub mod datetime;
pub mod numeric;
