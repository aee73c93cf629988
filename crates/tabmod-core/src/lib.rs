//! Orchestration for tabmod.
//!
//! [`Transformer`] ties the loader, the rule engine and the exporter together:
//!
//! ```ignore
//! use std::path::Path;
//! use tabmod_core::Transformer;
//!
//! let mut transformer = Transformer::from_config_path(Path::new("configs/ledger.yaml"))?;
//! let written = transformer.process(Path::new("ledger.xls"), None)?;
//! println!("{}", written.display());
//! ```

mod error;
mod transformer;

pub use error::{PipelineError, Result};
pub use transformer::Transformer;
