//! Safe edits on tabular model definitions.
//!
//! A single-table `createOrReplace` replaces the live table whole, so the
//! only safe way to build one is from the current model definition. This
//! crate extracts a complete table payload ([`extract_table`]), applies
//! measure upserts to it ([`add_measure`]), and audits the result for
//! data-loss gaps before it is handed back ([`check_completeness`]).

pub mod audit;
pub mod error;
pub mod extract;
pub mod measure;

pub use audit::check_completeness;
pub use error::{EditError, Result};
pub use extract::extract_table;
pub use measure::{MeasureSpec, add_measure};
