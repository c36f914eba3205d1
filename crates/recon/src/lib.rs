//! Recon pipeline (SPEC §4.6): turns an agent's free-text task into a
//! byte-budgeted, tiered set of files.
//!
//! ```text
//! task text
//!     │
//!     ├─ parse task (identifiers, paths, intent, query views)   §4.6.1
//!     ├─ harvest (explicit, lexical, term-match, def/file vec)  §4.6.2
//!     ├─ enrich (join definition table)                         §4.6.3
//!     ├─ score + filter (weights, penalties, edit likelihood)   §4.6.4
//!     ├─ cutoff (elbow + anchor floor)                          §4.6.5
//!     ├─ expansion (import-graph neighbours, depth 2)           §4.6.6
//!     ├─ tier assignment                                        §4.6.7
//!     └─ assemble with byte budget + pagination cursor          §4.6.8
//! ```

mod assemble;
mod cutoff;
mod enrich;
mod error;
mod expansion;
mod harvest;
mod pipeline;
mod score;
mod task;
mod tier;

pub use assemble::{AssembledFile, AssemblyResult};
pub use error::{ReconError, Result};
pub use harvest::{HarvestCandidate, HarvestSource};
pub use pipeline::{run, ReconConfig, ReconOutcome};
pub use task::{Intent, ParsedTask, QueryViews};
pub use tier::Tier;
