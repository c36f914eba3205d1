//! File-level import graph and structural-neighbour expansion, the piece of
//! recon's pipeline that turns a seed set of files into the files pulled in
//! by §4.6.6 "Expansion".

mod builder;
mod error;
mod expand;
mod types;

pub use builder::build;
pub use error::{GraphError, Result};
pub use expand::{expand, ExpansionHit};
pub use types::{FileGraph, FileNode, ImportEdge};
