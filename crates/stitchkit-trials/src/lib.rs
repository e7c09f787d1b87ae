//! Stitchkit Trials - clinical-trial and MeSH helpers
//!
//! - [`normalize_date`]: free-text dates (`"March 15, 2020"`) to ISO
//! - [`parse_mesh_ascii`]: MeSH ASCII records keyed by UI
//! - [`parse_study`]: ClinicalTrials.gov study XML to a [`TrialRecord`]
//! - [`run_index`]: parse a whole XML dump in parallel into a gzip JSON index

pub mod config;
pub mod ctgov;
pub mod dates;
pub mod index;
pub mod mesh;
pub mod runner;

// Re-exports
pub use config::{IndexConfig, MeshConfig};
pub use ctgov::{TrialRecord, parse_study};
pub use dates::{month_number, normalize_date};
pub use index::{TrialIndex, index_files, study_files, write_index};
pub use mesh::{MeshRecord, parse_mesh_ascii};
pub use runner::{IndexSummary, MeshSummary, run_index, run_mesh};
