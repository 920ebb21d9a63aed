//! # Data Model
//!
//! In-memory representations of samples, decoded variant records, the
//! length-collapsed allele coordinate system, and per-record allele-frequency
//! statistics.

pub mod length_allele;
pub mod sample;
pub mod stats;
pub mod variant;

pub use length_allele::{LengthAlleleIndex, LengthRounding};
pub use sample::{SampleIdx, Samples};
pub use variant::{GenotypeCall, RawRecord, VariantRecord, MISSING_ALLELE};
