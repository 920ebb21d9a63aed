//! # Input/Output
//!
//! Indexed VCF access.

pub mod vcf;

pub use vcf::VcfIndexedReader;
