//! # StrNovo Library Root
//!
//! ## Role
//! The crate root that declares all public modules and re-exports common
//! types, so the indexed-VCF machinery can be used as a library by other
//! tools or by the binary executable.
//!
//! ## Module Structure
//! ```text
//! strnovo
//! ├── config    # CLI arguments and validation
//! ├── data      # In-memory representations (samples, records, length alleles)
//! ├── io        # Indexed VCF access
//! ├── pedigree  # Nuclear family extraction from .fam files
//! ├── inspect   # Per-locus family reports
//! └── utils     # Tracing setup
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod inspect;
pub mod io;
pub mod pedigree;
pub mod utils;

pub use data::{GenotypeCall, LengthAlleleIndex, LengthRounding, SampleIdx, Samples, VariantRecord};
pub use error::{Result, StrNovoError};
pub use io::VcfIndexedReader;
pub use pedigree::{NuclearFamily, PedigreeSet};
