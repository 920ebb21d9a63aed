//! # Configuration Logic
//!
//! CLI argument parsing and validation via `clap`. Inputs are checked up
//! front: the VCF, its `.tbi` index, and the pedigree file must all exist
//! before any of them is opened.

use std::path::PathBuf;

use clap::Parser;

use crate::data::length_allele::LengthRounding;
use crate::error::{Result, StrNovoError};

/// Examine STR allele transmission within one family at one locus
#[derive(Parser, Debug)]
#[command(name = "strnovo", version)]
pub struct Config {
    /// Bgzipped, tabix-indexed STR VCF
    #[arg(long = "str-vcf")]
    pub str_vcf: PathBuf,

    /// Pedigree file (PLINK .fam)
    #[arg(long)]
    pub fam: PathBuf,

    /// Locus to examine, as chrom:start
    #[arg(long)]
    pub locus: String,

    /// Family ID from the pedigree
    #[arg(long)]
    pub family: String,

    /// Round allele lengths to the nearest multiple of this repeat period
    /// when grouping alleles by size
    #[arg(long = "round-period")]
    pub round_period: Option<u32>,

    /// Keep only families with at least this many children
    #[arg(long = "min-children", default_value_t = 1)]
    pub min_children: usize,

    /// Print progress messages (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Parse the command line and validate it
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.str_vcf.exists() {
            return Err(StrNovoError::config(format!(
                "STR VCF {} does not exist",
                self.str_vcf.display()
            )));
        }

        let mut index_path = self.str_vcf.as_os_str().to_os_string();
        index_path.push(".tbi");
        if !PathBuf::from(index_path).exists() {
            return Err(StrNovoError::config(format!(
                "no .tbi index found for {}",
                self.str_vcf.display()
            )));
        }

        if !self.fam.exists() {
            return Err(StrNovoError::config(format!(
                "pedigree file {} does not exist",
                self.fam.display()
            )));
        }

        if self.round_period == Some(0) {
            return Err(StrNovoError::config("round period must be positive"));
        }

        self.locus_parts().map(|_| ())
    }

    /// Split the locus argument into chromosome and 1-based start
    pub fn locus_parts(&self) -> Result<(&str, u32)> {
        let invalid = || {
            StrNovoError::config(format!(
                "invalid locus {:?}, expected chrom:start",
                self.locus
            ))
        };
        let (chrom, start) = self.locus.split_once(':').ok_or_else(invalid)?;
        if chrom.is_empty() {
            return Err(invalid());
        }
        let start: u32 = start.parse().map_err(|_| invalid())?;
        if start == 0 {
            return Err(invalid());
        }
        Ok((chrom, start))
    }

    /// The length-grouping mode the records will be decoded with
    pub fn rounding(&self) -> LengthRounding {
        match self.round_period {
            Some(period) => LengthRounding::Period(period),
            None => LengthRounding::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(locus: &str) -> Config {
        Config {
            str_vcf: PathBuf::from("strs.vcf.gz"),
            fam: PathBuf::from("trios.fam"),
            locus: locus.to_string(),
            family: "F1".to_string(),
            round_period: None,
            min_children: 1,
            verbose: 0,
        }
    }

    #[test]
    fn test_locus_parts() {
        assert_eq!(config("chr3:3074876").locus_parts().unwrap(), ("chr3", 3074876));
    }

    #[test]
    fn test_locus_parts_rejects_malformed() {
        assert!(config("chr3").locus_parts().is_err());
        assert!(config(":100").locus_parts().is_err());
        assert!(config("chr3:zero").locus_parts().is_err());
        assert!(config("chr3:0").locus_parts().is_err());
    }

    #[test]
    fn test_rounding_mode() {
        assert_eq!(config("chr1:1").rounding(), LengthRounding::Exact);
        let mut with_period = config("chr1:1");
        with_period.round_period = Some(4);
        assert_eq!(with_period.rounding(), LengthRounding::Period(4));
    }
}
