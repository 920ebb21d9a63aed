//! # Length-Ordered Allele Index
//!
//! STR genotypes are compared across relatives by allele *size*, not by the
//! declaration order of the VCF record. This module derives a secondary
//! coordinate system from a record's allele list: alleles are grouped by
//! (optionally rounded) sequence length and ranked ascending, rank 0 being the
//! shortest. Each rank carries a signed size relative to the reference allele,
//! so an expansion reads as `+n` bp and a contraction as `-n` bp.
//!
//! Alleles whose (rounded) lengths tie collapse into a single rank slot. The
//! representative of a slot is the allele with the lowest raw index; this
//! choice is deterministic and is only used for display.

use crate::error::{Result, StrNovoError};

/// How allele lengths are grouped before ranking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthRounding {
    /// Exact sequence lengths
    Exact,
    /// Round each length to the nearest multiple of the repeat-unit period,
    /// collapsing alleles that differ by less than one repeat unit
    Period(u32),
}

impl LengthRounding {
    /// Apply the rounding mode to a raw length.
    ///
    /// Nearest-multiple rounding with ties rounding up: `(len + p/2) / p * p`.
    fn apply(self, len: usize) -> i64 {
        match self {
            LengthRounding::Exact => len as i64,
            LengthRounding::Period(p) => {
                let p = i64::from(p.max(1));
                (len as i64 + p / 2) / p * p
            }
        }
    }
}

/// Mapping between raw allele indices and length-rank indices for one record
#[derive(Clone, Debug)]
pub struct LengthAlleleIndex {
    /// Length rank of each raw allele index
    rank_of_raw: Vec<usize>,
    /// Distinct (rounded) lengths, ascending, one per rank
    rank_lengths: Vec<i64>,
    /// Signed size of each rank relative to the reference allele
    relative_sizes: Vec<i64>,
}

impl LengthAlleleIndex {
    /// Build the index from a record's declared alleles (reference first).
    ///
    /// Every raw index maps to exactly one rank; a rank may cover several raw
    /// indices when lengths tie.
    pub fn new(alleles: &[String], rounding: LengthRounding) -> Self {
        let lengths: Vec<i64> = alleles.iter().map(|a| rounding.apply(a.len())).collect();

        let mut rank_lengths = lengths.clone();
        rank_lengths.sort_unstable();
        rank_lengths.dedup();

        let rank_of_raw = lengths
            .iter()
            .map(|len| {
                rank_lengths
                    .binary_search(len)
                    .unwrap_or_else(|_| unreachable!("every length is in the distinct set"))
            })
            .collect();

        let ref_length = lengths.first().copied().unwrap_or(0);
        let relative_sizes = rank_lengths.iter().map(|len| len - ref_length).collect();

        Self {
            rank_of_raw,
            rank_lengths,
            relative_sizes,
        }
    }

    /// Number of distinct length-rank slots
    pub fn num_ranks(&self) -> usize {
        self.rank_lengths.len()
    }

    /// Map a raw allele index to its length rank
    pub fn raw_to_length_rank(&self, raw: usize) -> Result<usize> {
        self.rank_of_raw
            .get(raw)
            .copied()
            .ok_or_else(|| StrNovoError::index_out_of_range(raw, self.rank_of_raw.len()))
    }

    /// Size of a length rank relative to the reference allele, in bp
    /// (positive = expansion, negative = contraction)
    pub fn relative_size(&self, rank: usize) -> Result<i64> {
        self.relative_sizes
            .get(rank)
            .copied()
            .ok_or_else(|| StrNovoError::index_out_of_range(rank, self.relative_sizes.len()))
    }

    /// The (rounded) length a rank groups on
    pub fn rank_length(&self, rank: usize) -> Result<i64> {
        self.rank_lengths
            .get(rank)
            .copied()
            .ok_or_else(|| StrNovoError::index_out_of_range(rank, self.rank_lengths.len()))
    }

    /// Lowest raw allele index mapped to this rank (the slot representative)
    pub fn representative_raw(&self, rank: usize) -> Result<usize> {
        if rank >= self.num_ranks() {
            return Err(StrNovoError::index_out_of_range(rank, self.num_ranks()));
        }
        Ok(self
            .rank_of_raw
            .iter()
            .position(|&r| r == rank)
            .unwrap_or_else(|| unreachable!("every rank has at least one raw index")))
    }
}
