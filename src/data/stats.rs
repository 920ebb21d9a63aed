//! # Population Statistics
//!
//! Allele-frequency diversity statistics over one record's genotype calls.
//! Missing calls are excluded entirely; every non-missing sample contributes
//! two haplotypes.

use crate::data::variant::VariantRecord;

/// Expected heterozygosity `1 - sum(p_i^2)` over raw allele frequencies.
///
/// Returns 0.0 when no non-missing calls are observed.
pub fn heterozygosity(record: &VariantRecord) -> f64 {
    diversity(record, record.num_alleles(), |a| a)
}

/// Expected heterozygosity over length-collapsed allele frequencies:
/// alleles sharing a (possibly rounded) length count as one.
pub fn heterozygosity_by_length(record: &VariantRecord) -> f64 {
    let index = record.length_index();
    diversity(record, index.num_ranks(), |a| {
        index
            .raw_to_length_rank(a)
            .unwrap_or_else(|_| unreachable!("decoded calls only hold valid raw indices"))
    })
}

fn diversity(record: &VariantRecord, n_slots: usize, map: impl Fn(usize) -> usize) -> f64 {
    let mut counts = vec![0u64; n_slots];
    let mut total = 0u64;

    for call in record.calls() {
        let Some((a1, a2)) = call.alleles() else {
            continue;
        };
        counts[map(a1)] += 1;
        counts[map(a2)] += 1;
        total += 2;
    }

    if total == 0 {
        return 0.0;
    }

    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();

    1.0 - sum_sq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::length_allele::LengthRounding;
    use crate::data::sample::Samples;
    use crate::data::variant::RawRecord;
    use std::sync::Arc;

    fn decode(line: &str, n: usize) -> VariantRecord {
        let samples = Arc::new(Samples::from_ids(
            (0..n).map(|i| format!("S{}", i)).collect(),
        ));
        VariantRecord::decode(RawRecord::from_line(line), samples, LengthRounding::Exact).unwrap()
    }

    #[test]
    fn test_biallelic_scenario() {
        // ref 10 bp, alt 16 bp; A hom-ref, B het -> freqs 3/4 and 1/4
        let record = decode(
            "chr1\t100\t.\tACACACACAC\tACACACACACACACAC\t.\t.\t.\tGT\t0/0\t0/1",
            2,
        );
        let expected = 1.0 - (0.75f64 * 0.75 + 0.25 * 0.25);
        assert!((heterozygosity(&record) - expected).abs() < 1e-12);
        assert!((heterozygosity_by_length(&record) - expected).abs() < 1e-12);
        assert_eq!(record.num_length_alleles(), 2);
        assert_eq!(record.length_index().relative_size(0).unwrap(), 0);
        assert_eq!(record.length_index().relative_size(1).unwrap(), 6);
    }

    #[test]
    fn test_missing_calls_excluded() {
        // one missing sample must not perturb the monomorphic remainder
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t0/0\t0/0\t./.", 3);
        assert_eq!(heterozygosity(&record), 0.0);
        assert_eq!(heterozygosity_by_length(&record), 0.0);
    }

    #[test]
    fn test_all_missing_is_zero() {
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t./.\t./.", 2);
        assert_eq!(heterozygosity(&record), 0.0);
    }

    #[test]
    fn test_length_collapse_lowers_diversity() {
        // alts of equal length look distinct raw but identical by length
        let record = decode("chr1\t100\t.\tAAAA\tTTTT,AA\t.\t.\t.\tGT\t0/1\t0/2\t1/2", 3);
        let raw = heterozygosity(&record);
        let by_length = heterozygosity_by_length(&record);
        assert!(by_length < raw);

        // by length: ref+alt1 share a slot (4/6), alt2 alone (2/6)
        let p1 = 4.0 / 6.0;
        let p2 = 2.0 / 6.0;
        assert!((by_length - (1.0 - (p1 * p1 + p2 * p2))).abs() < 1e-12);
    }
}
