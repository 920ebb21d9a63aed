//! # Locus Inspection
//!
//! Renders a human-readable transmission summary for one decoded record and
//! one nuclear family: the locus and its alleles in both coordinate systems,
//! then each family member's genotype in raw and length-rank coordinates.

use std::fmt::Write;

use crate::data::sample::SampleIdx;
use crate::data::stats::{heterozygosity, heterozygosity_by_length};
use crate::data::variant::VariantRecord;
use crate::error::Result;
use crate::pedigree::{NuclearFamily, Phenotype};

/// Build the full report for a family at one locus
pub fn locus_report(record: &VariantRecord, family: &NuclearFamily) -> Result<String> {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Locus {}:{} ({})",
        record.chromosome(),
        record.position(),
        record.id().unwrap_or(".")
    );

    let index = record.length_index();
    for rank in 0..index.num_ranks() {
        let raw = index.representative_raw(rank)?;
        let _ = writeln!(
            out,
            "  length allele {}: {:+} bp ({} raw allele {}{})",
            rank,
            index.relative_size(rank)?,
            index.rank_length(rank)?,
            raw,
            if raw == 0 { ", reference" } else { "" }
        );
    }

    let _ = writeln!(
        out,
        "  heterozygosity: {:.4} raw, {:.4} by length; {} of {} samples missing",
        heterozygosity(record),
        heterozygosity_by_length(record),
        record.num_missing(),
        record.num_samples()
    );

    member_line(&mut out, record, "mother", family.mother(), None)?;
    member_line(&mut out, record, "father", family.father(), None)?;
    for child in family.children() {
        member_line(&mut out, record, "child", &child.id, Some(child.phenotype))?;
    }

    Ok(out)
}

fn member_line(
    out: &mut String,
    record: &VariantRecord,
    role: &str,
    sample_id: &str,
    phenotype: Option<Phenotype>,
) -> Result<()> {
    let _ = write!(out, "  {:<6} {}", role, sample_id);
    if let Some(phenotype) = phenotype {
        let _ = write!(out, " [{}]", phenotype.as_str());
    }

    let Some(idx) = record.samples().index_of(sample_id) else {
        let _ = writeln!(out, ": no data in VCF");
        return Ok(());
    };

    let call = record.call(idx)?;
    let Some((a1, a2)) = call.alleles() else {
        let _ = writeln!(out, ": missing call");
        return Ok(());
    };

    let (l1, l2) = record
        .length_genotype(idx)?
        .unwrap_or_else(|| unreachable!("call is not missing"));
    let index = record.length_index();
    let sep = if call.is_phased() { '|' } else { '/' };

    let _ = writeln!(
        out,
        ": GT {}{}{}  length GT {}{}{}  sizes {:+}{}{:+} bp{}",
        a1,
        sep,
        a2,
        l1,
        sep,
        l2,
        index.relative_size(l1)?,
        sep,
        index.relative_size(l2)?,
        if call.is_phased() { "" } else { "  unphased" }
    );
    Ok(())
}

/// One sample's view of the record, without family context
pub fn sample_summary(record: &VariantRecord, sample: SampleIdx) -> Result<String> {
    let mut out = String::new();
    let id = record.samples().name(sample).unwrap_or("?").to_string();
    member_line(&mut out, record, "sample", &id, None)?;
    Ok(out)
}
