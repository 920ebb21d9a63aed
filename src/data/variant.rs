//! # Variant Record Model
//!
//! Decodes one raw VCF record into a typed model: chromosome, position,
//! identifier, the reference-first allele list, and one genotype call per
//! header sample. Decoding either produces a fully valid record or fails with
//! a [`StrNovoError::MalformedRecord`]; nothing partially constructed escapes.
//!
//! The raw record handed out by the reader is an owned, scoped value —
//! [`VariantRecord::decode`] consumes it, so releasing the underlying buffer
//! is structural rather than a call the caller can forget.

use std::cell::OnceCell;
use std::sync::Arc;

use crate::data::length_allele::{LengthAlleleIndex, LengthRounding};
use crate::data::sample::{SampleIdx, Samples};
use crate::error::{Result, StrNovoError};

/// Sentinel stored for the halves of a missing genotype call
pub const MISSING_ALLELE: u16 = u16::MAX;

/// One raw record line fetched from the reader.
///
/// Constructing a [`VariantRecord`] consumes the raw record; it cannot be
/// reused or released twice.
#[derive(Debug)]
pub struct RawRecord {
    line: String,
}

impl RawRecord {
    /// Wrap a record line (no header prefix, no trailing newline)
    pub fn from_line(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

/// One sample's genotype at one record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenotypeCall {
    a1: u16,
    a2: u16,
    phased: bool,
    missing: bool,
}

impl GenotypeCall {
    fn missing() -> Self {
        Self {
            a1: MISSING_ALLELE,
            a2: MISSING_ALLELE,
            phased: false,
            missing: true,
        }
    }

    fn diploid(a1: u16, a2: u16, phased: bool) -> Self {
        Self {
            a1,
            a2,
            phased,
            missing: false,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn is_phased(&self) -> bool {
        self.phased
    }

    /// The pair of raw allele indices, in source order, or `None` for a
    /// missing call. Unphased pairs carry no ordering guarantee.
    pub fn alleles(&self) -> Option<(usize, usize)> {
        if self.missing {
            None
        } else {
            Some((self.a1 as usize, self.a2 as usize))
        }
    }
}

/// A fully decoded variant record
#[derive(Debug)]
pub struct VariantRecord {
    chrom: String,
    pos: u32,
    id: Option<String>,
    alleles: Vec<String>,
    calls: Vec<GenotypeCall>,
    num_missing: usize,
    info: String,
    format_keys: Vec<String>,
    sample_fields: Vec<String>,
    samples: Arc<Samples>,
    rounding: LengthRounding,
    length_index: OnceCell<LengthAlleleIndex>,
}

impl VariantRecord {
    /// Decode a raw record against the reader's sample table.
    ///
    /// `rounding` fixes how the record's length-allele index will group
    /// lengths, should it be requested later.
    pub fn decode(
        raw: RawRecord,
        samples: Arc<Samples>,
        rounding: LengthRounding,
    ) -> Result<Self> {
        let line = raw.line;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            return Err(StrNovoError::malformed(format!(
                "expected at least 8 fields, got {}",
                fields.len()
            )));
        }

        let n_samples = samples.len();
        if n_samples > 0 && fields.len() != 9 + n_samples {
            return Err(StrNovoError::malformed(format!(
                "expected {} per-sample fields, got {}",
                n_samples,
                fields.len().saturating_sub(9)
            )));
        }

        let chrom = fields[0].to_string();
        if chrom.is_empty() {
            return Err(StrNovoError::malformed("empty CHROM field"));
        }

        let pos: u32 = fields[1]
            .parse()
            .map_err(|_| StrNovoError::malformed(format!("invalid POS field {:?}", fields[1])))?;

        let id = match fields[2] {
            "." | "" => None,
            other => Some(other.to_string()),
        };

        // Reference first; a record with no reference allele is structurally
        // invalid even if the file format should make that impossible.
        let mut alleles = Vec::new();
        match fields[3] {
            "." | "" => {
                return Err(StrNovoError::malformed("record declares no reference allele"))
            }
            reference => alleles.push(reference.to_string()),
        }
        if fields[4] != "." && !fields[4].is_empty() {
            for alt in fields[4].split(',') {
                if alt.is_empty() {
                    return Err(StrNovoError::malformed("empty ALT allele"));
                }
                alleles.push(alt.to_string());
            }
        }

        let info = fields[7].to_string();

        let (format_keys, sample_fields, calls) = if n_samples > 0 {
            let format_keys: Vec<String> = fields[8].split(':').map(|k| k.to_string()).collect();
            let gt_idx = format_keys
                .iter()
                .position(|k| k == "GT")
                .ok_or_else(|| StrNovoError::malformed("no GT field in FORMAT"))?;

            let sample_fields: Vec<String> =
                fields[9..].iter().map(|f| f.to_string()).collect();

            let mut calls = Vec::with_capacity(n_samples);
            for field in &sample_fields {
                let gt = field.split(':').nth(gt_idx).unwrap_or(".");
                let call = parse_genotype(gt);
                if let Some((a1, a2)) = call.alleles() {
                    let limit = alleles.len();
                    if a1 >= limit || a2 >= limit {
                        return Err(StrNovoError::malformed(format!(
                            "genotype {}/{} references only {} declared allele(s)",
                            a1, a2, limit
                        )));
                    }
                }
                calls.push(call);
            }
            (format_keys, sample_fields, calls)
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        let num_missing = calls.iter().filter(|c| c.is_missing()).count();

        Ok(Self {
            chrom,
            pos,
            id,
            alleles,
            calls,
            num_missing,
            info,
            format_keys,
            sample_fields,
            samples,
            rounding,
            length_index: OnceCell::new(),
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chrom
    }

    /// 1-based genomic position
    pub fn position(&self) -> u32 {
        self.pos
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Declared alleles, reference first
    pub fn alleles(&self) -> &[String] {
        &self.alleles
    }

    pub fn allele(&self, raw: usize) -> Result<&str> {
        self.alleles
            .get(raw)
            .map(|a| a.as_str())
            .ok_or_else(|| StrNovoError::index_out_of_range(raw, self.alleles.len()))
    }

    pub fn num_alleles(&self) -> usize {
        self.alleles.len()
    }

    pub fn num_samples(&self) -> usize {
        self.calls.len()
    }

    /// Samples with a missing call, counted once at decode time
    pub fn num_missing(&self) -> usize {
        self.num_missing
    }

    /// The reader's sample table this record was decoded against
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn calls(&self) -> &[GenotypeCall] {
        &self.calls
    }

    pub fn call(&self, sample: SampleIdx) -> Result<GenotypeCall> {
        self.calls
            .get(sample.as_usize())
            .copied()
            .ok_or_else(|| StrNovoError::index_out_of_range(sample.as_usize(), self.calls.len()))
    }

    /// Genotype call looked up by sample name; `None` for unknown samples
    pub fn call_for(&self, sample_id: &str) -> Option<GenotypeCall> {
        let idx = self.samples.index_of(sample_id)?;
        self.calls.get(idx.as_usize()).copied()
    }

    /// The length-ordered allele index, built on first use and cached
    pub fn length_index(&self) -> &LengthAlleleIndex {
        self.length_index
            .get_or_init(|| LengthAlleleIndex::new(&self.alleles, self.rounding))
    }

    pub fn num_length_alleles(&self) -> usize {
        self.length_index().num_ranks()
    }

    /// A sample's genotype in length-rank coordinates; `None` for missing calls
    pub fn length_genotype(&self, sample: SampleIdx) -> Result<Option<(usize, usize)>> {
        let call = self.call(sample)?;
        let Some((a1, a2)) = call.alleles() else {
            return Ok(None);
        };
        let index = self.length_index();
        Ok(Some((
            index.raw_to_length_rank(a1)?,
            index.raw_to_length_rank(a2)?,
        )))
    }

    pub fn has_info_field(&self, name: &str) -> bool {
        self.info_value(name).is_some()
    }

    pub fn has_format_field(&self, name: &str) -> bool {
        self.format_keys.iter().any(|k| k == name)
    }

    /// A scalar integer INFO value
    pub fn info_integer(&self, name: &str) -> Result<i32> {
        let value = self
            .info_value(name)
            .flatten()
            .ok_or_else(|| StrNovoError::missing_field(name, "INFO field absent or valueless"))?;
        if value.contains(',') {
            return Err(StrNovoError::missing_field(name, "INFO field is not scalar"));
        }
        value
            .parse()
            .map_err(|_| StrNovoError::missing_field(name, "INFO value is not an integer"))
    }

    /// A multi-value integer INFO field; fails unless it has more than one entry
    pub fn info_integers(&self, name: &str) -> Result<Vec<i32>> {
        let value = self
            .info_value(name)
            .flatten()
            .ok_or_else(|| StrNovoError::missing_field(name, "INFO field absent or valueless"))?;
        let values = value
            .split(',')
            .map(|v| {
                v.parse()
                    .map_err(|_| StrNovoError::missing_field(name, "INFO value is not an integer"))
            })
            .collect::<Result<Vec<i32>>>()?;
        if values.len() <= 1 {
            return Err(StrNovoError::missing_field(
                name,
                "INFO field has a single entry",
            ));
        }
        Ok(values)
    }

    /// One integer per sample; `.` placeholders decode to `None`
    pub fn format_integers(&self, name: &str) -> Result<Vec<Option<i32>>> {
        self.format_values(name)?
            .into_iter()
            .map(|v| {
                v.map(|v| {
                    v.parse().map_err(|_| {
                        StrNovoError::missing_field(name, "FORMAT value is not an integer")
                    })
                })
                .transpose()
            })
            .collect()
    }

    /// One float per sample; `.` placeholders decode to `None`
    pub fn format_floats(&self, name: &str) -> Result<Vec<Option<f32>>> {
        self.format_values(name)?
            .into_iter()
            .map(|v| {
                v.map(|v| {
                    v.parse().map_err(|_| {
                        StrNovoError::missing_field(name, "FORMAT value is not a float")
                    })
                })
                .transpose()
            })
            .collect()
    }

    /// One string per sample; `.` placeholders decode to `None`
    pub fn format_strings(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(self
            .format_values(name)?
            .into_iter()
            .map(|v| v.map(|v| v.to_string()))
            .collect())
    }

    /// A multi-value integer list per sample; each present entry must have
    /// more than one value
    pub fn format_integer_lists(&self, name: &str) -> Result<Vec<Option<Vec<i32>>>> {
        self.format_values(name)?
            .into_iter()
            .map(|entry| {
                let Some(entry) = entry else {
                    return Ok(None);
                };
                let values = entry
                    .split(',')
                    .map(|v| {
                        v.parse().map_err(|_| {
                            StrNovoError::missing_field(name, "FORMAT value is not an integer")
                        })
                    })
                    .collect::<Result<Vec<i32>>>()?;
                if values.len() <= 1 {
                    return Err(StrNovoError::missing_field(
                        name,
                        "FORMAT field has a single entry per sample",
                    ));
                }
                Ok(Some(values))
            })
            .collect()
    }

    /// Outer `None`: key absent. Inner `None`: key present without a value (flag).
    fn info_value(&self, name: &str) -> Option<Option<&str>> {
        for entry in self.info.split(';') {
            match entry.split_once('=') {
                Some((key, value)) if key == name => return Some(Some(value)),
                None if entry == name => return Some(None),
                _ => {}
            }
        }
        None
    }

    /// Per-sample raw values for a FORMAT key, `.` mapped to `None`.
    /// Fails if the key is undeclared or any sample field has too few entries.
    fn format_values(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self
            .format_keys
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| StrNovoError::missing_field(name, "FORMAT field not declared"))?;
        self.sample_fields
            .iter()
            .map(|field| {
                let value = field.split(':').nth(idx).ok_or_else(|| {
                    StrNovoError::missing_field(name, "fewer FORMAT entries than samples")
                })?;
                Ok(match value {
                    "." | "" => None,
                    v => Some(v),
                })
            })
            .collect()
    }
}

/// Parse one GT subfield (e.g. `0|1`, `0/2`, `./.`, `1`).
///
/// If either half is unset the whole call is missing; a single-allele
/// (haploid) entry is stored as a duplicated, phased pair. Unparseable
/// entries degrade to missing rather than aborting the record.
fn parse_genotype(gt: &str) -> GenotypeCall {
    if gt == "." || gt == "./." || gt == ".|." {
        return GenotypeCall::missing();
    }

    let phased = gt.contains('|');
    let sep = if phased { '|' } else { '/' };
    let mut parts = gt.split(sep);

    let first = parts.next().unwrap_or(".");
    let Some(second) = parts.next() else {
        return match parse_allele(first) {
            Some(a) => GenotypeCall::diploid(a, a, true),
            None => GenotypeCall::missing(),
        };
    };
    if parts.next().is_some() {
        return GenotypeCall::missing();
    }

    match (parse_allele(first), parse_allele(second)) {
        (Some(a1), Some(a2)) => GenotypeCall::diploid(a1, a2, phased),
        _ => GenotypeCall::missing(),
    }
}

fn parse_allele(s: &str) -> Option<u16> {
    if s == "." || s.is_empty() {
        return None;
    }
    s.parse::<u16>().ok().filter(|&a| a != MISSING_ALLELE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize) -> Arc<Samples> {
        Arc::new(Samples::from_ids(
            (0..n).map(|i| format!("S{}", i)).collect(),
        ))
    }

    fn decode(line: &str, n: usize) -> Result<VariantRecord> {
        VariantRecord::decode(RawRecord::from_line(line), samples(n), LengthRounding::Exact)
    }

    #[test]
    fn test_decode_multiallelic_record() {
        let record = decode(
            "chr1\t100\tSTR_1\tACACACACAC\tACACACACACACACAC,ACAC\t.\tPASS\tSTART=100;END=110\tGT\t0|1\t2/0\t./.",
            3,
        )
        .unwrap();

        assert_eq!(record.chromosome(), "chr1");
        assert_eq!(record.position(), 100);
        assert_eq!(record.id(), Some("STR_1"));
        assert_eq!(record.num_alleles(), 3);
        assert_eq!(record.allele(0).unwrap(), "ACACACACAC");
        assert_eq!(record.num_samples(), 3);
        assert_eq!(record.num_missing(), 1);

        let call = record.call(SampleIdx::new(0)).unwrap();
        assert_eq!(call.alleles(), Some((0, 1)));
        assert!(call.is_phased());

        let call = record.call(SampleIdx::new(1)).unwrap();
        assert_eq!(call.alleles(), Some((2, 0)));
        assert!(!call.is_phased());

        let call = record.call(SampleIdx::new(2)).unwrap();
        assert!(call.is_missing());
        assert_eq!(call.alleles(), None);
    }

    #[test]
    fn test_half_missing_genotype_is_missing() {
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t.|1", 1).unwrap();
        assert!(record.call(SampleIdx::new(0)).unwrap().is_missing());
        assert_eq!(record.num_missing(), 1);
    }

    #[test]
    fn test_haploid_genotype_duplicates() {
        let record = decode("chrX\t100\t.\tA\tT\t.\t.\t.\tGT\t1", 1).unwrap();
        let call = record.call(SampleIdx::new(0)).unwrap();
        assert_eq!(call.alleles(), Some((1, 1)));
        assert!(call.is_phased());
    }

    #[test]
    fn test_missing_reference_allele_rejected() {
        let err = decode("chr1\t100\t.\t.\tT\t.\t.\t.\tGT\t0/0", 1).unwrap_err();
        assert!(matches!(err, StrNovoError::MalformedRecord { .. }));
    }

    #[test]
    fn test_sample_field_count_mismatch_rejected() {
        let err = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t0/0", 2).unwrap_err();
        assert!(matches!(err, StrNovoError::MalformedRecord { .. }));
    }

    #[test]
    fn test_genotype_index_beyond_alleles_rejected() {
        let err = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t0/2", 1).unwrap_err();
        assert!(matches!(err, StrNovoError::MalformedRecord { .. }));
    }

    #[test]
    fn test_info_integer_accessors() {
        let record = decode(
            "chr1\t100\t.\tA\tT\t.\t.\tSTART=100;PERIOD=4;GTS=3,4,5;FLAG\tGT\t0/0",
            1,
        )
        .unwrap();

        assert_eq!(record.info_integer("START").unwrap(), 100);
        assert_eq!(record.info_integers("GTS").unwrap(), vec![3, 4, 5]);
        assert!(record.has_info_field("FLAG"));
        assert!(!record.has_info_field("ABSENT"));

        assert!(matches!(
            record.info_integer("ABSENT"),
            Err(StrNovoError::MissingField { .. })
        ));
        // multi-value requested through the scalar accessor
        assert!(record.info_integer("GTS").is_err());
        // scalar requested through the multi-value accessor
        assert!(record.info_integers("START").is_err());
        // flags have no value at all
        assert!(record.info_integer("FLAG").is_err());
    }

    #[test]
    fn test_format_accessors() {
        let record = decode(
            "chr1\t100\t.\tA\tT\t.\t.\t.\tGT:REPCN:Q:ALLREADS\t0/1:12:0.98:3,9\t1/1:.:0.50:4,8",
            2,
        )
        .unwrap();

        assert_eq!(
            record.format_integers("REPCN").unwrap(),
            vec![Some(12), None]
        );
        assert_eq!(
            record.format_floats("Q").unwrap(),
            vec![Some(0.98), Some(0.50)]
        );
        assert_eq!(
            record.format_integer_lists("ALLREADS").unwrap(),
            vec![Some(vec![3, 9]), Some(vec![4, 8])]
        );
        assert!(record.has_format_field("REPCN"));
        assert!(matches!(
            record.format_integers("DP"),
            Err(StrNovoError::MissingField { .. })
        ));
    }

    #[test]
    fn test_format_fewer_entries_than_samples() {
        // second sample omits the trailing REPCN subfield entirely
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT:REPCN\t0/1:12\t1/1", 2).unwrap();
        assert!(matches!(
            record.format_integers("REPCN"),
            Err(StrNovoError::MissingField { .. })
        ));
    }

    #[test]
    fn test_length_genotype_mapping() {
        // ref 10 bp, alts 16 bp and 4 bp
        let record = decode(
            "chr1\t100\t.\tACACACACAC\tACACACACACACACAC,ACAC\t.\t.\t.\tGT\t0|1\t2/2\t./.",
            3,
        )
        .unwrap();

        assert_eq!(record.num_length_alleles(), 3);
        assert_eq!(
            record.length_genotype(SampleIdx::new(0)).unwrap(),
            Some((1, 2))
        );
        assert_eq!(
            record.length_genotype(SampleIdx::new(1)).unwrap(),
            Some((0, 0))
        );
        assert_eq!(record.length_genotype(SampleIdx::new(2)).unwrap(), None);
        assert_eq!(record.length_index().relative_size(2).unwrap(), 6);
    }

    #[test]
    fn test_call_lookup_by_name() {
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\t.\tGT\t0/1\t1/1", 2).unwrap();
        assert_eq!(record.call_for("S1").unwrap().alleles(), Some((1, 1)));
        assert!(record.call_for("nobody").is_none());
    }

    #[test]
    fn test_sitesonly_record_decodes() {
        let record = decode("chr1\t100\t.\tA\tT\t.\t.\tAC=3", 0).unwrap();
        assert_eq!(record.num_samples(), 0);
        assert_eq!(record.num_missing(), 0);
    }
}
