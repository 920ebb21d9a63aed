//! # Pedigree Extraction
//!
//! Parses a PLINK `.fam` relationship file (FID, IID, father, mother, sex,
//! phenotype; whitespace-separated) into nuclear families. Only individuals
//! with genotype data in the opened VCF participate: a child row whose own ID
//! or either parent ID is absent from the VCF sample table is dropped, and a
//! family survives only if it keeps enough children.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::data::sample::Samples;
use crate::error::{Result, StrNovoError};

/// Affection status from the sixth `.fam` column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phenotype {
    /// `0` or `-9` (or anything unrecognized)
    Missing,
    /// `1`
    Unaffected,
    /// `2`
    Affected,
}

impl Phenotype {
    fn from_fam(value: &str) -> Self {
        match value {
            "1" => Phenotype::Unaffected,
            "2" => Phenotype::Affected,
            _ => Phenotype::Missing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phenotype::Missing => "unknown",
            Phenotype::Unaffected => "unaffected",
            Phenotype::Affected => "affected",
        }
    }
}

/// One child of a nuclear family
#[derive(Clone, Debug)]
pub struct Child {
    pub id: String,
    pub phenotype: Phenotype,
}

/// Mother, father, and their children, all with data in the VCF
#[derive(Clone, Debug)]
pub struct NuclearFamily {
    family_id: String,
    father: String,
    mother: String,
    children: Vec<Child>,
}

impl NuclearFamily {
    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    pub fn father(&self) -> &str {
        &self.father
    }

    pub fn mother(&self) -> &str {
        &self.mother
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }
}

/// All nuclear families extracted from one `.fam` file
#[derive(Clone, Debug, Default)]
pub struct PedigreeSet {
    families: Vec<NuclearFamily>,
}

impl PedigreeSet {
    /// Extract nuclear families, restricted to `samples` and to families
    /// with at least `min_children` children.
    ///
    /// Rows with a parent ID of `0` are founders; they only appear as the
    /// parents of other rows.
    pub fn from_fam(path: &Path, samples: &Samples, min_children: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| StrNovoError::open(path, e))?;
        let reader = BufReader::new(file);

        let mut families: Vec<NuclearFamily> = Vec::new();
        let mut n_rows = 0usize;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 6 {
                return Err(StrNovoError::pedigree(format!(
                    "line {}: expected 6 columns, got {}",
                    line_num + 1,
                    cols.len()
                )));
            }
            n_rows += 1;

            let (family_id, child_id, father, mother) = (cols[0], cols[1], cols[2], cols[3]);
            let phenotype = Phenotype::from_fam(cols[5]);

            // founder rows carry no parent pair
            if father == "0" || mother == "0" {
                continue;
            }
            if !samples.contains(child_id) || !samples.contains(father) || !samples.contains(mother)
            {
                continue;
            }

            let child = Child {
                id: child_id.to_string(),
                phenotype,
            };

            match families.iter_mut().find(|f| {
                f.family_id == family_id && f.father == father && f.mother == mother
            }) {
                Some(family) => family.children.push(child),
                None => families.push(NuclearFamily {
                    family_id: family_id.to_string(),
                    father: father.to_string(),
                    mother: mother.to_string(),
                    children: vec![child],
                }),
            }
        }

        families.retain(|f| f.num_children() >= min_children);

        info!(
            n_rows,
            n_families = families.len(),
            "extracted nuclear families with data"
        );

        Ok(Self { families })
    }

    pub fn families(&self) -> &[NuclearFamily] {
        &self.families
    }

    /// First family with this family ID
    pub fn family(&self, family_id: &str) -> Option<&NuclearFamily> {
        self.families.iter().find(|f| f.family_id == family_id)
    }

    pub fn log_status(&self) {
        for family in &self.families {
            info!(
                family = family.family_id(),
                mother = family.mother(),
                father = family.father(),
                n_children = family.num_children(),
                "family"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn samples(ids: &[&str]) -> Samples {
        Samples::from_ids(ids.iter().map(|s| s.to_string()).collect())
    }

    fn write_fam(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_extract_trio() {
        let fam = write_fam(
            "FAM1 dad 0 0 1 1\n\
             FAM1 mom 0 0 2 1\n\
             FAM1 kid dad mom 1 2\n",
        );
        let samples = samples(&["dad", "mom", "kid"]);
        let pedigree = PedigreeSet::from_fam(fam.path(), &samples, 1).unwrap();

        assert_eq!(pedigree.families().len(), 1);
        let family = pedigree.family("FAM1").unwrap();
        assert_eq!(family.father(), "dad");
        assert_eq!(family.mother(), "mom");
        assert_eq!(family.num_children(), 1);
        assert_eq!(family.children()[0].phenotype, Phenotype::Affected);
    }

    #[test]
    fn test_child_without_vcf_data_dropped() {
        let fam = write_fam(
            "FAM1 dad 0 0 1 1\n\
             FAM1 mom 0 0 2 1\n\
             FAM1 kid dad mom 1 2\n",
        );
        // kid has no genotype data
        let samples = samples(&["dad", "mom"]);
        let pedigree = PedigreeSet::from_fam(fam.path(), &samples, 1).unwrap();
        assert!(pedigree.families().is_empty());
    }

    #[test]
    fn test_min_children_filter() {
        let fam = write_fam(
            "FAM1 dad 0 0 1 1\n\
             FAM1 mom 0 0 2 1\n\
             FAM1 kid1 dad mom 1 2\n\
             FAM1 kid2 dad mom 2 1\n",
        );
        let samples = samples(&["dad", "mom", "kid1", "kid2"]);
        assert_eq!(
            PedigreeSet::from_fam(fam.path(), &samples, 2)
                .unwrap()
                .families()
                .len(),
            1
        );
        let fam2 = write_fam(
            "FAM1 dad 0 0 1 1\n\
             FAM1 mom 0 0 2 1\n\
             FAM1 kid1 dad mom 1 2\n",
        );
        assert!(PedigreeSet::from_fam(fam2.path(), &samples, 2)
            .unwrap()
            .families()
            .is_empty());
    }

    #[test]
    fn test_short_row_rejected() {
        let fam = write_fam("FAM1 kid dad mom\n");
        let samples = samples(&["kid", "dad", "mom"]);
        assert!(matches!(
            PedigreeSet::from_fam(fam.path(), &samples, 1),
            Err(StrNovoError::Pedigree { .. })
        ));
    }

    #[test]
    fn test_unknown_family_lookup() {
        let fam = write_fam("FAM1 dad 0 0 1 1\n");
        let samples = samples(&["dad"]);
        let pedigree = PedigreeSet::from_fam(fam.path(), &samples, 0).unwrap();
        assert!(pedigree.family("FAM9").is_none());
    }
}
