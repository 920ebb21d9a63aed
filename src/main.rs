//! # StrNovo: STR Transmission Inspection
//!
//! Looks up one STR locus in a bgzipped, tabix-indexed VCF and prints how its
//! alleles are carried through one nuclear family.
//!
//! ## Usage
//! ```bash
//! strnovo --str-vcf strs.vcf.gz --fam trios.fam --locus chr3:3074876 --family F0213
//! ```

use std::time::Instant;

use strnovo::config::Config;
use strnovo::error::{Result, StrNovoError};
use strnovo::io::VcfIndexedReader;
use strnovo::pedigree::PedigreeSet;
use strnovo::{inspect, utils};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let start_time = Instant::now();

    let config = Config::parse_and_validate()?;
    utils::init_tracing(config.verbose);

    let (chrom, start) = config.locus_parts()?;

    let mut reader = VcfIndexedReader::open(&config.str_vcf)?;
    let pedigree = PedigreeSet::from_fam(&config.fam, reader.samples(), config.min_children)?;
    pedigree.log_status();

    let family = pedigree.family(&config.family).ok_or_else(|| {
        StrNovoError::config(format!(
            "family {} has no members with genotype data",
            config.family
        ))
    })?;

    if !reader.seek_interval(chrom, start, None) {
        return Err(StrNovoError::config(format!(
            "chromosome {} not present in the index",
            chrom
        )));
    }

    // STR callers may anchor POS a few bases before the repeat; the INFO
    // START tag carries the repeat's own start when they do.
    let mut locus = None;
    while let Some(record) = reader.read_variant(config.rounding())? {
        let rec_start = record
            .info_integer("START")
            .ok()
            .unwrap_or(record.position() as i32);
        if rec_start == start as i32 {
            locus = Some(record);
            break;
        }
        if record.position() > start {
            break;
        }
    }

    let Some(record) = locus else {
        return Err(StrNovoError::config(format!(
            "no record with start {} found at {}:{}",
            start, chrom, start
        )));
    };

    print!("{}", inspect::locus_report(&record, family)?);

    eprintln!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
