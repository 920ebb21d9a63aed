//! # Indexed VCF Reading
//!
//! Streams records from a bgzip-compressed VCF with a tabix companion index,
//! with region jumps ahead of forward-only iteration. Uses the `noodles`
//! crates for the header, BGZF virtual-position seeks, and tabix queries;
//! record lines themselves are handed out raw for [`VariantRecord`] decoding.
//!
//! The reader owns the file and index handles for its whole lifetime and
//! snapshots the header's sample ordering once at open; every decoded record
//! shares that snapshot.
//!
//! [`VariantRecord`]: crate::data::variant::VariantRecord

use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use noodles::bgzf;
use noodles::core::region::Interval;
use noodles::core::Position;
use noodles::csi::BinningIndex;
use noodles::tabix;
use noodles::vcf::Header;
use tracing::{debug, info, info_span};

use crate::data::length_allele::LengthRounding;
use crate::data::sample::{SampleIdx, Samples};
use crate::data::variant::{RawRecord, VariantRecord};
use crate::error::{Result, StrNovoError};

/// Streaming cursor state. A failed seek parks the cursor at `Finished` so a
/// stale region can never leak records.
enum Cursor {
    /// No seek yet: records in file order from the current offset
    FileOrder,
    /// Confined to one chromosome interval
    Region {
        chrom: String,
        start: u32,
        end: Option<u32>,
        entered: bool,
    },
    /// End of stream (EOF, past the region, or after a failed seek)
    Finished,
}

/// Region-indexed reader over a bgzipped VCF and its `.tbi` index
pub struct VcfIndexedReader {
    reader: bgzf::io::Reader<File>,
    index: tabix::Index,
    header: Header,
    samples: Arc<Samples>,
    cursor: Cursor,
}

impl VcfIndexedReader {
    /// Open `path` and its `path.tbi` companion index.
    ///
    /// Fails with an open error if either file is missing or unreadable, or
    /// if the header cannot be parsed. The header's sample list becomes the
    /// fixed sample ordering for every record this reader produces.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info_span!("vcf_open", path = ?path).in_scope(|| {
            let file = File::open(path).map_err(|e| StrNovoError::open(path, e))?;
            let mut reader = bgzf::io::Reader::new(file);

            let mut header_str = String::new();
            loop {
                let mut line = String::new();
                let bytes_read = reader.read_line(&mut line)?;
                if bytes_read == 0 {
                    break;
                }
                if line.starts_with('#') {
                    header_str.push_str(&line);
                    if line.starts_with("#CHROM") {
                        break;
                    }
                } else {
                    break;
                }
            }

            let header: Header = header_str
                .parse()
                .map_err(|e| StrNovoError::open(path, format!("invalid header: {}", e)))?;

            let index_path = tabix_path(path);
            let index = tabix::fs::read(&index_path)
                .map_err(|e| StrNovoError::open(&index_path, e))?;

            let samples = Arc::new(Samples::from_ids(
                header.sample_names().iter().map(|s| s.to_string()).collect(),
            ));
            info!(n_samples = samples.len(), "opened indexed VCF");

            Ok(Self {
                reader,
                index,
                header,
                samples,
                cursor: Cursor::FileOrder,
            })
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The header-declared sample table
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Shared handle to the sample table, for decoding records
    pub fn samples_arc(&self) -> Arc<Samples> {
        Arc::clone(&self.samples)
    }

    /// Sample index by name; unknown names resolve to `None`
    pub fn sample_index(&self, id: &str) -> Option<SampleIdx> {
        self.samples.index_of(id)
    }

    pub fn sample_name(&self, idx: SampleIdx) -> Option<&str> {
        self.samples.name(idx)
    }

    /// Whether the positional index knows this contig
    pub fn has_chromosome(&self, chrom: &str) -> bool {
        self.index
            .header()
            .map(|h| {
                h.reference_sequence_names()
                    .get_index_of(chrom.as_bytes())
                    .is_some()
            })
            .unwrap_or(false)
    }

    /// Reposition to the first record at or after `start` in a region string
    /// (`chrom`, `chrom:pos`, or `chrom:start-end`, 1-based inclusive).
    ///
    /// Returns `false` for an unknown contig or malformed region; that is
    /// non-fatal, but the reader stays at end-of-stream until another
    /// successful seek.
    pub fn seek(&mut self, region: &str) -> bool {
        match parse_region(region) {
            Some((chrom, start, end)) => {
                let chrom = chrom.to_string();
                self.seek_interval(&chrom, start, end)
            }
            None => {
                debug!(region, "malformed region string");
                self.cursor = Cursor::Finished;
                false
            }
        }
    }

    /// Reposition to the first record at or after `start` on `chrom`
    /// (`end` unbounded when `None`)
    pub fn seek_interval(&mut self, chrom: &str, start: u32, end: Option<u32>) -> bool {
        self.cursor = Cursor::Finished;

        let Some(index_header) = self.index.header() else {
            return false;
        };
        let Some(ref_id) = index_header.reference_sequence_names().get_index_of(chrom.as_bytes()) else {
            debug!(chrom, "contig not in index");
            return false;
        };

        let Ok(start_pos) = Position::try_from(start.max(1) as usize) else {
            return false;
        };
        let interval = match end {
            Some(e) => match Position::try_from(e as usize) {
                Ok(end_pos) if start_pos <= end_pos => Interval::from(start_pos..=end_pos),
                _ => return false,
            },
            None => Interval::from(start_pos..),
        };

        let chunks = match self.index.query(ref_id, interval) {
            Ok(chunks) => chunks,
            Err(_) => return false,
        };

        // A known contig with no overlapping data: successful seek, already
        // at end-of-stream.
        let Some(first) = chunks.first() else {
            return true;
        };
        if self.reader.seek(first.start()).is_err() {
            return false;
        }

        debug!(chrom, start, ?end, "seek");
        self.cursor = Cursor::Region {
            chrom: chrom.to_string(),
            start,
            end,
            entered: false,
        };
        true
    }

    /// Next raw record, or `None` at end-of-stream.
    ///
    /// After a successful seek, only records on the sought chromosome with
    /// start position inside the interval are yielded, in increasing
    /// position order; once past the interval the stream ends without a
    /// further seek.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>> {
        loop {
            if matches!(self.cursor, Cursor::Finished) {
                return Ok(None);
            }

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                self.cursor = Cursor::Finished;
                return Ok(None);
            }
            line.truncate(line.trim_end().len());
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (rec_chrom, rec_pos) = locate(&line)?;

            match &mut self.cursor {
                Cursor::FileOrder => return Ok(Some(RawRecord::from_line(line))),
                Cursor::Region {
                    chrom,
                    start,
                    end,
                    entered,
                } => {
                    if rec_chrom != chrom {
                        if *entered {
                            // left the sought contig
                            self.cursor = Cursor::Finished;
                            return Ok(None);
                        }
                        continue;
                    }
                    if rec_pos < *start {
                        continue;
                    }
                    if let Some(e) = end {
                        if rec_pos > *e {
                            self.cursor = Cursor::Finished;
                            return Ok(None);
                        }
                    }
                    *entered = true;
                    return Ok(Some(RawRecord::from_line(line)));
                }
                Cursor::Finished => unreachable!("checked above"),
            }
        }
    }

    /// Fetch and decode the next record in one step
    pub fn read_variant(&mut self, rounding: LengthRounding) -> Result<Option<VariantRecord>> {
        match self.next_record()? {
            Some(raw) => Ok(Some(VariantRecord::decode(
                raw,
                self.samples_arc(),
                rounding,
            )?)),
            None => Ok(None),
        }
    }
}

/// Chromosome and 1-based position of a record line, without a full decode
fn locate(line: &str) -> Result<(&str, u32)> {
    let mut fields = line.split('\t');
    let chrom = fields
        .next()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| StrNovoError::malformed("record with empty CHROM field"))?;
    let pos = fields
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| StrNovoError::malformed(format!("invalid POS on {}", chrom)))?;
    Ok((chrom, pos))
}

/// Parse `chrom`, `chrom:pos`, or `chrom:start-end` (1-based inclusive)
fn parse_region(region: &str) -> Option<(&str, u32, Option<u32>)> {
    let region = region.trim();
    let Some((chrom, range)) = region.split_once(':') else {
        return if region.is_empty() {
            None
        } else {
            Some((region, 1, None))
        };
    };
    if chrom.is_empty() {
        return None;
    }
    match range.split_once('-') {
        None => Some((chrom, parse_coord(range)?, None)),
        Some((start, end)) => {
            let start = parse_coord(start)?;
            let end = parse_coord(end)?;
            (start <= end).then_some((chrom, start, Some(end)))
        }
    }
}

fn parse_coord(s: &str) -> Option<u32> {
    s.parse().ok().filter(|&v| v > 0)
}

fn tabix_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".tbi");
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_forms() {
        assert_eq!(parse_region("chr1"), Some(("chr1", 1, None)));
        assert_eq!(parse_region("chr1:250"), Some(("chr1", 250, None)));
        assert_eq!(parse_region("chr1:100-200"), Some(("chr1", 100, Some(200))));
    }

    #[test]
    fn test_parse_region_rejects_malformed() {
        assert_eq!(parse_region(""), None);
        assert_eq!(parse_region(":100"), None);
        assert_eq!(parse_region("chr1:abc"), None);
        assert_eq!(parse_region("chr1:200-100"), None);
        assert_eq!(parse_region("chr1:0"), None);
    }

    #[test]
    fn test_locate() {
        let (chrom, pos) = locate("chr2\t1234\t.\tA\tT\t.\t.\t.").unwrap();
        assert_eq!(chrom, "chr2");
        assert_eq!(pos, 1234);
        assert!(locate("chr2\toops").is_err());
    }

    #[test]
    fn test_tabix_path() {
        assert_eq!(
            tabix_path(Path::new("/data/strs.vcf.gz")),
            PathBuf::from("/data/strs.vcf.gz.tbi")
        );
    }
}
