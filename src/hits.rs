//! Tabular BLASTX hits, one file per relative
//!
//! Expected columns (`-outfmt` below): query id, subject id, 1-based query
//! and subject coordinates, query and subject frame, expect value,
//! identities, alignment length and an optional subject title. BLAST lists
//! subjects best-first for each query, so the first subject seen for a
//! query is its best-ranked alignment.

use crate::fasta::ContigSet;
use crate::hsp::{BlastAlignment, BlastHsp, BlastRecord};
use crate::logging::log_rejected_alignment;
use crate::types::{ContigOrfError, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// BLAST `-outfmt` value producing the expected columns
pub const HITS_OUTFMT: &str =
    "6 qseqid sseqid qstart qend sstart send qframe sframe evalue nident length stitle";

const MIN_COLUMNS: usize = 11;

/// Search records of one relative, per query in first-seen order
#[derive(Debug, Default)]
pub struct RelativeHits {
    pub relative: String,
    pub records: Vec<(String, BlastRecord)>,
}

/// Parse a tabular hits file for `relative`
pub fn parse_hits_file<P: AsRef<Path>>(path: P, relative: &str) -> Result<RelativeHits> {
    let path = path.as_ref();
    info!("Parsing hits for relative {}: {}", relative, path.display());

    let file = File::open(path).map_err(|e| {
        ContigOrfError::HitsParse(format!(
            "Failed to open hits file {}: {}",
            path.display(),
            e
        ))
    })?;
    let hits = parse_hits(BufReader::new(file), relative)?;

    info!(
        "Loaded hits for {} queries from relative {}",
        hits.records.len(),
        relative
    );
    Ok(hits)
}

pub fn parse_hits<R: BufRead>(reader: R, relative: &str) -> Result<RelativeHits> {
    let mut records: Vec<(String, BlastRecord)> = Vec::new();
    let mut query_index: HashMap<String, usize> = HashMap::new();
    // (query slot, subject id) -> alignment slot
    let mut subject_index: HashMap<(usize, String), usize> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (query_id, subject_id, title, hsp) = parse_hits_line(trimmed, line_number)?;

        let query_slot = *query_index.entry(query_id.clone()).or_insert_with(|| {
            records.push((query_id, BlastRecord::default()));
            records.len() - 1
        });
        let record = &mut records[query_slot].1;

        let alignment_slot = *subject_index
            .entry((query_slot, subject_id))
            .or_insert_with(|| {
                record.alignments.push(BlastAlignment {
                    title,
                    hsps: Vec::new(),
                });
                record.alignments.len() - 1
            });
        record.alignments[alignment_slot].hsps.push(hsp);
    }

    Ok(RelativeHits {
        relative: relative.to_string(),
        records,
    })
}

fn parse_hits_line(line: &str, line_number: usize) -> Result<(String, String, String, BlastHsp)> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(ContigOrfError::HitsParse(format!(
            "Line {}: expected at least {} tab-separated columns, found {}",
            line_number,
            MIN_COLUMNS,
            fields.len()
        )));
    }

    fn field<T: std::str::FromStr>(fields: &[&str], column: usize, line_number: usize) -> Result<T> {
        fields[column].trim().parse().map_err(|_| {
            ContigOrfError::HitsParse(format!(
                "Line {}: invalid value '{}' in column {}",
                line_number,
                fields[column],
                column + 1
            ))
        })
    }

    let query_id = fields[0].to_string();
    let subject_id = fields[1].to_string();
    let title = match fields.get(11) {
        Some(title) if !title.trim().is_empty() && *title != "N/A" => title.trim().to_string(),
        _ => subject_id.clone(),
    };

    let hsp = BlastHsp {
        query_start: field(&fields, 2, line_number)?,
        query_end: field(&fields, 3, line_number)?,
        sbjct_start: field(&fields, 4, line_number)?,
        sbjct_end: field(&fields, 5, line_number)?,
        frame: (
            field(&fields, 6, line_number)?,
            field(&fields, 7, line_number)?,
        ),
        expect: field(&fields, 8, line_number)?,
        identities: field(&fields, 9, line_number)?,
        align_length: field(&fields, 10, line_number)?,
    };

    Ok((query_id, subject_id, title, hsp))
}

/// Counts from attaching one relative's hits to the contigs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EvidenceStats {
    pub contigs_with_hits: u32,
    pub hsps_added: u32,
    pub unknown_contigs: u32,
    pub rejected_alignments: u32,
}

impl std::fmt::Display for EvidenceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contigs with hits: {}, HSPs added: {}, Unknown contigs: {}, Rejected alignments: {}",
            self.contigs_with_hits, self.hsps_added, self.unknown_contigs, self.rejected_alignments
        )
    }
}

/// Attach the best alignment of each record to its contig.
///
/// Unknown contigs and alignments breaking the input contract are logged
/// and skipped so the remaining contigs are still processed.
pub fn add_relative_hits(contigs: &mut ContigSet, hits: &RelativeHits) -> EvidenceStats {
    let mut stats = EvidenceStats::default();

    for (query_id, record) in &hits.records {
        let contig = match contigs.get_mut(query_id) {
            Some(contig) => contig,
            None => {
                debug!("Hits for unknown contig {} ({})", query_id, hits.relative);
                stats.unknown_contigs += 1;
                continue;
            }
        };

        match contig.add_alignment(&hits.relative, record) {
            Ok(0) => {}
            Ok(added) => {
                stats.contigs_with_hits += 1;
                stats.hsps_added += added as u32;
            }
            Err(e) => {
                log_rejected_alignment(query_id, &hits.relative, &e);
                stats.rejected_alignments += 1;
            }
        }
    }

    if stats.unknown_contigs > 0 {
        warn!(
            "{} queries in hits of {} do not match any contig",
            stats.unknown_contigs, hits.relative
        );
    }
    info!("Relative {}: {}", hits.relative, stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contig::Contig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HITS: &str = "# BLASTX\n\
contig1\tP1\t11\t100\t5\t34\t1\t0\t1e-20\t28\t30\tkinase [A. thaliana]\n\
contig1\tP1\t151\t250\t50\t83\t1\t0\t1e-10\t20\t34\tkinase [A. thaliana]\n\
contig1\tP2\t1\t90\t1\t30\t2\t0\t1e-3\t10\t30\tother protein\n\
contig2\tP3\t200\t101\t2\t35\t-1\t0\t2e-5\t15\t34\n";

    #[test]
    fn test_parse_groups_by_query_and_subject() {
        let hits = parse_hits(HITS.as_bytes(), "athaliana").unwrap();
        assert_eq!(hits.records.len(), 2);

        let (query, record) = &hits.records[0];
        assert_eq!(query, "contig1");
        assert_eq!(record.alignments.len(), 2);
        let best = record.best_alignment().unwrap();
        assert_eq!(best.title, "kinase [A. thaliana]");
        assert_eq!(best.hsps.len(), 2);
        assert_eq!(best.hsps[1].query_start, 151);
        assert_eq!(best.hsps[1].frame, (1, 0));
        assert_eq!(best.hsps[0].identities, 28);

        let (_, record) = &hits.records[1];
        let best = record.best_alignment().unwrap();
        assert_eq!(best.title, "P3");
        assert_eq!(best.hsps[0].frame, (-1, 0));
        assert!((best.hsps[0].expect - 2e-5).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        let err = parse_hits("c1\tP1\t1\t90\n".as_bytes(), "r").unwrap_err();
        assert!(err.to_string().contains("Line 1"));

        let err = parse_hits(
            "# header\nc1\tP1\tone\t90\t1\t30\t1\t0\t1e-5\t20\t30\n".as_bytes(),
            "r",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_add_relative_hits() {
        let mut contigs = ContigSet::new();
        contigs
            .add_contig(Contig::new("contig1", None, vec![b'A'; 300]))
            .unwrap();
        // contig2's HSP ends past the contig and is rejected
        contigs
            .add_contig(Contig::new("contig2", None, vec![b'A'; 150]))
            .unwrap();

        let mut hits = parse_hits(HITS.as_bytes(), "athaliana").unwrap();
        hits.records.push(("contig9".to_string(), BlastRecord::default()));

        let stats = add_relative_hits(&mut contigs, &hits);
        assert_eq!(stats.contigs_with_hits, 1);
        assert_eq!(stats.hsps_added, 2);
        assert_eq!(stats.rejected_alignments, 1);
        assert_eq!(stats.unknown_contigs, 1);

        assert!(contigs.get("contig1").unwrap().has_relative);
        assert!(!contigs.get("contig2").unwrap().has_relative);
    }

    #[test]
    fn test_parse_hits_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", HITS).unwrap();
        let hits = parse_hits_file(temp_file.path(), "rel").unwrap();
        assert_eq!(hits.relative, "rel");
        assert_eq!(hits.records.len(), 2);
        assert!(parse_hits_file("/nonexistent/hits.tsv", "rel").is_err());
    }
}
