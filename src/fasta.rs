//! FASTA parsing of assembled contigs

use crate::contig::Contig;
use crate::types::{ContigOrfError, Result};
use bio::io::fasta;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Contigs in input order with lookup by id
#[derive(Debug, Default)]
pub struct ContigSet {
    contigs: Vec<Contig>,
    index: HashMap<String, usize>,
}

impl ContigSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contig(&mut self, contig: Contig) -> Result<()> {
        if self.index.contains_key(&contig.id) {
            return Err(ContigOrfError::FastaParse(format!(
                "Duplicate contig id: {}",
                contig.id
            )));
        }
        self.index.insert(contig.id.clone(), self.contigs.len());
        self.contigs.push(contig);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Contig> {
        self.index.get(id).map(|&i| &self.contigs[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Contig> {
        match self.index.get(id) {
            Some(&i) => self.contigs.get_mut(i),
            None => None,
        }
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

/// Parse a FASTA file of contigs
pub fn parse_fasta_file<P: AsRef<Path>>(path: P) -> Result<ContigSet> {
    let path = path.as_ref();
    info!("Parsing FASTA file: {}", path.display());

    let file = File::open(path).map_err(|e| {
        ContigOrfError::FastaParse(format!(
            "Failed to open FASTA file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contigs = parse_fasta(BufReader::new(file))?;
    info!("Successfully loaded {} contigs from FASTA file", contigs.len());
    Ok(contigs)
}

/// Parse contigs from any FASTA reader
pub fn parse_fasta<R: Read>(reader: R) -> Result<ContigSet> {
    let mut contigs = ContigSet::new();

    for result in fasta::Reader::new(reader).records() {
        let record = result.map_err(|e| {
            ContigOrfError::FastaParse(format!("Failed to parse FASTA record: {}", e))
        })?;

        let sequence = record.seq().to_ascii_uppercase();
        validate_dna_sequence(&sequence).map_err(|e| {
            ContigOrfError::FastaParse(format!("Contig {}: {}", record.id(), e))
        })?;

        debug!("Loaded contig: {} (length: {})", record.id(), sequence.len());
        contigs.add_contig(Contig::new(
            record.id(),
            record.desc().map(|d| d.to_string()),
            sequence,
        ))?;
    }

    if contigs.is_empty() {
        return Err(ContigOrfError::FastaParse(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(contigs)
}

/// Validate that a sequence contains only nucleotide codes
pub fn validate_dna_sequence(sequence: &[u8]) -> Result<()> {
    for (i, &base) in sequence.iter().enumerate() {
        match base.to_ascii_uppercase() {
            b'A' | b'T' | b'G' | b'C' | b'U' | b'N' => continue,
            b'R' | b'Y' | b'S' | b'W' | b'K' | b'M' | b'B' | b'D' | b'H' | b'V' => continue,
            _ => {
                return Err(ContigOrfError::FastaParse(format!(
                    "Invalid base '{}' at position {}",
                    base as char,
                    i + 1
                )));
            }
        }
    }
    Ok(())
}

/// Summary statistics over the loaded contigs
#[derive(Debug)]
pub struct ContigStats {
    pub contig_count: usize,
    pub total_length: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub gc_content: f64,
}

pub fn get_contig_stats(contigs: &ContigSet) -> ContigStats {
    let mut total_length = 0;
    let mut gc_count = 0;

    for contig in contigs.contigs() {
        total_length += contig.len();
        gc_count += contig
            .sequence
            .iter()
            .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
            .count();
    }

    let gc_content = if total_length > 0 {
        (gc_count as f64 / total_length as f64) * 100.0
    } else {
        0.0
    };

    ContigStats {
        contig_count: contigs.len(),
        total_length,
        min_length: contigs.contigs().iter().map(|c| c.len()).min().unwrap_or(0),
        max_length: contigs.contigs().iter().map(|c| c.len()).max().unwrap_or(0),
        gc_content,
    }
}

impl std::fmt::Display for ContigStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contigs: {}, Total length: {} bp, Length range: {}-{} bp, GC content: {:.2}%",
            self.contig_count, self.total_length, self.min_length, self.max_length, self.gc_content
        )
    }
}
